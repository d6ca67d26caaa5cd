//! Initial hit list
//!
//! Word hits that pass admission are appended here during a pass. The list
//! is owned by the caller, reused across passes via [`InitHitList::reset`],
//! and handed on to gapped extension afterwards.

use std::cmp::Ordering;

/// Result of an ungapped extension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UngappedData {
    /// Start of the extension in the query
    pub q_start: i32,
    /// Start of the extension in the subject
    pub s_start: i32,
    /// Length of the extension (same on both sequences)
    pub length: i32,
    pub score: i32,
}

impl UngappedData {
    /// One past the last subject offset covered
    #[inline]
    pub fn s_end(&self) -> i32 {
        self.s_start + self.length
    }

    #[inline]
    pub fn q_end(&self) -> i32 {
        self.q_start + self.length
    }
}

/// An admitted word hit and, if it was scored, its ungapped extension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitHsp {
    pub q_off: i32,
    pub s_off: i32,
    pub ungapped_data: Option<UngappedData>,
}

/// Append-only list of admitted hits
#[derive(Clone, Debug, Default)]
pub struct InitHitList {
    hsps: Vec<InitHsp>,
    /// Hits ever appended since the last reset
    total: usize,
}

const MIN_INIT_HITLIST_SIZE: usize = 100;

impl InitHitList {
    pub fn new() -> Self {
        Self {
            hsps: Vec::with_capacity(MIN_INIT_HITLIST_SIZE),
            total: 0,
        }
    }

    /// Append a hit
    pub fn save_initial_hit(&mut self, q_off: i32, s_off: i32, ungapped_data: Option<UngappedData>) {
        self.hsps.push(InitHsp {
            q_off,
            s_off,
            ungapped_data,
        });
        self.total += 1;
    }

    /// Append a hit whose ungapped extension was computed elsewhere
    pub fn save_init_hsp(
        &mut self,
        q_start: i32,
        s_start: i32,
        q_off: i32,
        s_off: i32,
        length: i32,
        score: i32,
    ) {
        self.save_initial_hit(
            q_off,
            s_off,
            Some(UngappedData {
                q_start,
                s_start,
                length,
                score,
            }),
        );
    }

    /// Sort scored hits by descending score.
    ///
    /// Ties fall back to subject start, then longer first, then query start.
    /// The sort is stable, so unscored hits keep their relative order at the
    /// end.
    pub fn sort_by_score(&mut self) {
        self.hsps.sort_by(compare_init_hsps);
    }

    /// Drop everything appended after the first `len` hits
    pub fn truncate(&mut self, len: usize) {
        let dropped = self.hsps.len().saturating_sub(len);
        self.hsps.truncate(len);
        self.total -= dropped.min(self.total);
    }

    pub fn reset(&mut self) {
        self.hsps.clear();
        self.total = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.hsps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hsps.is_empty()
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn hsps(&self) -> &[InitHsp] {
        &self.hsps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InitHsp> {
        self.hsps.iter()
    }
}

impl<'a> IntoIterator for &'a InitHitList {
    type Item = &'a InitHsp;
    type IntoIter = std::slice::Iter<'a, InitHsp>;

    fn into_iter(self) -> Self::IntoIter {
        self.hsps.iter()
    }
}

fn compare_init_hsps(a: &InitHsp, b: &InitHsp) -> Ordering {
    match (&a.ungapped_data, &b.ungapped_data) {
        (Some(x), Some(y)) => y
            .score
            .cmp(&x.score)
            .then(x.s_start.cmp(&y.s_start))
            .then(y.length.cmp(&x.length))
            .then(x.q_start.cmp(&y.q_start)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
