//! Nucleotide Ungapped Extension
//!
//! X-drop ungapped extension of word hits and the per-diagonal admission
//! logic deciding which hits get extended.
//!
//! Two extenders share one result type:
//! - [`nucl_ungapped_extend_exact`] scores one base at a time through the
//!   match/mismatch matrix.
//! - [`nucl_ungapped_extend`] scores four bases at a time through a table
//!   keyed by `query_byte ^ subject_byte`. Promising hits are thrown away
//!   and recomputed exactly from the same anchor.
//!
//! Both use the same running-sum discipline: a positive running sum is
//! committed into the score and the extension boundary moves to the
//! committing base; the walk stops once the uncommitted sum drops below the
//! (negative) X-drop threshold.

use std::ops::Range;

use crate::core::blast_encoding::{PackedSequence, COMPRESSION_RATIO};
use crate::core::blast_extend::{DiagStruct, DiagonalStore, StaleWindow};
use crate::core::blast_hits::{InitHitList, UngappedData};
use crate::core::blast_parameters::{NuclScoringMatrix, UngappedCutoffs, WordFinderParams};
use crate::core::query_info::QueryInfo;
use crate::error::Result;

/// Exact base-by-base X-drop extension around `(q_off, s_off)`.
///
/// The left walk starts at the base before the anchor, the right walk at
/// the anchor itself. Both stop at the sequence boundaries, so the result
/// never leaves either sequence.
pub fn nucl_ungapped_extend_exact(
    query: &PackedSequence,
    subject: &PackedSequence,
    matrix: &NuclScoringMatrix,
    q_off: usize,
    s_off: usize,
    x_dropoff: i32,
) -> UngappedData {
    extend_exact_within(query, subject, matrix, 0..query.len(), q_off, s_off, x_dropoff)
}

/// Exact extension that never leaves `q_range` of the query
pub(crate) fn extend_exact_within(
    query: &PackedSequence,
    subject: &PackedSequence,
    matrix: &NuclScoringMatrix,
    q_range: Range<usize>,
    q_off: usize,
    s_off: usize,
    x_dropoff: i32,
) -> UngappedData {
    debug_assert!(q_range.contains(&q_off) || q_off == q_range.end);
    debug_assert!(q_range.end <= query.len() && s_off <= subject.len());

    let mut score = 0;
    let mut sum = 0;

    // extend to the left
    let mut q_beg = q_off;
    let max_left = (q_off - q_range.start).min(s_off);
    for i in 1..=max_left {
        sum += matrix.score(query.get_base(q_off - i), subject.get_base(s_off - i));
        if sum > 0 {
            q_beg = q_off - i;
            score += sum;
            sum = 0;
        } else if sum < x_dropoff {
            break;
        }
    }

    // extend to the right
    let mut q_end = q_off;
    let max_right = (q_range.end - q_off).min(subject.len() - s_off);
    sum = 0;
    for i in 0..max_right {
        sum += matrix.score(query.get_base(q_off + i), subject.get_base(s_off + i));
        if sum > 0 {
            q_end = q_off + i + 1;
            score += sum;
            sum = 0;
        } else if sum < x_dropoff {
            break;
        }
    }

    UngappedData {
        q_start: q_beg as i32,
        s_start: (s_off - (q_off - q_beg)) as i32,
        length: (q_end - q_beg) as i32,
        score,
    }
}

/// Approximate 4-bases-at-a-time extension with exact fallback.
///
/// `s_match_end` is the first subject offset not known to match the query;
/// an approximate result always reaches at least that far. If the
/// approximate score reaches the context's reduced cutoff the approximate
/// alignment is discarded and [`nucl_ungapped_extend_exact`] is rerun from
/// `(q_off, s_off)`.
pub fn nucl_ungapped_extend(
    query: &PackedSequence,
    subject: &PackedSequence,
    matrix: &NuclScoringMatrix,
    score_table: &[i32; 256],
    q_off: usize,
    s_match_end: usize,
    s_off: usize,
    cutoffs: &UngappedCutoffs,
) -> UngappedData {
    extend_within(
        query,
        subject,
        matrix,
        score_table,
        0..query.len(),
        q_off,
        s_match_end,
        s_off,
        cutoffs,
    )
}

/// Approximate extension that never leaves `q_range` of the query
///
/// NCBI reference: na_ungapped.c, s_NuclUngappedExtend
pub(crate) fn extend_within(
    query: &PackedSequence,
    subject: &PackedSequence,
    matrix: &NuclScoringMatrix,
    score_table: &[i32; 256],
    q_range: Range<usize>,
    q_off: usize,
    s_match_end: usize,
    s_off: usize,
    cutoffs: &UngappedCutoffs,
) -> UngappedData {
    let x_dropoff = cutoffs.x_dropoff;

    // The left extension begins behind (q_ext, s_ext), the first 4-base
    // boundary of the subject at or after s_off.
    let align = (COMPRESSION_RATIO - s_off % COMPRESSION_RATIO) % COMPRESSION_RATIO;
    let q_ext = q_off + align;
    let s_ext = s_off + align;
    if q_ext > q_range.end || s_ext > subject.len() {
        return extend_exact_within(query, subject, matrix, q_range, q_off, s_off, x_dropoff);
    }

    let s_bytes = subject.data();
    let mut score = 0;
    let mut sum = 0;

    let mut q = q_ext;
    let mut s = s_ext / COMPRESSION_RATIO;
    let mut new_q = q;
    let len = (q_ext - q_range.start).min(s_ext) / COMPRESSION_RATIO;
    for _ in 0..len {
        sum += score_table[(query.byte_at(q - COMPRESSION_RATIO) ^ s_bytes[s - 1]) as usize];
        q -= COMPRESSION_RATIO;
        s -= 1;
        if sum > 0 {
            new_q = q;
            score += sum;
            sum = 0;
        }
        if sum < x_dropoff {
            break;
        }
    }

    let q_start = new_q;
    let s_start = s_ext - (q_ext - q_start);

    // the right extension begins at the first bases the left walk did not see
    q = q_ext;
    s = s_ext / COMPRESSION_RATIO;
    new_q = q;
    sum = 0;
    let len = (q_range.end - q_ext).min(subject.len() - s_ext) / COMPRESSION_RATIO;
    for _ in 0..len {
        sum += score_table[(query.byte_at(q) ^ s_bytes[s]) as usize];
        if sum > 0 {
            new_q = q + COMPRESSION_RATIO - 1;
            score += sum;
            sum = 0;
        }
        if sum < x_dropoff {
            break;
        }
        q += COMPRESSION_RATIO;
        s += 1;
    }

    if score >= cutoffs.reduced_nucl_cutoff_score {
        return extend_exact_within(query, subject, matrix, q_range, q_off, s_off, x_dropoff);
    }

    let covered = (s_match_end as i64 - s_start as i64).max((new_q - q_start + 1) as i64);
    let room = (q_range.end - q_start).min(subject.len() - s_start) as i64;
    UngappedData {
        q_start: q_start as i32,
        s_start: s_start as i32,
        length: covered.min(room) as i32,
        score,
    }
}

/// Read-only inputs shared by every admission call of a pass
#[derive(Clone, Copy)]
pub struct ExtendContext<'a> {
    pub query: &'a PackedSequence,
    pub subject: &'a PackedSequence,
    pub matrix: &'a NuclScoringMatrix,
    pub query_info: &'a QueryInfo,
    pub params: &'a WordFinderParams,
}

impl ExtendContext<'_> {
    #[inline]
    fn stale_window(&self) -> StaleWindow {
        StaleWindow {
            window_size: self.params.window_size as i32,
            min_step: self.params.min_step as i32,
            two_hits: self.params.two_hits(),
        }
    }
}

/// Decide whether the word hit `(q_off, s_off)`, matching exactly up to
/// `s_end`, is extended; extend it and save it if it qualifies.
///
/// Returns whether the hit was ready for extension. Only a failure to grow
/// the diagonal store is an error.
pub fn blastn_extend_initial_hit<S: DiagonalStore>(
    ctx: &ExtendContext<'_>,
    store: &mut S,
    q_off: usize,
    s_end: usize,
    s_off: usize,
    init_hitlist: &mut InitHitList,
) -> Result<bool> {
    let params = ctx.params;
    let window_size = params.window_size as i32;
    let min_step = params.min_step as i32;
    let offset = store.offset();

    let diag = s_off as i32 - q_off as i32;
    let s_pos = s_end as i32 + offset;
    let prev = store.lookup(diag);

    let step = match prev {
        Some(entry) => s_pos - entry.last_hit,
        None => i32::MAX,
    };
    if step <= 0 {
        // already explored further down this diagonal
        return Ok(false);
    }
    let hit_saved = prev.is_some_and(|entry| entry.flag);

    // A saved diagonal in two-hit mode is never extended directly: a hit
    // clear of the saved extension only starts the next pair.
    // NCBI reference: na_ungapped.c, s_BlastnDiagTableExtendInitialHit.
    let (new_hit, second_hit) = if !params.two_hits() || hit_saved {
        (step > min_step, false)
    } else {
        (
            step > window_size,
            step >= params.template_length as i32 && step < window_size,
        )
    };
    let hit_ready = (!params.two_hits() && new_hit) || second_hit;

    if hit_ready {
        let entry = if params.ungapped_extension_enabled {
            let context = ctx.query_info.context_for_offset(q_off);
            let cutoffs = params.cutoffs_for(context);
            let ungapped = extend_within(
                ctx.query,
                ctx.subject,
                ctx.matrix,
                &params.approx_score_table,
                ctx.query_info.contexts[context].range(),
                q_off,
                s_end,
                s_off,
                cutoffs,
            );
            let saved = ungapped.score >= cutoffs.cutoff_score;
            if saved {
                init_hitlist.save_initial_hit(q_off as i32, s_off as i32, Some(ungapped));
            }
            DiagStruct {
                last_hit: ungapped.s_end() + offset,
                flag: saved,
            }
        } else {
            init_hitlist.save_initial_hit(q_off as i32, s_off as i32, None);
            DiagStruct {
                last_hit: s_pos,
                flag: true,
            }
        };
        store.update(diag, entry, s_pos, &ctx.stale_window())?;
    } else if step > window_size || new_hit {
        // first hit of a possible pair, or a hit continuing the last one
        let entry = DiagStruct {
            last_hit: match prev {
                Some(entry) if step <= window_size => entry.last_hit,
                _ => s_pos,
            },
            flag: hit_saved && !new_hit,
        };
        store.update(diag, entry, s_pos, &ctx.stale_window())?;
    }

    Ok(hit_ready)
}
