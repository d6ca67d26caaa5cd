//! Nucleotide word finder
//!
//! Drives a scanner over one subject, confirms each lookup-table hit up to
//! the full word length, and hands surviving hits to admission.
//!
//! Three strategies confirm the extra `word_length - lut_word_length`
//! bases:
//! - direct: the lookup word already is the full word
//! - aligned: hits start on subject byte boundaries, so whole subject bytes
//!   are compared four bases at a time before finishing base by base
//! - unaligned: base-by-base comparison
//!
//! All three walk left from the hit first and only then right, and drop a
//! hit as soon as fewer than the required extra bases match.

use crate::core::blast_diagnostics::UngappedStats;
use crate::core::blast_encoding::{PackedSequence, COMPRESSION_RATIO};
use crate::core::blast_extend::{DiagContainer, DiagonalStore};
use crate::core::blast_hits::InitHitList;
use crate::core::blast_nascan::{NaScanSubject, OffsetPair};
use crate::core::blast_parameters::OFFSET_ARRAY_SIZE;
use crate::core::na_ungapped::{blastn_extend_initial_hit, ExtendContext};
use crate::error::Result;

/// How lookup-table hits are confirmed up to the full word length
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordExtension {
    Direct,
    Aligned,
    Unaligned,
}

impl WordExtension {
    pub fn select(lut_word_length: usize, word_length: usize, scan_step: usize) -> Self {
        if lut_word_length == word_length {
            WordExtension::Direct
        } else if lut_word_length % COMPRESSION_RATIO == 0 && scan_step % COMPRESSION_RATIO == 0 {
            WordExtension::Aligned
        } else {
            WordExtension::Unaligned
        }
    }
}

/// Admit lookup hits that already span the full word
pub fn blast_na_extend_direct<S: DiagonalStore>(
    ctx: &ExtendContext<'_>,
    store: &mut S,
    offset_pairs: &[OffsetPair],
    init_hitlist: &mut InitHitList,
) -> Result<usize> {
    let lut_word_length = ctx.params.lut_word_length;
    let mut hits_extended = 0;
    for pair in offset_pairs {
        let q_off = pair.q_off as usize;
        let s_off = pair.s_off as usize;
        if blastn_extend_initial_hit(ctx, store, q_off, s_off + lut_word_length, s_off, init_hitlist)? {
            hits_extended += 1;
        }
    }
    Ok(hits_extended)
}

/// Confirm extra bases on byte-aligned hits, then admit
pub fn blast_na_extend_aligned<S: DiagonalStore>(
    ctx: &ExtendContext<'_>,
    store: &mut S,
    offset_pairs: &[OffsetPair],
    init_hitlist: &mut InitHitList,
) -> Result<usize> {
    extend_to_word_size(ctx, store, offset_pairs, init_hitlist, true)
}

/// Confirm extra bases one at a time, then admit
pub fn blast_na_extend<S: DiagonalStore>(
    ctx: &ExtendContext<'_>,
    store: &mut S,
    offset_pairs: &[OffsetPair],
    init_hitlist: &mut InitHitList,
) -> Result<usize> {
    extend_to_word_size(ctx, store, offset_pairs, init_hitlist, false)
}

fn extend_to_word_size<S: DiagonalStore>(
    ctx: &ExtendContext<'_>,
    store: &mut S,
    offset_pairs: &[OffsetPair],
    init_hitlist: &mut InitHitList,
    aligned: bool,
) -> Result<usize> {
    let query = ctx.query;
    let subject = ctx.subject;
    let lut_word_length = ctx.params.lut_word_length;
    let extra_bases = ctx.params.word_length - lut_word_length;
    let mut hits_extended = 0;

    for pair in offset_pairs {
        let q_offset = pair.q_off as usize;
        let s_offset = pair.s_off as usize;
        let context = &ctx.query_info.contexts[ctx.query_info.context_for_offset(q_offset)];
        let q_range = context.range();
        // aligned reads need the subject offset on a byte boundary
        let by_bytes = aligned && s_offset % COMPRESSION_RATIO == 0;
        debug_assert!(!aligned || by_bytes, "unaligned hit at {}", s_offset);

        let max_bases_left = extra_bases.min(q_offset - q_range.start).min(s_offset);
        let extended_left = if by_bytes {
            extend_left_aligned(query, subject, q_offset, s_offset, max_bases_left)
        } else {
            extend_left(query, subject, q_offset, s_offset, max_bases_left)
        };

        let q_off = q_offset + lut_word_length;
        let s_off = s_offset + lut_word_length;
        let mut extended_right = 0;
        if extended_left < extra_bases {
            let max_bases_right = (extra_bases - extended_left)
                .min(q_range.end.saturating_sub(q_off))
                .min(subject.len().saturating_sub(s_off));
            extended_right = if by_bytes {
                extend_right_aligned(query, subject, q_off, s_off, max_bases_right)
            } else {
                extend_right(query, subject, q_off, s_off, max_bases_right)
            };
            if extended_left + extended_right < extra_bases {
                continue;
            }
        }

        // the hit spans from its first confirmed match to one past its last
        if blastn_extend_initial_hit(
            ctx,
            store,
            q_offset - extended_left,
            s_off + extended_right,
            s_offset - extended_left,
            init_hitlist,
        )? {
            hits_extended += 1;
        }
    }
    Ok(hits_extended)
}

#[inline]
fn extend_left(
    query: &PackedSequence,
    subject: &PackedSequence,
    q_off: usize,
    s_off: usize,
    max: usize,
) -> usize {
    let mut ext = 0;
    while ext < max && subject.get_base(s_off - ext - 1) == query.get_base(q_off - ext - 1) {
        ext += 1;
    }
    ext
}

#[inline]
fn extend_right(
    query: &PackedSequence,
    subject: &PackedSequence,
    q_off: usize,
    s_off: usize,
    max: usize,
) -> usize {
    let mut ext = 0;
    while ext < max && subject.get_base(s_off + ext) == query.get_base(q_off + ext) {
        ext += 1;
    }
    ext
}

#[inline]
fn extend_left_aligned(
    query: &PackedSequence,
    subject: &PackedSequence,
    q_off: usize,
    s_off: usize,
    max: usize,
) -> usize {
    let s_bytes = subject.data();
    let mut ext = 0;
    while ext + COMPRESSION_RATIO <= max
        && s_bytes[(s_off - ext) / COMPRESSION_RATIO - 1]
            == query.byte_at(q_off - ext - COMPRESSION_RATIO)
    {
        ext += COMPRESSION_RATIO;
    }
    ext + extend_left(query, subject, q_off - ext, s_off - ext, max - ext)
}

#[inline]
fn extend_right_aligned(
    query: &PackedSequence,
    subject: &PackedSequence,
    q_off: usize,
    s_off: usize,
    max: usize,
) -> usize {
    let s_bytes = subject.data();
    let mut ext = 0;
    while ext + COMPRESSION_RATIO <= max
        && s_bytes[(s_off + ext) / COMPRESSION_RATIO] == query.byte_at(q_off + ext)
    {
        ext += COMPRESSION_RATIO;
    }
    ext + extend_right(query, subject, q_off + ext, s_off + ext, max - ext)
}

/// Find, confirm and admit every word hit between the query and `ctx.subject`.
///
/// `offset_pairs` is scratch space for scan batches and may be reused
/// between calls. On success the diagonal store has been rebased past the
/// subject and, if hits were scored, the hit list is sorted by score. On
/// failure the hits appended by this pass are removed and the store is
/// cleared before the error is returned.
pub fn blast_na_word_finder<L: NaScanSubject + ?Sized>(
    ctx: &ExtendContext<'_>,
    lookup: &L,
    container: &mut DiagContainer,
    offset_pairs: &mut Vec<OffsetPair>,
    init_hitlist: &mut InitHitList,
) -> Result<UngappedStats> {
    debug_assert_eq!(lookup.lut_word_length(), ctx.params.lut_word_length);

    let max_hits = OFFSET_ARRAY_SIZE.max(lookup.longest_chain());
    if offset_pairs.len() < max_hits {
        offset_pairs.resize(max_hits, OffsetPair::default());
    }

    let start_len = init_hitlist.len();
    let pass = match container {
        DiagContainer::Dense(table) => scan_and_extend(ctx, lookup, table, offset_pairs, init_hitlist),
        DiagContainer::Sparse(hash) => scan_and_extend(ctx, lookup, hash, offset_pairs, init_hitlist),
    };

    let (lookup_hits, init_extends) = match pass {
        Ok(counts) => counts,
        Err(err) => {
            log::debug!("word finder pass aborted: {}", err);
            init_hitlist.truncate(start_len);
            container.clear();
            return Err(err);
        }
    };

    container.end_subject(ctx.subject.len());

    let stats = UngappedStats {
        lookup_hits,
        init_extends,
        good_init_extends: init_hitlist.len() - start_len,
    };
    log::debug!(
        "word finder: {} lookup hits, {} extended, {} saved ({:?} store)",
        stats.lookup_hits,
        stats.init_extends,
        stats.good_init_extends,
        container.kind()
    );

    if ctx.params.ungapped_extension_enabled {
        init_hitlist.sort_by_score();
    }
    Ok(stats)
}

fn scan_and_extend<L: NaScanSubject + ?Sized, S: DiagonalStore>(
    ctx: &ExtendContext<'_>,
    lookup: &L,
    store: &mut S,
    offset_pairs: &mut [OffsetPair],
    init_hitlist: &mut InitHitList,
) -> Result<(usize, usize)> {
    let params = ctx.params;
    let subject = ctx.subject;
    let mut total_hits = 0;
    let mut hits_extended = 0;

    if subject.len() < params.lut_word_length {
        return Ok((0, 0));
    }
    let last_start = subject.len() - params.lut_word_length;
    let strategy = WordExtension::select(params.lut_word_length, params.word_length, params.scan_step);

    let mut start_offset = 0;
    while start_offset <= last_start {
        let mut next_start = last_start + 1;
        let hits_found = lookup.scan_subject(subject, start_offset, offset_pairs, &mut next_start);
        if next_start <= start_offset {
            // scanner made no progress
            log::warn!("scanner stalled at subject offset {}", start_offset);
            break;
        }
        total_hits += hits_found;

        let batch = &offset_pairs[..hits_found];
        hits_extended += match strategy {
            WordExtension::Direct => blast_na_extend_direct(ctx, store, batch, init_hitlist)?,
            WordExtension::Aligned => blast_na_extend_aligned(ctx, store, batch, init_hitlist)?,
            WordExtension::Unaligned => blast_na_extend(ctx, store, batch, init_hitlist)?,
        };
        if log::log_enabled!(log::Level::Trace) {
            log::trace!(
                "batch [{}, {}): {} hits, {} saved so far",
                start_offset,
                next_start,
                hits_found,
                init_hitlist.len()
            );
        }

        start_offset = next_start;
    }

    Ok((total_hits, hits_extended))
}

/// Source of precomputed hits for an indexed subject database
pub trait IndexedHitSource {
    /// Append every hit for chunk `chunk` of subject `oid`; returns how
    /// many were appended.
    fn get_results(&self, oid: usize, chunk: usize, init_hitlist: &mut InitHitList) -> usize;
}

/// Fill the hit list straight from an index, bypassing scanning and
/// admission
pub fn indexed_word_finder<I: IndexedHitSource + ?Sized>(
    index: &I,
    oid: usize,
    chunk: usize,
    sort_by_score: bool,
    init_hitlist: &mut InitHitList,
) -> UngappedStats {
    let found = index.get_results(oid, chunk, init_hitlist);
    if sort_by_score {
        init_hitlist.sort_by_score();
    }
    UngappedStats {
        lookup_hits: found,
        init_extends: found,
        good_init_extends: found,
    }
}
