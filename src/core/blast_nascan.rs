//! Nucleotide subject scanning
//!
//! The word finder drives a scanner through the subject in batches. A
//! scanner reports every (query offset, subject offset) pair whose
//! lookup-table word matches, never splitting one subject word's hits
//! across two batches.

use crate::core::blast_encoding::PackedSequence;

/// A lookup-table word hit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OffsetPair {
    pub q_off: u32,
    pub s_off: u32,
}

/// Subject scanner backed by a lookup table over the query
pub trait NaScanSubject {
    /// Width of the words the table indexes
    fn lut_word_length(&self) -> usize;

    /// Distance between consecutive scanned subject offsets
    fn scan_step(&self) -> usize;

    /// Most query offsets stored under any one word. A batch must be at
    /// least this long for the scan to make progress.
    fn longest_chain(&self) -> usize;

    /// Scan `subject` from `start_offset`, filling `offset_pairs` with hits.
    ///
    /// Returns the number of pairs written and sets `next_start` to the
    /// first offset not yet scanned. Scanning stops early when the next
    /// word's hits would not fit in the remaining batch.
    fn scan_subject(
        &self,
        subject: &PackedSequence,
        start_offset: usize,
        offset_pairs: &mut [OffsetPair],
        next_start: &mut usize,
    ) -> usize;
}
