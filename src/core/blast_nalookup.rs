//! Nucleotide Lookup Table
//!
//! Hash table from `lut_word_length`-base query words to the query offsets
//! where they occur. Words are indexed per context, so no word straddles
//! the boundary between two contexts of a query block.

use rustc_hash::FxHashMap;

use crate::core::blast_encoding::PackedSequence;
use crate::core::blast_nascan::{NaScanSubject, OffsetPair};
use crate::core::query_info::QueryInfo;
use crate::error::{ExtendError, Result};

/// Query offsets keyed by 2-bit encoded word
pub type NaWordLookup = FxHashMap<u64, Vec<u32>>;

pub struct NaLookupTable {
    table: NaWordLookup,
    lut_word_length: usize,
    scan_step: usize,
    longest_chain: usize,
}

impl NaLookupTable {
    /// Index every `lut_word_length`-base word of each query context
    pub fn new(
        query: &PackedSequence,
        query_info: &QueryInfo,
        lut_word_length: usize,
        scan_step: usize,
    ) -> Result<Self> {
        if lut_word_length == 0 || lut_word_length > 32 {
            return Err(ExtendError::invalid_options(format!(
                "lookup word length {} outside 1..=32",
                lut_word_length
            )));
        }
        if scan_step == 0 {
            return Err(ExtendError::invalid_options("scan step must be positive"));
        }

        let mask = if lut_word_length == 32 {
            u64::MAX
        } else {
            (1u64 << (2 * lut_word_length)) - 1
        };

        let mut table: NaWordLookup = FxHashMap::default();
        for context in &query_info.contexts {
            let from = context.query_offset as usize;
            let to = context.end_offset() as usize;
            if to - from < lut_word_length {
                continue;
            }

            // rolling word over the context
            let mut word = 0u64;
            for pos in from..to {
                word = ((word << 2) | query.get_base(pos) as u64) & mask;
                if pos + 1 >= from + lut_word_length {
                    let q_off = pos + 1 - lut_word_length;
                    table.entry(word).or_default().push(q_off as u32);
                }
            }
        }

        let longest_chain = table.values().map(Vec::len).max().unwrap_or(0);
        log::debug!(
            "lookup table: {} distinct {}-mers, longest chain {}",
            table.len(),
            lut_word_length,
            longest_chain
        );

        Ok(Self {
            table,
            lut_word_length,
            scan_step,
            longest_chain,
        })
    }

    /// Number of distinct words indexed
    #[inline]
    pub fn num_words(&self) -> usize {
        self.table.len()
    }

    /// Query offsets of `word`, empty if it does not occur
    #[inline]
    pub fn get_hits(&self, word: u64) -> &[u32] {
        self.table.get(&word).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl NaScanSubject for NaLookupTable {
    #[inline]
    fn lut_word_length(&self) -> usize {
        self.lut_word_length
    }

    #[inline]
    fn scan_step(&self) -> usize {
        self.scan_step
    }

    #[inline]
    fn longest_chain(&self) -> usize {
        self.longest_chain
    }

    fn scan_subject(
        &self,
        subject: &PackedSequence,
        start_offset: usize,
        offset_pairs: &mut [OffsetPair],
        next_start: &mut usize,
    ) -> usize {
        let mut count = 0;
        let mut s_off = start_offset;

        if subject.len() >= self.lut_word_length {
            let last_start = subject.len() - self.lut_word_length;
            while s_off <= last_start {
                let Some(word) = subject.extract_word(s_off, self.lut_word_length) else {
                    break;
                };
                let hits = self.get_hits(word);
                if count + hits.len() > offset_pairs.len() {
                    debug_assert!(count > 0, "batch shorter than the longest chain");
                    break;
                }
                for (slot, &q_off) in offset_pairs[count..].iter_mut().zip(hits) {
                    *slot = OffsetPair {
                        q_off,
                        s_off: s_off as u32,
                    };
                }
                count += hits.len();
                s_off += self.scan_step;
            }
        } else {
            s_off = subject.len() + 1;
        }

        *next_start = s_off;
        count
    }
}
