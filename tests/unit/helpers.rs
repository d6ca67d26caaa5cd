//! Test utilities and helpers for unit tests
//!
//! - Deterministic random sequences
//! - A pass fixture bundling everything admission needs

use blastn_seed::core::blast_encoding::PackedSequence;
use blastn_seed::core::blast_parameters::{NuclScoringMatrix, WordFinderParams, WordOptions};
use blastn_seed::core::na_ungapped::ExtendContext;
use blastn_seed::core::query_info::QueryInfo;

/// Deterministic ACGT sequence (xorshift64)
pub fn random_sequence(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            b"ACGT"[(state >> 62) as usize]
        })
        .collect()
}

/// Everything a pass borrows, owned in one place
pub struct Fixture {
    pub query: PackedSequence,
    pub subject: PackedSequence,
    pub matrix: NuclScoringMatrix,
    pub query_info: QueryInfo,
    pub params: WordFinderParams,
}

impl Fixture {
    pub fn new(query: &[u8], subject: &[u8], options: &WordOptions) -> Self {
        Self::with_contexts(query, &[query.len()], subject, options)
    }

    pub fn with_contexts(
        query: &[u8],
        context_lengths: &[usize],
        subject: &[u8],
        options: &WordOptions,
    ) -> Self {
        let query_info = QueryInfo::from_lengths(context_lengths);
        let params = WordFinderParams::new(options, &query_info, subject.len())
            .expect("test options must be valid");
        Self {
            query: PackedSequence::new(query),
            subject: PackedSequence::new(subject),
            matrix: NuclScoringMatrix::new(options.reward, options.penalty),
            query_info,
            params,
        }
    }

    pub fn ctx(&self) -> ExtendContext<'_> {
        ExtendContext {
            query: &self.query,
            subject: &self.subject,
            matrix: &self.matrix,
            query_info: &self.query_info,
            params: &self.params,
        }
    }
}
