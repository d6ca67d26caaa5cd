//! Property tests
//!
//! Invariants that must hold for any input: hash bookkeeping, monotone
//! diagonal positions, the approximate extender's fallback, and agreement
//! between the two diagonal stores.

use blastn_seed::core::blast_encoding::PackedSequence;
use blastn_seed::core::blast_extend::{DiagHash, DiagStruct, DiagTable, DiagonalStore, StaleWindow};
use blastn_seed::core::blast_hits::InitHitList;
use blastn_seed::core::blast_parameters::{
    build_nucl_score_table, NuclScoringMatrix, UngappedCutoffs, WordOptions,
};
use blastn_seed::core::na_ungapped::{
    blastn_extend_initial_hit, nucl_ungapped_extend, nucl_ungapped_extend_exact,
};
use proptest::prelude::*;

use crate::helpers::{random_sequence, Fixture};

fn bases(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"ACGT".to_vec()), len)
}

/// Query, subject and 8-base word hits `(q_off, s_off)` in subject order
fn pass_inputs() -> impl Strategy<Value = (Vec<u8>, Vec<u8>, Vec<(usize, usize)>)> {
    (bases(30..80), bases(30..80)).prop_flat_map(|(query, subject)| {
        let hits = prop::collection::vec((0..=query.len() - 8, 1..=subject.len() - 8), 1..120)
            .prop_map(|mut hits| {
                hits.sort_by_key(|&(_, s_off)| s_off);
                hits
            });
        (Just(query), Just(subject), hits)
    })
}

proptest! {
    #[test]
    fn prop_hash_bookkeeping(
        updates in prop::collection::vec((-300i32..300, 1i32..40), 1..400),
        window_size in 0i32..30,
        initial in 1usize..16,
    ) {
        let stale = StaleWindow { window_size, min_step: 0, two_hits: window_size > 0 };
        let mut hash = DiagHash::with_capacity(0, initial).unwrap();
        let mut s_pos = 1;
        let mut last_capacity = hash.capacity();
        for (diag, advance) in updates {
            s_pos += advance;
            let before = hash.lookup(diag).map(|_| hash.bucket_len(diag));
            hash.update(diag, DiagStruct { last_hit: s_pos, flag: true }, s_pos, &stale).unwrap();

            prop_assert_eq!(hash.lookup(diag), Some(DiagStruct { last_hit: s_pos, flag: true }));
            prop_assert!(hash.occupancy() <= hash.capacity());
            prop_assert!(hash.capacity() >= last_capacity);
            prop_assert!((hash.capacity() / initial).is_power_of_two());
            prop_assert_eq!(hash.capacity() % initial, 0);
            if let Some(len) = before {
                prop_assert_eq!(hash.bucket_len(diag), len);
            }
            last_capacity = hash.capacity();
        }
    }

    #[test]
    fn prop_diagonal_position_never_retreats(
        seq in bases(40..120),
        s_offs in prop::collection::vec(0usize..1000, 1..60),
        two_hits in any::<bool>(),
    ) {
        let len = seq.len();
        let options = WordOptions {
            word_size: 8,
            lut_word_length: 8,
            scan_step: 1,
            window_size: if two_hits { 20 } else { 0 },
            template_length: if two_hits { 4 } else { 0 },
            ..WordOptions::default()
        };
        let fx = Fixture::new(&seq, &seq, &options);
        let mut table = DiagTable::new(len, options.window_size);
        let mut hits = InitHitList::new();
        let mut s_offs: Vec<usize> = s_offs.into_iter().map(|s| s % (len - 8)).collect();
        s_offs.sort_unstable();

        let mut last = 0;
        for s_off in s_offs {
            blastn_extend_initial_hit(&fx.ctx(), &mut table, s_off, s_off + 8, s_off, &mut hits).unwrap();
            if let Some(state) = table.lookup(0) {
                prop_assert!(state.last_hit >= last);
                last = state.last_hit;
            }
        }
    }

    #[test]
    fn prop_approximate_matches_exact_when_promising(
        query in bases(8..90),
        subject in bases(8..90),
        q_pick in any::<prop::sample::Index>(),
        s_pick in any::<prop::sample::Index>(),
        cutoff in 0i32..40,
        x_dropoff in 1i32..30,
    ) {
        let q = PackedSequence::new(&query);
        let s = PackedSequence::new(&subject);
        let q_off = q_pick.index(query.len());
        let s_off = s_pick.index(subject.len());
        let m = NuclScoringMatrix::new(1, -2);
        let table = build_nucl_score_table(1, -2);
        let cutoffs = UngappedCutoffs::new(x_dropoff, cutoff);
        let s_match_end = (s_off + 1).min(subject.len());

        let approx = nucl_ungapped_extend(&q, &s, &m, &table, q_off, s_match_end, s_off, &cutoffs);
        let exact = nucl_ungapped_extend_exact(&q, &s, &m, q_off, s_off, cutoffs.x_dropoff);
        prop_assert!(approx == exact || approx.score < cutoffs.reduced_nucl_cutoff_score);
        prop_assert!(approx.q_start >= 0 && approx.s_start >= 0);
        prop_assert!(approx.q_end() as usize <= query.len());
        prop_assert!(approx.s_end() as usize <= subject.len());
        prop_assert_eq!(approx.s_start - approx.q_start, s_off as i32 - q_off as i32);
    }

    #[test]
    fn prop_dense_and_sparse_agree_on_single_hits(
        (query, subject, hits) in pass_inputs(),
        ungapped_extension in any::<bool>(),
    ) {
        let options = WordOptions {
            word_size: 8,
            lut_word_length: 8,
            scan_step: 4,
            ungapped_extension,
            ..WordOptions::default()
        };
        let fx = Fixture::new(&query, &subject, &options);

        // sized so no two diagonals of this pair share a slot
        let mut table = DiagTable::new(query.len() + subject.len(), 0);
        let mut hash = DiagHash::with_capacity(0, 4).unwrap();
        let mut dense_hits = InitHitList::new();
        let mut sparse_hits = InitHitList::new();
        for (q_off, s_off) in hits {
            let dense = blastn_extend_initial_hit(&fx.ctx(), &mut table, q_off, s_off + 8, s_off, &mut dense_hits).unwrap();
            let sparse = blastn_extend_initial_hit(&fx.ctx(), &mut hash, q_off, s_off + 8, s_off, &mut sparse_hits).unwrap();
            prop_assert_eq!(dense, sparse);
        }
        prop_assert_eq!(dense_hits.hsps(), sparse_hits.hsps());
    }

    #[test]
    fn prop_dense_and_sparse_agree_on_colliding_two_hits(
        picks in prop::collection::vec((0usize..7, 1usize..40), 1..150),
        ungapped_extension in any::<bool>(),
        template_length in 1usize..8,
    ) {
        let query = random_sequence(41, 8192);
        let subject = random_sequence(42, 8192);
        let options = WordOptions {
            word_size: 8,
            lut_word_length: 8,
            scan_step: 4,
            window_size: 20,
            template_length,
            ungapped_extension,
            ..WordOptions::default()
        };
        let fx = Fixture::new(&query, &subject, &options);
        let diagonals = shared_bucket_diagonals();

        let mut table = DiagTable::new(8192, 20);
        let mut hash = DiagHash::new(20).unwrap();
        let mut dense_hits = InitHitList::new();
        let mut sparse_hits = InitHitList::new();
        let mut s_off = 1500;
        for (pick, advance) in picks {
            s_off += advance;
            // keeps s_off - diag inside the query
            if s_off + 8 + 1500 > 8192 {
                break;
            }
            let diag = diagonals[pick % diagonals.len()];
            let q_off = (s_off as i32 - diag) as usize;
            let dense = blastn_extend_initial_hit(&fx.ctx(), &mut table, q_off, s_off + 8, s_off, &mut dense_hits).unwrap();
            let sparse = blastn_extend_initial_hit(&fx.ctx(), &mut hash, q_off, s_off + 8, s_off, &mut sparse_hits).unwrap();
            prop_assert_eq!(dense, sparse, "diag {} s_off {}", diag, s_off);
        }
        prop_assert_eq!(dense_hits.hsps(), sparse_hits.hsps());
    }
}

/// Diagonals in [-1500, 1500] hashing to the same bucket as diagonal 0
fn shared_bucket_diagonals() -> Vec<i32> {
    let never_stale = StaleWindow {
        window_size: i32::MAX,
        min_step: i32::MAX,
        two_hits: true,
    };
    let mut hash = DiagHash::new(0).unwrap();
    hash.update(0, DiagStruct { last_hit: 1, flag: false }, 1, &never_stale)
        .unwrap();
    (-1500..=1500)
        .filter(|&diag| diag == 0 || hash.bucket_len(diag) == 1)
        .collect()
}
