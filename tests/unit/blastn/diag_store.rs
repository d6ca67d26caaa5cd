//! Diagonal store tests
//!
//! Dense table and chained hash behaviour outside of admission: growth,
//! cell recycling, rebasing between subjects.

use blastn_seed::core::blast_extend::{
    DiagContainer, DiagHash, DiagStruct, DiagTable, DiagonalStore, StaleWindow,
    DIAGHASH_CHAIN_LENGTH,
};
use blastn_seed::core::blast_parameters::ContainerKind;
use blastn_seed::ExtendError;

fn entry(last_hit: i32) -> DiagStruct {
    DiagStruct {
        last_hit,
        flag: true,
    }
}

/// A window wide enough that no cell is ever stale
const NEVER_STALE: StaleWindow = StaleWindow {
    window_size: i32::MAX,
    min_step: i32::MAX,
    two_hits: true,
};

#[test]
fn test_hash_growth_keeps_every_diagonal() {
    let mut hash = DiagHash::with_capacity(0, 4).unwrap();
    for diag in 0..5 {
        hash.update(diag, entry(10 + diag), 20, &NEVER_STALE).unwrap();
    }
    assert_eq!(hash.capacity(), 8);
    assert_eq!(hash.occupancy(), 5);
    for diag in 0..5 {
        assert_eq!(hash.lookup(diag), Some(entry(10 + diag)));
    }
}

#[test]
fn test_hash_growth_doubles_repeatedly() {
    let mut hash = DiagHash::with_capacity(0, 2).unwrap();
    for diag in -20..20 {
        hash.update(diag, entry(1), 1, &NEVER_STALE).unwrap();
        assert!(hash.occupancy() <= hash.capacity());
    }
    assert_eq!(hash.occupancy(), 40);
    assert_eq!(hash.capacity(), 64);
    assert!((-20..20).all(|diag| hash.lookup(diag).is_some()));
}

#[test]
fn test_hash_reinsert_does_not_chain() {
    let mut hash = DiagHash::new(0).unwrap();
    hash.update(-7, entry(5), 5, &NEVER_STALE).unwrap();
    let before = hash.bucket_len(-7);
    hash.update(-7, entry(9), 9, &NEVER_STALE).unwrap();
    hash.update(-7, entry(12), 12, &NEVER_STALE).unwrap();
    assert_eq!(hash.bucket_len(-7), before);
    assert_eq!(hash.occupancy(), 1);
    assert_eq!(hash.lookup(-7), Some(entry(12)));
}

#[test]
fn test_hash_missing_diagonal() {
    let mut hash = DiagHash::new(0).unwrap();
    assert_eq!(hash.lookup(3), None);
    hash.update(3, entry(4), 4, &NEVER_STALE).unwrap();
    assert_eq!(hash.lookup(4), None);
}

#[test]
fn test_hash_reports_out_of_memory() {
    match DiagHash::with_capacity(0, usize::MAX / 4) {
        Err(ExtendError::OutOfMemory { requested }) => assert_eq!(requested, usize::MAX / 4),
        other => panic!("expected OutOfMemory, got {:?}", other.map(|h| h.capacity())),
    }
}

#[test]
fn test_hash_capacity_ceiling_stops_growth() {
    let mut hash = DiagHash::with_capacity(0, 2).unwrap().with_max_capacity(4);
    for diag in 0..4 {
        hash.update(diag, entry(1), 1, &NEVER_STALE).unwrap();
    }
    assert_eq!(hash.capacity(), 4);
    match hash.update(4, entry(1), 1, &NEVER_STALE) {
        Err(ExtendError::OutOfMemory { requested }) => assert_eq!(requested, 8),
        other => panic!("expected OutOfMemory, got {:?}", other),
    }
    // the failed insert leaves the stored diagonals alone
    assert_eq!(hash.occupancy(), 4);
    assert_eq!(hash.lookup(4), None);
    assert!((0..4).all(|diag| hash.lookup(diag) == Some(entry(1))));
}

#[test]
fn test_hash_cell_cap_only_applies_to_sparse() {
    let capped = DiagContainer::new(ContainerKind::Sparse, 100, 0)
        .unwrap()
        .with_max_hash_cells(3);
    match capped {
        DiagContainer::Sparse(mut hash) => {
            // the default chain fills before the cap is consulted
            let full = DIAGHASH_CHAIN_LENGTH as i32;
            for diag in 0..full {
                hash.update(diag, entry(1), 1, &NEVER_STALE).unwrap();
            }
            assert!(matches!(
                hash.update(full, entry(1), 1, &NEVER_STALE),
                Err(ExtendError::OutOfMemory { .. })
            ));
        }
        DiagContainer::Dense(_) => panic!("expected a sparse store"),
    }
    let dense = DiagContainer::new(ContainerKind::Dense, 100, 0)
        .unwrap()
        .with_max_hash_cells(3);
    assert_eq!(dense.kind(), ContainerKind::Dense);
}

#[test]
fn test_dense_table_covers_query() {
    let table = DiagTable::new(100, 40);
    assert_eq!(table.diag_array_length(), 256);
    assert_eq!(table.offset(), 40);
    assert_eq!(table.lookup(-99), None);
}

#[test]
fn test_rebase_moves_past_subject() {
    let mut table = DiagTable::new(64, 16);
    let mut hash = DiagHash::new(16).unwrap();
    let window = StaleWindow {
        window_size: 16,
        min_step: 0,
        two_hits: true,
    };
    table.update(5, entry(16 + 30), 16 + 30, &window).unwrap();
    hash.update(5, entry(16 + 30), 16 + 30, &window).unwrap();

    table.end_subject(100);
    hash.end_subject(100);
    assert_eq!(table.offset(), 16 + 100 + 16);
    assert_eq!(hash.offset(), table.offset());

    // the old position sits more than a window behind any new one
    let s_pos = table.offset();
    let old = table.lookup(5).unwrap();
    assert!(s_pos - old.last_hit > 16);
    assert_eq!(hash.lookup(5), Some(old));
}

#[test]
fn test_rebase_clears_before_overflow() {
    let mut table = DiagTable::new(64, 8);
    let window = StaleWindow {
        window_size: 8,
        min_step: 0,
        two_hits: true,
    };
    table.update(1, entry(20), 20, &window).unwrap();
    table.end_subject(i32::MAX as usize);
    assert_eq!(table.offset(), 8);
    assert_eq!(table.lookup(1), None);
}

#[test]
fn test_container_kind_round_trip() {
    let dense = DiagContainer::new(ContainerKind::Dense, 1000, 0).unwrap();
    let sparse = DiagContainer::new(ContainerKind::Sparse, 1000, 0).unwrap();
    assert_eq!(dense.kind(), ContainerKind::Dense);
    assert_eq!(sparse.kind(), ContainerKind::Sparse);
}

#[test]
fn test_auto_choice_prefers_hash_for_short_subjects() {
    assert_eq!(ContainerKind::choose(1 << 20, 200, 0), ContainerKind::Sparse);
    assert_eq!(ContainerKind::choose(1000, 1 << 20, 0), ContainerKind::Dense);
}
