//! Diagonal tracking for nucleotide word hits
//!
//! Every word hit lies on a diagonal `s_off - q_off`. The admission logic
//! needs, per diagonal, how far along the subject it has already been
//! explored and whether the last hit there was saved. Two stores provide
//! that:
//!
//! - [`DiagTable`]: a power-of-two array indexed by the masked diagonal.
//!   Distinct diagonals that share a slot overwrite each other; the array
//!   is sized to the query so this only happens between diagonals far
//!   apart on the subject.
//! - [`DiagHash`]: chained buckets over a growable cell array, for passes
//!   where only a small fraction of diagonals is ever touched. Cells whose
//!   diagonal fell behind the scan are recycled before the array grows.
//!
//! Stored positions are subject offsets plus a running `offset` that
//! advances after every subject, so one store can serve consecutive
//! subjects without clearing.

use crate::core::blast_parameters::ContainerKind;
use crate::error::{ExtendError, Result};

/// Number of buckets in the diagonal hash
pub const DIAGHASH_NUM_BUCKETS: usize = 512;
const DIAGHASH_BUCKET_BITS: u32 = DIAGHASH_NUM_BUCKETS.trailing_zeros();

/// Initial number of cells in the diagonal hash
pub const DIAGHASH_CHAIN_LENGTH: usize = 256;

/// 2^32 / golden ratio
const FIBONACCI_MULTIPLIER: u32 = 0x9E37_79B1;

const NIL: u32 = u32::MAX;

/// Per-diagonal state
///
/// NCBI reference: blast_extend.c, DiagStruct entries of `hit_level_array`
/// (`last_hit` plus the 1-bit `flag`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiagStruct {
    /// End of the explored region, including the running offset
    pub last_hit: i32,
    /// Whether the last hit on this diagonal was saved
    pub flag: bool,
}

/// When a hash cell may be recycled for another diagonal
#[derive(Clone, Copy, Debug)]
pub struct StaleWindow {
    pub window_size: i32,
    pub min_step: i32,
    pub two_hits: bool,
}

impl StaleWindow {
    #[inline(always)]
    pub fn is_stale(&self, s_pos: i32, last_hit: i32) -> bool {
        let behind = s_pos - last_hit;
        behind > self.min_step && (!self.two_hits || behind > self.window_size)
    }
}

/// Storage for per-diagonal hit state
pub trait DiagonalStore {
    /// Running offset added to subject positions
    fn offset(&self) -> i32;

    /// State of diagonal `diag`, or `None` if it has not been touched
    fn lookup(&self, diag: i32) -> Option<DiagStruct>;

    /// Record `entry` for `diag`. `s_pos` is the current scan position
    /// (with offset), used to decide which cells are stale.
    fn update(&mut self, diag: i32, entry: DiagStruct, s_pos: i32, stale: &StaleWindow)
        -> Result<()>;

    /// Rebase after a subject of `subject_length` bases has been scanned
    fn end_subject(&mut self, subject_length: usize);

    /// Forget every diagonal
    fn clear(&mut self);
}

/// Advance a running offset past a finished subject; `None` when it has to
/// wrap and the store must be cleared instead.
#[inline]
fn rebased_offset(offset: i32, subject_length: usize, window: i32) -> Option<i32> {
    let next = offset as i64 + subject_length as i64 + window as i64;
    if next >= (i32::MAX / 2) as i64 {
        None
    } else {
        Some(next as i32)
    }
}

/// Dense diagonal array
#[derive(Clone, Debug)]
pub struct DiagTable {
    hit_level_array: Vec<DiagStruct>,
    diag_array_length: i32,
    diag_mask: i32,
    offset: i32,
    window: i32,
}

impl DiagTable {
    /// Smallest power of two covering every query diagonal plus the window
    pub fn new(query_length: usize, window_size: usize) -> Self {
        let diag_array_length = (query_length + window_size).max(1).next_power_of_two();
        Self {
            hit_level_array: vec![DiagStruct::default(); diag_array_length],
            diag_array_length: diag_array_length as i32,
            diag_mask: diag_array_length as i32 - 1,
            offset: window_size as i32,
            window: window_size as i32,
        }
    }

    #[inline]
    pub fn diag_array_length(&self) -> usize {
        self.diag_array_length as usize
    }

    #[inline(always)]
    fn slot(&self, diag: i32) -> usize {
        ((diag + self.diag_array_length) & self.diag_mask) as usize
    }
}

impl DiagonalStore for DiagTable {
    #[inline(always)]
    fn offset(&self) -> i32 {
        self.offset
    }

    #[inline(always)]
    fn lookup(&self, diag: i32) -> Option<DiagStruct> {
        let entry = self.hit_level_array[self.slot(diag)];
        // stored positions always include a word end, so 0 marks a fresh slot
        (entry.last_hit != 0).then_some(entry)
    }

    #[inline(always)]
    fn update(
        &mut self,
        diag: i32,
        entry: DiagStruct,
        _s_pos: i32,
        _stale: &StaleWindow,
    ) -> Result<()> {
        let slot = self.slot(diag);
        self.hit_level_array[slot] = entry;
        Ok(())
    }

    fn end_subject(&mut self, subject_length: usize) {
        match rebased_offset(self.offset, subject_length, self.window) {
            Some(offset) => self.offset = offset,
            None => self.clear(),
        }
    }

    fn clear(&mut self) {
        self.hit_level_array.fill(DiagStruct::default());
        self.offset = self.window;
    }
}

#[derive(Clone, Copy, Debug)]
struct DiagHashCell {
    diag: i32,
    entry: DiagStruct,
    next: u32,
}

/// Sparse diagonal hash
#[derive(Clone, Debug)]
pub struct DiagHash {
    backbone: Vec<u32>,
    chain: Vec<DiagHashCell>,
    /// Cells the chain may hold before it has to grow
    capacity: usize,
    /// Largest capacity growth may reach
    max_capacity: usize,
    offset: i32,
    window: i32,
}

impl DiagHash {
    pub fn new(window_size: usize) -> Result<Self> {
        Self::with_capacity(window_size, DIAGHASH_CHAIN_LENGTH)
    }

    pub fn with_capacity(window_size: usize, capacity: usize) -> Result<Self> {
        let capacity = capacity.max(1);
        let mut chain = Vec::new();
        chain
            .try_reserve_exact(capacity)
            .map_err(|_| ExtendError::OutOfMemory { requested: capacity })?;
        Ok(Self {
            backbone: vec![NIL; DIAGHASH_NUM_BUCKETS],
            chain,
            capacity,
            max_capacity: usize::MAX,
            offset: window_size as i32,
            window: window_size as i32,
        })
    }

    /// Caps the chain at `max_capacity` cells; an insert past the cap fails
    /// with `OutOfMemory`.
    pub fn with_max_capacity(mut self, max_capacity: usize) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Number of cells in use
    #[inline]
    pub fn occupancy(&self) -> usize {
        self.chain.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of cells chained in the bucket `diag` hashes to
    pub fn bucket_len(&self, diag: i32) -> usize {
        let mut len = 0;
        let mut index = self.backbone[Self::bucket(diag)];
        while index != NIL {
            len += 1;
            index = self.chain[index as usize].next;
        }
        len
    }

    #[inline(always)]
    fn bucket(diag: i32) -> usize {
        ((diag as u32).wrapping_mul(FIBONACCI_MULTIPLIER) >> (32 - DIAGHASH_BUCKET_BITS)) as usize
    }

    fn grow(&mut self) -> Result<()> {
        let requested = self
            .capacity
            .checked_mul(2)
            .ok_or(ExtendError::OutOfMemory { requested: usize::MAX })?;
        if requested > self.max_capacity {
            return Err(ExtendError::OutOfMemory { requested });
        }
        self.chain
            .try_reserve_exact(requested - self.chain.len())
            .map_err(|_| ExtendError::OutOfMemory { requested })?;
        log::trace!("diagonal hash grew from {} to {} cells", self.capacity, requested);
        self.capacity = requested;
        Ok(())
    }
}

impl DiagonalStore for DiagHash {
    #[inline(always)]
    fn offset(&self) -> i32 {
        self.offset
    }

    #[inline]
    fn lookup(&self, diag: i32) -> Option<DiagStruct> {
        let mut index = self.backbone[Self::bucket(diag)];
        while index != NIL {
            let cell = &self.chain[index as usize];
            if cell.diag == diag {
                return Some(cell.entry);
            }
            index = cell.next;
        }
        None
    }

    fn update(
        &mut self,
        diag: i32,
        entry: DiagStruct,
        s_pos: i32,
        stale: &StaleWindow,
    ) -> Result<()> {
        // NCBI reference: na_ungapped.c, s_BlastDiagHashInsert.
        // Exact match first, then the first stale cell, then a new cell.
        let bucket = Self::bucket(diag);
        let mut index = self.backbone[bucket];
        let mut reusable = NIL;

        while index != NIL {
            let cell = &mut self.chain[index as usize];
            if cell.diag == diag {
                cell.entry = entry;
                return Ok(());
            }
            if reusable == NIL && stale.is_stale(s_pos, cell.entry.last_hit) {
                reusable = index;
            }
            index = cell.next;
        }

        if reusable != NIL {
            let cell = &mut self.chain[reusable as usize];
            cell.diag = diag;
            cell.entry = entry;
            return Ok(());
        }

        if self.chain.len() == self.capacity {
            self.grow()?;
        }
        self.chain.push(DiagHashCell {
            diag,
            entry,
            next: self.backbone[bucket],
        });
        self.backbone[bucket] = (self.chain.len() - 1) as u32;
        Ok(())
    }

    fn end_subject(&mut self, subject_length: usize) {
        match rebased_offset(self.offset, subject_length, self.window) {
            Some(offset) => self.offset = offset,
            None => self.clear(),
        }
    }

    fn clear(&mut self) {
        self.backbone.fill(NIL);
        self.chain.clear();
        self.offset = self.window;
    }
}

/// The diagonal store chosen for a pass
#[derive(Clone, Debug)]
pub enum DiagContainer {
    Dense(DiagTable),
    Sparse(DiagHash),
}

impl DiagContainer {
    pub fn new(kind: ContainerKind, query_length: usize, window_size: usize) -> Result<Self> {
        Ok(match kind {
            ContainerKind::Dense => DiagContainer::Dense(DiagTable::new(query_length, window_size)),
            ContainerKind::Sparse => DiagContainer::Sparse(DiagHash::new(window_size)?),
        })
    }

    /// Caps a sparse store's chain length (0 = unlimited); dense tables are
    /// sized up front and left as they are.
    pub fn with_max_hash_cells(self, max_cells: usize) -> Self {
        match self {
            DiagContainer::Sparse(hash) if max_cells > 0 => {
                DiagContainer::Sparse(hash.with_max_capacity(max_cells))
            }
            other => other,
        }
    }

    pub fn kind(&self) -> ContainerKind {
        match self {
            DiagContainer::Dense(_) => ContainerKind::Dense,
            DiagContainer::Sparse(_) => ContainerKind::Sparse,
        }
    }

    pub fn end_subject(&mut self, subject_length: usize) {
        match self {
            DiagContainer::Dense(table) => table.end_subject(subject_length),
            DiagContainer::Sparse(hash) => hash.end_subject(subject_length),
        }
    }

    pub fn clear(&mut self) {
        match self {
            DiagContainer::Dense(table) => table.clear(),
            DiagContainer::Sparse(hash) => hash.clear(),
        }
    }
}
