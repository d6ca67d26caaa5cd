//! Word finder options and per-pass parameters
//!
//! `WordOptions` holds the user-facing knobs; `WordFinderParams` is the
//! validated, read-only parameter block handed to every extension pass. One
//! `WordFinderParams` may be shared by reference across concurrent passes.

use crate::core::query_info::QueryInfo;
use crate::error::{ExtendError, Result};

/// Default ungapped X-dropoff for nucleotide searches (positive form)
pub const BLAST_UNGAPPED_X_DROPOFF_NUCL: i32 = 20;

/// Fraction of the cutoff score an approximate extension must reach before
/// it is recomputed exactly
pub const REDUCED_CUTOFF_FRACTION: f64 = 0.8;

/// Minimum number of offset pairs in a scan batch
pub const OFFSET_ARRAY_SIZE: usize = 4096;

/// Dense table is abandoned for the hash once it would be this many times
/// larger than the subject
const SPARSE_RATIO: usize = 4;

/// Dense tables at or below this many slots are always kept
const DENSE_MIN_SLOTS: usize = 1 << 16;

/// Match/mismatch matrix over ncbi2na codes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NuclScoringMatrix {
    pub reward: i32,
    pub penalty: i32,
    matrix: [[i32; 4]; 4],
}

impl NuclScoringMatrix {
    pub fn new(reward: i32, penalty: i32) -> Self {
        let mut matrix = [[penalty; 4]; 4];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] = reward;
        }
        Self {
            reward,
            penalty,
            matrix,
        }
    }

    #[inline(always)]
    pub fn score(&self, q: u8, s: u8) -> i32 {
        self.matrix[q as usize][s as usize]
    }
}

/// Score table for 4-base approximate extension, keyed by
/// `query_byte ^ subject_byte`: every zero 2-bit field is a match.
pub fn build_nucl_score_table(reward: i32, penalty: i32) -> [i32; 256] {
    let mut table = [0i32; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = (0..4)
            .map(|field| if (i >> (2 * field)) & 3 == 0 { reward } else { penalty })
            .sum();
    }
    table
}

/// Which diagonal store backs a pass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ContainerKind {
    #[default]
    Dense,
    Sparse,
}

impl ContainerKind {
    /// Pick the store for a pass from the expected sparsity of hits.
    ///
    /// The dense table needs one slot per query diagonal (rounded up to a
    /// power of two); a short subject can only touch a few of them, so the
    /// hash wins when the array would dwarf the subject.
    pub fn choose(query_length: usize, subject_length: usize, window_size: usize) -> Self {
        let slots = (query_length + window_size).max(1).next_power_of_two();
        if slots > DENSE_MIN_SLOTS && slots > SPARSE_RATIO.saturating_mul(subject_length) {
            ContainerKind::Sparse
        } else {
            ContainerKind::Dense
        }
    }
}

/// User choice of diagonal store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ContainerChoice {
    #[default]
    Auto,
    Dense,
    Sparse,
}

/// Cutoffs that apply to hits in one query context
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UngappedCutoffs {
    /// X-drop threshold, negative
    pub x_dropoff: i32,
    /// Minimum ungapped score for a hit to be saved
    pub cutoff_score: i32,
    /// Approximate scores at or above this are recomputed exactly
    pub reduced_nucl_cutoff_score: i32,
}

impl UngappedCutoffs {
    /// `x_dropoff` is given in its positive, user-facing form
    pub fn new(x_dropoff: i32, cutoff_score: i32) -> Self {
        Self {
            x_dropoff: -x_dropoff.abs(),
            cutoff_score,
            reduced_nucl_cutoff_score: (REDUCED_CUTOFF_FRACTION * cutoff_score as f64) as i32,
        }
    }
}

/// User-facing word finder options
#[derive(Clone, Debug)]
pub struct WordOptions {
    /// Length of exact match required before extension
    pub word_size: usize,
    /// Word length indexed by the lookup table
    pub lut_word_length: usize,
    /// Stride between scanned subject offsets; 0 derives it from the words
    pub scan_step: usize,
    /// Two-hit window; 0 selects the single-hit model
    pub window_size: usize,
    /// Minimum distance between paired hits; 0 means `word_size`
    pub template_length: usize,
    /// Ungapped X-dropoff, positive
    pub x_dropoff: i32,
    pub ungapped_extension: bool,
    pub container: ContainerChoice,
    pub reward: i32,
    pub penalty: i32,
    /// Ungapped cutoff score; 0 derives it as `word_size * reward`
    pub cutoff_score: i32,
}

impl Default for WordOptions {
    fn default() -> Self {
        Self {
            word_size: 28,
            lut_word_length: 11,
            scan_step: 0,
            window_size: 0,
            template_length: 0,
            x_dropoff: BLAST_UNGAPPED_X_DROPOFF_NUCL,
            ungapped_extension: true,
            container: ContainerChoice::Auto,
            reward: 1,
            penalty: -2,
            cutoff_score: 0,
        }
    }
}

impl WordOptions {
    /// Scan stride actually used.
    ///
    /// The derived stride is the longest one that still samples every seed;
    /// once it reaches a byte it is rounded down to whole bytes so aligned
    /// subject reads stay possible.
    pub fn effective_scan_step(&self) -> usize {
        if self.scan_step > 0 {
            return self.scan_step;
        }
        let step = (self.word_size + 1).saturating_sub(self.lut_word_length).max(1);
        if step >= 4 {
            step - step % 4
        } else {
            step
        }
    }

    pub fn effective_template_length(&self) -> usize {
        if self.template_length > 0 {
            self.template_length
        } else {
            self.word_size
        }
    }

    pub fn effective_cutoff_score(&self) -> i32 {
        if self.cutoff_score > 0 {
            self.cutoff_score
        } else {
            self.word_size as i32 * self.reward
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.lut_word_length == 0 || self.lut_word_length > 16 {
            return Err(ExtendError::invalid_options(format!(
                "lookup word length {} outside 1..=16",
                self.lut_word_length
            )));
        }
        if self.word_size < self.lut_word_length {
            return Err(ExtendError::invalid_options(format!(
                "word size {} shorter than lookup word length {}",
                self.word_size, self.lut_word_length
            )));
        }
        if self.reward <= 0 || self.penalty >= 0 {
            return Err(ExtendError::invalid_options(format!(
                "reward/penalty {}/{} must be positive/negative",
                self.reward, self.penalty
            )));
        }
        if self.x_dropoff <= 0 {
            return Err(ExtendError::invalid_options(format!(
                "x-dropoff {} must be positive",
                self.x_dropoff
            )));
        }
        if self.window_size > 0 && self.effective_template_length() >= self.window_size {
            return Err(ExtendError::invalid_options(format!(
                "template length {} leaves no room in two-hit window {}",
                self.effective_template_length(),
                self.window_size
            )));
        }
        let max_step = self.word_size - self.lut_word_length + 1;
        if self.effective_scan_step() > max_step {
            log::warn!(
                "scan step {} exceeds {}; some {}-base seeds will be missed",
                self.effective_scan_step(),
                max_step,
                self.word_size
            );
        }
        Ok(())
    }
}

/// Read-only parameters of an extension pass
#[derive(Clone, Debug)]
pub struct WordFinderParams {
    pub ungapped_extension_enabled: bool,
    pub window_size: u32,
    pub template_length: u32,
    pub container_kind: ContainerKind,
    /// Steps at or below this on one diagonal continue an earlier hit
    pub min_step: u32,
    pub word_length: usize,
    pub lut_word_length: usize,
    pub scan_step: usize,
    pub approx_score_table: [i32; 256],
    /// Indexed by query context
    pub cutoffs: Vec<UngappedCutoffs>,
}

impl WordFinderParams {
    pub fn new(options: &WordOptions, query_info: &QueryInfo, subject_length: usize) -> Result<Self> {
        options.validate()?;
        if query_info.num_contexts() == 0 {
            return Err(ExtendError::invalid_options("query has no contexts"));
        }

        let scan_step = options.effective_scan_step();
        let container_kind = match options.container {
            ContainerChoice::Dense => ContainerKind::Dense,
            ContainerChoice::Sparse => ContainerKind::Sparse,
            ContainerChoice::Auto => ContainerKind::choose(
                query_info.total_length(),
                subject_length,
                options.window_size,
            ),
        };
        // Without ungapped extension a hit only advances the diagonal by
        // the scan stride, so steps that small are continuations.
        let min_step = if options.ungapped_extension {
            0
        } else {
            scan_step as u32
        };
        let cutoff =
            UngappedCutoffs::new(options.x_dropoff, options.effective_cutoff_score());

        Ok(Self {
            ungapped_extension_enabled: options.ungapped_extension,
            window_size: options.window_size as u32,
            template_length: options.effective_template_length() as u32,
            container_kind,
            min_step,
            word_length: options.word_size,
            lut_word_length: options.lut_word_length,
            scan_step,
            approx_score_table: build_nucl_score_table(options.reward, options.penalty),
            cutoffs: vec![cutoff; query_info.num_contexts()],
        })
    }

    /// Replace the cutoffs of one context
    pub fn set_context_cutoffs(&mut self, context: usize, cutoffs: UngappedCutoffs) {
        self.cutoffs[context] = cutoffs;
    }

    #[inline]
    pub fn cutoffs_for(&self, context: usize) -> &UngappedCutoffs {
        &self.cutoffs[context]
    }

    #[inline]
    pub fn two_hits(&self) -> bool {
        self.window_size > 0
    }
}
