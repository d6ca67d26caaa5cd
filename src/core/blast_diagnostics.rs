//! Hit statistics for nucleotide word finding
//!
//! Every pass returns an [`UngappedStats`]. Callers running many passes can
//! fold them into a shared [`DiagnosticCounters`], which is enabled via the
//! BLASTN_SEED_DIAGNOSTICS environment variable.

use std::ops::AddAssign;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering as AtomicOrdering};

/// Check if diagnostics are enabled via environment variable
pub fn diagnostics_enabled() -> bool {
    std::env::var("BLASTN_SEED_DIAGNOSTICS")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Counters of one word finder pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UngappedStats {
    /// Word hits produced by the scanner
    pub lookup_hits: usize,
    /// Hits that were ready for extension
    pub init_extends: usize,
    /// Hits appended to the hit list
    pub good_init_extends: usize,
}

impl AddAssign for UngappedStats {
    fn add_assign(&mut self, rhs: Self) {
        self.lookup_hits += rhs.lookup_hits;
        self.init_extends += rhs.init_extends;
        self.good_init_extends += rhs.good_init_extends;
    }
}

/// Totals shared by concurrent passes
pub struct DiagnosticCounters {
    pub passes: AtomicUsize,
    pub failed_passes: AtomicUsize,
    pub lookup_hits: AtomicUsize,
    pub init_extends: AtomicUsize,
    pub good_init_extends: AtomicUsize,
    pub best_score: AtomicI32,
}

impl Default for DiagnosticCounters {
    fn default() -> Self {
        Self {
            passes: AtomicUsize::new(0),
            failed_passes: AtomicUsize::new(0),
            lookup_hits: AtomicUsize::new(0),
            init_extends: AtomicUsize::new(0),
            good_init_extends: AtomicUsize::new(0),
            best_score: AtomicI32::new(i32::MIN),
        }
    }
}

impl DiagnosticCounters {
    pub fn record_pass(&self, stats: &UngappedStats) {
        self.passes.fetch_add(1, AtomicOrdering::Relaxed);
        self.lookup_hits
            .fetch_add(stats.lookup_hits, AtomicOrdering::Relaxed);
        self.init_extends
            .fetch_add(stats.init_extends, AtomicOrdering::Relaxed);
        self.good_init_extends
            .fetch_add(stats.good_init_extends, AtomicOrdering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed_passes.fetch_add(1, AtomicOrdering::Relaxed);
    }

    pub fn record_score(&self, score: i32) {
        self.best_score.fetch_max(score, AtomicOrdering::Relaxed);
    }

    pub fn snapshot(&self) -> UngappedStats {
        UngappedStats {
            lookup_hits: self.lookup_hits.load(AtomicOrdering::Relaxed),
            init_extends: self.init_extends.load(AtomicOrdering::Relaxed),
            good_init_extends: self.good_init_extends.load(AtomicOrdering::Relaxed),
        }
    }

    /// Log a summary of all counters
    pub fn print_summary(&self) {
        let totals = self.snapshot();
        log::info!("=== Word Finder Diagnostics ===");
        log::info!(
            "  Passes:                     {} ({} failed)",
            self.passes.load(AtomicOrdering::Relaxed),
            self.failed_passes.load(AtomicOrdering::Relaxed)
        );
        log::info!("  Lookup hits:                {}", totals.lookup_hits);
        log::info!("  Hits extended:              {}", totals.init_extends);
        log::info!("  Hits saved:                 {}", totals.good_init_extends);
        if totals.lookup_hits > 0 {
            log::info!(
                "  Extended per lookup hit:    {:.4}",
                totals.init_extends as f64 / totals.lookup_hits as f64
            );
        }
        let best = self.best_score.load(AtomicOrdering::Relaxed);
        if best != i32::MIN {
            log::info!("  Best ungapped score:        {}", best);
        }
    }
}
