use clap::{Args, ValueEnum};
use std::path::PathBuf;

use crate::core::blast_parameters::{ContainerChoice, WordOptions, BLAST_UNGAPPED_X_DROPOFF_NUCL};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerArg {
    /// Pick from query and subject lengths
    Auto,
    Dense,
    Sparse,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrandArg {
    Both,
    Plus,
    Minus,
}

impl StrandArg {
    /// Whether the plus and minus strands of each query are searched
    pub fn strands(self) -> (bool, bool) {
        match self {
            StrandArg::Both => (true, true),
            StrandArg::Plus => (true, false),
            StrandArg::Minus => (false, true),
        }
    }
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[arg(short, long)]
    pub query: PathBuf,
    #[arg(short, long)]
    pub subject: PathBuf,
    #[arg(short, long, default_value_t = 28)]
    pub word_size: usize,
    /// Word length indexed by the lookup table
    #[arg(long, default_value_t = 11)]
    pub lut_word_length: usize,
    /// Scan stride over the subject (0 = derived from the word lengths)
    #[arg(long, default_value_t = 0)]
    pub scan_step: usize,
    /// Two-hit window (0 = single-hit)
    #[arg(long, default_value_t = 0)]
    pub window_size: usize,
    /// Minimum distance between paired hits (0 = word size)
    #[arg(long, default_value_t = 0)]
    pub template_length: usize,
    #[arg(long, default_value_t = BLAST_UNGAPPED_X_DROPOFF_NUCL)]
    pub xdrop_ungap: i32,
    #[arg(long, default_value_t = 1)]
    pub reward: i32,
    #[arg(long, default_value_t = -2, allow_hyphen_values = true)]
    pub penalty: i32,
    /// Minimum ungapped score of a saved hit (0 = word size * reward)
    #[arg(long, default_value_t = 0)]
    pub cutoff_score: i32,
    /// Save word hits without ungapped extension
    #[arg(long, default_value_t = false)]
    pub no_ungapped: bool,
    #[arg(long, value_enum, default_value_t = ContainerArg::Auto)]
    pub container: ContainerArg,
    /// Most cells a sparse diagonal store may grow to (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub max_hash_cells: usize,
    #[arg(long, value_enum, default_value_t = StrandArg::Both)]
    pub strand: StrandArg,
    #[arg(short = 'n', long, default_value_t = 0)]
    pub num_threads: usize,
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// -v for debug output, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl ScanArgs {
    pub fn word_options(&self) -> WordOptions {
        WordOptions {
            word_size: self.word_size,
            lut_word_length: self.lut_word_length,
            scan_step: self.scan_step,
            window_size: self.window_size,
            template_length: self.template_length,
            x_dropoff: self.xdrop_ungap,
            ungapped_extension: !self.no_ungapped,
            container: match self.container {
                ContainerArg::Auto => ContainerChoice::Auto,
                ContainerArg::Dense => ContainerChoice::Dense,
                ContainerArg::Sparse => ContainerChoice::Sparse,
            },
            reward: self.reward,
            penalty: self.penalty,
            cutoff_score: self.cutoff_score,
        }
    }
}
