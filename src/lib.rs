pub mod error;

pub mod seed;

// NCBI-style modules (matching NCBI BLAST structure)
pub mod core;
pub mod api;
pub mod blastinput;

pub use error::{ExtendError, Result};
