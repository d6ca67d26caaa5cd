//! BLAST Input Handling
//!
//! Command-line arguments of the `blastn-seed` binary and their mapping
//! onto [`WordOptions`](crate::core::blast_parameters::WordOptions).

pub mod scan_args;

pub use scan_args::{ContainerArg, ScanArgs, StrandArg};
