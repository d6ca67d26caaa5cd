//! BLAST API Layer
//!
//! High-level entry points that wire FASTA input, the lookup table and the
//! word finder together.
//!
//! - `local_scan` - word-hit search of FASTA queries against FASTA subjects

pub mod local_scan;
