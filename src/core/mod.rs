//! BLAST Core Algorithms
//!
//! Nucleotide seed extension, organized after NCBI BLAST's core/ directory:
//!
//! - **Sequences** (`blast_encoding`, `query_info`)
//!   - 2-bit packed sequences
//!   - Query context table
//!
//! - **Parameters** (`blast_parameters`)
//!   - Word finder options, cutoffs, score tables
//!
//! - **Lookup and scanning** (`blast_nalookup`, `blast_nascan`)
//!
//! - **Extension** (`blast_extend`, `na_ungapped`)
//!   - Diagonal stores
//!   - Ungapped X-drop extension and hit admission
//!
//! - **Hits and statistics** (`blast_hits`, `blast_diagnostics`)

// Sequences
pub mod blast_encoding;
pub mod query_info;

// Parameters
pub mod blast_parameters;

// Lookup and scanning
pub mod blast_nalookup;
pub mod blast_nascan;

// Extension
pub mod blast_extend;
pub mod na_ungapped;

// Hits and statistics
pub mod blast_diagnostics;
pub mod blast_hits;
