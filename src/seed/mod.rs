//! Seed finding
//!
//! Word finders turn lookup-table hits into admitted, optionally scored
//! initial hits.

pub mod na_word_finder;

pub use na_word_finder::{
    blast_na_word_finder, indexed_word_finder, IndexedHitSource, WordExtension,
};
