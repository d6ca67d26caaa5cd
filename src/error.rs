//! Error type for the seed extension engine

use thiserror::Error;

/// Errors surfaced by a word-finder pass
///
/// Only allocation failure can abort a pass once it has started; option
/// validation happens before any subject is scanned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtendError {
    #[error("out of memory growing diagonal hash to {requested} cells")]
    OutOfMemory { requested: usize },

    #[error("invalid word options: {0}")]
    InvalidOptions(String),
}

impl ExtendError {
    pub fn invalid_options<S: Into<String>>(message: S) -> Self {
        Self::InvalidOptions(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ExtendError>;
