//! Error types for the ledger

use thiserror::Error;

/// Ledger-wide error type
///
/// Only conditions the caller cannot recover from end up here. Per-record
/// data gaps are absorbed by the engine and never surface as a `LedgerError`.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LedgerError {
    pub fn storage(msg: impl Into<String>) -> Self {
        LedgerError::Storage(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        LedgerError::Config(msg.into())
    }
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
