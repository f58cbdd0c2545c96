//! Error types for the debt ledger.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur during ledger operation.
///
/// Rejections that leave the record untouched by design (a duplicate claim,
/// an approval with nothing pending) are not errors; see
/// [`ClaimOutcome`](crate::lifecycle::ClaimOutcome) and
/// [`ApprovalOutcome`](crate::lifecycle::ApprovalOutcome).
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Storage I/O failure outside of document parsing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV report writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Rejected input: bad amount, empty name, short secret
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The record is gone or no longer matches what the caller displayed
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Receipt could not be copied into managed storage
    #[error("Failed to copy receipt {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The ledger document exists but cannot be parsed
    #[error("Ledger document {path} is corrupt: {source}")]
    StorageCorruption {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The on-disk document changed between load and save
    #[error("Ledger changed concurrently (loaded revision {expected}, found {found})")]
    Conflict { expected: u64, found: u64 },

    /// Wrong manager secret
    #[error("Manager secret rejected")]
    Unauthorized,

    /// Secret hashing backend failure or unparsable stored hash
    #[error("Secret hashing failed: {0}")]
    SecretHash(String),

    /// An attached receipt file has disappeared from storage
    #[error("Receipt file {0} does not exist")]
    ReceiptMissing(PathBuf),

    /// A manager command was issued without a secret
    #[error("Manager secret required. Pass --secret or set DEBT_LEDGER_SECRET")]
    MissingSecret,
}
