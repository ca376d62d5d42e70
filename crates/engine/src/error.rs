//! The module contains the errors the ledger engine can return.
//!
//! Rejections (nothing was written, the caller asked for something the
//! ledger refuses):
//!
//! - [`Validation`] a required field is missing or an amount is not positive.
//! - [`KeyNotFound`] an account, transaction or budget does not exist.
//! - [`ExistingKey`] a uniquely named item already exists.
//! - [`InsufficientFunds`] the account cannot cover the debit.
//!
//! Storage failures (the atomic unit guarantees nothing was made visible,
//! except for [`AbortFailed`]):
//!
//! - [`StorageUnavailable`] the unit could not be opened.
//! - [`CommitFailed`] the unit could not be committed.
//! - [`Database`] a statement inside the unit failed; the unit was aborted.
//! - [`AbortFailed`] the abort itself failed: fatal ledger inconsistency.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`InsufficientFunds`]: EngineError::InsufficientFunds
//!  [`StorageUnavailable`]: EngineError::StorageUnavailable
//!  [`CommitFailed`]: EngineError::CommitFailed
//!  [`Database`]: EngineError::Database
//!  [`AbortFailed`]: EngineError::AbortFailed
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(DbErr),
    #[error("Commit failed: {0}")]
    CommitFailed(DbErr),
    #[error("Abort failed after \"{cause}\": {abort}")]
    AbortFailed {
        cause: Box<EngineError>,
        abort: DbErr,
    },
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Business rejections: the request was refused and nothing changed.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::KeyNotFound(_)
                | Self::ExistingKey(_)
                | Self::InsufficientFunds(_)
        )
    }

    /// The unit never became visible; the same request may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_) | Self::CommitFailed(_))
    }

    /// The ledger may hold partially applied writes and needs a reconcile.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AbortFailed { .. })
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::StorageUnavailable(a), Self::StorageUnavailable(b)) => {
                a.to_string() == b.to_string()
            }
            (Self::CommitFailed(a), Self::CommitFailed(b)) => a.to_string() == b.to_string(),
            (
                Self::AbortFailed {
                    cause: cause_a,
                    abort: abort_a,
                },
                Self::AbortFailed {
                    cause: cause_b,
                    abort: abort_b,
                },
            ) => cause_a == cause_b && abort_a.to_string() == abort_b.to_string(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
