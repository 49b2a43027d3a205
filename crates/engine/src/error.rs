//! The errors the engine can throw.
//!
//! Lookups return the `*NotFound` family, name and import-id collisions
//! return [`Conflict`], and everything the invariant checks reject maps to
//! a dedicated variant so callers can translate them precisely.
//!
//! [`Conflict`]: EngineError::Conflict
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("budget \"{0}\" not found")]
    BudgetNotFound(String),
    #[error("account \"{0}\" not found")]
    AccountNotFound(String),
    #[error("category \"{0}\" not found")]
    CategoryNotFound(String),
    #[error("payee \"{0}\" not found")]
    PayeeNotFound(String),
    #[error("tag \"{0}\" not found")]
    TagNotFound(String),
    #[error("transaction \"{0}\" not found")]
    TransactionNotFound(String),
    #[error("line \"{0}\" not found")]
    LineNotFound(String),
    #[error("user \"{0}\" not found")]
    UserNotFound(String),
    #[error("currency \"{0}\" not found")]
    CurrencyNotFound(String),
    #[error("\"{0}\" already present")]
    Conflict(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("{0} name must not be empty")]
    EmptyName(String),
    #[error("invalid status: {0}")]
    InvalidStatus(String),
    #[error("invalid account type: {0}")]
    InvalidAccountType(String),
    #[error("invalid lines: {0}")]
    InvalidTransactionLines(String),
    #[error("line \"{0}\" appears more than once")]
    DuplicateLineId(String),
    #[error("category \"{0}\" would nest deeper than one level")]
    CategoryDepthExceeded(String),
    #[error("a category cannot be its own parent")]
    CategoryOwnParent,
    #[error("currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error("the base currency is locked once accounts exist")]
    CurrencyLocked,
    #[error("account \"{0}\" still has transaction lines")]
    AccountInUse(String),
    #[error("amounts must be non-zero")]
    ZeroAmount,
    #[error("no fields to update")]
    NoFieldsToUpdate,
    #[error("posted_at cannot be cleared")]
    PostedAtRequired,
    #[error("status cannot be cleared")]
    StatusRequired,
    #[error("import_id cannot change once set")]
    ImportIdImmutable,
    #[error("a transfer cannot be split")]
    TransferCannotBeSplit,
    #[error("a transfer needs two distinct accounts")]
    TransferAccountsMustDiffer,
    #[error("transfer lines cannot carry a payee")]
    PayeeNotAllowedForTransfers,
    #[error("duplicate import ids inside the batch at {indexes:?}")]
    DuplicateImportIdInBatch { indexes: Vec<usize> },
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::BudgetNotFound(a), Self::BudgetNotFound(b))
            | (Self::AccountNotFound(a), Self::AccountNotFound(b))
            | (Self::CategoryNotFound(a), Self::CategoryNotFound(b))
            | (Self::PayeeNotFound(a), Self::PayeeNotFound(b))
            | (Self::TagNotFound(a), Self::TagNotFound(b))
            | (Self::TransactionNotFound(a), Self::TransactionNotFound(b))
            | (Self::LineNotFound(a), Self::LineNotFound(b))
            | (Self::UserNotFound(a), Self::UserNotFound(b))
            | (Self::CurrencyNotFound(a), Self::CurrencyNotFound(b))
            | (Self::Conflict(a), Self::Conflict(b))
            | (Self::Forbidden(a), Self::Forbidden(b))
            | (Self::EmptyName(a), Self::EmptyName(b))
            | (Self::InvalidStatus(a), Self::InvalidStatus(b))
            | (Self::InvalidAccountType(a), Self::InvalidAccountType(b))
            | (Self::InvalidTransactionLines(a), Self::InvalidTransactionLines(b))
            | (Self::DuplicateLineId(a), Self::DuplicateLineId(b))
            | (Self::CategoryDepthExceeded(a), Self::CategoryDepthExceeded(b))
            | (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b))
            | (Self::AccountInUse(a), Self::AccountInUse(b)) => a == b,
            (
                Self::DuplicateImportIdInBatch { indexes: a },
                Self::DuplicateImportIdInBatch { indexes: b },
            ) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}
