//! Unified error types for the ledger engine.
//!
//! Every fallible operation returns [`Result`]. Variants map onto five failure
//! classes (see [`FailureKind`]) so the calling layer can translate them into
//! responses without matching on every variant.

use crate::core::money::Money;
use sea_orm::DbErr;
use thiserror::Error;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Malformed, missing or out-of-range input.
    Validation,
    /// The referenced entity does not exist for the calling user.
    Authorization,
    /// Budget total would exceed the account balance.
    CapacityOverflow,
    /// A savings transfer would overdraw a non-credit account.
    InsufficientFunds,
    /// Storage or environment failure; the unit of work was rolled back.
    Internal,
}

/// All errors produced by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before any state was touched.
    #[error("Validation failed: {message}")]
    Validation {
        /// Human-readable reason
        message: String,
    },

    /// A monetary input outside its allowed range.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: Money,
    },

    /// The entity is missing or belongs to another user.
    #[error("{entity} {id} not found or not owned by the current user")]
    NotOwned {
        /// Entity kind (e.g. `"account"`)
        entity: &'static str,
        /// Requested identifier
        id: i64,
    },

    /// Budgets on the account would exceed its current balance.
    #[error(
        "Budgets for account {account_id} would total {new_total} (already budgeted {current_budgeted}), exceeding its balance of {account_balance}"
    )]
    CapacityOverflow {
        /// Account the budgets are drawn against
        account_id: i64,
        /// Sum of the other budgets on the account
        current_budgeted: Money,
        /// Total including the rejected budget
        new_total: Money,
        /// Account balance at the time of the check
        account_balance: Money,
    },

    /// The account cannot cover the requested transfer.
    #[error("Insufficient funds in account {account_id}: balance {current}, required {required}")]
    InsufficientFunds {
        /// Account being debited
        account_id: i64,
        /// Balance before the transfer
        current: Money,
        /// Amount requested
        required: Money,
    },

    /// Configuration could not be loaded or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable reason
        message: String,
    },

    /// Underlying database failure.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// I/O failure outside the database.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotOwned`].
    #[must_use]
    pub const fn not_owned(entity: &'static str, id: i64) -> Self {
        Self::NotOwned { entity, id }
    }

    /// Classifies the error into one of the failure kinds.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Validation { .. } | Self::InvalidAmount { .. } => FailureKind::Validation,
            Self::NotOwned { .. } => FailureKind::Authorization,
            Self::CapacityOverflow { .. } => FailureKind::CapacityOverflow,
            Self::InsufficientFunds { .. } => FailureKind::InsufficientFunds,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => FailureKind::Internal,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
