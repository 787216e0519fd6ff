//! Transaction business logic - Records, edits and removes transactions.
//!
//! Every mutation here is one database transaction: the transaction row and the
//! balance of every affected account are committed together or not at all. Ownership
//! of the account and category is checked before anything is written.

use crate::{
    core::{access, money::Money, reconcile, validate},
    entities::{Transaction, TransactionType, account, transaction},
    errors::Result,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument, warn};

const MAX_DESCRIPTION_LEN: usize = 255;
const MAX_PAYEE_LEN: usize = 100;

/// Fields supplied when recording or editing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionInput {
    /// Account the transaction affects
    pub account_id: i64,
    /// Optional category label
    pub category_id: Option<i64>,
    /// Income, expense or transfer
    pub transaction_type: TransactionType,
    /// Positive amount
    pub amount: Money,
    /// Short description
    pub description: Option<String>,
    /// Date the transaction happened
    pub transaction_date: NaiveDate,
    /// Counterparty
    pub payee: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

impl TransactionInput {
    /// Input with only the required fields set.
    #[must_use]
    pub const fn new(
        account_id: i64,
        transaction_type: TransactionType,
        amount: Money,
        transaction_date: NaiveDate,
    ) -> Self {
        Self {
            account_id,
            category_id: None,
            transaction_type,
            amount,
            description: None,
            transaction_date,
            payee: None,
            notes: None,
        }
    }

    /// Checks ranges and lengths, trimming the free-text fields.
    pub fn validated(self) -> Result<Self> {
        validate::positive_amount(self.amount)?;
        Ok(Self {
            description: validate::optional_text(
                "description",
                self.description.as_deref(),
                MAX_DESCRIPTION_LEN,
            )?,
            payee: validate::optional_text("payee", self.payee.as_deref(), MAX_PAYEE_LEN)?,
            notes: validate::optional_text("notes", self.notes.as_deref(), usize::MAX)?,
            ..self
        })
    }
}

/// Result of recording a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTransaction {
    /// The stored transaction
    pub transaction: transaction::Model,
    /// The account after the transaction was applied
    pub account: account::Model,
}

/// Result of editing a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedTransaction {
    /// The stored transaction with its new fields
    pub transaction: transaction::Model,
    /// The account the transaction now affects
    pub account: account::Model,
    /// The account it used to affect, when that was a different account
    pub previous_account: Option<account::Model>,
}

/// Result of deleting a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedTransaction {
    /// The row that was removed
    pub transaction: transaction::Model,
    /// The account after the reversal, or `None` if the account record was missing
    pub account: Option<account::Model>,
}

/// Records a transaction and applies it to its account's balance.
///
/// The input is validated before anything is read. Inside one unit of work the account
/// and optional category are checked against `user_id`, the row is inserted and the
/// account balance is shifted by the transaction's signed effect.
///
/// # Arguments
/// * `user_id` - The user recording the transaction
/// * `input` - Account, type, positive amount, date and optional labels
///
/// # Errors
/// * `Error::InvalidAmount` / `Error::Validation` for bad input
/// * `Error::NotOwned` if the account or category is not the user's
/// * `Error::Database` if the unit of work fails; nothing is persisted
#[instrument(skip(db, input))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    user_id: i64,
    input: TransactionInput,
) -> Result<RecordedTransaction> {
    let input = input.validated()?;

    let txn = db.begin().await?;

    access::require_account(&txn, user_id, input.account_id).await?;
    access::require_optional_category(&txn, user_id, input.category_id).await?;

    let now = Utc::now();
    let transaction = transaction::ActiveModel {
        user_id: Set(user_id),
        account_id: Set(input.account_id),
        category_id: Set(input.category_id),
        transaction_type: Set(input.transaction_type),
        amount_cents: Set(input.amount.cents()),
        description: Set(input.description),
        transaction_date: Set(input.transaction_date),
        payee: Set(input.payee),
        notes: Set(input.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let account = reconcile::apply_transaction(&txn, &transaction).await?;

    txn.commit().await?;

    info!(
        "Created transaction {} on account {}: {:?} {}, balance now {}",
        transaction.id,
        account.id,
        transaction.transaction_type,
        transaction.amount(),
        account.current_balance()
    );
    Ok(RecordedTransaction {
        transaction,
        account,
    })
}

/// Replaces a transaction's fields, moving its balance effect accordingly.
///
/// The old effect is reversed on the old account and the new effect applied to the
/// (possibly different) new account inside one unit of work.
///
/// # Errors
/// * `Error::InvalidAmount` / `Error::Validation` for bad input
/// * `Error::NotOwned` if the transaction, new account or category is not the user's
/// * `Error::Database` if the unit of work fails; nothing is persisted
#[instrument(skip(db, input))]
pub async fn update_transaction(
    db: &DatabaseConnection,
    user_id: i64,
    transaction_id: i64,
    input: TransactionInput,
) -> Result<UpdatedTransaction> {
    let input = input.validated()?;

    let txn = db.begin().await?;

    let existing = access::require_transaction(&txn, user_id, transaction_id).await?;
    access::require_account(&txn, user_id, input.account_id).await?;
    access::require_optional_category(&txn, user_id, input.category_id).await?;

    let previous_account = if access::find_owned_account(&txn, user_id, existing.account_id)
        .await?
        .is_some()
    {
        Some(reconcile::reverse_transaction(&txn, &existing).await?)
    } else {
        warn!(
            "Account {} of transaction {} is missing; skipping reversal",
            existing.account_id, existing.id
        );
        None
    };

    let mut active: transaction::ActiveModel = existing.into();
    active.account_id = Set(input.account_id);
    active.category_id = Set(input.category_id);
    active.transaction_type = Set(input.transaction_type);
    active.amount_cents = Set(input.amount.cents());
    active.description = Set(input.description);
    active.transaction_date = Set(input.transaction_date);
    active.payee = Set(input.payee);
    active.notes = Set(input.notes);
    active.updated_at = Set(Utc::now());
    let transaction = active.update(&txn).await?;

    let account = reconcile::apply_transaction(&txn, &transaction).await?;

    txn.commit().await?;

    info!(
        "Updated transaction {}: now {:?} {} on account {}",
        transaction.id,
        transaction.transaction_type,
        transaction.amount(),
        account.id
    );
    Ok(UpdatedTransaction {
        previous_account: previous_account.filter(|previous| previous.id != account.id),
        transaction,
        account,
    })
}

/// Deletes a transaction and reverses its effect on the account balance.
///
/// A transaction whose account record no longer exists is still deleted; the anomaly
/// is logged at warn level and reported as `account: None`.
///
/// # Errors
/// * `Error::NotOwned` if the transaction is not the user's
/// * `Error::Database` if the unit of work fails; nothing is persisted
#[instrument(skip(db))]
pub async fn delete_transaction(
    db: &DatabaseConnection,
    user_id: i64,
    transaction_id: i64,
) -> Result<DeletedTransaction> {
    let txn = db.begin().await?;

    let existing = access::require_transaction(&txn, user_id, transaction_id).await?;

    let account = if access::find_owned_account(&txn, user_id, existing.account_id)
        .await?
        .is_some()
    {
        Some(reconcile::reverse_transaction(&txn, &existing).await?)
    } else {
        warn!(
            "Account {} of transaction {} not found while deleting; balance left untouched",
            existing.account_id, existing.id
        );
        None
    };

    existing.clone().delete(&txn).await?;

    txn.commit().await?;

    info!("Deleted transaction {}", existing.id);
    Ok(DeletedTransaction {
        transaction: existing,
        account,
    })
}

/// Retrieves one of the user's transactions.
pub async fn get_transaction(
    db: &DatabaseConnection,
    user_id: i64,
    transaction_id: i64,
) -> Result<transaction::Model> {
    access::require_transaction(db, user_id, transaction_id).await
}

/// Lists the user's transactions, most recent `transaction_date` first.
///
/// Transactions on the same date are ordered newest ID first.
///
/// # Errors
/// Returns `Error::Database` if the query fails.
pub async fn list_transactions(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .order_by_desc(transaction::Column::TransactionDate)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
