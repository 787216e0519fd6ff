//! Account business logic - Create, read, update and delete operations for accounts.
//!
//! The opening balance is set once at creation. After that the balance is only moved
//! by transaction reconciliation and savings transfers, never by [`update_account`].

use crate::{
    core::{access, money::Money, validate},
    entities::{Account, AccountType, Budget, Transaction, account, budget, transaction},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

const MAX_NAME_LEN: usize = 100;

/// Editable account fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountInput {
    /// Display name
    pub name: String,
    /// Kind of account
    pub account_type: AccountType,
    /// ISO 4217 code, any case
    pub currency: String,
    /// Whether the account is in use
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl AccountInput {
    /// Active account with the given name, type and currency.
    #[must_use]
    pub fn new(name: &str, account_type: AccountType, currency: &str) -> Self {
        Self {
            name: name.to_string(),
            account_type,
            currency: currency.to_string(),
            is_active: true,
        }
    }

    fn validated(self) -> Result<Self> {
        let currency = self.currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::validation(format!(
                "currency must be a 3-letter code, got '{currency}'"
            )));
        }
        Ok(Self {
            name: validate::required_text("name", &self.name, MAX_NAME_LEN)?,
            currency: currency.to_ascii_uppercase(),
            ..self
        })
    }
}

/// Creates an account with its opening balance.
///
/// # Errors
/// Returns `Error::Validation` for an empty or over-long name or a malformed currency.
#[instrument(skip(db, input))]
pub async fn create_account(
    db: &DatabaseConnection,
    user_id: i64,
    input: AccountInput,
    opening_balance: Money,
) -> Result<account::Model> {
    let input = input.validated()?;

    let now = Utc::now();
    let account = account::ActiveModel {
        user_id: Set(user_id),
        name: Set(input.name),
        current_balance_cents: Set(opening_balance.cents()),
        currency: Set(input.currency),
        account_type: Set(input.account_type),
        is_active: Set(input.is_active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Created account '{}' (ID: {}) with opening balance {} {}",
        account.name,
        account.id,
        account.current_balance(),
        account.currency
    );
    Ok(account)
}

/// Retrieves one of the user's accounts by ID.
///
/// The lookup is scoped to `user_id`, so an account that belongs to someone else is
/// reported exactly like one that does not exist.
///
/// # Arguments
/// * `user_id` - The user making the request
/// * `account_id` - The account to fetch
///
/// # Errors
/// Returns `Error::NotOwned` if no such account belongs to the user, or
/// `Error::Database` if the query fails.
pub async fn get_account(
    db: &DatabaseConnection,
    user_id: i64,
    account_id: i64,
) -> Result<account::Model> {
    access::require_account(db, user_id, account_id).await
}

/// Lists the user's accounts by name.
pub async fn list_accounts(db: &DatabaseConnection, user_id: i64) -> Result<Vec<account::Model>> {
    Account::find()
        .filter(account::Column::UserId.eq(user_id))
        .order_by_asc(account::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Updates name, type, currency and active flag. The balance is left as is.
#[instrument(skip(db, input))]
pub async fn update_account(
    db: &DatabaseConnection,
    user_id: i64,
    account_id: i64,
    input: AccountInput,
) -> Result<account::Model> {
    let input = input.validated()?;
    let existing = access::require_account(db, user_id, account_id).await?;

    let mut active: account::ActiveModel = existing.into();
    active.name = Set(input.name);
    active.account_type = Set(input.account_type);
    active.currency = Set(input.currency);
    active.is_active = Set(input.is_active);
    active.updated_at = Set(Utc::now());
    let account = active.update(db).await?;

    info!("Updated account '{}' (ID: {})", account.name, account.id);
    Ok(account)
}

/// Deletes an account together with its transactions and budgets.
#[instrument(skip(db))]
pub async fn delete_account(db: &DatabaseConnection, user_id: i64, account_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let account = access::require_account(&txn, user_id, account_id).await?;

    let transactions = Transaction::delete_many()
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::AccountId.eq(account_id))
        .exec(&txn)
        .await?;
    let budgets = Budget::delete_many()
        .filter(budget::Column::UserId.eq(user_id))
        .filter(budget::Column::AccountId.eq(account_id))
        .exec(&txn)
        .await?;
    account.delete(&txn).await?;

    txn.commit().await?;

    info!(
        "Deleted account {} with {} transactions and {} budgets",
        account_id, transactions.rows_affected, budgets.rows_affected
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{budget::list_budgets, transaction::list_transactions};
    use crate::entities::TransactionType;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_account_normalises_currency() -> Result<()> {
        let db = setup_test_db().await?;

        let input = AccountInput::new("  Main ", AccountType::Checking, "eur");
        let account = create_account(&db, OWNER, input, Money::new(12_34)).await?;

        assert_eq!(account.name, "Main");
        assert_eq!(account.currency, "EUR");
        assert_eq!(account.current_balance(), Money::new(12_34));
        assert!(account.is_active);
        assert_eq!(account.user_id, OWNER);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_account_validation() -> Result<()> {
        let db = setup_test_db().await?;

        for currency in ["EU", "EURO", "E1R", ""] {
            let input = AccountInput::new("Main", AccountType::Checking, currency);
            assert!(matches!(
                create_account(&db, OWNER, input, Money::ZERO).await,
                Err(Error::Validation { .. })
            ));
        }

        let input = AccountInput::new(&"a".repeat(101), AccountType::Cash, "USD");
        assert!(create_account(&db, OWNER, input, Money::ZERO).await.is_err());

        assert!(list_accounts(&db, OWNER).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_account_keeps_balance() -> Result<()> {
        let (db, account) = setup_with_account(100_00).await?;

        let mut input = AccountInput::new("Renamed", AccountType::Savings, "gbp");
        input.is_active = false;
        let updated = update_account(&db, OWNER, account.id, input).await?;

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.account_type, AccountType::Savings);
        assert_eq!(updated.currency, "GBP");
        assert!(!updated.is_active);
        assert_eq!(updated.current_balance(), Money::new(100_00));
        Ok(())
    }

    #[tokio::test]
    async fn test_account_ownership() -> Result<()> {
        let (db, account) = setup_with_account(100_00).await?;

        assert!(matches!(
            get_account(&db, STRANGER, account.id).await,
            Err(Error::NotOwned { .. })
        ));
        let input = AccountInput::new("Hijack", AccountType::Checking, "USD");
        assert!(update_account(&db, STRANGER, account.id, input).await.is_err());
        assert!(delete_account(&db, STRANGER, account.id).await.is_err());
        assert!(list_accounts(&db, STRANGER).await?.is_empty());
        assert_eq!(get_account(&db, OWNER, account.id).await?, account);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_accounts_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_account(&db, OWNER, "Wallet", 0).await?;
        create_test_account(&db, OWNER, "Bank", 0).await?;
        create_test_account(&db, STRANGER, "Another", 0).await?;

        let names: Vec<String> = list_accounts(&db, OWNER)
            .await?
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Bank", "Wallet"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_account_removes_transactions_and_budgets() -> Result<()> {
        let (db, account) = setup_with_account(100_00).await?;
        let kept = create_test_account(&db, OWNER, "Kept", 100_00).await?;

        create_test_transaction(&db, account.id, TransactionType::Expense, 5_00, day(1)).await?;
        create_test_budget(&db, account.id, "Groceries", 50_00).await?;
        let kept_tx =
            create_test_transaction(&db, kept.id, TransactionType::Income, 5_00, day(1)).await?;
        create_test_budget(&db, kept.id, "Fuel", 50_00).await?;

        delete_account(&db, OWNER, account.id).await?;

        assert!(get_account(&db, OWNER, account.id).await.is_err());
        let transactions = list_transactions(&db, OWNER).await?;
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].id, kept_tx.transaction.id);
        let budgets = list_budgets(&db, OWNER).await?;
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].name, "Fuel");
        Ok(())
    }
}
