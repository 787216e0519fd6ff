//! Shared test utilities for `PocketLedger`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        account::{self, AccountInput},
        budget::{self, BudgetInput},
        category::{self, CategoryInput},
        money::Money,
        savings::{self, SavingsGoalInput},
        transaction::{self, RecordedTransaction, TransactionInput},
    },
    entities::{self, AccountType, TransactionType},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// The user most tests act as.
pub const OWNER: i64 = 1;
/// A second user, used to check that ownership is enforced.
pub const STRANGER: i64 = 2;

/// Installs a test-writer tracing subscriber. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A day in January 2024; test windows are built from these.
///
/// # Panics
/// Panics if `day` is not between 1 and 31.
#[must_use]
pub fn day(day: u32) -> NaiveDate {
    date(2024, 1, day)
}

/// Builds a date, panicking on an invalid one.
///
/// # Panics
/// Panics if the date does not exist.
#[must_use]
#[allow(clippy::expect_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Creates a USD checking account for `user_id` with the given opening balance in cents.
pub async fn create_test_account(
    db: &DatabaseConnection,
    user_id: i64,
    name: &str,
    opening_cents: i64,
) -> Result<entities::account::Model> {
    create_custom_account(db, user_id, name, AccountType::Checking, opening_cents).await
}

/// Creates an account of a specific type.
pub async fn create_custom_account(
    db: &DatabaseConnection,
    user_id: i64,
    name: &str,
    account_type: AccountType,
    opening_cents: i64,
) -> Result<entities::account::Model> {
    account::create_account(
        db,
        user_id,
        AccountInput::new(name, account_type, "USD"),
        Money::new(opening_cents),
    )
    .await
}

/// Creates an expense category for `user_id`.
pub async fn create_test_category(
    db: &DatabaseConnection,
    user_id: i64,
    name: &str,
) -> Result<entities::category::Model> {
    category::create_category(
        db,
        user_id,
        CategoryInput::new(name, TransactionType::Expense),
    )
    .await
}

/// Records an uncategorised transaction for [`OWNER`].
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    account_id: i64,
    transaction_type: TransactionType,
    cents: i64,
    on: NaiveDate,
) -> Result<RecordedTransaction> {
    let input = TransactionInput::new(account_id, transaction_type, Money::new(cents), on);
    transaction::create_transaction(db, OWNER, input).await
}

/// Records a categorised transaction for [`OWNER`].
pub async fn create_categorized_transaction(
    db: &DatabaseConnection,
    account_id: i64,
    category_id: i64,
    transaction_type: TransactionType,
    cents: i64,
    on: NaiveDate,
) -> Result<RecordedTransaction> {
    let input = TransactionInput {
        category_id: Some(category_id),
        ..TransactionInput::new(account_id, transaction_type, Money::new(cents), on)
    };
    transaction::create_transaction(db, OWNER, input).await
}

/// Creates a budget for [`OWNER`] covering all of January 2024, with no category.
pub async fn create_test_budget(
    db: &DatabaseConnection,
    account_id: i64,
    name: &str,
    cents: i64,
) -> Result<entities::budget::Model> {
    let input = BudgetInput::new(account_id, name, Money::new(cents), day(1), day(31));
    budget::create_budget(db, OWNER, input).await
}

/// Creates a budget for [`OWNER`] with a custom category and window.
pub async fn create_custom_budget(
    db: &DatabaseConnection,
    account_id: i64,
    category_id: Option<i64>,
    cents: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<entities::budget::Model> {
    let input = BudgetInput {
        category_id,
        ..BudgetInput::new(account_id, "Test budget", Money::new(cents), start, end)
    };
    budget::create_budget(db, OWNER, input).await
}

/// Creates a savings goal for [`OWNER`] with nothing saved.
pub async fn create_test_goal(
    db: &DatabaseConnection,
    name: &str,
    target_cents: i64,
) -> Result<entities::savings_goal::Model> {
    savings::create_savings_goal(db, OWNER, SavingsGoalInput::new(name, Money::new(target_cents)))
        .await
}

/// Sets up a complete test environment with one checking account for [`OWNER`].
/// Returns (db, account) for common test scenarios.
pub async fn setup_with_account(
    opening_cents: i64,
) -> Result<(DatabaseConnection, entities::account::Model)> {
    let db = setup_test_db().await?;
    let account = create_test_account(&db, OWNER, "Checking", opening_cents).await?;
    Ok((db, account))
}
