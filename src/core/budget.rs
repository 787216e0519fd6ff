//! Budget business logic - Spending limits per account and date window.
//!
//! A budget's spent amount is the sum of matching expense transactions. It is stored
//! on every write and recomputed on every read. The sum of budgeted amounts on one
//! account may not exceed that account's balance at the time a budget is written.

use crate::{
    core::{access, money::Money, validate},
    entities::{Budget, Transaction, TransactionType, budget, transaction},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{debug, info, instrument};

const MAX_NAME_LEN: usize = 100;

/// Fields supplied when creating or editing a budget.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BudgetInput {
    /// Account the budget is drawn against
    pub account_id: i64,
    /// Restrict counted expenses to this category
    pub category_id: Option<i64>,
    /// Display name
    pub name: String,
    /// Budgeted amount, must be positive
    pub budget_amount: Money,
    /// First day of the window
    pub start_date: NaiveDate,
    /// Last day of the window, not before `start_date`
    pub end_date: NaiveDate,
    /// Whether the budget is in use
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl BudgetInput {
    /// Active budget without a category.
    #[must_use]
    pub fn new(
        account_id: i64,
        name: &str,
        budget_amount: Money,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            account_id,
            category_id: None,
            name: name.to_string(),
            budget_amount,
            start_date,
            end_date,
            is_active: true,
        }
    }

    fn validated(self) -> Result<Self> {
        validate::positive_amount(self.budget_amount)?;
        if self.end_date < self.start_date {
            return Err(Error::validation(format!(
                "end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        Ok(Self {
            name: validate::required_text("name", &self.name, MAX_NAME_LEN)?,
            ..self
        })
    }
}

/// Total of the owner's expense transactions that count against `budget`.
///
/// Matches on account, the inclusive date window and, when the budget has one, the
/// category. Income and transfers never count.
pub async fn spent_amount<C>(db: &C, budget: &budget::Model) -> Result<Money>
where
    C: ConnectionTrait,
{
    let mut condition = Condition::all()
        .add(transaction::Column::UserId.eq(budget.user_id))
        .add(transaction::Column::AccountId.eq(budget.account_id))
        .add(transaction::Column::TransactionType.eq(TransactionType::Expense))
        .add(transaction::Column::TransactionDate.between(budget.start_date, budget.end_date));
    if let Some(category_id) = budget.category_id {
        condition = condition.add(transaction::Column::CategoryId.eq(category_id));
    }

    access::sum_cents(
        db,
        Transaction::find().filter(condition),
        transaction::Column::AmountCents,
    )
    .await
}

/// Checks that adding `new_amount` keeps the account's budgets within its balance.
///
/// The sum covers all of the user's budgets on `account_id` except `exclude_budget_id`.
///
/// # Errors
/// * `Error::NotOwned` if the account is not the user's
/// * `Error::CapacityOverflow` if the new total exceeds the current balance or does not
///   fit in [`Money`]
pub async fn validate_budget_capacity<C>(
    db: &C,
    user_id: i64,
    account_id: i64,
    new_amount: Money,
    exclude_budget_id: Option<i64>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let account = access::require_account(db, user_id, account_id).await?;

    let mut others = Budget::find()
        .filter(budget::Column::UserId.eq(user_id))
        .filter(budget::Column::AccountId.eq(account_id));
    if let Some(id) = exclude_budget_id {
        others = others.filter(budget::Column::Id.ne(id));
    }
    let current_budgeted = access::sum_cents(db, others, budget::Column::BudgetAmountCents).await?;

    let account_balance = account.current_balance();
    debug!(
        "Budget capacity for account {}: {} budgeted, {} requested, balance {}",
        account_id, current_budgeted, new_amount, account_balance
    );

    // A total past the representable range is always over capacity
    match current_budgeted.checked_add(new_amount) {
        Some(new_total) if new_total <= account_balance => Ok(()),
        new_total => Err(Error::CapacityOverflow {
            account_id,
            current_budgeted,
            new_total: new_total.unwrap_or(Money::MAX),
            account_balance,
        }),
    }
}

/// Creates a budget after checking ownership and account capacity.
///
/// # Errors
/// * `Error::Validation` / `Error::InvalidAmount` for bad input
/// * `Error::NotOwned` if the account or category is not the user's
/// * `Error::CapacityOverflow` if the account cannot cover the budget; nothing is persisted
#[instrument(skip(db, input))]
pub async fn create_budget(
    db: &DatabaseConnection,
    user_id: i64,
    input: BudgetInput,
) -> Result<budget::Model> {
    let input = input.validated()?;

    let txn = db.begin().await?;

    access::require_optional_category(&txn, user_id, input.category_id).await?;
    validate_budget_capacity(&txn, user_id, input.account_id, input.budget_amount, None).await?;

    let now = Utc::now();
    let created = budget::ActiveModel {
        user_id: Set(user_id),
        account_id: Set(input.account_id),
        category_id: Set(input.category_id),
        name: Set(input.name),
        budget_amount_cents: Set(input.budget_amount.cents()),
        spent_amount_cents: Set(0),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        is_active: Set(input.is_active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let budget = store_spent(&txn, created).await?;

    txn.commit().await?;

    info!(
        "Created budget '{}' (ID: {}) on account {} for {}",
        budget.name,
        budget.id,
        budget.account_id,
        budget.budget_amount()
    );
    Ok(budget)
}

/// Replaces a budget's fields. The capacity check excludes the budget itself.
///
/// # Errors
/// Same as [`create_budget`], plus `Error::NotOwned` if the budget is not the user's.
#[instrument(skip(db, input))]
pub async fn update_budget(
    db: &DatabaseConnection,
    user_id: i64,
    budget_id: i64,
    input: BudgetInput,
) -> Result<budget::Model> {
    let input = input.validated()?;

    let txn = db.begin().await?;

    let existing = access::require_budget(&txn, user_id, budget_id).await?;
    access::require_optional_category(&txn, user_id, input.category_id).await?;
    validate_budget_capacity(
        &txn,
        user_id,
        input.account_id,
        input.budget_amount,
        Some(budget_id),
    )
    .await?;

    let mut active: budget::ActiveModel = existing.into();
    active.account_id = Set(input.account_id);
    active.category_id = Set(input.category_id);
    active.name = Set(input.name);
    active.budget_amount_cents = Set(input.budget_amount.cents());
    active.start_date = Set(input.start_date);
    active.end_date = Set(input.end_date);
    active.is_active = Set(input.is_active);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    let budget = store_spent(&txn, updated).await?;

    txn.commit().await?;

    info!("Updated budget '{}' (ID: {})", budget.name, budget.id);
    Ok(budget)
}

async fn store_spent<C>(db: &C, budget: budget::Model) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    let spent = spent_amount(db, &budget).await?;
    let mut active: budget::ActiveModel = budget.into();
    active.spent_amount_cents = Set(spent.cents());
    Ok(active.update(db).await?)
}

fn with_spent(mut budget: budget::Model, spent: Money) -> budget::Model {
    budget.spent_amount_cents = spent.cents();
    budget
}

/// Retrieves a budget with a freshly computed spent amount.
pub async fn get_budget(
    db: &DatabaseConnection,
    user_id: i64,
    budget_id: i64,
) -> Result<budget::Model> {
    let budget = access::require_budget(db, user_id, budget_id).await?;
    let spent = spent_amount(db, &budget).await?;
    Ok(with_spent(budget, spent))
}

/// Lists the user's budgets by name, each with a freshly computed spent amount.
///
/// Spent amounts are recomputed from the transactions for every budget in the list and
/// returned in `spent_amount_cents`; the stored values are not updated.
///
/// # Arguments
/// * `user_id` - The user whose budgets to list
///
/// # Errors
/// Returns `Error::Database` if any of the queries fail.
pub async fn list_budgets(db: &DatabaseConnection, user_id: i64) -> Result<Vec<budget::Model>> {
    let budgets = Budget::find()
        .filter(budget::Column::UserId.eq(user_id))
        .order_by_asc(budget::Column::Name)
        .all(db)
        .await?;

    let mut refreshed = Vec::with_capacity(budgets.len());
    for budget in budgets {
        let spent = spent_amount(db, &budget).await?;
        refreshed.push(with_spent(budget, spent));
    }
    Ok(refreshed)
}

/// Deletes one of the user's budgets.
#[instrument(skip(db))]
pub async fn delete_budget(db: &DatabaseConnection, user_id: i64, budget_id: i64) -> Result<()> {
    let budget = access::require_budget(db, user_id, budget_id).await?;
    budget.delete(db).await?;
    info!("Deleted budget {}", budget_id);
    Ok(())
}
