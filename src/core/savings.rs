//! Savings goal business logic - Goals and transfers into them.
//!
//! [`add_funds`] moves money from an account into a goal. The account debit, the goal
//! update and the mirror expense transaction are committed together or not at all.

use crate::{
    core::{access, money::Money, reconcile, validate},
    entities::{AccountType, SavingsGoal, TransactionType, account, savings_goal, transaction},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument, warn};

const MAX_NAME_LEN: usize = 100;

/// Payee recorded on the mirror transaction of a savings transfer.
pub const SAVINGS_PAYEE: &str = "Savings Goal";

/// Fields supplied when creating or editing a savings goal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SavingsGoalInput {
    /// Display name
    pub name: String,
    /// Amount to reach, must be positive
    pub target_amount: Money,
    /// Amount already saved
    #[serde(default)]
    pub saved_amount: Money,
    /// Optional deadline, not in the past
    pub target_date: Option<NaiveDate>,
    /// Optional description
    pub description: Option<String>,
}

impl SavingsGoalInput {
    /// Goal with nothing saved yet and no deadline.
    #[must_use]
    pub fn new(name: &str, target_amount: Money) -> Self {
        Self {
            name: name.to_string(),
            target_amount,
            saved_amount: Money::ZERO,
            target_date: None,
            description: None,
        }
    }

    fn validated(self, today: NaiveDate) -> Result<Self> {
        validate::positive_amount(self.target_amount)?;
        if self.saved_amount.is_negative() {
            return Err(Error::InvalidAmount {
                amount: self.saved_amount,
            });
        }
        if self.saved_amount > self.target_amount {
            return Err(Error::validation(format!(
                "saved amount {} exceeds target amount {}",
                self.saved_amount, self.target_amount
            )));
        }
        if let Some(target_date) = self.target_date.filter(|date| *date < today) {
            return Err(Error::validation(format!(
                "target date {target_date} is in the past"
            )));
        }
        Ok(Self {
            name: validate::required_text("name", &self.name, MAX_NAME_LEN)?,
            description: validate::optional_text(
                "description",
                self.description.as_deref(),
                usize::MAX,
            )?,
            ..self
        })
    }
}

/// Result of a savings transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavingsContribution {
    /// The goal after the contribution
    pub goal: savings_goal::Model,
    /// The debited account after the contribution
    pub account: account::Model,
    /// The expense transaction recording the transfer
    pub transaction: transaction::Model,
}

/// Moves `amount` from an account into a savings goal.
///
/// Only `CreditCard` accounts may end up below zero. The goal's saved amount is not
/// capped at its target.
///
/// # Errors
/// * `Error::InvalidAmount` if `amount` is not positive or would overflow the goal or
///   account balance
/// * `Error::NotOwned` if the goal or account is not the user's
/// * `Error::InsufficientFunds` if the account cannot cover `amount`; nothing is persisted
#[instrument(skip(db))]
pub async fn add_funds(
    db: &DatabaseConnection,
    user_id: i64,
    goal_id: i64,
    account_id: i64,
    amount: Money,
) -> Result<SavingsContribution> {
    validate::positive_amount(amount)?;

    let txn = db.begin().await?;

    let goal = access::require_savings_goal(&txn, user_id, goal_id).await?;
    let before = access::require_account(&txn, user_id, account_id).await?;
    let saved = goal
        .saved_amount()
        .checked_add(amount)
        .ok_or(Error::InvalidAmount { amount })?;

    let account = reconcile::shift_balance(&txn, user_id, account_id, -amount).await?;
    if account.current_balance().is_negative() && account.account_type != AccountType::CreditCard
    {
        txn.rollback().await?;
        let current = before.current_balance();
        warn!(
            "Rejected transfer of {} from account {} to goal {}: balance is {}",
            amount, account_id, goal_id, current
        );
        return Err(Error::InsufficientFunds {
            account_id,
            current,
            required: amount,
        });
    }

    let is_achieved = saved >= goal.target_amount();
    let now = Utc::now();
    let goal_name = goal.name.clone();
    let mut active: savings_goal::ActiveModel = goal.into();
    active.saved_amount_cents = Set(saved.cents());
    active.is_achieved = Set(is_achieved);
    active.updated_at = Set(now);
    let goal = active.update(&txn).await?;

    let transaction = transaction::ActiveModel {
        user_id: Set(user_id),
        account_id: Set(account_id),
        category_id: Set(None),
        transaction_type: Set(TransactionType::Expense),
        amount_cents: Set(amount.cents()),
        description: Set(Some(format!("Contribution to savings goal: {goal_name}"))),
        transaction_date: Set(now.date_naive()),
        payee: Set(Some(SAVINGS_PAYEE.to_string())),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        "Added {} to goal '{}' (ID: {}) from account {}, saved now {} of {}",
        amount,
        goal.name,
        goal.id,
        account.id,
        goal.saved_amount(),
        goal.target_amount()
    );
    Ok(SavingsContribution {
        goal,
        account,
        transaction,
    })
}

/// Creates a savings goal. `is_achieved` is derived from the amounts.
#[instrument(skip(db, input))]
pub async fn create_savings_goal(
    db: &DatabaseConnection,
    user_id: i64,
    input: SavingsGoalInput,
) -> Result<savings_goal::Model> {
    let input = input.validated(Utc::now().date_naive())?;

    let now = Utc::now();
    let goal = savings_goal::ActiveModel {
        user_id: Set(user_id),
        name: Set(input.name),
        target_amount_cents: Set(input.target_amount.cents()),
        saved_amount_cents: Set(input.saved_amount.cents()),
        target_date: Set(input.target_date),
        description: Set(input.description),
        is_achieved: Set(input.saved_amount >= input.target_amount),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created savings goal '{}' (ID: {})", goal.name, goal.id);
    Ok(goal)
}

/// Replaces a savings goal's fields and recomputes `is_achieved`.
#[instrument(skip(db, input))]
pub async fn update_savings_goal(
    db: &DatabaseConnection,
    user_id: i64,
    goal_id: i64,
    input: SavingsGoalInput,
) -> Result<savings_goal::Model> {
    let input = input.validated(Utc::now().date_naive())?;
    let existing = access::require_savings_goal(db, user_id, goal_id).await?;

    let mut active: savings_goal::ActiveModel = existing.into();
    active.name = Set(input.name);
    active.target_amount_cents = Set(input.target_amount.cents());
    active.saved_amount_cents = Set(input.saved_amount.cents());
    active.target_date = Set(input.target_date);
    active.description = Set(input.description);
    active.is_achieved = Set(input.saved_amount >= input.target_amount);
    active.updated_at = Set(Utc::now());
    let goal = active.update(db).await?;

    info!("Updated savings goal '{}' (ID: {})", goal.name, goal.id);
    Ok(goal)
}

/// Retrieves one of the user's savings goals by ID.
///
/// The returned model carries the stored `saved_amount_cents` and `is_achieved`; both
/// are kept current by [`add_funds`] and [`update_savings_goal`].
///
/// # Arguments
/// * `user_id` - The user making the request
/// * `goal_id` - The goal to fetch
///
/// # Errors
/// Returns `Error::NotOwned` if no such goal belongs to the user.
pub async fn get_savings_goal(
    db: &DatabaseConnection,
    user_id: i64,
    goal_id: i64,
) -> Result<savings_goal::Model> {
    access::require_savings_goal(db, user_id, goal_id).await
}

/// Lists the user's savings goals by name.
pub async fn list_savings_goals(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<savings_goal::Model>> {
    SavingsGoal::find()
        .filter(savings_goal::Column::UserId.eq(user_id))
        .order_by_asc(savings_goal::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes one of the user's savings goals. Past contribution transactions are kept.
#[instrument(skip(db))]
pub async fn delete_savings_goal(db: &DatabaseConnection, user_id: i64, goal_id: i64) -> Result<()> {
    let goal = access::require_savings_goal(db, user_id, goal_id).await?;
    goal.delete(db).await?;
    info!("Deleted savings goal {}", goal_id);
    Ok(())
}
