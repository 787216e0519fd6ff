//! Ownership-filtered access to the ledger store.
//!
//! Every lookup here is scoped by `user_id`: a row owned by another user is treated
//! exactly like a missing row. The `require_*` variants turn a miss into
//! [`Error::NotOwned`]. All functions accept any `ConnectionTrait`, so they run the same
//! against a plain connection or inside an open database transaction.

use crate::{
    core::money::Money,
    entities::{
        Account, Budget, Category, SavingsGoal, Transaction, account, budget, category,
        savings_goal, transaction,
    },
    errors::{Error, Result},
};
use sea_orm::{QuerySelect, Select, prelude::*};

/// Finds an account by id if it belongs to `user_id`.
pub async fn find_owned_account<C>(
    db: &C,
    user_id: i64,
    account_id: i64,
) -> Result<Option<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find_by_id(account_id)
        .filter(account::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`find_owned_account`] but fails with [`Error::NotOwned`] on a miss.
pub async fn require_account<C>(db: &C, user_id: i64, account_id: i64) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    find_owned_account(db, user_id, account_id)
        .await?
        .ok_or_else(|| Error::not_owned("account", account_id))
}

/// Fails with [`Error::NotOwned`] unless the category belongs to `user_id`.
pub async fn require_category<C>(
    db: &C,
    user_id: i64,
    category_id: i64,
) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    Category::find_by_id(category_id)
        .filter(category::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_owned("category", category_id))
}

/// Checks an optional category reference.
pub async fn require_optional_category<C>(
    db: &C,
    user_id: i64,
    category_id: Option<i64>,
) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    match category_id {
        Some(id) => require_category(db, user_id, id).await.map(Some),
        None => Ok(None),
    }
}

/// Fails with [`Error::NotOwned`] unless the transaction belongs to `user_id`.
pub async fn require_transaction<C>(
    db: &C,
    user_id: i64,
    transaction_id: i64,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    Transaction::find_by_id(transaction_id)
        .filter(transaction::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_owned("transaction", transaction_id))
}

/// Fails with [`Error::NotOwned`] unless the budget belongs to `user_id`.
pub async fn require_budget<C>(db: &C, user_id: i64, budget_id: i64) -> Result<budget::Model>
where
    C: ConnectionTrait,
{
    Budget::find_by_id(budget_id)
        .filter(budget::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_owned("budget", budget_id))
}

/// Fails with [`Error::NotOwned`] unless the savings goal belongs to `user_id`.
pub async fn require_savings_goal<C>(
    db: &C,
    user_id: i64,
    goal_id: i64,
) -> Result<savings_goal::Model>
where
    C: ConnectionTrait,
{
    SavingsGoal::find_by_id(goal_id)
        .filter(savings_goal::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_owned("savings goal", goal_id))
}

/// Sums a cents column over the rows matched by `select`. An empty match sums to zero.
pub async fn sum_cents<C, E>(db: &C, select: Select<E>, column: E::Column) -> Result<Money>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let total: Option<Option<i64>> = select
        .select_only()
        .column_as(column.sum(), "total")
        .into_tuple::<Option<i64>>()
        .one(db)
        .await?;
    Ok(Money::new(total.flatten().unwrap_or(0)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_require_account_filters_by_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db, OWNER, "Checking", 100_00).await?;

        let found = require_account(&db, OWNER, account.id).await?;
        assert_eq!(found, account);

        let result = require_account(&db, STRANGER, account.id).await;
        assert!(matches!(
            result,
            Err(Error::NotOwned {
                entity: "account",
                ..
            })
        ));

        let missing = find_owned_account(&db, OWNER, 999).await?;
        assert!(missing.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_require_optional_category() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_test_category(&db, OWNER, "Food").await?;

        assert!(require_optional_category(&db, OWNER, None).await?.is_none());
        assert_eq!(
            require_optional_category(&db, OWNER, Some(category.id))
                .await?
                .unwrap()
                .id,
            category.id
        );
        assert!(
            require_optional_category(&db, STRANGER, Some(category.id))
                .await
                .is_err()
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_sum_cents_empty_is_zero() -> Result<()> {
        let db = setup_test_db().await?;
        let total = sum_cents(
            &db,
            Transaction::find().filter(transaction::Column::UserId.eq(OWNER)),
            transaction::Column::AmountCents,
        )
        .await?;
        assert_eq!(total, Money::ZERO);
        Ok(())
    }
}
