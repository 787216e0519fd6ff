//! Balance reconciliation - keeps an account's running balance in step with its transactions.
//!
//! Balances are moved with a single in-place `UPDATE ... SET current_balance_cents =
//! current_balance_cents + ?` statement rather than read-modify-write, so two concurrent
//! units of work against the same account cannot lose each other's update.

use crate::{
    core::{access, money::Money},
    entities::{Account, TransactionType, account, transaction},
    errors::{Error, Result},
};
use sea_orm::{prelude::*, sea_query::Expr};
use tracing::debug;

/// Signed effect of a transaction on its account's balance.
///
/// Transfers are recorded without any balance effect.
#[must_use]
pub fn signed_effect(transaction_type: TransactionType, amount: Money) -> Money {
    match transaction_type {
        TransactionType::Income => amount,
        TransactionType::Expense => -amount,
        TransactionType::Transfer => Money::ZERO,
    }
}

/// Applies `tx` to its account and returns the updated account.
pub async fn apply_transaction<C>(db: &C, tx: &transaction::Model) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let delta = signed_effect(tx.transaction_type, tx.amount());
    shift_balance(db, tx.user_id, tx.account_id, delta).await
}

/// Undoes the effect of `tx` on its account and returns the updated account.
pub async fn reverse_transaction<C>(db: &C, tx: &transaction::Model) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let delta = -signed_effect(tx.transaction_type, tx.amount());
    shift_balance(db, tx.user_id, tx.account_id, delta).await
}

/// Adds `delta` to the account balance in place and re-reads the account.
///
/// # Errors
/// * `Error::NotOwned` if no account with that id belongs to `user_id`
/// * `Error::InvalidAmount` if the new balance would not fit in [`Money`]
pub async fn shift_balance<C>(
    db: &C,
    user_id: i64,
    account_id: i64,
    delta: Money,
) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let current = access::require_account(db, user_id, account_id).await?;
    if current.current_balance().checked_add(delta).is_none() {
        return Err(Error::InvalidAmount { amount: delta });
    }

    if delta != Money::ZERO {
        let result = Account::update_many()
            .col_expr(
                account::Column::CurrentBalanceCents,
                Expr::col(account::Column::CurrentBalanceCents).add(delta.cents()),
            )
            .col_expr(account::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(account::Column::Id.eq(account_id))
            .filter(account::Column::UserId.eq(user_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(Error::not_owned("account", account_id));
        }
        debug!("Shifted balance of account {} by {}", account_id, delta);
    }

    access::require_account(db, user_id, account_id).await
}
