//! Account entity - A financial account owned by one user.
//!
//! The `current_balance_cents` column is the running balance. After the opening balance
//! is set at creation it is only moved by transaction reconciliation and savings transfers.

use crate::core::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of account. Only `CreditCard` may go below zero through a savings transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Everyday checking account
    #[sea_orm(string_value = "checking")]
    Checking,
    /// Savings account
    #[sea_orm(string_value = "savings")]
    Savings,
    /// Credit card; allowed to carry a negative balance
    #[sea_orm(string_value = "credit_card")]
    CreditCard,
    /// Brokerage or other investment account
    #[sea_orm(string_value = "investment")]
    Investment,
    /// Physical cash
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Anything else
    #[sea_orm(string_value = "other")]
    Other,
}

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Display name (e.g. "Main checking")
    pub name: String,
    /// Running balance in cents
    pub current_balance_cents: i64,
    /// ISO 4217 currency code, upper-case
    pub currency: String,
    /// Kind of account
    pub account_type: AccountType,
    /// Whether the account is in use
    pub is_active: bool,
    /// When the account was created
    pub created_at: DateTimeUtc,
    /// When the account was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Current balance as [`Money`].
    #[must_use]
    pub const fn current_balance(&self) -> Money {
        Money::new(self.current_balance_cents)
    }
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account has many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One account has many budgets
    #[sea_orm(has_many = "super::budget::Entity")]
    Budgets,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
