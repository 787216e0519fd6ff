//! Transaction entity - A single income, expense or transfer against one account.
//!
//! `amount_cents` is always positive; the direction is carried by `transaction_type`.
//! Backticks are used for field names to enable proper documentation linking.

use crate::core::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a transaction (also used as a category kind).
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money coming into the account
    #[sea_orm(string_value = "income")]
    Income,
    /// Money leaving the account
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Movement between accounts; recorded but has no balance effect
    #[sea_orm(string_value = "transfer")]
    Transfer,
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// ID of the account this transaction affects
    pub account_id: i64,
    /// Optional category label
    pub category_id: Option<i64>,
    /// Direction: `"income"`, `"expense"` or `"transfer"`
    pub transaction_type: TransactionType,
    /// Positive amount in cents
    pub amount_cents: i64,
    /// Short description
    pub description: Option<String>,
    /// Calendar date the transaction happened on
    pub transaction_date: Date,
    /// Counterparty
    pub payee: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Amount as [`Money`].
    #[must_use]
    pub const fn amount(&self) -> Money {
        Money::new(self.amount_cents)
    }
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
    /// Each transaction optionally belongs to a category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
