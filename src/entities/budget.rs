//! Budget entity - A spending limit on one account over a date window.
//!
//! `spent_amount_cents` is a cached view of matching expense transactions. It is
//! refreshed when the budget is written and recomputed on every read.

use crate::core::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Account the budget is drawn against
    pub account_id: i64,
    /// Optional category restricting which expenses count
    pub category_id: Option<i64>,
    /// Display name
    pub name: String,
    /// Budgeted amount in cents
    pub budget_amount_cents: i64,
    /// Spent amount in cents (derived)
    pub spent_amount_cents: i64,
    /// First day of the window (inclusive)
    pub start_date: Date,
    /// Last day of the window (inclusive)
    pub end_date: Date,
    /// Caller-controlled flag, no automatic transitions
    pub is_active: bool,
    /// When the budget was created
    pub created_at: DateTimeUtc,
    /// When the budget was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Budgeted amount as [`Money`].
    #[must_use]
    pub const fn budget_amount(&self) -> Money {
        Money::new(self.budget_amount_cents)
    }

    /// Spent amount as [`Money`].
    #[must_use]
    pub const fn spent_amount(&self) -> Money {
        Money::new(self.spent_amount_cents)
    }
}

/// Defines relationships between Budget and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each budget belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
    /// Each budget optionally targets one category
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
