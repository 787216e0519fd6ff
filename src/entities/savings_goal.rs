//! Savings goal entity - A target amount the user is saving towards.

use crate::core::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Savings goal database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "savings_goals")]
pub struct Model {
    /// Unique identifier for the goal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Display name
    pub name: String,
    /// Amount to reach, in cents
    pub target_amount_cents: i64,
    /// Amount saved so far, in cents
    pub saved_amount_cents: i64,
    /// Optional deadline
    pub target_date: Option<Date>,
    /// Optional free-text description
    pub description: Option<String>,
    /// `true` iff saved >= target
    pub is_achieved: bool,
    /// When the goal was created
    pub created_at: DateTimeUtc,
    /// When the goal was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Target amount as [`Money`].
    #[must_use]
    pub const fn target_amount(&self) -> Money {
        Money::new(self.target_amount_cents)
    }

    /// Saved amount as [`Money`].
    #[must_use]
    pub const fn saved_amount(&self) -> Money {
        Money::new(self.saved_amount_cents)
    }
}

/// Savings goals have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
