//! Category entity - User-defined labels for transactions and budgets.
//!
//! Names are unique per user. A category's `category_type` reuses [`TransactionType`]
//! but is purely descriptive: it never affects balances.

use super::transaction::TransactionType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Name, unique among the user's categories
    pub name: String,
    /// Whether this category is meant for income, expenses or transfers
    pub category_type: TransactionType,
    /// Optional free-text description
    pub description: Option<String>,
    /// When the category was created
    pub created_at: DateTimeUtc,
    /// When the category was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One category labels many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One category scopes many budgets
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
