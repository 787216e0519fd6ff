//! Entity module - Contains all SeaORM entity definitions for the ledger tables.
//! Each entity has a Model struct for data and an Entity struct for operations.
//! Every table carries a `user_id` column; all access in `core` is filtered by it.

pub mod account;
pub mod budget;
pub mod category;
pub mod savings_goal;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use account::{
    AccountType, Column as AccountColumn, Entity as Account, Model as AccountModel,
};
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use savings_goal::{
    Column as SavingsGoalColumn, Entity as SavingsGoal, Model as SavingsGoalModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
    TransactionType,
};
