//! Core module - Framework-agnostic ledger operations.
//! Each submodule exposes free async functions over a `SeaORM` connection; units of
//! work open their own database transaction.

pub mod access;
pub mod account;
pub mod budget;
pub mod category;
pub mod money;
pub mod reconcile;
pub mod savings;
pub mod transaction;
pub mod validate;
