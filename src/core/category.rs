//! Category business logic - Per-user labels for transactions and budgets.
//!
//! Category names are unique per user. Deleting a category detaches it from the
//! user's transactions and budgets instead of removing them.

use crate::{
    config::categories::CategoryConfig,
    core::{access, validate},
    entities::{Budget, Category, Transaction, TransactionType, budget, category, transaction},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

const MAX_NAME_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 500;

/// Editable category fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryInput {
    /// Display name, unique per user
    pub name: String,
    /// Kind of transaction the category is meant for
    pub category_type: TransactionType,
    /// Optional description
    pub description: Option<String>,
}

impl CategoryInput {
    /// Category with no description.
    #[must_use]
    pub fn new(name: &str, category_type: TransactionType) -> Self {
        Self {
            name: name.to_string(),
            category_type,
            description: None,
        }
    }

    fn validated(self) -> Result<Self> {
        Ok(Self {
            name: validate::required_text("name", &self.name, MAX_NAME_LEN)?,
            description: validate::optional_text(
                "description",
                self.description.as_deref(),
                MAX_DESCRIPTION_LEN,
            )?,
            ..self
        })
    }
}

impl From<&CategoryConfig> for CategoryInput {
    fn from(config: &CategoryConfig) -> Self {
        Self {
            name: config.name.clone(),
            category_type: config.category_type,
            description: config.description.clone(),
        }
    }
}

async fn ensure_unique_name<C>(
    db: &C,
    user_id: i64,
    name: &str,
    exclude_category_id: Option<i64>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Category::find()
        .filter(category::Column::UserId.eq(user_id))
        .filter(category::Column::Name.eq(name));
    if let Some(id) = exclude_category_id {
        query = query.filter(category::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(Error::validation(format!(
            "a category named '{name}' already exists"
        )));
    }
    Ok(())
}

async fn insert_category<C>(db: &C, user_id: i64, input: CategoryInput) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    let now = Utc::now();
    let category = category::ActiveModel {
        user_id: Set(user_id),
        name: Set(input.name),
        category_type: Set(input.category_type),
        description: Set(input.description),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(category)
}

/// Creates a category.
///
/// # Errors
/// Returns `Error::Validation` for a bad name or description, or a name the user
/// already has.
#[instrument(skip(db, input))]
pub async fn create_category(
    db: &DatabaseConnection,
    user_id: i64,
    input: CategoryInput,
) -> Result<category::Model> {
    let input = input.validated()?;
    ensure_unique_name(db, user_id, &input.name, None).await?;

    let category = insert_category(db, user_id, input).await?;
    info!("Created category '{}' (ID: {})", category.name, category.id);
    Ok(category)
}

/// Retrieves one of the user's categories.
pub async fn get_category(
    db: &DatabaseConnection,
    user_id: i64,
    category_id: i64,
) -> Result<category::Model> {
    access::require_category(db, user_id, category_id).await
}

/// Lists all of the user's categories, ordered alphabetically by name.
///
/// Other users' categories are never included, even when they share a name.
///
/// # Errors
/// Returns `Error::Database` if the query fails.
pub async fn list_categories(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<category::Model>> {
    Category::find()
        .filter(category::Column::UserId.eq(user_id))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces a category's fields. The new name must not clash with another category.
#[instrument(skip(db, input))]
pub async fn update_category(
    db: &DatabaseConnection,
    user_id: i64,
    category_id: i64,
    input: CategoryInput,
) -> Result<category::Model> {
    let input = input.validated()?;
    let existing = access::require_category(db, user_id, category_id).await?;
    ensure_unique_name(db, user_id, &input.name, Some(category_id)).await?;

    let mut active: category::ActiveModel = existing.into();
    active.name = Set(input.name);
    active.category_type = Set(input.category_type);
    active.description = Set(input.description);
    active.updated_at = Set(Utc::now());
    let category = active.update(db).await?;

    info!("Updated category '{}' (ID: {})", category.name, category.id);
    Ok(category)
}

/// Deletes a category, clearing it from the user's transactions and budgets.
#[instrument(skip(db))]
pub async fn delete_category(
    db: &DatabaseConnection,
    user_id: i64,
    category_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;

    let category = access::require_category(&txn, user_id, category_id).await?;

    let transactions = Transaction::update_many()
        .col_expr(transaction::Column::CategoryId, Expr::value(Option::<i64>::None))
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::CategoryId.eq(category_id))
        .exec(&txn)
        .await?;
    let budgets = Budget::update_many()
        .col_expr(budget::Column::CategoryId, Expr::value(Option::<i64>::None))
        .filter(budget::Column::UserId.eq(user_id))
        .filter(budget::Column::CategoryId.eq(category_id))
        .exec(&txn)
        .await?;
    category.delete(&txn).await?;

    txn.commit().await?;

    info!(
        "Deleted category {}, detached from {} transactions and {} budgets",
        category_id, transactions.rows_affected, budgets.rows_affected
    );
    Ok(())
}

/// Creates the starter categories for a user, skipping names the user already has.
///
/// Returns the categories that were created.
#[instrument(skip(db, defaults))]
pub async fn seed_default_categories(
    db: &DatabaseConnection,
    user_id: i64,
    defaults: &[CategoryConfig],
) -> Result<Vec<category::Model>> {
    let txn = db.begin().await?;

    let mut existing: HashSet<String> = Category::find()
        .filter(category::Column::UserId.eq(user_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();

    let mut created = Vec::new();
    for config in defaults {
        let input = CategoryInput::from(config).validated()?;
        if existing.contains(&input.name) {
            debug!("Category '{}' already exists, skipping", input.name);
            continue;
        }
        existing.insert(input.name.clone());
        created.push(insert_category(&txn, user_id, input).await?);
    }

    txn.commit().await?;

    info!(
        "Seeded {} default categories for user {}",
        created.len(),
        user_id
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::categories::builtin_categories;
    use crate::core::{budget::get_budget, transaction::get_transaction};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_category() -> Result<()> {
        let db = setup_test_db().await?;

        let mut input = CategoryInput::new("  Groceries ", TransactionType::Expense);
        input.description = Some("Weekly shop".to_string());
        let category = create_category(&db, OWNER, input).await?;

        assert_eq!(category.name, "Groceries");
        assert_eq!(category.category_type, TransactionType::Expense);
        assert_eq!(category.description.as_deref(), Some("Weekly shop"));

        let input = CategoryInput {
            description: Some("x".repeat(501)),
            ..CategoryInput::new("Long", TransactionType::Expense)
        };
        assert!(matches!(
            create_category(&db, OWNER, input).await,
            Err(Error::Validation { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_category_names_unique_per_user() -> Result<()> {
        let db = setup_test_db().await?;
        let food = create_test_category(&db, OWNER, "Food").await?;

        let duplicate = CategoryInput::new("Food", TransactionType::Income);
        assert!(matches!(
            create_category(&db, OWNER, duplicate).await,
            Err(Error::Validation { .. })
        ));

        // Another user may reuse the name
        create_test_category(&db, STRANGER, "Food").await?;

        let rent = create_test_category(&db, OWNER, "Rent").await?;
        let clash = CategoryInput::new("Food", TransactionType::Expense);
        assert!(update_category(&db, OWNER, rent.id, clash).await.is_err());

        // Renaming to its own name is fine
        let same = CategoryInput::new("Food", TransactionType::Income);
        let updated = update_category(&db, OWNER, food.id, same).await?;
        assert_eq!(updated.category_type, TransactionType::Income);
        Ok(())
    }

    #[tokio::test]
    async fn test_category_ownership() -> Result<()> {
        let db = setup_test_db().await?;
        let category = create_test_category(&db, OWNER, "Food").await?;

        assert!(matches!(
            get_category(&db, STRANGER, category.id).await,
            Err(Error::NotOwned {
                entity: "category",
                ..
            })
        ));
        assert!(delete_category(&db, STRANGER, category.id).await.is_err());
        assert!(list_categories(&db, STRANGER).await?.is_empty());
        assert_eq!(list_categories(&db, OWNER).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_category_detaches() -> Result<()> {
        let (db, account) = setup_with_account(500_00).await?;
        let food = create_test_category(&db, OWNER, "Food").await?;

        let recorded = create_categorized_transaction(
            &db,
            account.id,
            food.id,
            TransactionType::Expense,
            10_00,
            day(5),
        )
        .await?;
        let budget =
            create_custom_budget(&db, account.id, Some(food.id), 100_00, day(1), day(31)).await?;

        delete_category(&db, OWNER, food.id).await?;

        assert!(get_category(&db, OWNER, food.id).await.is_err());
        let transaction = get_transaction(&db, OWNER, recorded.transaction.id).await?;
        assert_eq!(transaction.category_id, None);
        let budget = get_budget(&db, OWNER, budget.id).await?;
        assert_eq!(budget.category_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_default_categories() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_category(&db, OWNER, "Food").await?;

        let defaults = builtin_categories();
        let created = seed_default_categories(&db, OWNER, &defaults).await?;
        assert_eq!(created.len(), defaults.len() - 1);
        assert!(created.iter().all(|c| c.name != "Food"));

        // Seeding twice adds nothing
        let again = seed_default_categories(&db, OWNER, &defaults).await?;
        assert!(again.is_empty());
        assert_eq!(list_categories(&db, OWNER).await?.len(), defaults.len());
        Ok(())
    }
}
