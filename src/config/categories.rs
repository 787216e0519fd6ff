//! Default category configuration loaded from config.toml
//!
//! New users get a starter set of categories. The set is read from the `[[categories]]`
//! tables of `config.toml`; when no file is present the built-in list is used.

use crate::entities::TransactionType;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Categories created for every new user
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

/// Configuration for a single default category
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CategoryConfig {
    /// Name of the category
    pub name: String,
    /// `"income"`, `"expense"` or `"transfer"`
    pub category_type: TransactionType,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

impl CategoryConfig {
    fn new(name: &str, category_type: TransactionType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            category_type,
            description: Some(description.to_string()),
        }
    }
}

/// Built-in starter categories.
#[must_use]
pub fn builtin_categories() -> Vec<CategoryConfig> {
    use TransactionType::{Expense, Income};
    vec![
        CategoryConfig::new("Salary", Income, "Regular income"),
        CategoryConfig::new("Food", Expense, "Groceries and restaurants"),
        CategoryConfig::new("Transport", Expense, "Getting around"),
        CategoryConfig::new("Housing", Expense, "Rent or mortgage, utilities"),
        CategoryConfig::new("Entertainment", Expense, "Leisure, hobbies, culture"),
        CategoryConfig::new("Health", Expense, "Doctor visits, medicine"),
        CategoryConfig::new("Savings", Expense, "Money set aside for savings goals"),
        CategoryConfig::new("Other", Expense, "Uncategorised expenses"),
    ]
}

/// Loads the category configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Returns the default categories from `./config.toml`, or the built-in list when the
/// file does not exist or lists no categories.
pub fn load_default_categories() -> Result<Vec<CategoryConfig>> {
    let path = Path::new("config.toml");
    if !path.exists() {
        tracing::debug!("No config.toml found, using built-in categories");
        return Ok(builtin_categories());
    }
    let config = load_config(path)?;
    if config.categories.is_empty() {
        return Ok(builtin_categories());
    }
    Ok(config.categories)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_category_config() {
        let toml_str = r#"
            [[categories]]
            name = "Salary"
            category_type = "income"

            [[categories]]
            name = "Groceries"
            category_type = "expense"
            description = "Weekly shop"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.categories.len(), 2);
        assert_eq!(config.categories[0].name, "Salary");
        assert_eq!(config.categories[0].category_type, TransactionType::Income);
        assert!(config.categories[0].description.is_none());
        assert_eq!(
            config.categories[1].description.as_deref(),
            Some("Weekly shop")
        );
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let toml_str = r#"
            [[categories]]
            name = "Odd"
            category_type = "refund"
        "#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_builtin_categories_have_unique_names() {
        let categories = builtin_categories();
        let mut names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), categories.len());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
