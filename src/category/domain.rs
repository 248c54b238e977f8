//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, UserID, database_id::CategoryId, text_enum::text_enum};

text_enum! {
    /// Whether a category (or transaction) is money coming in or going out.
    pub enum CategoryType {
        Income => "INCOME",
        Expense => "EXPENSE",
    }
}

/// The name of the default category used when nothing more specific is known.
pub const UNSPECIFIED_CATEGORY_NAME: &str = "Unspecified";

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyField] if `name` is empty or whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyField("category name"))
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A category for grouping transactions, e.g. "Food" or "Salary".
///
/// Default categories have no owner and are visible to every user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub user_id: Option<UserID>,
    pub is_default: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The short form of a category embedded in other records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
}

/// Form data for category creation.
#[derive(Debug, Deserialize)]
pub struct NewCategoryForm {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
}

/// Form data for editing a category. Missing fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct EditCategoryForm {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub category_type: Option<CategoryType>,
}
