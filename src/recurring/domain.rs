//! Core recurring income and expense types.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    UserID,
    category::CategoryType,
    database_id::{CategoryId, DatabaseId},
    nullable,
};

/// Selects whether a recurring endpoint works on incomes or expenses.
pub trait RecurringKind: Send + Sync + 'static {
    /// The type of the items and of the transactions created from them.
    const TYPE: CategoryType;
}

/// Marker for recurring incomes.
#[derive(Debug, Clone, Copy)]
pub struct Incomes;

impl RecurringKind for Incomes {
    const TYPE: CategoryType = CategoryType::Income;
}

/// Marker for recurring expenses.
#[derive(Debug, Clone, Copy)]
pub struct Expenses;

impl RecurringKind for Expenses {
    const TYPE: CategoryType = CategoryType::Expense;
}

/// A template for an income or expense that happens every month, e.g. a salary or rent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringItem {
    pub id: DatabaseId,
    pub user_id: UserID,
    #[serde(skip)]
    pub item_type: CategoryType,
    pub name: String,
    pub amount: f64,
    /// The day of the month the income or expense is expected, 1 to 31.
    pub day_of_month: u8,
    pub start_date: Date,
    pub end_date: Option<Date>,
    /// Only active items are turned into transactions by "create all".
    pub active: bool,
    pub category_id: Option<CategoryId>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

fn default_active() -> bool {
    true
}

/// The body of a request to create a recurring item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecurringForm {
    pub name: String,
    pub amount: f64,
    pub day_of_month: u8,
    pub start_date: Date,
    pub end_date: Option<Date>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub category_id: Option<CategoryId>,
}

/// The fields of a recurring item to change. Missing fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringUpdate {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub day_of_month: Option<u8>,
    pub start_date: Option<Date>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub end_date: Option<Option<Date>>,
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub category_id: Option<Option<CategoryId>>,
}
