//! Core debt domain types.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    UserID,
    category::CategoryType,
    database_id::{CategoryId, DatabaseId, TransactionId},
    lifecycle::{LifecycleStatus, Obligation},
    nullable,
    text_enum::text_enum,
};

text_enum! {
    /// Where a debt is in its lifecycle.
    pub enum DebtStatus {
        Open => "OPEN",
        Overdue => "OVERDUE",
        Paid => "PAID",
    }
}

impl LifecycleStatus for DebtStatus {
    const OPEN: Self = Self::Open;
    const OVERDUE: Self = Self::Overdue;
    const SETTLED: Self = Self::Paid;
}

text_enum! {
    /// How urgent it is to pay a debt.
    pub enum DebtPriority {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
    }
}

impl Default for DebtPriority {
    fn default() -> Self {
        Self::Medium
    }
}

text_enum! {
    /// How often a recurring debt comes due.
    pub enum Recurrence {
        Monthly => "MONTHLY",
        Quarterly => "QUARTERLY",
        Yearly => "YEARLY",
    }
}

/// Money the user owes to someone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: DatabaseId,
    pub user_id: UserID,
    pub creditor_name: String,
    pub description: Option<String>,
    pub total_amount: f64,
    pub is_recurring: bool,
    pub recurrence: Option<Recurrence>,
    pub start_date: Date,
    pub due_date: Date,
    #[serde(with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
    pub priority: DebtPriority,
    pub status: DebtStatus,
    pub category_id: Option<CategoryId>,
    /// The expense recorded when the debt was marked as paid.
    pub settlement_transaction_id: Option<TransactionId>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Obligation for Debt {
    type Status = DebtStatus;

    const NOUN: &'static str = "debt";
    const TABLE: &'static str = "debt";
    const SETTLED_AT_COLUMN: &'static str = "paid_at";
    const COUNTERPART_COLUMN: &'static str = "creditor_name";
    const TRANSACTION_TYPE: CategoryType = CategoryType::Expense;

    fn settlement_description(counterpart: &str) -> String {
        format!("Debt payment to {counterpart}")
    }
}

/// The body of a request to create a debt.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDebtForm {
    pub creditor_name: String,
    pub description: Option<String>,
    pub total_amount: f64,
    #[serde(default)]
    pub is_recurring: bool,
    pub recurrence: Option<Recurrence>,
    pub start_date: Date,
    pub due_date: Date,
    #[serde(default)]
    pub priority: DebtPriority,
    pub category_id: Option<CategoryId>,
}

/// The fields of a debt to change. Missing fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtUpdate {
    pub creditor_name: Option<String>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub description: Option<Option<String>>,
    pub total_amount: Option<f64>,
    pub is_recurring: Option<bool>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub recurrence: Option<Option<Recurrence>>,
    pub start_date: Option<Date>,
    pub due_date: Option<Date>,
    pub priority: Option<DebtPriority>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub category_id: Option<Option<CategoryId>>,
}
