//! Core receivable domain types.

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
    /// Where a receivable is in its lifecycle.
    pub enum ReceivableStatus {
        Open => "OPEN",
        Overdue => "OVERDUE",
        Received => "RECEIVED",
    }
}

impl LifecycleStatus for ReceivableStatus {
    const OPEN: Self = Self::Open;
    const OVERDUE: Self = Self::Overdue;
    const SETTLED: Self = Self::Received;
}

/// Money someone owes to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receivable {
    pub id: DatabaseId,
    pub user_id: UserID,
    pub debtor_name: String,
    pub description: Option<String>,
    pub total_amount: f64,
    pub due_date: Date,
    #[serde(with = "time::serde::rfc3339::option")]
    pub received_at: Option<OffsetDateTime>,
    pub status: ReceivableStatus,
    pub category_id: Option<CategoryId>,
    /// The income recorded when the receivable was marked as received.
    pub settlement_transaction_id: Option<TransactionId>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Obligation for Receivable {
    type Status = ReceivableStatus;

    const NOUN: &'static str = "receivable";
    const TABLE: &'static str = "receivable";
    const SETTLED_AT_COLUMN: &'static str = "received_at";
    const COUNTERPART_COLUMN: &'static str = "debtor_name";
    const TRANSACTION_TYPE: CategoryType = CategoryType::Income;

    fn settlement_description(counterpart: &str) -> String {
        format!("Payment received from {counterpart}")
    }
}

/// The body of a request to create a receivable.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReceivableForm {
    pub debtor_name: String,
    pub description: Option<String>,
    pub total_amount: f64,
    pub due_date: Date,
    pub category_id: Option<CategoryId>,
}

/// The fields of a receivable to change. Missing fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivableUpdate {
    pub debtor_name: Option<String>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub description: Option<Option<String>>,
    pub total_amount: Option<f64>,
    pub due_date: Option<Date>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub category_id: Option<Option<CategoryId>>,
}
