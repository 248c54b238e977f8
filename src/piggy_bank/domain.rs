//! Core piggy bank types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{UserID, database_id::DatabaseId, nullable, text_enum::text_enum};

text_enum! {
    /// How often the user plans to save `amountPerPeriod`.
    pub enum PeriodType {
        Day => "DAY",
        Week => "WEEK",
        Fortnight => "FORTNIGHT",
        Month => "MONTH",
    }
}

text_enum! {
    /// Whether money was put into or taken out of a piggy bank.
    pub enum MovementType {
        Deposit => "DEPOSIT",
        Withdrawal => "WITHDRAWAL",
    }
}

/// A savings goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PiggyBank {
    pub id: DatabaseId,
    pub user_id: UserID,
    pub name: String,
    pub description: Option<String>,
    pub photo_url: Option<String>,
    /// The sum of deposits minus withdrawals. Never negative.
    pub current_amount: f64,
    pub target_amount: Option<f64>,
    pub amount_per_period: f64,
    pub period_type: PeriodType,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A deposit into or withdrawal from a piggy bank.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PiggyBankTransaction {
    pub id: DatabaseId,
    pub piggy_bank_id: DatabaseId,
    /// The absolute amount moved.
    pub amount: f64,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A piggy bank along with its most recent movements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PiggyBankWithTransactions {
    #[serde(flatten)]
    pub piggy_bank: PiggyBank,
    pub transactions: Vec<PiggyBankTransaction>,
}

/// The fields of a request to create a piggy bank.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPiggyBankForm {
    pub name: String,
    pub description: Option<String>,
    pub target_amount: Option<f64>,
    pub amount_per_period: f64,
    pub period_type: PeriodType,
}

/// The fields of a piggy bank to change. Missing fields are left unchanged.
///
/// The current amount can only change through deposits and withdrawals.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PiggyBankUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub target_amount: Option<Option<f64>>,
    pub amount_per_period: Option<f64>,
    pub period_type: Option<PeriodType>,
}

/// The body of a deposit or withdrawal request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementForm {
    pub amount: f64,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub description: Option<String>,
}
