//! Aggregate queries behind the dashboard summary.

use std::ops::Range;

use rusqlite::{Connection, ToSql};
use serde::Serialize;
use time::Date;

use crate::{
    Error, UserID,
    auth::get_user_by_id,
    category::CategoryType,
    debt::{Debt, get_pending_debts},
    lifecycle::{LifecycleStatus, Obligation, refresh_overdue},
    receivable::{Receivable, get_pending_receivables},
    transaction::add_months,
};

/// The number of debts and receivables listed on the dashboard.
pub const PENDING_ITEMS_LIMIT: usize = 5;

/// An overview of the user's finances.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// The initial balance plus all income minus all expenses.
    pub current_balance: f64,
    pub initial_balance: f64,
    /// How much the balance has changed since the initial balance was set.
    pub balance_evolution: f64,
    pub total_income: f64,
    pub total_expenses: f64,
    /// The amount still owed on open and overdue debts.
    pub total_debts: f64,
    /// The amount still to be received on open and overdue receivables.
    pub total_receivables: f64,
    pub month_income: f64,
    pub month_expense: f64,
    /// This month's income and expenses with the active recurring items added.
    pub month_projection: f64,
    pub total_recurring_income: f64,
    pub total_recurring_expense: f64,
    pub pending_debts: Vec<Debt>,
    pub pending_receivables: Vec<Receivable>,
}

/// Build the dashboard summary for `user_id` as of `today`.
///
/// Debt and receivable statuses are refreshed first so that the totals and
/// pending lists include items that became overdue today.
///
/// # Errors
/// - [Error::InitialBalanceNotSet] if the user has not completed onboarding,
/// - [Error::SqlError] if a query fails.
pub fn get_dashboard_summary(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<DashboardSummary, Error> {
    let initial_balance = get_user_by_id(user_id, connection)?
        .initial_balance
        .ok_or(Error::InitialBalanceNotSet)?;

    refresh_overdue::<Debt>(user_id, today, connection)?;
    refresh_overdue::<Receivable>(user_id, today, connection)?;

    let month = current_month(today)?;

    let total_income = sum_transactions(user_id, CategoryType::Income, None, connection)?;
    let total_expenses = sum_transactions(user_id, CategoryType::Expense, None, connection)?;
    let month_income =
        sum_transactions(user_id, CategoryType::Income, Some(&month), connection)?;
    let month_expense =
        sum_transactions(user_id, CategoryType::Expense, Some(&month), connection)?;
    let total_recurring_income =
        sum_active_recurring(user_id, CategoryType::Income, connection)?;
    let total_recurring_expense =
        sum_active_recurring(user_id, CategoryType::Expense, connection)?;

    let current_balance = initial_balance + total_income - total_expenses;

    Ok(DashboardSummary {
        current_balance,
        initial_balance,
        balance_evolution: current_balance - initial_balance,
        total_income,
        total_expenses,
        total_debts: sum_unsettled::<Debt>(user_id, connection)?,
        total_receivables: sum_unsettled::<Receivable>(user_id, connection)?,
        month_income,
        month_expense,
        month_projection: month_income + total_recurring_income
            - month_expense
            - total_recurring_expense,
        total_recurring_income,
        total_recurring_expense,
        pending_debts: get_pending_debts(user_id, PENDING_ITEMS_LIMIT, connection)?,
        pending_receivables: get_pending_receivables(user_id, PENDING_ITEMS_LIMIT, connection)?,
    })
}

/// The dates from the first of `today`'s month up to, but excluding, the first
/// of the next month.
fn current_month(today: Date) -> Result<Range<Date>, Error> {
    let first = today
        .replace_day(1)
        .map_err(|error| Error::InvalidDate(error.to_string()))?;

    Ok(first..add_months(first, 1)?)
}

fn sum_transactions(
    user_id: UserID,
    transaction_type: CategoryType,
    date_range: Option<&Range<Date>>,
    connection: &Connection,
) -> Result<f64, Error> {
    let user_id = user_id.as_i64();
    let mut query =
        "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\" WHERE user_id = ? AND type = ?"
            .to_owned();
    let mut params: Vec<&dyn ToSql> = vec![&user_id, &transaction_type];

    if let Some(range) = date_range {
        query.push_str(" AND date >= ? AND date < ?");
        params.push(&range.start);
        params.push(&range.end);
    }

    connection
        .query_row(&query, params.as_slice(), |row| row.get(0))
        .map_err(Error::from)
}

fn sum_unsettled<O: Obligation>(user_id: UserID, connection: &Connection) -> Result<f64, Error> {
    connection
        .query_row(
            &format!(
                "SELECT COALESCE(SUM(total_amount), 0) FROM {}
                 WHERE user_id = ?1 AND status IN (?2, ?3)",
                O::TABLE
            ),
            rusqlite::params![
                user_id.as_i64(),
                <O::Status as LifecycleStatus>::OPEN,
                <O::Status as LifecycleStatus>::OVERDUE,
            ],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

fn sum_active_recurring(
    user_id: UserID,
    item_type: CategoryType,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM recurring_item
             WHERE user_id = ?1 AND type = ?2 AND active = 1",
            (user_id.as_i64(), item_type),
            |row| row.get(0),
        )
        .map_err(Error::from)
}
