//! Database operations for debts.

use rusqlite::{Connection, Row};
use time::{Date, OffsetDateTime};

use crate::{
    Error, UserID,
    category::{CategoryType, validate_category},
    database_id::DatabaseId,
    debt::{Debt, DebtStatus, DebtUpdate, NewDebtForm},
    lifecycle::{
        ensure_unsettled, refresh_overdue, status_after_due_date_change, unsettled_status,
    },
    nullable,
    validate::{optional_text, positive_amount, required_text},
};

const DEBT_COLUMNS: &str = "id, user_id, creditor_name, description, total_amount, \
    is_recurring, recurrence, start_date, due_date, paid_at, priority, status, category_id, \
    settlement_transaction_id, created_at, updated_at";

/// Create a debt. It starts OVERDUE if `due_date` is before `today`, otherwise OPEN.
///
/// # Errors
/// - [Error::EmptyField] if the creditor name is empty,
/// - [Error::NonPositiveAmount] if the total amount is not greater than zero,
/// - [Error::InvalidCategory] if the category is not a visible expense category.
pub fn create_debt(
    form: NewDebtForm,
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Debt, Error> {
    let creditor_name = required_text(&form.creditor_name, "creditor name")?;
    let total_amount = positive_amount(form.total_amount, "total amount")?;

    if let Some(category_id) = form.category_id {
        validate_category(category_id, CategoryType::Expense, user_id, connection)?;
    }

    let status: DebtStatus = unsettled_status(form.due_date, today);
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(&format!(
            "INSERT INTO debt (user_id, creditor_name, description, total_amount, is_recurring,
                recurrence, start_date, due_date, priority, status, category_id, created_at,
                updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
             RETURNING {DEBT_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                user_id.as_i64(),
                creditor_name,
                optional_text(form.description),
                total_amount,
                form.is_recurring,
                form.recurrence,
                form.start_date,
                form.due_date,
                form.priority,
                status,
                form.category_id,
                now,
            ],
            map_debt_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a debt owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the debt does not exist or belongs to another user.
pub fn get_debt(id: DatabaseId, user_id: UserID, connection: &Connection) -> Result<Debt, Error> {
    connection
        .prepare(&format!(
            "SELECT {DEBT_COLUMNS} FROM debt WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id.as_i64()), map_debt_row)
        .map_err(|error| error.into())
}

/// Get the user's debts ordered by status (open, overdue, paid) and then due date.
///
/// Open debts past their due date are marked overdue before they are read.
pub fn get_debts(user_id: UserID, today: Date, connection: &Connection) -> Result<Vec<Debt>, Error> {
    refresh_overdue::<Debt>(user_id, today, connection)?;

    connection
        .prepare(&format!(
            "SELECT {DEBT_COLUMNS} FROM debt WHERE user_id = ?1
             ORDER BY CASE status WHEN 'OPEN' THEN 0 WHEN 'OVERDUE' THEN 1 ELSE 2 END,
                due_date ASC, id ASC"
        ))?
        .query_map([user_id.as_i64()], map_debt_row)?
        .map(|maybe_debt| maybe_debt.map_err(Error::from))
        .collect()
}

/// Apply a partial update to an unsettled debt.
///
/// The status is recomputed from the due date, so a stale OPEN status
/// becomes OVERDUE even when the due date is not part of the update.
///
/// # Errors
/// - [Error::NotFound] if the debt does not exist or belongs to another user,
/// - [Error::SettledReadOnly] if the debt has been paid,
/// - the validation errors of [create_debt].
pub fn update_debt(
    id: DatabaseId,
    user_id: UserID,
    update: DebtUpdate,
    today: Date,
    connection: &Connection,
) -> Result<Debt, Error> {
    let current = get_debt(id, user_id, connection)?;
    ensure_unsettled::<Debt>(current.status)?;

    let creditor_name = match update.creditor_name {
        Some(name) => required_text(&name, "creditor name")?,
        None => current.creditor_name,
    };
    let total_amount = match update.total_amount {
        Some(amount) => positive_amount(amount, "total amount")?,
        None => current.total_amount,
    };
    let category_id = nullable::apply(update.category_id, current.category_id);

    if let Some(category_id) = category_id {
        validate_category(category_id, CategoryType::Expense, user_id, connection)?;
    }

    let due_date = update.due_date.unwrap_or(current.due_date);
    let status = status_after_due_date_change(current.status, due_date, today);

    connection
        .prepare(&format!(
            "UPDATE debt
             SET creditor_name = ?1, description = ?2, total_amount = ?3, is_recurring = ?4,
                recurrence = ?5, start_date = ?6, due_date = ?7, priority = ?8, status = ?9,
                category_id = ?10, updated_at = ?11
             WHERE id = ?12 AND user_id = ?13
             RETURNING {DEBT_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                creditor_name,
                optional_text(nullable::apply(update.description, current.description)),
                total_amount,
                update.is_recurring.unwrap_or(current.is_recurring),
                nullable::apply(update.recurrence, current.recurrence),
                update.start_date.unwrap_or(current.start_date),
                due_date,
                update.priority.unwrap_or(current.priority),
                status,
                category_id,
                OffsetDateTime::now_utc(),
                id,
                user_id.as_i64(),
            ],
            map_debt_row,
        )
        .map_err(|error| error.into())
}

/// Delete a debt owned by `user_id`. Its settlement transaction is kept.
///
/// # Errors
/// Returns [Error::NotFound] if the debt does not exist or belongs to another user.
pub fn delete_debt(id: DatabaseId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM debt WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get up to `limit` of the user's unsettled debts, soonest due date first.
///
/// Statuses must be refreshed with [refresh_overdue] beforehand for them to be current.
pub fn get_pending_debts(
    user_id: UserID,
    limit: usize,
    connection: &Connection,
) -> Result<Vec<Debt>, Error> {
    connection
        .prepare(&format!(
            "SELECT {DEBT_COLUMNS} FROM debt
             WHERE user_id = ?1 AND status IN ('OPEN', 'OVERDUE')
             ORDER BY due_date ASC, id ASC
             LIMIT ?2"
        ))?
        .query_map((user_id.as_i64(), limit as i64), map_debt_row)?
        .map(|maybe_debt| maybe_debt.map_err(Error::from))
        .collect()
}

/// Create the debt table.
pub fn create_debt_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS debt (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            creditor_name TEXT NOT NULL,
            description TEXT,
            total_amount REAL NOT NULL CHECK (total_amount > 0),
            is_recurring INTEGER NOT NULL DEFAULT 0,
            recurrence TEXT,
            start_date TEXT NOT NULL,
            due_date TEXT NOT NULL,
            paid_at TEXT,
            priority TEXT NOT NULL DEFAULT 'MEDIUM',
            status TEXT NOT NULL DEFAULT 'OPEN',
            category_id INTEGER,
            settlement_transaction_id INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE SET NULL,
            FOREIGN KEY(settlement_transaction_id) REFERENCES \"transaction\"(id) ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_debt_user_due ON debt(user_id, due_date);",
    )?;

    Ok(())
}

fn map_debt_row(row: &Row) -> Result<Debt, rusqlite::Error> {
    Ok(Debt {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        creditor_name: row.get(2)?,
        description: row.get(3)?,
        total_amount: row.get(4)?,
        is_recurring: row.get(5)?,
        recurrence: row.get(6)?,
        start_date: row.get(7)?,
        due_date: row.get(8)?,
        paid_at: row.get(9)?,
        priority: row.get(10)?,
        status: row.get(11)?,
        category_id: row.get(12)?,
        settlement_transaction_id: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}
