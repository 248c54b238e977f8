//! Database operations for recurring incomes and expenses.

use rusqlite::{Connection, Row};
use time::{Date, OffsetDateTime};

use crate::{
    Error, UserID,
    category::{CategoryType, validate_category},
    database_id::{CategoryId, DatabaseId},
    nullable,
    recurring::{NewRecurringForm, RecurringItem, RecurringUpdate},
    validate::{positive_amount, required_text},
};

const RECURRING_COLUMNS: &str = "id, user_id, type, name, amount, day_of_month, start_date, \
    end_date, active, category_id, created_at, updated_at";

fn validate_day_of_month(day_of_month: u8) -> Result<u8, Error> {
    if (1..=31).contains(&day_of_month) {
        Ok(day_of_month)
    } else {
        Err(Error::InvalidDayOfMonth(day_of_month))
    }
}

fn validate_date_range(start_date: Date, end_date: Option<Date>) -> Result<(), Error> {
    match end_date {
        Some(end_date) if end_date < start_date => Err(Error::InvalidDateRange),
        _ => Ok(()),
    }
}

fn validate_item_category(
    category_id: Option<CategoryId>,
    item_type: CategoryType,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    if let Some(category_id) = category_id {
        validate_category(category_id, item_type, user_id, connection)?;
    }

    Ok(())
}

/// Create a recurring income or expense.
///
/// # Errors
/// - [Error::EmptyField] if the name is empty,
/// - [Error::NonPositiveAmount] if the amount is not greater than zero,
/// - [Error::InvalidDayOfMonth] if the day is not between 1 and 31,
/// - [Error::InvalidDateRange] if the end date is before the start date,
/// - [Error::InvalidCategory] if the category is not visible or has the other type.
pub fn create_recurring(
    item_type: CategoryType,
    form: NewRecurringForm,
    user_id: UserID,
    connection: &Connection,
) -> Result<RecurringItem, Error> {
    let name = required_text(&form.name, "name")?;
    let amount = positive_amount(form.amount, "amount")?;
    let day_of_month = validate_day_of_month(form.day_of_month)?;
    validate_date_range(form.start_date, form.end_date)?;
    validate_item_category(form.category_id, item_type, user_id, connection)?;

    connection
        .prepare(&format!(
            "INSERT INTO recurring_item (user_id, type, name, amount, day_of_month, start_date,
                end_date, active, category_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
             RETURNING {RECURRING_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                user_id.as_i64(),
                item_type,
                name,
                amount,
                day_of_month,
                form.start_date,
                form.end_date,
                form.active,
                form.category_id,
                OffsetDateTime::now_utc(),
            ],
            map_recurring_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a recurring item of `item_type` owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such item.
pub fn get_recurring(
    item_type: CategoryType,
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<RecurringItem, Error> {
    connection
        .prepare(&format!(
            "SELECT {RECURRING_COLUMNS} FROM recurring_item
             WHERE id = ?1 AND user_id = ?2 AND type = ?3"
        ))?
        .query_row((id, user_id.as_i64(), item_type), map_recurring_row)
        .map_err(|error| error.into())
}

/// Get the user's recurring items of `item_type` ordered by day of the month.
pub fn get_recurring_items(
    item_type: CategoryType,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<RecurringItem>, Error> {
    connection
        .prepare(&format!(
            "SELECT {RECURRING_COLUMNS} FROM recurring_item
             WHERE user_id = ?1 AND type = ?2
             ORDER BY day_of_month ASC, id ASC"
        ))?
        .query_map((user_id.as_i64(), item_type), map_recurring_row)?
        .map(|maybe_item| maybe_item.map_err(Error::from))
        .collect()
}

/// Get the user's active recurring items of `item_type` ordered by day of the month.
pub fn get_active_recurring_items(
    item_type: CategoryType,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<RecurringItem>, Error> {
    connection
        .prepare(&format!(
            "SELECT {RECURRING_COLUMNS} FROM recurring_item
             WHERE user_id = ?1 AND type = ?2 AND active = 1
             ORDER BY day_of_month ASC, id ASC"
        ))?
        .query_map((user_id.as_i64(), item_type), map_recurring_row)?
        .map(|maybe_item| maybe_item.map_err(Error::from))
        .collect()
}

/// Apply a partial update to a recurring item.
///
/// # Errors
/// - [Error::NotFound] if there is no such item,
/// - the validation errors of [create_recurring].
pub fn update_recurring(
    item_type: CategoryType,
    id: DatabaseId,
    user_id: UserID,
    update: RecurringUpdate,
    connection: &Connection,
) -> Result<RecurringItem, Error> {
    let current = get_recurring(item_type, id, user_id, connection)?;

    let name = match update.name {
        Some(name) => required_text(&name, "name")?,
        None => current.name,
    };
    let amount = match update.amount {
        Some(amount) => positive_amount(amount, "amount")?,
        None => current.amount,
    };
    let day_of_month = match update.day_of_month {
        Some(day_of_month) => validate_day_of_month(day_of_month)?,
        None => current.day_of_month,
    };
    let start_date = update.start_date.unwrap_or(current.start_date);
    let end_date = nullable::apply(update.end_date, current.end_date);
    validate_date_range(start_date, end_date)?;
    let category_id = nullable::apply(update.category_id, current.category_id);
    validate_item_category(category_id, item_type, user_id, connection)?;

    connection
        .prepare(&format!(
            "UPDATE recurring_item
             SET name = ?1, amount = ?2, day_of_month = ?3, start_date = ?4, end_date = ?5,
                active = ?6, category_id = ?7, updated_at = ?8
             WHERE id = ?9 AND user_id = ?10 AND type = ?11
             RETURNING {RECURRING_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                name,
                amount,
                day_of_month,
                start_date,
                end_date,
                update.active.unwrap_or(current.active),
                category_id,
                OffsetDateTime::now_utc(),
                id,
                user_id.as_i64(),
                item_type,
            ],
            map_recurring_row,
        )
        .map_err(|error| error.into())
}

/// Delete a recurring item. Transactions already created from it are kept.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such item.
pub fn delete_recurring(
    item_type: CategoryType,
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM recurring_item WHERE id = ?1 AND user_id = ?2 AND type = ?3",
        (id, user_id.as_i64(), item_type),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the table holding recurring incomes and expenses.
pub fn create_recurring_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS recurring_item (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
            name TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            day_of_month INTEGER NOT NULL CHECK (day_of_month BETWEEN 1 AND 31),
            start_date TEXT NOT NULL,
            end_date TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            category_id INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_recurring_item_user_type
            ON recurring_item(user_id, type, day_of_month);",
    )?;

    Ok(())
}

fn map_recurring_row(row: &Row) -> Result<RecurringItem, rusqlite::Error> {
    Ok(RecurringItem {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        item_type: row.get(2)?,
        name: row.get(3)?,
        amount: row.get(4)?,
        day_of_month: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        active: row.get(8)?,
        category_id: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}
