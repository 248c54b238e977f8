//! Database operations for piggy banks.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    database_id::DatabaseId,
    nullable,
    piggy_bank::{
        NewPiggyBankForm, PiggyBank, PiggyBankUpdate, PiggyBankWithTransactions,
        get_recent_transactions,
    },
    validate::{optional_text, positive_amount, required_text},
};

/// The number of movements included with each piggy bank in the list.
pub const RECENT_TRANSACTIONS_LIMIT: usize = 5;

const PIGGY_BANK_COLUMNS: &str = "id, user_id, name, description, photo_url, current_amount, \
    target_amount, amount_per_period, period_type, created_at, updated_at";

fn validate_target(target_amount: Option<f64>) -> Result<Option<f64>, Error> {
    target_amount
        .map(|amount| positive_amount(amount, "target amount"))
        .transpose()
}

/// Create a piggy bank with a zero balance, optionally with the URL of an uploaded photo.
///
/// # Errors
/// - [Error::EmptyField] if the name is empty,
/// - [Error::NonPositiveAmount] if the amount per period or target is not greater than zero.
pub fn create_piggy_bank(
    form: NewPiggyBankForm,
    photo_url: Option<&str>,
    user_id: UserID,
    connection: &Connection,
) -> Result<PiggyBank, Error> {
    let name = required_text(&form.name, "name")?;
    let amount_per_period = positive_amount(form.amount_per_period, "amount per period")?;
    let target_amount = validate_target(form.target_amount)?;

    connection
        .prepare(&format!(
            "INSERT INTO piggy_bank (user_id, name, description, photo_url, current_amount,
                target_amount, amount_per_period, period_type, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?8, ?8)
             RETURNING {PIGGY_BANK_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                user_id.as_i64(),
                name,
                optional_text(form.description),
                photo_url,
                target_amount,
                amount_per_period,
                form.period_type,
                OffsetDateTime::now_utc(),
            ],
            map_piggy_bank_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a piggy bank owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the piggy bank does not exist or belongs to another user.
pub fn get_piggy_bank(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<PiggyBank, Error> {
    connection
        .prepare(&format!(
            "SELECT {PIGGY_BANK_COLUMNS} FROM piggy_bank WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id.as_i64()), map_piggy_bank_row)
        .map_err(|error| error.into())
}

/// Retrieve a piggy bank along with all of its movements, newest first.
pub fn get_piggy_bank_with_transactions(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<PiggyBankWithTransactions, Error> {
    let piggy_bank = get_piggy_bank(id, user_id, connection)?;
    let transactions = get_recent_transactions(piggy_bank.id, None, connection)?;

    Ok(PiggyBankWithTransactions {
        piggy_bank,
        transactions,
    })
}

/// Get the user's piggy banks, newest first, each with its
/// [RECENT_TRANSACTIONS_LIMIT] most recent movements.
pub fn get_piggy_banks(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<PiggyBankWithTransactions>, Error> {
    let piggy_banks = connection
        .prepare(&format!(
            "SELECT {PIGGY_BANK_COLUMNS} FROM piggy_bank WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC"
        ))?
        .query_map([user_id.as_i64()], map_piggy_bank_row)?
        .collect::<Result<Vec<_>, _>>()?;

    piggy_banks
        .into_iter()
        .map(|piggy_bank| {
            let transactions = get_recent_transactions(
                piggy_bank.id,
                Some(RECENT_TRANSACTIONS_LIMIT),
                connection,
            )?;

            Ok(PiggyBankWithTransactions {
                piggy_bank,
                transactions,
            })
        })
        .collect()
}

/// Apply a partial update to a piggy bank.
///
/// `photo_url` replaces the piggy bank's photo when set. The caller is
/// responsible for removing the file of the previous photo.
///
/// # Errors
/// - [Error::NotFound] if the piggy bank does not exist or belongs to another user,
/// - the validation errors of [create_piggy_bank].
pub fn update_piggy_bank(
    id: DatabaseId,
    user_id: UserID,
    update: PiggyBankUpdate,
    photo_url: Option<&str>,
    connection: &Connection,
) -> Result<PiggyBank, Error> {
    let current = get_piggy_bank(id, user_id, connection)?;

    let name = match update.name {
        Some(name) => required_text(&name, "name")?,
        None => current.name,
    };
    let amount_per_period = match update.amount_per_period {
        Some(amount) => positive_amount(amount, "amount per period")?,
        None => current.amount_per_period,
    };
    let target_amount = validate_target(nullable::apply(update.target_amount, current.target_amount))?;
    let photo_url = photo_url.map(str::to_owned).or(current.photo_url);

    connection
        .prepare(&format!(
            "UPDATE piggy_bank
             SET name = ?1, description = ?2, photo_url = ?3, target_amount = ?4,
                amount_per_period = ?5, period_type = ?6, updated_at = ?7
             WHERE id = ?8 AND user_id = ?9
             RETURNING {PIGGY_BANK_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                name,
                optional_text(nullable::apply(update.description, current.description)),
                photo_url,
                target_amount,
                amount_per_period,
                update.period_type.unwrap_or(current.period_type),
                OffsetDateTime::now_utc(),
                id,
                user_id.as_i64(),
            ],
            map_piggy_bank_row,
        )
        .map_err(|error| error.into())
}

/// Delete a piggy bank and its movements, returning it so its photo can be removed.
///
/// # Errors
/// Returns [Error::NotFound] if the piggy bank does not exist or belongs to another user.
pub fn delete_piggy_bank(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<PiggyBank, Error> {
    connection
        .prepare(&format!(
            "DELETE FROM piggy_bank WHERE id = ?1 AND user_id = ?2 RETURNING {PIGGY_BANK_COLUMNS}"
        ))?
        .query_row((id, user_id.as_i64()), map_piggy_bank_row)
        .map_err(|error| error.into())
}

/// Create the piggy bank table.
pub fn create_piggy_bank_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS piggy_bank (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            photo_url TEXT,
            current_amount REAL NOT NULL DEFAULT 0 CHECK (current_amount >= 0),
            target_amount REAL,
            amount_per_period REAL NOT NULL,
            period_type TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_piggy_bank_user ON piggy_bank(user_id);",
    )?;

    Ok(())
}

pub(crate) fn map_piggy_bank_row(row: &Row) -> Result<PiggyBank, rusqlite::Error> {
    Ok(PiggyBank {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        description: row.get(3)?,
        photo_url: row.get(4)?,
        current_amount: row.get(5)?,
        target_amount: row.get(6)?,
        amount_per_period: row.get(7)?,
        period_type: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}
