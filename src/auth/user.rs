//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use email_address::EmailAddress;
use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A normalised (trimmed, lowercase) email address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
pub struct Email(String);

impl Email {
    /// Validate and normalise `raw_email`.
    ///
    /// # Errors
    /// Returns [Error::InvalidEmail] if the string is not a valid email address.
    pub fn new(raw_email: &str) -> Result<Self, Error> {
        let email = raw_email.trim().to_lowercase();

        if EmailAddress::is_valid(&email) {
            Ok(Self(email))
        } else {
            Err(Error::InvalidEmail(raw_email.to_owned()))
        }
    }

    /// Wrap an email loaded from the database.
    pub fn new_unchecked(email: &str) -> Self {
        Self(email.to_owned())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The address the user logs in with.
    pub email: Email,
    /// The user's password hash.
    #[serde(skip)]
    pub password_hash: PasswordHash,
    /// The balance the user started tracking from, set during onboarding.
    pub initial_balance: Option<f64>,
    /// When the initial balance was set.
    #[serde(with = "time::serde::rfc3339::option")]
    pub initial_balance_set_at: Option<OffsetDateTime>,
    /// When the user registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                initial_balance REAL,
                initial_balance_set_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

const USER_COLUMNS: &str =
    "id, name, email, password, initial_balance, initial_balance_set_at, created_at";

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns [Error::DuplicateEmail] if the email is already registered, or an
/// [Error::SqlError] if some other SQL error occurred.
pub fn create_user(
    name: &str,
    email: &Email,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(&format!(
            "INSERT INTO user (name, email, password, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             RETURNING {USER_COLUMNS}"
        ))?
        .query_row(
            (name, email.as_ref(), password_hash.as_ref(), now),
            map_user_row,
        )
        .map_err(Error::from)
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user registered with `email`, if there is one.
pub fn get_user_by_email(email: &Email, connection: &Connection) -> Result<Option<User>, Error> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE email = :email"))?
        .query_row(&[(":email", email.as_ref())], map_user_row)
        .optional()
        .map_err(|error| error.into())
}

/// Replace the password hash of `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the user does not exist.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1, updated_at = ?2 WHERE id = ?3",
        (
            password_hash.as_ref(),
            OffsetDateTime::now_utc(),
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Record the user's starting balance and when it was set.
///
/// # Errors
/// Returns [Error::NotFound] if the user does not exist.
pub fn set_initial_balance(
    user_id: UserID,
    initial_balance: f64,
    connection: &Connection,
) -> Result<User, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(&format!(
            "UPDATE user SET initial_balance = ?1, initial_balance_set_at = ?2, updated_at = ?2
             WHERE id = ?3
             RETURNING {USER_COLUMNS}"
        ))?
        .query_row((initial_balance, now, user_id.as_i64()), map_user_row)
        .map_err(Error::from)
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_email: String = row.get(2)?;
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        name: row.get(1)?,
        email: Email::new_unchecked(&raw_email),
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        initial_balance: row.get(4)?,
        initial_balance_set_at: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod email_tests {
    use crate::{Error, auth::Email};

    #[test]
    fn new_normalises_case_and_whitespace() {
        let email = Email::new("  Foo@Bar.BAZ ").unwrap();

        assert_eq!(email.as_ref(), "foo@bar.baz");
    }

    #[test]
    fn new_fails_on_missing_domain() {
        assert_eq!(
            Email::new("foo@"),
            Err(Error::InvalidEmail("foo@".to_owned()))
        );
    }
}
