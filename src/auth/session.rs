//! Refresh token sessions.
//!
//! Each log in creates a session row holding the SHA-256 hash of the current
//! refresh token. Refreshing replaces the hash, so a refresh token can only
//! be used once.

use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::{
        UserID,
        token::{TokenKeys, decode_refresh_token, encode_access_token, encode_refresh_token},
    },
    database_id::DatabaseId,
};

/// How long a session lasts when the user did not ask to be remembered.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::days(7);
/// How long a session lasts when the user asked to be remembered.
pub const REMEMBER_ME_SESSION_DURATION: Duration = Duration::days(30);

/// A refresh token session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: DatabaseId,
    pub user_id: UserID,
    pub refresh_token_hash: String,
    pub expires_at: OffsetDateTime,
}

/// An access token and refresh token issued together.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Hash a refresh token for storage, as lowercase hex.
pub fn hash_refresh_token(refresh_token: &str) -> String {
    Sha256::digest(refresh_token.as_bytes())
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Create a new session for `user_id` and issue its first token pair.
///
/// Expired sessions of the same user are removed at the same time.
pub fn start_session(
    user_id: UserID,
    remember_me: bool,
    keys: &TokenKeys,
    connection: &Connection,
) -> Result<TokenPair, Error> {
    let now = OffsetDateTime::now_utc();
    let expires_at = now
        + if remember_me {
            REMEMBER_ME_SESSION_DURATION
        } else {
            DEFAULT_SESSION_DURATION
        };

    let tx = connection.unchecked_transaction()?;

    tx.execute(
        "DELETE FROM session WHERE user_id = ?1 AND expires_at <= ?2",
        (user_id.as_i64(), now),
    )?;

    // The token embeds the session ID, so the row is created before the hash is known.
    let session_id: DatabaseId = tx.query_row(
        "INSERT INTO session (user_id, refresh_token_hash, expires_at, created_at)
         VALUES (?1, '', ?2, ?3)
         RETURNING id",
        (user_id.as_i64(), expires_at, now),
        |row| row.get(0),
    )?;

    let refresh_token = encode_refresh_token(user_id, session_id, expires_at, keys)?;
    tx.execute(
        "UPDATE session SET refresh_token_hash = ?1 WHERE id = ?2",
        (hash_refresh_token(&refresh_token), session_id),
    )?;

    tx.commit()?;

    Ok(TokenPair {
        access_token: encode_access_token(user_id, keys)?,
        refresh_token,
    })
}

/// Exchange a refresh token for a new token pair.
///
/// The stored hash is replaced, so `refresh_token` cannot be used again. The
/// session keeps its original expiry.
///
/// # Errors
/// Returns [Error::InvalidToken] if the token itself is invalid, or
/// [Error::InvalidSession] if the session no longer accepts it.
pub fn rotate_session(
    refresh_token: &str,
    keys: &TokenKeys,
    connection: &Connection,
) -> Result<TokenPair, Error> {
    let claims = decode_refresh_token(refresh_token, keys)?;
    let now = OffsetDateTime::now_utc();

    let session = get_session(claims.sid, connection)?.ok_or(Error::InvalidSession)?;

    if session.user_id != claims.sub
        || session.expires_at <= now
        || session.refresh_token_hash != hash_refresh_token(refresh_token)
    {
        return Err(Error::InvalidSession);
    }

    let new_refresh_token =
        encode_refresh_token(session.user_id, session.id, session.expires_at, keys)?;

    let rows_affected = connection.execute(
        "UPDATE session SET refresh_token_hash = ?1 WHERE id = ?2 AND refresh_token_hash = ?3",
        (
            hash_refresh_token(&new_refresh_token),
            session.id,
            &session.refresh_token_hash,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::InvalidSession);
    }

    Ok(TokenPair {
        access_token: encode_access_token(session.user_id, keys)?,
        refresh_token: new_refresh_token,
    })
}

/// Delete the session of `user_id` that currently holds `refresh_token`.
///
/// Returns whether a session was deleted.
pub fn end_session(
    user_id: UserID,
    refresh_token: &str,
    connection: &Connection,
) -> Result<bool, Error> {
    let rows_affected = connection.execute(
        "DELETE FROM session WHERE user_id = ?1 AND refresh_token_hash = ?2",
        (user_id.as_i64(), hash_refresh_token(refresh_token)),
    )?;

    Ok(rows_affected > 0)
}

/// Delete every session of `user_id`, logging them out on all devices.
pub fn end_all_sessions(user_id: UserID, connection: &Connection) -> Result<usize, Error> {
    connection
        .execute("DELETE FROM session WHERE user_id = ?1", [user_id.as_i64()])
        .map_err(Error::from)
}

fn get_session(session_id: DatabaseId, connection: &Connection) -> Result<Option<Session>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, refresh_token_hash, expires_at FROM session WHERE id = :id",
        )?
        .query_row(&[(":id", &session_id)], map_session_row)
        .optional()
        .map_err(|error| error.into())
}

/// Create the session table.
pub fn create_session_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS session (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            refresh_token_hash TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_session_user ON session(user_id);",
    )?;

    Ok(())
}

fn map_session_row(row: &Row) -> Result<Session, rusqlite::Error> {
    Ok(Session {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        refresh_token_hash: row.get(2)?,
        expires_at: row.get(3)?,
    })
}
