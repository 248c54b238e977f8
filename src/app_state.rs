//! Implements a struct that holds the state of the REST server.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;

use crate::{
    Error,
    auth::{LogInRateLimiter, PasswordHash, TokenKeys},
    db::initialize,
};

/// The secrets used to sign access and refresh tokens.
#[derive(Debug, Clone)]
pub struct TokenSecrets {
    /// The secret for short lived access tokens.
    pub access: String,
    /// The secret for refresh tokens.
    pub refresh: String,
}

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The keys for signing and verifying JSON web tokens.
    pub token_keys: TokenKeys,

    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,

    /// The directory uploaded images are saved to.
    pub uploads_dir: PathBuf,

    /// Failed log in attempts per email.
    pub log_in_limiter: LogInRateLimiter,

    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "America/Sao_Paulo".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        token_secrets: &TokenSecrets,
        local_timezone: &str,
        uploads_dir: impl Into<PathBuf>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            token_keys: TokenKeys::new(&token_secrets.access, &token_secrets.refresh),
            local_timezone: local_timezone.to_owned(),
            uploads_dir: uploads_dir.into(),
            log_in_limiter: LogInRateLimiter::default(),
            password_hash_cost: PasswordHash::DEFAULT_COST,
        })
    }
}
