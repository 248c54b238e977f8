//! The endpoint for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{
        Email, PasswordHash, User, ValidatedPassword, create_user,
        session::{TokenPair, start_session},
        token::TokenKeys,
    },
    extract::JsonBody,
};

/// The state needed for registering a user.
#[derive(Clone)]
pub struct RegistrationState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub token_keys: TokenKeys,
    pub password_hash_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            token_keys: state.token_keys.clone(),
            password_hash_cost: state.password_hash_cost,
        }
    }
}

/// The data for registering a user.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// The user along with the tokens of their new session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Register a new user and log them in.
///
/// # Errors
/// - [Error::EmptyField] if the name is blank,
/// - [Error::InvalidEmail] if the email is malformed,
/// - [Error::TooWeak] if the password is too easy to guess,
/// - [Error::DuplicateEmail] if the email is already registered.
pub async fn register_user(
    State(state): State<RegistrationState>,
    JsonBody(form): JsonBody<RegisterForm>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyField("name"));
    }

    let email = Email::new(&form.email)?;
    let password = ValidatedPassword::new(&form.password, &[name, email.as_ref()])?;
    let password_hash = PasswordHash::new(password, state.password_hash_cost)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = create_user(name, &email, &password_hash, &connection)?;
    let tokens = start_session(user.id, false, &state.token_keys, &connection)?;

    tracing::info!("registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(AuthResponse { user, tokens })))
}
