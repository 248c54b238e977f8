//! The endpoints for logging out and getting the current user.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::{
        User, UserID, get_user_by_id,
        session::{end_all_sessions, end_session},
    },
};

/// The state needed for the session endpoints.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SessionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body of a log out request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogOutForm {
    /// The refresh token of the session to end. When omitted, every session
    /// of the user is ended.
    pub refresh_token: Option<String>,
}

/// End the session holding the given refresh token.
pub async fn log_out(
    State(state): State<SessionState>,
    Extension(user_id): Extension<UserID>,
    form: Option<Json<LogOutForm>>,
) -> Result<Json<Value>, Error> {
    let Json(form) = form.unwrap_or_default();

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    match form.refresh_token {
        Some(refresh_token) => {
            if !end_session(user_id, &refresh_token, &connection)? {
                tracing::debug!("log out for user {user_id} did not match a session");
            }
        }
        None => {
            end_all_sessions(user_id, &connection)?;
        }
    }

    Ok(Json(json!({ "message": "logged out" })))
}

/// Get the logged in user.
pub async fn get_current_user(
    State(state): State<SessionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<User>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_user_by_id(user_id, &connection).map(Json)
}
