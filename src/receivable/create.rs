//! Receivable creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    extract::JsonBody,
    receivable::{NewReceivableForm, Receivable, create_receivable},
    timezone::local_today,
};

/// The state needed for creating a receivable.
#[derive(Debug, Clone)]
pub struct CreateReceivableState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateReceivableState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Create a receivable for the current user.
pub async fn create_receivable_endpoint(
    State(state): State<CreateReceivableState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(form): JsonBody<NewReceivableForm>,
) -> Result<(StatusCode, Json<Receivable>), Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let receivable = create_receivable(form, user_id, today, &connection)?;

    Ok((StatusCode::CREATED, Json(receivable)))
}
