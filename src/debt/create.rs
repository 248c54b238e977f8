//! Debt creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    debt::{Debt, NewDebtForm, create_debt},
    extract::JsonBody,
    timezone::local_today,
};

/// The state needed for creating a debt.
#[derive(Debug, Clone)]
pub struct CreateDebtState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateDebtState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Create a debt for the current user.
pub async fn create_debt_endpoint(
    State(state): State<CreateDebtState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(form): JsonBody<NewDebtForm>,
) -> Result<(StatusCode, Json<Debt>), Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let debt = create_debt(form, user_id, today, &connection)?;

    Ok((StatusCode::CREATED, Json(debt)))
}
