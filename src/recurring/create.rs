//! Recurring item creation endpoint.

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
    recurring::{NewRecurringForm, RecurringItem, RecurringKind, create_recurring},
};

/// The state needed for creating a recurring item.
#[derive(Debug, Clone)]
pub struct CreateRecurringState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateRecurringState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Create a recurring income or expense.
pub async fn create_recurring_endpoint<K: RecurringKind>(
    State(state): State<CreateRecurringState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(form): JsonBody<NewRecurringForm>,
) -> Result<(StatusCode, Json<RecurringItem>), Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let item = create_recurring(K::TYPE, form, user_id, &connection)?;

    Ok((StatusCode::CREATED, Json(item)))
}
