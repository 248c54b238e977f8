//! Recurring item update endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    database_id::DatabaseId,
    extract::JsonBody,
    recurring::{RecurringItem, RecurringKind, RecurringUpdate, update_recurring},
};

/// The state needed for updating a recurring item.
#[derive(Debug, Clone)]
pub struct UpdateRecurringState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateRecurringState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Apply a partial update to a recurring income or expense.
pub async fn update_recurring_endpoint<K: RecurringKind>(
    State(state): State<UpdateRecurringState>,
    Extension(user_id): Extension<UserID>,
    Path(recurring_id): Path<DatabaseId>,
    JsonBody(update): JsonBody<RecurringUpdate>,
) -> Result<Json<RecurringItem>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    update_recurring(K::TYPE, recurring_id, user_id, update, &connection).map(Json)
}
