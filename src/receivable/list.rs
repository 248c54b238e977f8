//! Receivable listing endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    receivable::{Receivable, get_receivables},
    timezone::local_today,
};

/// The state needed for listing receivables.
#[derive(Debug, Clone)]
pub struct ListReceivablesState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ListReceivablesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// List the user's receivables, marking any that are past due as overdue first.
pub async fn list_receivables_endpoint(
    State(state): State<ListReceivablesState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Receivable>>, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_receivables(user_id, today, &connection).map(Json)
}
