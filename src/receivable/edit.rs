//! Receivable update endpoint.

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
    receivable::{Receivable, ReceivableUpdate, update_receivable},
    timezone::local_today,
};

/// The state needed for updating a receivable.
#[derive(Debug, Clone)]
pub struct UpdateReceivableState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for UpdateReceivableState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Apply a partial update to a receivable that has not been received.
pub async fn update_receivable_endpoint(
    State(state): State<UpdateReceivableState>,
    Extension(user_id): Extension<UserID>,
    Path(receivable_id): Path<DatabaseId>,
    JsonBody(update): JsonBody<ReceivableUpdate>,
) -> Result<Json<Receivable>, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    update_receivable(receivable_id, user_id, update, today, &connection).map(Json)
}
