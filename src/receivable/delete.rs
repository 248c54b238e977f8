//! Receivable deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{AppState, Error, UserID, database_id::DatabaseId, receivable::delete_receivable};

/// The state needed for deleting a receivable.
#[derive(Debug, Clone)]
pub struct DeleteReceivableState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteReceivableState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete one of the user's receivables.
pub async fn delete_receivable_endpoint(
    State(state): State<DeleteReceivableState>,
    Extension(user_id): Extension<UserID>,
    Path(receivable_id): Path<DatabaseId>,
) -> Result<StatusCode, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_receivable(receivable_id, user_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
