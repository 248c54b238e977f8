//! Debt deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{AppState, Error, UserID, database_id::DatabaseId, debt::delete_debt};

/// The state needed for deleting a debt.
#[derive(Debug, Clone)]
pub struct DeleteDebtState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteDebtState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete one of the user's debts.
pub async fn delete_debt_endpoint(
    State(state): State<DeleteDebtState>,
    Extension(user_id): Extension<UserID>,
    Path(debt_id): Path<DatabaseId>,
) -> Result<StatusCode, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_debt(debt_id, user_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
