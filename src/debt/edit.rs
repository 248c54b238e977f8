//! Debt update endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    database_id::DatabaseId,
    debt::{Debt, DebtUpdate, update_debt},
    extract::JsonBody,
    timezone::local_today,
};

/// The state needed for updating a debt.
#[derive(Debug, Clone)]
pub struct UpdateDebtState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for UpdateDebtState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Apply a partial update to an unpaid debt.
pub async fn update_debt_endpoint(
    State(state): State<UpdateDebtState>,
    Extension(user_id): Extension<UserID>,
    Path(debt_id): Path<DatabaseId>,
    JsonBody(update): JsonBody<DebtUpdate>,
) -> Result<Json<Debt>, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    update_debt(debt_id, user_id, update, today, &connection).map(Json)
}
