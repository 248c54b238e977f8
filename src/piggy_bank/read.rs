//! Piggy bank listing and lookup endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    database_id::DatabaseId,
    piggy_bank::{PiggyBankWithTransactions, get_piggy_bank_with_transactions, get_piggy_banks},
};

/// The state needed for reading piggy banks.
#[derive(Debug, Clone)]
pub struct PiggyBankState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PiggyBankState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the user's piggy banks, newest first, with their most recent movements.
pub async fn list_piggy_banks_endpoint(
    State(state): State<PiggyBankState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<PiggyBankWithTransactions>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_piggy_banks(user_id, &connection).map(Json)
}

/// Get a piggy bank with all of its movements.
pub async fn get_piggy_bank_endpoint(
    State(state): State<PiggyBankState>,
    Extension(user_id): Extension<UserID>,
    Path(piggy_bank_id): Path<DatabaseId>,
) -> Result<Json<PiggyBankWithTransactions>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_piggy_bank_with_transactions(piggy_bank_id, user_id, &connection).map(Json)
}
