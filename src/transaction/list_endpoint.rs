//! Transaction listing endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    extract::QueryParams,
    transaction::{Transaction, TransactionFilters, get_transactions},
};

/// The state needed for listing transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the user's transactions, newest first, narrowed by the query string filters.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(filters): QueryParams<TransactionFilters>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_transactions(user_id, &filters, &connection).map(Json)
}
