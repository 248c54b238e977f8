//! Endpoints for marking a receivable as received and reopening it.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    database_id::DatabaseId,
    lifecycle::{reopen, settle},
    receivable::{Receivable, get_receivable},
    timezone::local_today,
};

/// The state needed for receiving and reopening receivables.
#[derive(Debug, Clone)]
pub struct ReceiptState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ReceiptState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Mark a receivable as received and record the payment as an income dated today.
pub async fn mark_receivable_received_endpoint(
    State(state): State<ReceiptState>,
    Extension(user_id): Extension<UserID>,
    Path(receivable_id): Path<DatabaseId>,
) -> Result<Json<Receivable>, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    settle::<Receivable>(receivable_id, user_id, today, &connection)?;

    get_receivable(receivable_id, user_id, &connection).map(Json)
}

/// Reopen a received receivable and delete the income recorded when it was received.
pub async fn unmark_receivable_received_endpoint(
    State(state): State<ReceiptState>,
    Extension(user_id): Extension<UserID>,
    Path(receivable_id): Path<DatabaseId>,
) -> Result<Json<Receivable>, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    reopen::<Receivable>(receivable_id, user_id, today, &connection)?;

    get_receivable(receivable_id, user_id, &connection).map(Json)
}
