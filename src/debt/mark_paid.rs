//! Endpoints for marking a debt as paid and reopening it.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    database_id::DatabaseId,
    debt::{Debt, get_debt},
    lifecycle::{reopen, settle},
    timezone::local_today,
};

/// The state needed for paying and reopening debts.
#[derive(Debug, Clone)]
pub struct DebtPaymentState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for DebtPaymentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Mark a debt as paid and record the payment as an expense dated today.
pub async fn mark_debt_paid_endpoint(
    State(state): State<DebtPaymentState>,
    Extension(user_id): Extension<UserID>,
    Path(debt_id): Path<DatabaseId>,
) -> Result<Json<Debt>, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    settle::<Debt>(debt_id, user_id, today, &connection)?;

    get_debt(debt_id, user_id, &connection).map(Json)
}

/// Reopen a paid debt and delete the expense recorded when it was paid.
pub async fn unmark_debt_paid_endpoint(
    State(state): State<DebtPaymentState>,
    Extension(user_id): Extension<UserID>,
    Path(debt_id): Path<DatabaseId>,
) -> Result<Json<Debt>, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    reopen::<Debt>(debt_id, user_id, today, &connection)?;

    get_debt(debt_id, user_id, &connection).map(Json)
}
