//! The dashboard summary endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    dashboard::{DashboardSummary, get_dashboard_summary},
    timezone::local_today,
};

/// The state needed for the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Get the dashboard summary, using the configured timezone to decide the current month.
pub async fn get_dashboard_summary_endpoint(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<DashboardSummary>, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_dashboard_summary(user_id, today, &connection).map(Json)
}
