//! Debt listing endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    debt::{Debt, get_debts},
    timezone::local_today,
};

/// The state needed for listing debts.
#[derive(Debug, Clone)]
pub struct ListDebtsState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ListDebtsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// List the user's debts, marking any that are past due as overdue first.
pub async fn list_debts_endpoint(
    State(state): State<ListDebtsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Debt>>, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_debts(user_id, today, &connection).map(Json)
}

#[cfg(test)]
mod list_debts_endpoint_tests {
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        test_utils::{get_test_server, must_log_in_test_user},
    };

    #[tokio::test]
    async fn past_due_debt_is_listed_as_overdue() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);
        server
            .post(endpoints::DEBTS)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({
                "creditorName": "Bank",
                "totalAmount": 100.0,
                "startDate": "2020-01-01",
                "dueDate": "2020-02-01",
            }))
            .await;

        let response = server
            .get(endpoints::DEBTS)
            .authorization_bearer(&tokens.access_token)
            .await;

        response.assert_status_ok();
        let debts = response.json::<Vec<Value>>();
        assert_eq!(debts.len(), 1);
        assert_eq!(debts[0]["status"], "OVERDUE");
    }
}
