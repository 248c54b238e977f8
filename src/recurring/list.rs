//! Recurring item listing endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    recurring::{RecurringItem, RecurringKind, get_recurring_items},
};

/// The state needed for listing recurring items.
#[derive(Debug, Clone)]
pub struct ListRecurringState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListRecurringState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the user's recurring incomes or expenses ordered by day of the month.
pub async fn list_recurring_endpoint<K: RecurringKind>(
    State(state): State<ListRecurringState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<RecurringItem>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_recurring_items(K::TYPE, user_id, &connection).map(Json)
}

#[cfg(test)]
mod list_recurring_endpoint_tests {
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        test_utils::{get_test_server, must_log_in_test_user},
    };

    #[tokio::test]
    async fn lists_only_requested_kind() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);
        server
            .post(endpoints::RECURRING_INCOMES)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({
                "name": "Salary",
                "amount": 5000.0,
                "dayOfMonth": 5,
                "startDate": "2025-01-01",
            }))
            .await;
        server
            .post(endpoints::RECURRING_EXPENSES)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({
                "name": "Rent",
                "amount": 1500.0,
                "dayOfMonth": 10,
                "startDate": "2025-01-01",
            }))
            .await;

        let incomes = server
            .get(endpoints::RECURRING_INCOMES)
            .authorization_bearer(&tokens.access_token)
            .await
            .json::<Vec<Value>>();
        let expenses = server
            .get(endpoints::RECURRING_EXPENSES)
            .authorization_bearer(&tokens.access_token)
            .await
            .json::<Vec<Value>>();

        assert_eq!(incomes.len(), 1);
        assert_eq!(incomes[0]["name"], "Salary");
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0]["name"], "Rent");
        assert_eq!(expenses[0]["dayOfMonth"], 10);
    }
}
