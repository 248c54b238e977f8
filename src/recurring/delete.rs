//! Recurring item deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    database_id::DatabaseId,
    recurring::{RecurringKind, delete_recurring},
};

/// The state needed for deleting a recurring item.
#[derive(Debug, Clone)]
pub struct DeleteRecurringState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteRecurringState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete a recurring income or expense.
pub async fn delete_recurring_endpoint<K: RecurringKind>(
    State(state): State<DeleteRecurringState>,
    Extension(user_id): Extension<UserID>,
    Path(recurring_id): Path<DatabaseId>,
) -> Result<StatusCode, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    delete_recurring(K::TYPE, recurring_id, user_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod delete_recurring_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{get_test_server, must_log_in_test_user},
    };

    #[tokio::test]
    async fn deletes_item() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);
        let item = server
            .post(endpoints::RECURRING_EXPENSES)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({
                "name": "Gym",
                "amount": 80.0,
                "dayOfMonth": 1,
                "startDate": "2025-01-01",
            }))
            .await
            .json::<Value>();

        server
            .delete(&format_endpoint(
                endpoints::RECURRING_EXPENSE,
                item["id"].as_i64().unwrap(),
            ))
            .authorization_bearer(&tokens.access_token)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let remaining = server
            .get(endpoints::RECURRING_EXPENSES)
            .authorization_bearer(&tokens.access_token)
            .await
            .json::<Vec<Value>>();
        assert!(remaining.is_empty());
    }
}
