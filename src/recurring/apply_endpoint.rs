//! Endpoints that create transactions from recurring items.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    database_id::DatabaseId,
    recurring::{AppliedItems, RecurringKind, create_all_transactions, create_transaction_from_item},
    timezone::local_today,
    transaction::Transaction,
};

/// The state needed for creating transactions from recurring items.
#[derive(Debug, Clone)]
pub struct ApplyRecurringState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ApplyRecurringState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Create a transaction dated today for every active recurring income or expense.
pub async fn apply_all_recurring_endpoint<K: RecurringKind>(
    State(state): State<ApplyRecurringState>,
    Extension(user_id): Extension<UserID>,
) -> Result<(StatusCode, Json<AppliedItems>), Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let applied = create_all_transactions(K::TYPE, user_id, today, &connection)?;

    Ok((StatusCode::CREATED, Json(applied)))
}

/// Create a transaction dated today from one recurring income or expense.
pub async fn apply_recurring_endpoint<K: RecurringKind>(
    State(state): State<ApplyRecurringState>,
    Extension(user_id): Extension<UserID>,
    Path(recurring_id): Path<DatabaseId>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction =
        create_transaction_from_item(K::TYPE, recurring_id, user_id, today, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[cfg(test)]
mod apply_recurring_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{get_test_server, must_log_in_test_user},
    };

    #[tokio::test]
    async fn apply_all_creates_expenses() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);
        for (name, amount) in [("Rent", 1500.0), ("Internet", 100.0)] {
            server
                .post(endpoints::RECURRING_EXPENSES)
                .authorization_bearer(&tokens.access_token)
                .json(&json!({
                    "name": name,
                    "amount": amount,
                    "dayOfMonth": 10,
                    "startDate": "2025-01-01",
                }))
                .await;
        }

        let response = server
            .post(endpoints::RECURRING_EXPENSES_APPLY_ALL)
            .authorization_bearer(&tokens.access_token)
            .await;

        response.assert_status(StatusCode::CREATED);
        let applied = response.json::<Value>();
        assert_eq!(applied["count"], 2);
        assert_eq!(applied["transactions"][0]["type"], "EXPENSE");
        assert_eq!(applied["transactions"][0]["category"]["name"], "Unspecified");
    }

    #[tokio::test]
    async fn apply_one_creates_income() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);
        let item = server
            .post(endpoints::RECURRING_INCOMES)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({
                "name": "Salary",
                "amount": 5000.0,
                "dayOfMonth": 5,
                "startDate": "2025-01-01",
            }))
            .await
            .json::<Value>();

        let response = server
            .post(&format_endpoint(
                endpoints::RECURRING_INCOME_APPLY,
                item["id"].as_i64().unwrap(),
            ))
            .authorization_bearer(&tokens.access_token)
            .await;

        response.assert_status(StatusCode::CREATED);
        let transaction = response.json::<Value>();
        assert_eq!(transaction["type"], "INCOME");
        assert_eq!(transaction["amount"], 5000.0);
        assert_eq!(transaction["description"], "Salary");
    }
}
