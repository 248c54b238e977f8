//! Transaction update endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    database_id::TransactionId,
    extract::JsonBody,
    transaction::{Transaction, TransactionUpdate, update_transaction},
};

/// The state needed for updating a transaction.
#[derive(Debug, Clone)]
pub struct UpdateTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Apply a partial update to one of the user's transactions.
pub async fn update_transaction_endpoint(
    State(state): State<UpdateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    JsonBody(update): JsonBody<TransactionUpdate>,
) -> Result<Json<Transaction>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    update_transaction(transaction_id, user_id, update, &connection).map(Json)
}

#[cfg(test)]
mod update_transaction_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        category::{CategoryType, find_or_create_unspecified},
        endpoints::{self, format_endpoint},
        test_utils::{get_test_server, must_log_in_test_user},
    };

    #[tokio::test]
    async fn updates_given_fields() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);
        let category =
            find_or_create_unspecified(CategoryType::Expense, &state.db_connection.lock().unwrap())
                .unwrap();
        let created = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({
                "type": "EXPENSE",
                "amount": 10.0,
                "date": "2025-03-01",
                "description": "Coffee",
                "categoryId": category,
            }))
            .await
            .json::<Value>();

        let response = server
            .put(&format_endpoint(
                endpoints::TRANSACTION,
                created["id"].as_i64().unwrap(),
            ))
            .authorization_bearer(&tokens.access_token)
            .json(&json!({ "isImportant": true, "description": null }))
            .await;

        response.assert_status_ok();
        let updated = response.json::<Value>();
        assert_eq!(updated["isImportant"], true);
        assert_eq!(updated["description"], Value::Null);
        assert_eq!(updated["amount"], 10.0);
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);

        server
            .put(&format_endpoint(endpoints::TRANSACTION, 404))
            .authorization_bearer(&tokens.access_token)
            .json(&json!({ "amount": 1.0 }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
