//! Transaction deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID, database_id::TransactionId, transaction::delete_transaction,
};

/// The state needed for deleting a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete a transaction. Deleting the first installment removes the whole series.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let deleted = delete_transaction(transaction_id, user_id, &connection)?;
    tracing::debug!("deleted {deleted} transactions starting from {transaction_id}");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod delete_transaction_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        category::{CategoryType, find_or_create_unspecified},
        endpoints::{self, format_endpoint},
        test_utils::{get_test_server, must_log_in_test_user},
    };

    #[tokio::test]
    async fn deleting_head_removes_series() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);
        let category =
            find_or_create_unspecified(CategoryType::Expense, &state.db_connection.lock().unwrap())
                .unwrap();
        let head = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({
                "type": "EXPENSE",
                "amount": 60.0,
                "date": "2025-03-01",
                "categoryId": category,
                "isInstallment": true,
                "installmentsTotal": 6,
            }))
            .await
            .json::<Value>();

        server
            .delete(&format_endpoint(
                endpoints::TRANSACTION,
                head["id"].as_i64().unwrap(),
            ))
            .authorization_bearer(&tokens.access_token)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let remaining = server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(&tokens.access_token)
            .await
            .json::<Vec<Value>>();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);

        server
            .delete(&format_endpoint(endpoints::TRANSACTION, 404))
            .authorization_bearer(&tokens.access_token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
