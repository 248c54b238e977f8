//! Endpoints for piggy bank deposits and withdrawals.

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
    extract::JsonBody,
    piggy_bank::{MovementForm, PiggyBankTransaction, add_transaction, get_piggy_bank_transactions},
};

/// The state needed for piggy bank movements.
#[derive(Debug, Clone)]
pub struct MovementState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for MovementState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List a piggy bank's movements, newest first.
pub async fn list_piggy_bank_transactions_endpoint(
    State(state): State<MovementState>,
    Extension(user_id): Extension<UserID>,
    Path(piggy_bank_id): Path<DatabaseId>,
) -> Result<Json<Vec<PiggyBankTransaction>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_piggy_bank_transactions(piggy_bank_id, user_id, &connection).map(Json)
}

/// Deposit into or withdraw from a piggy bank.
pub async fn add_piggy_bank_transaction_endpoint(
    State(state): State<MovementState>,
    Extension(user_id): Extension<UserID>,
    Path(piggy_bank_id): Path<DatabaseId>,
    JsonBody(form): JsonBody<MovementForm>,
) -> Result<(StatusCode, Json<PiggyBankTransaction>), Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = add_transaction(piggy_bank_id, user_id, form, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[cfg(test)]
mod movement_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{get_test_server, must_log_in_test_user},
    };

    #[tokio::test]
    async fn overdraw_is_rejected() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);
        let piggy_bank = server
            .post(endpoints::PIGGY_BANKS)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({ "name": "Trip", "amountPerPeriod": 10.0, "periodType": "WEEK" }))
            .await
            .json::<Value>();
        let endpoint = format_endpoint(
            endpoints::PIGGY_BANK_TRANSACTIONS,
            piggy_bank["id"].as_i64().unwrap(),
        );

        let deposit = server
            .post(&endpoint)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({ "amount": 20.0, "type": "DEPOSIT", "description": "Allowance" }))
            .await;
        deposit.assert_status(StatusCode::CREATED);
        assert_eq!(deposit.json::<Value>()["type"], "DEPOSIT");

        let withdrawal = server
            .post(&endpoint)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({ "amount": 50.0, "type": "WITHDRAWAL" }))
            .await;
        withdrawal.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            withdrawal.json::<Value>()["error"],
            "insufficient funds: the balance is 20.00"
        );

        let movements = server
            .get(&endpoint)
            .authorization_bearer(&tokens.access_token)
            .await
            .json::<Vec<Value>>();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0]["description"], "Allowance");
    }
}
