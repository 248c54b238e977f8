//! Transaction creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error, UserID,
    category::CategoryType,
    database_id::CategoryId,
    extract::JsonBody,
    transaction::{PaymentMethod, Transaction, create_installments, create_transaction},
};

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body of a request to create a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransactionForm {
    #[serde(rename = "type")]
    pub transaction_type: CategoryType,
    /// The total amount. Split evenly when `is_installment` is set.
    pub amount: f64,
    pub date: Date,
    pub description: Option<String>,
    pub category_id: CategoryId,
    #[serde(default)]
    pub is_important: bool,
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub is_installment: bool,
    pub installments_total: Option<u32>,
}

/// Create a transaction, or a series of monthly installments.
///
/// Responds with the created transaction, or the first installment of a series.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(form): JsonBody<NewTransactionForm>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let builder = Transaction::build(
        form.transaction_type,
        form.amount,
        form.date,
        form.category_id,
    )
    .description(form.description)
    .is_important(form.is_important)
    .payment_method(form.payment_method);

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = if form.is_installment {
        let installments_total = form.installments_total.unwrap_or(0);
        create_installments(builder, installments_total, user_id, &connection)?
            .into_iter()
            .next()
            .ok_or(Error::InvalidInstallments(installments_total))?
    } else {
        create_transaction(builder, user_id, &connection)?
    };

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[cfg(test)]
mod create_transaction_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        category::{CategoryType, find_or_create_unspecified},
        endpoints,
        test_utils::{get_test_server, must_log_in_test_user},
    };

    #[tokio::test]
    async fn creates_single_transaction() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);
        let category =
            find_or_create_unspecified(CategoryType::Expense, &state.db_connection.lock().unwrap())
                .unwrap();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({
                "type": "EXPENSE",
                "amount": 42.5,
                "date": "2025-03-14",
                "description": "Groceries",
                "categoryId": category,
                "paymentMethod": "CARD",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["amount"], 42.5);
        assert_eq!(body["date"], "2025-03-14");
        assert_eq!(body["category"]["name"], "Unspecified");
        assert_eq!(body["isInstallment"], false);
    }

    #[tokio::test]
    async fn creates_installment_series() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);
        let category =
            find_or_create_unspecified(CategoryType::Expense, &state.db_connection.lock().unwrap())
                .unwrap();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({
                "type": "EXPENSE",
                "amount": 100.0,
                "date": "2025-01-31",
                "categoryId": category,
                "isInstallment": true,
                "installmentsTotal": 3,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let head = response.json::<Value>();
        assert_eq!(head["installmentIndex"], 1);
        assert_eq!(head["amount"], 33.33);

        let all = server
            .get(endpoints::TRANSACTIONS)
            .authorization_bearer(&tokens.access_token)
            .await
            .json::<Vec<Value>>();
        assert_eq!(all.len(), 3);
        let total_cents: i64 = all
            .iter()
            .map(|t| (t["amount"].as_f64().unwrap() * 100.0).round() as i64)
            .sum();
        assert_eq!(total_cents, 10000);
    }

    #[tokio::test]
    async fn installments_without_count_are_rejected() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);
        let category =
            find_or_create_unspecified(CategoryType::Expense, &state.db_connection.lock().unwrap())
                .unwrap();

        server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({
                "type": "EXPENSE",
                "amount": 100.0,
                "date": "2025-01-31",
                "categoryId": category,
                "isInstallment": true,
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn negative_amount_is_rejected() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);
        let category =
            find_or_create_unspecified(CategoryType::Income, &state.db_connection.lock().unwrap())
                .unwrap();

        server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({
                "type": "INCOME",
                "amount": -5.0,
                "date": "2025-01-31",
                "categoryId": category,
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
