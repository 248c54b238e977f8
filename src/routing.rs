//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post, put},
};
use serde_json::{Value, json};
use tower_http::services::ServeDir;

use crate::{
    AppState, Error,
    auth::{auth_guard, get_current_user, log_in, log_out, refresh_tokens, register_user},
    category::{
        create_category_endpoint, delete_category_endpoint, list_categories_endpoint,
        update_category_endpoint,
    },
    dashboard::get_dashboard_summary_endpoint,
    debt::{
        create_debt_endpoint, delete_debt_endpoint, list_debts_endpoint, mark_debt_paid_endpoint,
        unmark_debt_paid_endpoint, update_debt_endpoint,
    },
    endpoints,
    onboarding::set_initial_balance_endpoint,
    piggy_bank::{
        add_piggy_bank_transaction_endpoint, create_piggy_bank_endpoint,
        delete_piggy_bank_endpoint, get_piggy_bank_endpoint, list_piggy_bank_transactions_endpoint,
        list_piggy_banks_endpoint, update_piggy_bank_endpoint,
    },
    receivable::{
        create_receivable_endpoint, delete_receivable_endpoint, list_receivables_endpoint,
        mark_receivable_received_endpoint, unmark_receivable_received_endpoint,
        update_receivable_endpoint,
    },
    recurring::{
        Expenses, Incomes, RecurringKind, apply_all_recurring_endpoint, apply_recurring_endpoint,
        create_recurring_endpoint, delete_recurring_endpoint, list_recurring_endpoint,
        update_recurring_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, list_transactions_endpoint,
        update_transaction_endpoint,
    },
    upload::PHOTO_BODY_LIMIT,
    wishlist::{
        create_wishlist_item_endpoint, delete_wishlist_item_endpoint, get_wishlist_item_endpoint,
        list_wishlist_endpoint, update_wishlist_item_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(log_in))
        .route(endpoints::REFRESH, post(refresh_tokens));

    let protected_routes = Router::new()
        .route(endpoints::LOG_OUT, post(log_out))
        .route(endpoints::ME, get(get_current_user))
        .route(
            endpoints::ONBOARDING_INITIAL_BALANCE,
            post(set_initial_balance_endpoint),
        )
        .route(
            endpoints::DASHBOARD_SUMMARY,
            get(get_dashboard_summary_endpoint),
        )
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            put(update_category_endpoint).delete(delete_category_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            put(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .merge(recurring_routes::<Incomes>(
            endpoints::RECURRING_INCOMES,
            endpoints::RECURRING_INCOME,
            endpoints::RECURRING_INCOMES_APPLY_ALL,
            endpoints::RECURRING_INCOME_APPLY,
        ))
        .merge(recurring_routes::<Expenses>(
            endpoints::RECURRING_EXPENSES,
            endpoints::RECURRING_EXPENSE,
            endpoints::RECURRING_EXPENSES_APPLY_ALL,
            endpoints::RECURRING_EXPENSE_APPLY,
        ))
        .route(
            endpoints::DEBTS,
            get(list_debts_endpoint).post(create_debt_endpoint),
        )
        .route(
            endpoints::DEBT,
            put(update_debt_endpoint).delete(delete_debt_endpoint),
        )
        .route(endpoints::DEBT_MARK_PAID, patch(mark_debt_paid_endpoint))
        .route(endpoints::DEBT_UNMARK_PAID, patch(unmark_debt_paid_endpoint))
        .route(
            endpoints::RECEIVABLES,
            get(list_receivables_endpoint).post(create_receivable_endpoint),
        )
        .route(
            endpoints::RECEIVABLE,
            put(update_receivable_endpoint).delete(delete_receivable_endpoint),
        )
        .route(
            endpoints::RECEIVABLE_MARK_RECEIVED,
            patch(mark_receivable_received_endpoint),
        )
        .route(
            endpoints::RECEIVABLE_UNMARK_RECEIVED,
            patch(unmark_receivable_received_endpoint),
        )
        .route(
            endpoints::PIGGY_BANK_TRANSACTIONS,
            get(list_piggy_bank_transactions_endpoint).post(add_piggy_bank_transaction_endpoint),
        )
        .merge(photo_routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let uploads = ServeDir::new(&state.uploads_dir);

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::UPLOADS, uploads)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The five routes of a recurring income or expense resource.
fn recurring_routes<K: RecurringKind>(
    collection: &'static str,
    item: &'static str,
    apply_all: &'static str,
    apply_one: &'static str,
) -> Router<AppState> {
    Router::new()
        .route(
            collection,
            get(list_recurring_endpoint::<K>).post(create_recurring_endpoint::<K>),
        )
        .route(
            item,
            put(update_recurring_endpoint::<K>).delete(delete_recurring_endpoint::<K>),
        )
        .route(apply_all, post(apply_all_recurring_endpoint::<K>))
        .route(apply_one, post(apply_recurring_endpoint::<K>))
}

/// Routes that accept a photo upload and therefore need a larger body limit.
fn photo_routes() -> Router<AppState> {
    Router::new()
        .route(
            endpoints::WISHLIST,
            get(list_wishlist_endpoint).post(create_wishlist_item_endpoint),
        )
        .route(
            endpoints::WISHLIST_ITEM,
            get(get_wishlist_item_endpoint)
                .put(update_wishlist_item_endpoint)
                .delete(delete_wishlist_item_endpoint),
        )
        .route(
            endpoints::PIGGY_BANKS,
            get(list_piggy_banks_endpoint).post(create_piggy_bank_endpoint),
        )
        .route(
            endpoints::PIGGY_BANK,
            get(get_piggy_bank_endpoint)
                .put(update_piggy_bank_endpoint)
                .delete(delete_piggy_bank_endpoint),
        )
        .layer(DefaultBodyLimit::max(PHOTO_BODY_LIMIT))
}

/// The liveness check.
async fn get_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints,
        test_utils::{get_test_server, get_test_server_with_uploads, must_log_in_test_user},
    };

    #[tokio::test]
    async fn health_check_is_public() {
        let (server, _) = get_test_server();

        let response = server.get(endpoints::HEALTH).await;

        response.assert_status_ok();
        response.assert_json(&json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn unknown_route_returns_json_not_found() {
        let (server, _) = get_test_server();

        let response = server.get("/api/v1/nothing-here").await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn api_routes_require_token() {
        let (server, _) = get_test_server();

        for endpoint in [
            endpoints::ME,
            endpoints::DASHBOARD_SUMMARY,
            endpoints::CATEGORIES,
            endpoints::TRANSACTIONS,
            endpoints::RECURRING_INCOMES,
            endpoints::RECURRING_EXPENSES,
            endpoints::DEBTS,
            endpoints::RECEIVABLES,
            endpoints::WISHLIST,
            endpoints::PIGGY_BANKS,
        ] {
            server
                .get(endpoint)
                .await
                .assert_status(StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn recurring_routes_are_kept_apart() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);
        server
            .post(endpoints::RECURRING_INCOMES)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({
                "name": "Salary",
                "amount": 3000.0,
                "dayOfMonth": 5,
                "startDate": "2025-01-01",
            }))
            .await
            .assert_status(StatusCode::CREATED);

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
        assert!(expenses.is_empty());
    }

    #[tokio::test]
    async fn serves_uploaded_files() {
        let uploads_dir = tempfile::tempdir().unwrap();
        std::fs::write(uploads_dir.path().join("wishlist-1-0.png"), b"png bytes").unwrap();
        let (server, _) = get_test_server_with_uploads(uploads_dir.path());

        let response = server.get("/uploads/wishlist-1-0.png").await;

        response.assert_status_ok();
        assert_eq!(response.as_bytes().as_ref(), b"png bytes");
    }
}
