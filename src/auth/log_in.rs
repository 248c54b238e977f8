//! The endpoint for logging in a registered user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::{
        Email, LogInRateLimiter, get_user_by_email, register::AuthResponse, session::start_session,
        token::TokenKeys,
    },
    extract::JsonBody,
};

/// The state needed for logging in.
#[derive(Clone)]
pub struct LogInState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub token_keys: TokenKeys,
    pub log_in_limiter: LogInRateLimiter,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            token_keys: state.token_keys.clone(),
            log_in_limiter: state.log_in_limiter.clone(),
        }
    }
}

/// The credentials entered during log in.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInForm {
    pub email: String,
    pub password: String,
    /// Keep the session alive for 30 days instead of 7.
    #[serde(default)]
    pub remember_me: bool,
}

/// Verify the user's credentials and start a new session.
///
/// # Errors
/// - [Error::InvalidCredentials] if the email or password is wrong,
/// - [Error::TooManyLogInAttempts] if too many recent attempts failed.
pub async fn log_in(
    State(state): State<LogInState>,
    JsonBody(form): JsonBody<LogInForm>,
) -> Result<Json<AuthResponse>, Error> {
    let email = Email::new(&form.email).map_err(|_| Error::InvalidCredentials)?;
    let now = OffsetDateTime::now_utc();

    state.log_in_limiter.check(&email, now)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = match get_user_by_email(&email, &connection)? {
        Some(user) => user,
        None => {
            state.log_in_limiter.record_failure(&email, now)?;
            return Err(Error::InvalidCredentials);
        }
    };

    let is_password_correct = user.password_hash.verify(&form.password).map_err(|error| {
        tracing::error!("Error verifying password: {error}");
        Error::HashingError(error.to_string())
    })?;

    if !is_password_correct {
        state.log_in_limiter.record_failure(&email, now)?;
        return Err(Error::InvalidCredentials);
    }

    state.log_in_limiter.reset(&email)?;
    let tokens = start_session(user.id, form.remember_me, &state.token_keys, &connection)?;

    Ok(Json(AuthResponse { user, tokens }))
}

#[cfg(test)]
mod log_in_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        auth::rate_limit::MAX_LOG_IN_ATTEMPTS,
        endpoints,
        test_utils::{TEST_EMAIL, TEST_PASSWORD, get_test_server, must_create_test_user},
    };

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let (server, state) = get_test_server();
        must_create_test_user(&state.db_connection.lock().unwrap());

        let response = server
            .post(endpoints::LOG_IN)
            .json(&json!({
                "email": TEST_EMAIL,
                "password": TEST_PASSWORD,
                "rememberMe": true,
            }))
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["user"]["email"], TEST_EMAIL);
        assert!(body["accessToken"].is_string());
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let (server, state) = get_test_server();
        must_create_test_user(&state.db_connection.lock().unwrap());

        server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": TEST_EMAIL, "password": "definitelyNotTheCorrectPassword" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let (server, _) = get_test_server();

        server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn log_in_fails_with_missing_credentials() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::LOG_IN)
            .content_type("application/json")
            .await;

        assert!(response.status_code().is_client_error());
    }

    #[tokio::test]
    async fn log_in_is_rate_limited() {
        let (server, state) = get_test_server();
        must_create_test_user(&state.db_connection.lock().unwrap());

        for _ in 0..MAX_LOG_IN_ATTEMPTS {
            server
                .post(endpoints::LOG_IN)
                .json(&json!({ "email": TEST_EMAIL, "password": "wrong" }))
                .await
                .assert_status(StatusCode::UNAUTHORIZED);
        }

        server
            .post(endpoints::LOG_IN)
            .json(&json!({ "email": TEST_EMAIL, "password": TEST_PASSWORD }))
            .await
            .assert_status(StatusCode::TOO_MANY_REQUESTS);
    }
}
