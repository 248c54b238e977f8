//! Onboarding: recording the balance the user starts tracking from.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{User, UserID, set_initial_balance},
    extract::JsonBody,
    validate::non_negative_amount,
};

/// The state needed for the onboarding endpoint.
#[derive(Debug, Clone)]
pub struct OnboardingState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for OnboardingState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for setting the initial balance.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialBalanceForm {
    /// The balance of the user's accounts when they started using the app.
    pub initial_balance: f64,
}

/// Set the user's initial balance. Setting it again overwrites the old value.
pub async fn set_initial_balance_endpoint(
    State(state): State<OnboardingState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(form): JsonBody<InitialBalanceForm>,
) -> Result<Json<User>, Error> {
    let initial_balance = non_negative_amount(form.initial_balance, "initial balance")?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = set_initial_balance(user_id, initial_balance, &connection)?;
    tracing::info!("user {user_id} set their initial balance");

    Ok(Json(user))
}
