//! The endpoint for exchanging a refresh token for a new token pair.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::HeaderMap,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{
        session::{TokenPair, rotate_session},
        token::TokenKeys,
    },
};

/// The state needed for refreshing tokens.
#[derive(Clone)]
pub struct RefreshState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub token_keys: TokenKeys,
}

impl FromRef<AppState> for RefreshState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            token_keys: state.token_keys.clone(),
        }
    }
}

/// Rotate the refresh token sent as the bearer token.
///
/// The old refresh token stops working once this succeeds.
pub async fn refresh_tokens(
    State(state): State<RefreshState>,
    headers: HeaderMap,
) -> Result<Json<TokenPair>, Error> {
    let Authorization(bearer) = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or(Error::InvalidToken)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    rotate_session(bearer.token(), &state.token_keys, &connection).map(Json)
}
