//! Authentication middleware that validates bearer access tokens.

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{
    AppState, Error,
    auth::token::{TokenKeys, decode_access_token},
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The keys for verifying access tokens.
    pub token_keys: TokenKeys,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_keys: state.token_keys.clone(),
        }
    }
}

/// Middleware function that checks for a valid access token in the
/// `Authorization: Bearer` header.
///
/// The user ID is placed into the request extensions and the request executed
/// normally if the token is valid, otherwise a 401 response is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>()
    else {
        return Error::InvalidToken.into_response();
    };

    let claims = match decode_access_token(bearer.token(), &state.token_keys) {
        Ok(claims) => claims,
        Err(error) => return error.into_response(),
    };

    request.extensions_mut().insert(claims.sub);

    next.run(request).await
}
