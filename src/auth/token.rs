//! JSON web tokens for authenticating API requests.
//!
//! Access tokens are short lived and sent with every protected request.
//! Refresh tokens are tied to a session row and are exchanged for a new
//! token pair at the refresh endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::UserID, database_id::DatabaseId};

/// How long an access token is valid for.
pub const ACCESS_TOKEN_DURATION: Duration = Duration::minutes(15);

/// The signing keys for access and refresh tokens.
///
/// The two token kinds use different secrets so that a refresh token can
/// never be used in place of an access token and vice versa.
#[derive(Clone)]
pub struct TokenKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl TokenKeys {
    /// Create the keys from the access and refresh token secrets.
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
        }
    }
}

/// The claims of an access token.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AccessClaims {
    /// The user the token was issued to.
    pub sub: UserID,
    /// When the token was issued, as a unix timestamp.
    pub iat: i64,
    /// When the token expires, as a unix timestamp.
    pub exp: i64,
}

/// The claims of a refresh token.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RefreshClaims {
    /// The user the token was issued to.
    pub sub: UserID,
    /// The session the token belongs to.
    pub sid: DatabaseId,
    /// Makes every issued token unique, even within the same second.
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

static TOKEN_COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_token_id(now: OffsetDateTime) -> String {
    let count = TOKEN_COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{}-{count}", now.unix_timestamp_nanos())
}

/// Create an access token for `user_id` that expires after [ACCESS_TOKEN_DURATION].
///
/// # Errors
/// Returns [Error::TokenCreationError] if the token could not be signed.
pub fn encode_access_token(user_id: UserID, keys: &TokenKeys) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = AccessClaims {
        sub: user_id,
        iat: now.unix_timestamp(),
        exp: (now + ACCESS_TOKEN_DURATION).unix_timestamp(),
    };

    encode(&Header::default(), &claims, &keys.access_encoding)
        .map_err(|error| Error::TokenCreationError(error.to_string()))
}

/// Create a refresh token for the session `session_id` that expires at `expires_at`.
///
/// # Errors
/// Returns [Error::TokenCreationError] if the token could not be signed.
pub fn encode_refresh_token(
    user_id: UserID,
    session_id: DatabaseId,
    expires_at: OffsetDateTime,
    keys: &TokenKeys,
) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = RefreshClaims {
        sub: user_id,
        sid: session_id,
        jti: unique_token_id(now),
        iat: now.unix_timestamp(),
        exp: expires_at.unix_timestamp(),
    };

    encode(&Header::default(), &claims, &keys.refresh_encoding)
        .map_err(|error| Error::TokenCreationError(error.to_string()))
}

/// Verify the signature and expiry of an access token.
///
/// # Errors
/// Returns [Error::InvalidToken] if the token is malformed, expired or was
/// not signed with the access token secret.
pub fn decode_access_token(token: &str, keys: &TokenKeys) -> Result<AccessClaims, Error> {
    decode::<AccessClaims>(token, &keys.access_decoding, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|error| {
            tracing::debug!("rejected access token: {error}");
            Error::InvalidToken
        })
}

/// Verify the signature and expiry of a refresh token.
///
/// # Errors
/// Returns [Error::InvalidToken] if the token is malformed, expired or was
/// not signed with the refresh token secret.
pub fn decode_refresh_token(token: &str, keys: &TokenKeys) -> Result<RefreshClaims, Error> {
    decode::<RefreshClaims>(token, &keys.refresh_decoding, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|error| {
            tracing::debug!("rejected refresh token: {error}");
            Error::InvalidToken
        })
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{
            UserID,
            token::{
                TokenKeys, decode_access_token, decode_refresh_token, encode_access_token,
                encode_refresh_token,
            },
        },
    };

    fn get_keys() -> TokenKeys {
        TokenKeys::new("access-secret", "refresh-secret")
    }

    #[test]
    fn decode_access_token_gives_user_id() {
        let keys = get_keys();
        let token = encode_access_token(UserID::new(7), &keys).unwrap();

        let claims = decode_access_token(&token, &keys).unwrap();

        assert_eq!(claims.sub, UserID::new(7));
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let keys = get_keys();
        let expires_at = OffsetDateTime::now_utc() + Duration::days(7);
        let token = encode_refresh_token(UserID::new(1), 3, expires_at, &keys).unwrap();

        assert_eq!(decode_access_token(&token, &keys), Err(Error::InvalidToken));
        assert_eq!(decode_refresh_token(&token, &keys).unwrap().sid, 3);
    }

    #[test]
    fn expired_refresh_token_is_rejected() {
        let keys = get_keys();
        let expires_at = OffsetDateTime::now_utc() - Duration::hours(1);
        let token = encode_refresh_token(UserID::new(1), 3, expires_at, &keys).unwrap();

        assert_eq!(decode_refresh_token(&token, &keys), Err(Error::InvalidToken));
    }

    #[test]
    fn refresh_tokens_are_unique() {
        let keys = get_keys();
        let expires_at = OffsetDateTime::now_utc() + Duration::days(7);

        let first = encode_refresh_token(UserID::new(1), 3, expires_at, &keys).unwrap();
        let second = encode_refresh_token(UserID::new(1), 3, expires_at, &keys).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert_eq!(
            decode_access_token("not.a.token", &get_keys()),
            Err(Error::InvalidToken)
        );
    }
}
