//! xfin is a personal finance tracker.
//!
//! This library provides a JSON REST API for recording transactions,
//! recurring incomes and expenses, debts, receivables, savings goals
//! ("piggy banks") and a wishlist, along with a dashboard that summarises
//! them.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod dashboard;
mod database_id;
mod db;
mod debt;
mod demo;
mod endpoints;
mod extract;
mod lifecycle;
mod logging;
mod nullable;
mod onboarding;
mod piggy_bank;
mod receivable;
mod recurring;
mod routing;
mod text_enum;
mod timezone;
mod transaction;
mod upload;
mod validate;
mod wishlist;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, TokenSecrets};
pub use auth::{
    Email, PasswordHash, User, UserID, ValidatedPassword, get_user_by_email, update_password,
};
pub use db::initialize as initialize_db;
pub use demo::{DEMO_EMAIL, DEMO_PASSWORD, seed_demo_data};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timezone::{get_local_offset, local_today};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The bearer token was missing, malformed or expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The refresh token does not belong to an active session.
    #[error("invalid or expired session")]
    InvalidSession,

    /// Too many failed log-in attempts were made for the same email.
    #[error("too many log in attempts, try again in {0} minutes")]
    TooManyLogInAttempts(i64),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The string is not a valid email address.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The email is already used by another user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A JSON web token could not be created.
    #[error("could not create token: {0}")]
    TokenCreationError(String),

    /// A required text field was empty or only whitespace.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// Money amounts must be strictly positive.
    #[error("{0} must be greater than zero")]
    NonPositiveAmount(&'static str),

    /// An amount that may be zero was negative.
    #[error("{0} cannot be negative")]
    NegativeAmount(&'static str),

    /// The number of installments is outside of the supported range.
    #[error("the number of installments must be between 1 and {max}, got {0}", max = transaction::MAX_INSTALLMENTS)]
    InvalidInstallments(u32),

    /// The day of the month must be between 1 and 31.
    #[error("day of month must be between 1 and 31, got {0}")]
    InvalidDayOfMonth(u8),

    /// Wishlist priorities must be between 1 and 5.
    #[error("priority must be between 1 and 5, got {0}")]
    InvalidPriority(u8),

    /// An end date was set before the start date.
    #[error("the end date must not be before the start date")]
    InvalidDateRange,

    /// A calendar date could not be computed.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// The category does not exist, is not visible to the user or has the
    /// wrong type for the record it was used for.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(i64),

    /// The dashboard needs the initial balance before it can be computed.
    #[error("the initial balance has not been set")]
    InitialBalanceNotSet,

    /// Default categories are shared by every user and cannot be changed.
    #[error("default categories cannot be edited or deleted")]
    DefaultCategoryReadOnly,

    /// The category is still referenced by other records.
    #[error("the category is still in use")]
    CategoryInUse,

    /// The debt or receivable has already been settled.
    #[error("the {0} has already been settled")]
    AlreadySettled(&'static str),

    /// The debt or receivable has not been settled.
    #[error("the {0} has not been settled")]
    NotSettled(&'static str),

    /// A settled debt or receivable must be reopened before editing.
    #[error("the {0} has been settled and must be reopened before it can be edited")]
    SettledReadOnly(&'static str),

    /// A piggy bank withdrawal would make the balance negative.
    #[error("insufficient funds: the balance is {0:.2}")]
    InsufficientFunds(f64),

    /// The uploaded file is not an accepted image.
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    /// The multipart form could not be parsed.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// The request body could not be parsed.
    #[error("invalid request body: {0}")]
    InvalidRequestBody(String),

    /// The requested resource was not found.
    ///
    /// Resources owned by other users are reported as not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Reading or writing an uploaded file failed.
    #[error("file system error: {0}")]
    FileSystemError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::InvalidToken | Error::InvalidSession => {
                StatusCode::UNAUTHORIZED
            }
            Error::TooManyLogInAttempts(_) => StatusCode::TOO_MANY_REQUESTS,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DuplicateEmail
            | Error::CategoryInUse
            | Error::AlreadySettled(_)
            | Error::NotSettled(_) => StatusCode::CONFLICT,
            Error::TooWeak(_)
            | Error::InvalidEmail(_)
            | Error::EmptyField(_)
            | Error::NonPositiveAmount(_)
            | Error::NegativeAmount(_)
            | Error::InvalidInstallments(_)
            | Error::InvalidDayOfMonth(_)
            | Error::InvalidPriority(_)
            | Error::InvalidDateRange
            | Error::InvalidDate(_)
            | Error::InvalidCategory(_)
            | Error::InitialBalanceNotSet
            | Error::DefaultCategoryReadOnly
            | Error::SettledReadOnly(_)
            | Error::InsufficientFunds(_)
            | Error::InvalidUpload(_)
            | Error::MultipartError(_)
            | Error::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Error::HashingError(_)
            | Error::TokenCreationError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::InvalidTimezoneError(_)
            | Error::FileSystemError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "an internal server error occurred, check the server logs for more details".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
