#![allow(missing_docs)]

use std::path::Path;

use axum_test::TestServer;
use rusqlite::Connection;

use crate::{
    AppState, TokenSecrets, build_router,
    auth::{
        Email, PasswordHash, User, ValidatedPassword, create_user, get_user_by_email,
        session::{TokenPair, start_session},
    },
    db::initialize,
};

pub(crate) const TEST_EMAIL: &str = "test@example.com";
pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";

/// Open an in-memory database with every table created.
#[track_caller]
pub(crate) fn must_open_test_db() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

/// Create the test user, hashing [TEST_PASSWORD] with a low cost to keep tests fast.
#[track_caller]
pub(crate) fn must_create_test_user(connection: &Connection) -> User {
    must_create_user(TEST_EMAIL, connection)
}

#[track_caller]
pub(crate) fn must_create_user(email: &str, connection: &Connection) -> User {
    let password_hash =
        PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4).unwrap();

    create_user(
        "Test User",
        &Email::new(email).unwrap(),
        &password_hash,
        connection,
    )
    .expect("Could not create test user")
}

#[track_caller]
pub(crate) fn get_test_app_state() -> AppState {
    get_test_app_state_with_uploads(&std::env::temp_dir().join("xfin-test-uploads"))
}

#[track_caller]
pub(crate) fn get_test_app_state_with_uploads(uploads_dir: &Path) -> AppState {
    let mut state = AppState::new(
        Connection::open_in_memory().expect("Could not open in-memory SQLite database"),
        &TokenSecrets {
            access: "test-access-secret".to_owned(),
            refresh: "test-refresh-secret".to_owned(),
        },
        "Etc/UTC",
        uploads_dir,
    )
    .expect("Could not create app state");
    state.password_hash_cost = 4;

    state
}

/// Create a test server for the full router, along with the state it uses.
#[track_caller]
pub(crate) fn get_test_server() -> (TestServer, AppState) {
    server_for(get_test_app_state())
}

/// Create a test server that saves uploads to `uploads_dir`.
#[track_caller]
pub(crate) fn get_test_server_with_uploads(uploads_dir: &Path) -> (TestServer, AppState) {
    server_for(get_test_app_state_with_uploads(uploads_dir))
}

#[track_caller]
fn server_for(state: AppState) -> (TestServer, AppState) {
    let server =
        TestServer::new(build_router(state.clone())).expect("Could not create test server.");

    (server, state)
}

/// Start a session for the test user, creating the user if needed.
#[track_caller]
pub(crate) fn must_log_in_test_user(state: &AppState) -> TokenPair {
    let connection = state.db_connection.lock().unwrap();
    let user = get_user_by_email(&Email::new(TEST_EMAIL).unwrap(), &connection)
        .unwrap()
        .unwrap_or_else(|| must_create_test_user(&connection));

    start_session(user.id, false, &state.token_keys, &connection).unwrap()
}
