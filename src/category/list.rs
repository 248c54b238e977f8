//! Lists the categories a user can pick from.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    category::{Category, get_visible_categories},
};

/// The state needed for listing categories.
#[derive(Debug, Clone)]
pub struct ListCategoriesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListCategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Get the default categories followed by the user's own categories.
pub async fn list_categories_endpoint(
    State(state): State<ListCategoriesState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_visible_categories(user_id, &connection).map(Json)
}
