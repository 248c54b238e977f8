//! Wishlist listing and lookup endpoints.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    database_id::DatabaseId,
    wishlist::{WishlistItem, get_wishlist, get_wishlist_item},
};

/// The state needed for reading the wishlist.
#[derive(Debug, Clone)]
pub struct WishlistState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for WishlistState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the user's wishlist, most wanted first.
pub async fn list_wishlist_endpoint(
    State(state): State<WishlistState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<WishlistItem>>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_wishlist(user_id, &connection).map(Json)
}

/// Get one of the user's wishlist items.
pub async fn get_wishlist_item_endpoint(
    State(state): State<WishlistState>,
    Extension(user_id): Extension<UserID>,
    Path(item_id): Path<DatabaseId>,
) -> Result<Json<WishlistItem>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_wishlist_item(item_id, user_id, &connection).map(Json)
}

#[cfg(test)]
mod read_wishlist_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{get_test_server, must_log_in_test_user},
    };

    #[tokio::test]
    async fn lists_and_gets_items() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);
        let created = server
            .post(endpoints::WISHLIST)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({ "name": "Headphones", "priority": 2, "estimatedPrice": 300.0 }))
            .await
            .json::<Value>();

        let items = server
            .get(endpoints::WISHLIST)
            .authorization_bearer(&tokens.access_token)
            .await
            .json::<Vec<Value>>();
        let item = server
            .get(&format_endpoint(
                endpoints::WISHLIST_ITEM,
                created["id"].as_i64().unwrap(),
            ))
            .authorization_bearer(&tokens.access_token)
            .await
            .json::<Value>();

        assert_eq!(items, vec![created.clone()]);
        assert_eq!(item, created);
    }

    #[tokio::test]
    async fn missing_item_is_not_found() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);

        server
            .get(&format_endpoint(endpoints::WISHLIST_ITEM, 99))
            .authorization_bearer(&tokens.access_token)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
