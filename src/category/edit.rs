//! Category update endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    category::{Category, EditCategoryForm, update_category},
    database_id::CategoryId,
    extract::JsonBody,
};

/// The state needed for updating a category.
#[derive(Debug, Clone)]
pub struct UpdateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Rename a category or change its type.
pub async fn update_category_endpoint(
    State(state): State<UpdateCategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
    JsonBody(form): JsonBody<EditCategoryForm>,
) -> Result<Json<Category>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    update_category(category_id, user_id, form, &connection).map(Json)
}

#[cfg(test)]
mod update_category_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{get_test_server, must_log_in_test_user},
    };

    #[tokio::test]
    async fn renames_category() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);
        let created = server
            .post(endpoints::CATEGORIES)
            .authorization_bearer(&tokens.access_token)
            .json(&json!({ "name": "Pets", "type": "EXPENSE" }))
            .await
            .json::<Value>();
        let id = created["id"].as_i64().unwrap();

        let response = server
            .put(&format_endpoint(endpoints::CATEGORY, id))
            .authorization_bearer(&tokens.access_token)
            .json(&json!({ "name": "Pet food" }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["name"], "Pet food");
    }

    #[tokio::test]
    async fn missing_category_is_not_found() {
        let (server, state) = get_test_server();
        let tokens = must_log_in_test_user(&state);

        server
            .put(&format_endpoint(endpoints::CATEGORY, 9999))
            .authorization_bearer(&tokens.access_token)
            .json(&json!({ "name": "Nope" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
