//! Wishlist item deletion endpoint.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID, database_id::DatabaseId, upload::remove_photo,
    wishlist::delete_wishlist_item,
};

/// The state needed for deleting a wishlist item.
#[derive(Debug, Clone)]
pub struct DeleteWishlistItemState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub uploads_dir: PathBuf,
}

impl FromRef<AppState> for DeleteWishlistItemState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            uploads_dir: state.uploads_dir.clone(),
        }
    }
}

/// Delete a wishlist item along with its photo.
pub async fn delete_wishlist_item_endpoint(
    State(state): State<DeleteWishlistItemState>,
    Extension(user_id): Extension<UserID>,
    Path(item_id): Path<DatabaseId>,
) -> Result<StatusCode, Error> {
    let item = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        delete_wishlist_item(item_id, user_id, &connection)?
    };

    if let Some(photo_url) = item.photo_url {
        remove_photo(&photo_url, &state.uploads_dir).await;
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod delete_wishlist_item_endpoint_tests {
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::Value;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{get_test_server_with_uploads, must_log_in_test_user},
    };

    #[tokio::test]
    async fn removes_photo_file() {
        let uploads_dir = tempfile::tempdir().unwrap();
        let (server, state) = get_test_server_with_uploads(uploads_dir.path());
        let tokens = must_log_in_test_user(&state);
        let form = MultipartForm::new()
            .add_text("name", "Camera")
            .add_text("priority", "3")
            .add_part(
                "photo",
                Part::bytes(b"fake gif".as_slice())
                    .file_name("camera.gif")
                    .mime_type("image/gif"),
            );
        let created = server
            .post(endpoints::WISHLIST)
            .authorization_bearer(&tokens.access_token)
            .multipart(form)
            .await
            .json::<Value>();

        server
            .delete(&format_endpoint(
                endpoints::WISHLIST_ITEM,
                created["id"].as_i64().unwrap(),
            ))
            .authorization_bearer(&tokens.access_token)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        assert_eq!(std::fs::read_dir(uploads_dir.path()).unwrap().count(), 0);
    }
}
