//! Wishlist item creation endpoint.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    upload::{PhotoForm, UploadPrefix, save_photo},
    wishlist::{NewWishlistItemForm, WishlistItem, create_wishlist_item},
};

/// The state needed for creating a wishlist item.
#[derive(Debug, Clone)]
pub struct CreateWishlistItemState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub uploads_dir: PathBuf,
}

impl FromRef<AppState> for CreateWishlistItemState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            uploads_dir: state.uploads_dir.clone(),
        }
    }
}

/// Create a wishlist item from a JSON body or a multipart form with a photo.
///
/// The photo is removed again if the item cannot be saved.
pub async fn create_wishlist_item_endpoint(
    State(state): State<CreateWishlistItemState>,
    Extension(user_id): Extension<UserID>,
    form: PhotoForm<NewWishlistItemForm>,
) -> Result<(StatusCode, Json<WishlistItem>), Error> {
    let photo = save_photo(form.photo, UploadPrefix::Wishlist, &state.uploads_dir).await?;

    let result = state
        .db_connection
        .lock()
        .map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
        .and_then(|connection| {
            create_wishlist_item(
                form.fields,
                photo.as_ref().map(|photo| photo.url()),
                user_id,
                &connection,
            )
        });

    match result {
        Ok(item) => Ok((StatusCode::CREATED, Json(item))),
        Err(error) => {
            if let Some(photo) = photo {
                photo.discard().await;
            }
            Err(error)
        }
    }
}
