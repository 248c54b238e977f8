//! Wishlist item update endpoint.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    database_id::DatabaseId,
    upload::{PhotoForm, UploadPrefix, remove_photo, save_photo},
    wishlist::{WishlistItem, WishlistItemUpdate, get_wishlist_item, update_wishlist_item},
};

/// The state needed for updating a wishlist item.
#[derive(Debug, Clone)]
pub struct UpdateWishlistItemState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub uploads_dir: PathBuf,
}

impl FromRef<AppState> for UpdateWishlistItemState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            uploads_dir: state.uploads_dir.clone(),
        }
    }
}

/// Apply a partial update to a wishlist item, optionally replacing its photo.
///
/// A replaced photo's file is removed. A new photo is removed again if the
/// update fails.
pub async fn update_wishlist_item_endpoint(
    State(state): State<UpdateWishlistItemState>,
    Extension(user_id): Extension<UserID>,
    Path(item_id): Path<DatabaseId>,
    form: PhotoForm<WishlistItemUpdate>,
) -> Result<Json<WishlistItem>, Error> {
    let photo = save_photo(form.photo, UploadPrefix::Wishlist, &state.uploads_dir).await?;

    let result = state
        .db_connection
        .lock()
        .map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
        .and_then(|connection| {
            let previous_photo_url = get_wishlist_item(item_id, user_id, &connection)?.photo_url;
            let item = update_wishlist_item(
                item_id,
                user_id,
                form.fields,
                photo.as_ref().map(|photo| photo.url()),
                &connection,
            )?;

            Ok((item, previous_photo_url))
        });

    match result {
        Ok((item, previous_photo_url)) => {
            if photo.is_some() {
                if let Some(previous_photo_url) = previous_photo_url {
                    remove_photo(&previous_photo_url, &state.uploads_dir).await;
                }
            }
            Ok(Json(item))
        }
        Err(error) => {
            if let Some(photo) = photo {
                photo.discard().await;
            }
            Err(error)
        }
    }
}
