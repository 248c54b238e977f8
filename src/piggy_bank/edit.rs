//! Piggy bank update endpoint.

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
    piggy_bank::{PiggyBank, PiggyBankUpdate, get_piggy_bank, update_piggy_bank},
    upload::{PhotoForm, UploadPrefix, remove_photo, save_photo},
};

/// The state needed for updating a piggy bank.
#[derive(Debug, Clone)]
pub struct UpdatePiggyBankState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub uploads_dir: PathBuf,
}

impl FromRef<AppState> for UpdatePiggyBankState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            uploads_dir: state.uploads_dir.clone(),
        }
    }
}

/// Apply a partial update to a piggy bank, optionally replacing its photo.
pub async fn update_piggy_bank_endpoint(
    State(state): State<UpdatePiggyBankState>,
    Extension(user_id): Extension<UserID>,
    Path(piggy_bank_id): Path<DatabaseId>,
    form: PhotoForm<PiggyBankUpdate>,
) -> Result<Json<PiggyBank>, Error> {
    let photo = save_photo(form.photo, UploadPrefix::PiggyBank, &state.uploads_dir).await?;

    let result = state
        .db_connection
        .lock()
        .map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
        .and_then(|connection| {
            let previous_photo_url =
                get_piggy_bank(piggy_bank_id, user_id, &connection)?.photo_url;
            let piggy_bank = update_piggy_bank(
                piggy_bank_id,
                user_id,
                form.fields,
                photo.as_ref().map(|photo| photo.url()),
                &connection,
            )?;

            Ok((piggy_bank, previous_photo_url))
        });

    match result {
        Ok((piggy_bank, previous_photo_url)) => {
            if photo.is_some() {
                if let Some(previous_photo_url) = previous_photo_url {
                    remove_photo(&previous_photo_url, &state.uploads_dir).await;
                }
            }
            Ok(Json(piggy_bank))
        }
        Err(error) => {
            if let Some(photo) = photo {
                photo.discard().await;
            }
            Err(error)
        }
    }
}
