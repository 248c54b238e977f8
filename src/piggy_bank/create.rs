//! Piggy bank creation endpoint.

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
    piggy_bank::{NewPiggyBankForm, PiggyBank, create_piggy_bank},
    upload::{PhotoForm, UploadPrefix, save_photo},
};

/// The state needed for creating a piggy bank.
#[derive(Debug, Clone)]
pub struct CreatePiggyBankState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub uploads_dir: PathBuf,
}

impl FromRef<AppState> for CreatePiggyBankState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            uploads_dir: state.uploads_dir.clone(),
        }
    }
}

/// Create a piggy bank from a JSON body or a multipart form with a photo.
///
/// The photo is removed again if the piggy bank cannot be saved.
pub async fn create_piggy_bank_endpoint(
    State(state): State<CreatePiggyBankState>,
    Extension(user_id): Extension<UserID>,
    form: PhotoForm<NewPiggyBankForm>,
) -> Result<(StatusCode, Json<PiggyBank>), Error> {
    let photo = save_photo(form.photo, UploadPrefix::PiggyBank, &state.uploads_dir).await?;

    let result = state
        .db_connection
        .lock()
        .map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
        .and_then(|connection| {
            create_piggy_bank(
                form.fields,
                photo.as_ref().map(|photo| photo.url()),
                user_id,
                &connection,
            )
        });

    match result {
        Ok(piggy_bank) => Ok((StatusCode::CREATED, Json(piggy_bank))),
        Err(error) => {
            if let Some(photo) = photo {
                photo.discard().await;
            }
            Err(error)
        }
    }
}
