//! Piggy bank deletion endpoint.

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
    AppState, Error, UserID, database_id::DatabaseId, piggy_bank::delete_piggy_bank,
    upload::remove_photo,
};

/// The state needed for deleting a piggy bank.
#[derive(Debug, Clone)]
pub struct DeletePiggyBankState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub uploads_dir: PathBuf,
}

impl FromRef<AppState> for DeletePiggyBankState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            uploads_dir: state.uploads_dir.clone(),
        }
    }
}

/// Delete a piggy bank, its movements and its photo.
pub async fn delete_piggy_bank_endpoint(
    State(state): State<DeletePiggyBankState>,
    Extension(user_id): Extension<UserID>,
    Path(piggy_bank_id): Path<DatabaseId>,
) -> Result<StatusCode, Error> {
    let piggy_bank = {
        let connection = state.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        delete_piggy_bank(piggy_bank_id, user_id, &connection)?
    };

    if let Some(photo_url) = piggy_bank.photo_url {
        remove_photo(&photo_url, &state.uploads_dir).await;
    }

    Ok(StatusCode::NO_CONTENT)
}
