//! Category creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    category::{Category, CategoryName, NewCategoryForm, create_category},
    extract::JsonBody,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Create a category owned by the current user.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(form): JsonBody<NewCategoryForm>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let name = CategoryName::new(&form.name)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let category = create_category(&name, form.category_type, user_id, &connection)?;

    Ok((StatusCode::CREATED, Json(category)))
}
