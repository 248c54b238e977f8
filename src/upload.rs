//! Image uploads for wishlist items and piggy banks.
//!
//! Create and update requests for those resources accept either a JSON body
//! or a multipart form. In a multipart form the image is the `photo` field and
//! every other field carries the same key as in the JSON body.

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Multipart, Request, multipart::Field},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use time::OffsetDateTime;

use crate::Error;

/// The largest image that can be uploaded, 5 MiB.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// The request body limit for routes that accept a photo.
///
/// Leaves room for the other form fields and the multipart framing.
pub const PHOTO_BODY_LIMIT: usize = MAX_PHOTO_BYTES + 1024 * 1024;

/// The URL path uploaded files are served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads/";

const PHOTO_FIELD: &str = "photo";

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

static UPLOAD_COUNTER: AtomicU64 = AtomicU64::new(0);

/// What an uploaded image belongs to, used as the start of its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPrefix {
    Wishlist,
    PiggyBank,
}

impl UploadPrefix {
    fn as_str(self) -> &'static str {
        match self {
            UploadPrefix::Wishlist => "wishlist",
            UploadPrefix::PiggyBank => "piggy-bank",
        }
    }
}

/// `jpg` and `jpeg` name the same format.
fn image_family(name: &str) -> &str {
    if name == "jpg" { "jpeg" } else { name }
}

/// An image received in a request that has not been written to disk yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    extension: String,
    bytes: Bytes,
}

impl ImageUpload {
    /// Check an uploaded file.
    ///
    /// # Errors
    /// Returns [Error::InvalidUpload] if the file is empty, larger than
    /// [MAX_PHOTO_BYTES], does not have an accepted image extension, or its
    /// content type is not an image of the same format.
    pub fn new(file_name: &str, content_type: Option<&str>, bytes: Bytes) -> Result<Self, Error> {
        if bytes.is_empty() {
            return Err(Error::InvalidUpload("the photo is empty".to_owned()));
        }

        if bytes.len() > MAX_PHOTO_BYTES {
            return Err(Error::InvalidUpload(
                "the photo must be 5 MiB or smaller".to_owned(),
            ));
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|extension| ALLOWED_EXTENSIONS.contains(&extension.as_str()))
            .ok_or_else(|| {
                Error::InvalidUpload(
                    "only jpeg, jpg, png, gif and webp images are allowed".to_owned(),
                )
            })?;

        let subtype = content_type
            .and_then(|content_type| content_type.strip_prefix("image/"))
            .map(str::to_ascii_lowercase);

        match subtype {
            Some(subtype) if image_family(&subtype) == image_family(&extension) => {
                Ok(Self { extension, bytes })
            }
            _ => Err(Error::InvalidUpload(format!(
                "the content type {} does not match a .{extension} image",
                content_type.unwrap_or("(missing)")
            ))),
        }
    }

    /// Write the image to `uploads_dir` under a new unique file name.
    ///
    /// # Errors
    /// Returns [Error::FileSystemError] if the directory or file cannot be written.
    pub async fn save(self, prefix: UploadPrefix, uploads_dir: &Path) -> Result<StoredPhoto, Error> {
        tokio::fs::create_dir_all(uploads_dir)
            .await
            .map_err(|error| Error::FileSystemError(error.to_string()))?;

        let file_name = format!(
            "{}-{}-{}.{}",
            prefix.as_str(),
            OffsetDateTime::now_utc().unix_timestamp_nanos(),
            UPLOAD_COUNTER.fetch_add(1, Ordering::Relaxed),
            self.extension
        );
        let path = uploads_dir.join(&file_name);

        tokio::fs::write(&path, &self.bytes)
            .await
            .map_err(|error| Error::FileSystemError(error.to_string()))?;

        tracing::debug!("saved {} byte upload to {}", self.bytes.len(), path.display());

        Ok(StoredPhoto {
            url: format!("{UPLOADS_URL_PREFIX}{file_name}"),
            path,
        })
    }
}

/// An uploaded image that has been written to the uploads directory.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPhoto {
    url: String,
    path: PathBuf,
}

impl StoredPhoto {
    /// The public URL of the image, e.g. `/uploads/wishlist-123.png`.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Delete the file, e.g. because the record it was saved for could not be written.
    pub async fn discard(self) {
        if let Err(error) = tokio::fs::remove_file(&self.path).await {
            tracing::warn!("could not remove upload {}: {error}", self.path.display());
        }
    }
}

/// Save `photo` if there is one.
pub async fn save_photo(
    photo: Option<ImageUpload>,
    prefix: UploadPrefix,
    uploads_dir: &Path,
) -> Result<Option<StoredPhoto>, Error> {
    match photo {
        Some(photo) => photo.save(prefix, uploads_dir).await.map(Some),
        None => Ok(None),
    }
}

/// Delete the file behind a photo URL that was returned by [ImageUpload::save].
///
/// Only the file name of the URL is used, so a URL cannot point outside of
/// `uploads_dir`. Missing files are ignored.
pub async fn remove_photo(photo_url: &str, uploads_dir: &Path) {
    let Some(file_name) = Path::new(photo_url).file_name() else {
        return;
    };
    let path = uploads_dir.join(file_name);

    match tokio::fs::remove_file(&path).await {
        Ok(()) => tracing::debug!("removed upload {}", path.display()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => tracing::warn!("could not remove upload {}: {error}", path.display()),
    }
}

/// A request body that is either JSON or a multipart form with an optional photo.
#[derive(Debug)]
pub struct PhotoForm<T> {
    pub fields: T,
    pub photo: Option<ImageUpload>,
}

impl<S, T> FromRequest<S> for PhotoForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(fields) = Json::<T>::from_request(request, state)
                .await
                .map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))?;

            return Ok(Self {
                fields,
                photo: None,
            });
        }

        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|rejection| Error::MultipartError(rejection.body_text()))?;

        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut photo = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|error| Error::MultipartError(error.body_text()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == PHOTO_FIELD {
                photo = parse_photo_field(field).await?;
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|error| Error::MultipartError(error.body_text()))?;
                push_form_value(&mut pairs, name, text);
            }
        }

        let encoded = serde_urlencoded::to_string(&pairs)
            .map_err(|error| Error::InvalidRequestBody(error.to_string()))?;
        let fields = serde_html_form::from_str(&encoded)
            .map_err(|error| Error::InvalidRequestBody(error.to_string()))?;

        Ok(Self { fields, photo })
    }
}

/// A file input left empty by the browser arrives as a part with no file name and no bytes.
async fn parse_photo_field(field: Field<'_>) -> Result<Option<ImageUpload>, Error> {
    let file_name = field.file_name().unwrap_or_default().to_owned();
    let content_type = field.content_type().map(str::to_owned);
    let bytes = field
        .bytes()
        .await
        .map_err(|error| Error::MultipartError(error.body_text()))?;

    if file_name.is_empty() && bytes.is_empty() {
        return Ok(None);
    }

    tracing::debug!("received photo '{file_name}' that is {} bytes", bytes.len());

    ImageUpload::new(&file_name, content_type.as_deref(), bytes).map(Some)
}

/// Add a multipart text field to the form pairs.
///
/// A value holding a JSON array of strings, e.g. `["a", "b"]`, is expanded
/// into one pair per element so it deserializes into a `Vec`.
fn push_form_value(pairs: &mut Vec<(String, String)>, name: String, value: String) {
    if value.trim_start().starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<String>>(&value) {
            pairs.extend(items.into_iter().map(|item| (name.clone(), item)));
            return;
        }
    }

    pairs.push((name, value));
}
