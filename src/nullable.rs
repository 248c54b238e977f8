//! Serde helpers for partial updates.
//!
//! Update requests need to tell apart a field that is missing (keep the
//! current value) from a field that is `null` (clear the current value).
//! Fields typed as `Option<Option<T>>` with
//! `#[serde(default, deserialize_with = "nullable::deserialize")]` decode
//! to `None` when missing, `Some(None)` when null and `Some(Some(value))`
//! otherwise.

use serde::{Deserialize, Deserializer};

/// Deserialize a present field into `Some`, keeping `null` as `Some(None)`.
pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Resolve a partial update against the current value.
pub fn apply<T>(update: Option<Option<T>>, current: Option<T>) -> Option<T> {
    match update {
        Some(value) => value,
        None => current,
    }
}
