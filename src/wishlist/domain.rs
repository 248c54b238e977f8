//! Core wishlist types.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{UserID, database_id::DatabaseId, nullable, text_enum::text_enum};

text_enum! {
    /// Whether a wishlist item is still wanted.
    pub enum WishlistStatus {
        Planned => "PLANNED",
        Bought => "BOUGHT",
        Dropped => "DROPPED",
    }
}

impl Default for WishlistStatus {
    fn default() -> Self {
        Self::Planned
    }
}

/// Something the user would like to buy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: DatabaseId,
    pub user_id: UserID,
    pub name: String,
    /// How much the user wants the item, from 1 (least) to 5 (most).
    pub priority: u8,
    pub estimated_price: Option<f64>,
    /// Why the item would be useful.
    pub utility_note: Option<String>,
    pub target_date: Option<Date>,
    pub status: WishlistStatus,
    pub photo_url: Option<String>,
    pub purchase_links: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The fields of a request to create a wishlist item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWishlistItemForm {
    pub name: String,
    pub priority: u8,
    pub estimated_price: Option<f64>,
    pub utility_note: Option<String>,
    pub target_date: Option<Date>,
    #[serde(default)]
    pub status: WishlistStatus,
    #[serde(default)]
    pub purchase_links: Vec<String>,
}

/// The fields of a wishlist item to change. Missing fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemUpdate {
    pub name: Option<String>,
    pub priority: Option<u8>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub estimated_price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub utility_note: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub target_date: Option<Option<Date>>,
    pub status: Option<WishlistStatus>,
    pub purchase_links: Option<Vec<String>>,
}
