//! The wishlist: things the user would like to buy, with an optional photo.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod read;

pub use create::create_wishlist_item_endpoint;
pub use db::{
    create_wishlist_item, create_wishlist_table, delete_wishlist_item, get_wishlist,
    get_wishlist_item, update_wishlist_item,
};
pub use delete::delete_wishlist_item_endpoint;
pub use domain::{NewWishlistItemForm, WishlistItem, WishlistItemUpdate, WishlistStatus};
pub use edit::update_wishlist_item_endpoint;
pub use read::{get_wishlist_item_endpoint, list_wishlist_endpoint};
