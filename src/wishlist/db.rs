//! Database operations for the wishlist.

use rusqlite::{Connection, Row, types::Type};
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    database_id::DatabaseId,
    nullable,
    validate::{non_negative_amount, optional_text, required_text},
    wishlist::{NewWishlistItemForm, WishlistItem, WishlistItemUpdate},
};

const WISHLIST_COLUMNS: &str = "id, user_id, name, priority, estimated_price, utility_note, \
    target_date, status, photo_url, purchase_links, created_at, updated_at";

fn validate_priority(priority: u8) -> Result<u8, Error> {
    if (1..=5).contains(&priority) {
        Ok(priority)
    } else {
        Err(Error::InvalidPriority(priority))
    }
}

fn validate_price(price: Option<f64>) -> Result<Option<f64>, Error> {
    price
        .map(|price| non_negative_amount(price, "estimated price"))
        .transpose()
}

/// Trim the links and drop empty ones.
fn clean_links(links: Vec<String>) -> Vec<String> {
    links
        .into_iter()
        .filter_map(|link| optional_text(Some(link)))
        .collect()
}

fn encode_links(links: &[String]) -> Result<String, Error> {
    serde_json::to_string(links).map_err(|error| Error::InvalidRequestBody(error.to_string()))
}

/// Create a wishlist item, optionally with the URL of an uploaded photo.
///
/// # Errors
/// - [Error::EmptyField] if the name is empty,
/// - [Error::InvalidPriority] if the priority is not between 1 and 5,
/// - [Error::NegativeAmount] if the estimated price is negative.
pub fn create_wishlist_item(
    form: NewWishlistItemForm,
    photo_url: Option<&str>,
    user_id: UserID,
    connection: &Connection,
) -> Result<WishlistItem, Error> {
    let name = required_text(&form.name, "name")?;
    let priority = validate_priority(form.priority)?;
    let estimated_price = validate_price(form.estimated_price)?;
    let purchase_links = encode_links(&clean_links(form.purchase_links))?;

    connection
        .prepare(&format!(
            "INSERT INTO wishlist_item (user_id, name, priority, estimated_price, utility_note,
                target_date, status, photo_url, purchase_links, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
             RETURNING {WISHLIST_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                user_id.as_i64(),
                name,
                priority,
                estimated_price,
                optional_text(form.utility_note),
                form.target_date,
                form.status,
                photo_url,
                purchase_links,
                OffsetDateTime::now_utc(),
            ],
            map_wishlist_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a wishlist item owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the item does not exist or belongs to another user.
pub fn get_wishlist_item(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<WishlistItem, Error> {
    connection
        .prepare(&format!(
            "SELECT {WISHLIST_COLUMNS} FROM wishlist_item WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id.as_i64()), map_wishlist_row)
        .map_err(|error| error.into())
}

/// Get the user's wishlist, most wanted first and then cheapest first.
///
/// Items without a price come after priced items of the same priority.
pub fn get_wishlist(user_id: UserID, connection: &Connection) -> Result<Vec<WishlistItem>, Error> {
    connection
        .prepare(&format!(
            "SELECT {WISHLIST_COLUMNS} FROM wishlist_item WHERE user_id = ?1
             ORDER BY priority DESC, estimated_price IS NULL, estimated_price ASC, id ASC"
        ))?
        .query_map([user_id.as_i64()], map_wishlist_row)?
        .map(|maybe_item| maybe_item.map_err(Error::from))
        .collect()
}

/// Apply a partial update to a wishlist item.
///
/// `photo_url` replaces the item's photo when set. The caller is responsible
/// for removing the file of the previous photo.
///
/// # Errors
/// - [Error::NotFound] if the item does not exist or belongs to another user,
/// - the validation errors of [create_wishlist_item].
pub fn update_wishlist_item(
    id: DatabaseId,
    user_id: UserID,
    update: WishlistItemUpdate,
    photo_url: Option<&str>,
    connection: &Connection,
) -> Result<WishlistItem, Error> {
    let current = get_wishlist_item(id, user_id, connection)?;

    let name = match update.name {
        Some(name) => required_text(&name, "name")?,
        None => current.name,
    };
    let priority = match update.priority {
        Some(priority) => validate_priority(priority)?,
        None => current.priority,
    };
    let estimated_price =
        validate_price(nullable::apply(update.estimated_price, current.estimated_price))?;
    let purchase_links = match update.purchase_links {
        Some(links) => clean_links(links),
        None => current.purchase_links,
    };
    let photo_url = photo_url.map(str::to_owned).or(current.photo_url);

    connection
        .prepare(&format!(
            "UPDATE wishlist_item
             SET name = ?1, priority = ?2, estimated_price = ?3, utility_note = ?4,
                target_date = ?5, status = ?6, photo_url = ?7, purchase_links = ?8,
                updated_at = ?9
             WHERE id = ?10 AND user_id = ?11
             RETURNING {WISHLIST_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                name,
                priority,
                estimated_price,
                optional_text(nullable::apply(update.utility_note, current.utility_note)),
                nullable::apply(update.target_date, current.target_date),
                update.status.unwrap_or(current.status),
                photo_url,
                encode_links(&purchase_links)?,
                OffsetDateTime::now_utc(),
                id,
                user_id.as_i64(),
            ],
            map_wishlist_row,
        )
        .map_err(|error| error.into())
}

/// Delete a wishlist item and return it so its photo can be removed.
///
/// # Errors
/// Returns [Error::NotFound] if the item does not exist or belongs to another user.
pub fn delete_wishlist_item(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<WishlistItem, Error> {
    connection
        .prepare(&format!(
            "DELETE FROM wishlist_item WHERE id = ?1 AND user_id = ?2 RETURNING {WISHLIST_COLUMNS}"
        ))?
        .query_row((id, user_id.as_i64()), map_wishlist_row)
        .map_err(|error| error.into())
}

/// Create the wishlist table.
pub fn create_wishlist_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS wishlist_item (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            priority INTEGER NOT NULL CHECK (priority BETWEEN 1 AND 5),
            estimated_price REAL,
            utility_note TEXT,
            target_date TEXT,
            status TEXT NOT NULL DEFAULT 'PLANNED',
            photo_url TEXT,
            purchase_links TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_wishlist_item_user ON wishlist_item(user_id);",
    )?;

    Ok(())
}

fn map_wishlist_row(row: &Row) -> Result<WishlistItem, rusqlite::Error> {
    let purchase_links: String = row.get(9)?;
    let purchase_links = serde_json::from_str(&purchase_links).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(error))
    })?;

    Ok(WishlistItem {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        priority: row.get(3)?,
        estimated_price: row.get(4)?,
        utility_note: row.get(5)?,
        target_date: row.get(6)?,
        status: row.get(7)?,
        photo_url: row.get(8)?,
        purchase_links,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}
