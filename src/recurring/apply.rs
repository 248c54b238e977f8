//! Turning recurring items into ledger transactions on demand.

use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{
    Error, UserID,
    category::{CategoryType, resolve_category},
    database_id::DatabaseId,
    recurring::{RecurringItem, get_active_recurring_items, get_recurring},
    transaction::{Transaction, create_transaction},
};

/// The transactions created by applying every active recurring item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedItems {
    pub count: usize,
    pub transactions: Vec<Transaction>,
}

fn create_transaction_for_item(
    item: &RecurringItem,
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let category_id = resolve_category(item.category_id, item.item_type, user_id, connection)?;

    create_transaction(
        Transaction::build(item.item_type, item.amount, today, category_id)
            .description(Some(item.name.clone())),
        user_id,
        connection,
    )
}

/// Create a transaction dated `today` for every active recurring item of
/// `item_type`, in one SQL transaction.
///
/// Each transaction uses the item's amount, its name as the description and
/// its category, falling back to "Unspecified" when the item has none.
pub fn create_all_transactions(
    item_type: CategoryType,
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<AppliedItems, Error> {
    let tx = connection.unchecked_transaction()?;

    let transactions = get_active_recurring_items(item_type, user_id, &tx)?
        .iter()
        .map(|item| create_transaction_for_item(item, user_id, today, &tx))
        .collect::<Result<Vec<_>, _>>()?;

    tx.commit()?;
    tracing::info!(
        "created {} {item_type} transactions from recurring items for user {user_id}",
        transactions.len()
    );

    Ok(AppliedItems {
        count: transactions.len(),
        transactions,
    })
}

/// Create a transaction dated `today` from a single recurring item.
///
/// The item does not need to be active.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such item.
pub fn create_transaction_from_item(
    item_type: CategoryType,
    id: DatabaseId,
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let item = get_recurring(item_type, id, user_id, connection)?;

    create_transaction_for_item(&item, user_id, today, connection)
}
