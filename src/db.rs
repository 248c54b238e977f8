//! Database initialization.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    auth::{create_session_table, create_user_table},
    category::{create_category_table, seed_default_categories},
    debt::create_debt_table,
    piggy_bank::{create_piggy_bank_table, create_piggy_bank_transaction_table},
    receivable::create_receivable_table,
    recurring::create_recurring_table,
    transaction::create_transaction_table,
    wishlist::create_wishlist_table,
};

/// Create the tables for the domain models if they do not exist and seed the
/// default categories.
///
/// Foreign key enforcement is switched on for `connection`. Tables are created
/// in one exclusive transaction, so a failure leaves the database untouched.
///
/// # Errors
/// Returns [Error::SqlError] if a statement fails.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Has no effect inside a transaction, so it must come first.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_session_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_recurring_table(&transaction)?;
    create_debt_table(&transaction)?;
    create_receivable_table(&transaction)?;
    create_wishlist_table(&transaction)?;
    create_piggy_bank_table(&transaction)?;
    create_piggy_bank_transaction_table(&transaction)?;
    seed_default_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}
