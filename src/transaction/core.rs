//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error, UserID,
    category::{CategorySummary, CategoryType, validate_category},
    database_id::{CategoryId, TransactionId},
    nullable,
    text_enum::text_enum,
    validate::{optional_text, positive_amount},
};

// ============================================================================
// MODELS
// ============================================================================

text_enum! {
    /// How a transaction was paid.
    pub enum PaymentMethod {
        Cash => "CASH",
        Card => "CARD",
        Pix => "PIX",
        BankTransfer => "BANK_TRANSFER",
        Other => "OTHER",
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// Whether money came in or went out.
    #[serde(rename = "type")]
    pub transaction_type: CategoryType,
    /// The amount of money spent or earned, always greater than zero.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// Whether the user flagged the transaction as important.
    pub is_important: bool,
    /// How the transaction was paid.
    pub payment_method: Option<PaymentMethod>,
    /// Whether the transaction is one of a series of installments.
    pub is_installment: bool,
    /// The number of installments in the series.
    pub installments_total: Option<u32>,
    /// The 1-based position of this transaction in its series.
    pub installment_index: Option<u32>,
    /// The first installment of the series, unset for the first installment itself.
    pub parent_id: Option<TransactionId>,
    /// The category the transaction belongs to.
    pub category: CategorySummary,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        transaction_type: CategoryType,
        amount: f64,
        date: Date,
        category_id: CategoryId,
    ) -> TransactionBuilder {
        TransactionBuilder {
            transaction_type,
            amount,
            date,
            category_id,
            description: None,
            is_important: false,
            payment_method: None,
            installment: None,
        }
    }
}

/// Where a transaction sits in a series of installments.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct InstallmentPosition {
    /// The 1-based index of the installment.
    pub index: u32,
    /// The number of installments in the series.
    pub total: u32,
    /// The first installment of the series, `None` for the first installment.
    pub parent_id: Option<TransactionId>,
}

/// A builder for creating [Transaction] instances.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// use crate::{category::CategoryType, transaction::{PaymentMethod, Transaction}};
///
/// let builder = Transaction::build(CategoryType::Expense, 45.99, date!(2025-01-15), food_id)
///     .description(Some("Coffee".to_owned()))
///     .payment_method(Some(PaymentMethod::Card));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether money came in or went out.
    pub transaction_type: CategoryType,
    /// The amount of money, must be greater than zero.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// The category of the transaction. Its type must match `transaction_type`.
    pub category_id: CategoryId,
    /// A human-readable description of the transaction.
    pub description: Option<String>,
    /// Whether the user flagged the transaction as important.
    pub is_important: bool,
    /// How the transaction was paid.
    pub payment_method: Option<PaymentMethod>,
    /// Set for transactions that are part of an installment series.
    pub installment: Option<InstallmentPosition>,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Flag the transaction as important.
    pub fn is_important(mut self, is_important: bool) -> Self {
        self.is_important = is_important;
        self
    }

    /// Set the payment method for the transaction.
    pub fn payment_method(mut self, payment_method: Option<PaymentMethod>) -> Self {
        self.payment_method = payment_method;
        self
    }

    /// Mark the transaction as part of an installment series.
    pub fn installment(mut self, installment: Option<InstallmentPosition>) -> Self {
        self.installment = installment;
        self
    }
}

/// The fields of a transaction to change. Missing fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    #[serde(rename = "type")]
    pub transaction_type: Option<CategoryType>,
    pub amount: Option<f64>,
    pub date: Option<Date>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub description: Option<Option<String>>,
    pub category_id: Option<CategoryId>,
    pub is_important: Option<bool>,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub payment_method: Option<Option<PaymentMethod>>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub(crate) const TRANSACTION_SELECT: &str = "SELECT t.id, t.user_id, t.category_id, t.type, \
    t.amount, t.date, t.description, t.is_important, t.payment_method, t.is_installment, \
    t.installments_total, t.installment_index, t.parent_id, t.created_at, t.updated_at, \
    c.name, c.type \
    FROM \"transaction\" t INNER JOIN category c ON c.id = t.category_id";

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is not greater than zero,
/// - [Error::InvalidCategory] if the category is not visible to the user or has a different type,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    positive_amount(builder.amount, "amount")?;
    validate_category(
        builder.category_id,
        builder.transaction_type,
        user_id,
        connection,
    )?;

    let now = OffsetDateTime::now_utc();
    let description = optional_text(builder.description);

    let id: TransactionId = connection.query_row(
        "INSERT INTO \"transaction\" (user_id, category_id, type, amount, date, description,
            is_important, payment_method, is_installment, installments_total, installment_index,
            parent_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
         RETURNING id",
        rusqlite::params![
            user_id.as_i64(),
            builder.category_id,
            builder.transaction_type,
            builder.amount,
            builder.date,
            description,
            builder.is_important,
            builder.payment_method,
            builder.installment.is_some(),
            builder.installment.map(|position| position.total),
            builder.installment.map(|position| position.index),
            builder.installment.and_then(|position| position.parent_id),
            now,
        ],
        |row| row.get(0),
    )?;

    get_transaction(id, user_id, connection)
}

/// Retrieve a transaction owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by the user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "{TRANSACTION_SELECT} WHERE t.id = ?1 AND t.user_id = ?2"
        ))?
        .query_row((id, user_id.as_i64()), map_transaction_row)
        .map_err(|error| error.into())
}

/// Apply a partial update to a transaction owned by `user_id`.
///
/// Installment linkage cannot be changed.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by the user,
/// - [Error::NonPositiveAmount] if the new amount is not greater than zero,
/// - [Error::InvalidCategory] if the resulting category does not match the resulting type,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let current = get_transaction(id, user_id, connection)?;

    let transaction_type = update
        .transaction_type
        .unwrap_or(current.transaction_type);
    let amount = match update.amount {
        Some(amount) => positive_amount(amount, "amount")?,
        None => current.amount,
    };
    let category_id = update.category_id.unwrap_or(current.category_id);
    let description = optional_text(nullable::apply(update.description, current.description));
    let payment_method = nullable::apply(update.payment_method, current.payment_method);

    validate_category(category_id, transaction_type, user_id, connection)?;

    connection.execute(
        "UPDATE \"transaction\"
         SET type = ?1, amount = ?2, date = ?3, description = ?4, category_id = ?5,
             is_important = ?6, payment_method = ?7, updated_at = ?8
         WHERE id = ?9 AND user_id = ?10",
        rusqlite::params![
            transaction_type,
            amount,
            update.date.unwrap_or(current.date),
            description,
            category_id,
            update.is_important.unwrap_or(current.is_important),
            payment_method,
            OffsetDateTime::now_utc(),
            id,
            user_id.as_i64(),
        ],
    )?;

    get_transaction(id, user_id, connection)
}

/// Delete a transaction owned by `user_id`.
///
/// Deleting the first installment of a series also deletes the rest of the
/// series. Returns the number of deleted transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by the user,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<usize, Error> {
    let transaction = get_transaction(id, user_id, connection)?;

    let rows_affected = if transaction.is_installment && transaction.parent_id.is_none() {
        connection.execute(
            "DELETE FROM \"transaction\" WHERE user_id = ?1 AND (id = ?2 OR parent_id = ?2)",
            (user_id.as_i64(), id),
        )?
    } else {
        connection.execute(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
            (id, user_id.as_i64()),
        )?
    };

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(rows_affected)
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
            amount REAL NOT NULL CHECK (amount > 0),
            date TEXT NOT NULL,
            description TEXT,
            is_important INTEGER NOT NULL DEFAULT 0,
            payment_method TEXT,
            is_installment INTEGER NOT NULL DEFAULT 0,
            installments_total INTEGER,
            installment_index INTEGER,
            parent_id INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE RESTRICT,
            FOREIGN KEY(parent_id) REFERENCES \"transaction\"(id) ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);
        CREATE INDEX IF NOT EXISTS idx_transaction_parent ON \"transaction\"(parent_id);",
    )?;

    Ok(())
}

/// Map a row selected with `TRANSACTION_SELECT` to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let category_id = row.get(2)?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        category_id,
        transaction_type: row.get(3)?,
        amount: row.get(4)?,
        date: row.get(5)?,
        description: row.get(6)?,
        is_important: row.get(7)?,
        payment_method: row.get(8)?,
        is_installment: row.get(9)?,
        installments_total: row.get(10)?,
        installment_index: row.get(11)?,
        parent_id: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
        category: CategorySummary {
            id: category_id,
            name: row.get(15)?,
            category_type: row.get(16)?,
        },
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use time::macros::date;

    use crate::{
        Error,
        category::{CategoryType, find_or_create_unspecified},
        test_utils::{must_create_test_user, must_create_user, must_open_test_db},
        transaction::{
            PaymentMethod, Transaction, TransactionUpdate, create_transaction,
            delete_transaction, get_transaction, update_transaction,
        },
    };

    #[test]
    fn create_succeeds() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let category = find_or_create_unspecified(CategoryType::Expense, &conn).unwrap();

        let transaction = create_transaction(
            Transaction::build(CategoryType::Expense, 12.3, date!(2025 - 10 - 05), category)
                .description(Some("  Lunch ".to_owned()))
                .payment_method(Some(PaymentMethod::Pix)),
            user.id,
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.amount, 12.3);
        assert_eq!(transaction.description.as_deref(), Some("Lunch"));
        assert_eq!(transaction.payment_method, Some(PaymentMethod::Pix));
        assert_eq!(transaction.category.name, "Unspecified");
        assert!(!transaction.is_installment);
    }

    #[test]
    fn create_fails_on_non_positive_amount() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let category = find_or_create_unspecified(CategoryType::Expense, &conn).unwrap();

        let result = create_transaction(
            Transaction::build(CategoryType::Expense, 0.0, date!(2025 - 10 - 05), category),
            user.id,
            &conn,
        );

        assert_eq!(result, Err(Error::NonPositiveAmount("amount")));
    }

    #[test]
    fn create_fails_on_mismatched_category() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let category = find_or_create_unspecified(CategoryType::Income, &conn).unwrap();

        let result = create_transaction(
            Transaction::build(CategoryType::Expense, 10.0, date!(2025 - 10 - 05), category),
            user.id,
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(category)));
    }

    #[test]
    fn other_users_cannot_read_transaction() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let other_user = must_create_user("other@example.com", &conn);
        let category = find_or_create_unspecified(CategoryType::Income, &conn).unwrap();
        let transaction = create_transaction(
            Transaction::build(CategoryType::Income, 10.0, date!(2025 - 10 - 05), category),
            user.id,
            &conn,
        )
        .unwrap();

        assert_eq!(
            get_transaction(transaction.id, other_user.id, &conn),
            Err(Error::NotFound)
        );
        assert_eq!(
            delete_transaction(transaction.id, other_user.id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn update_changes_only_given_fields() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let category = find_or_create_unspecified(CategoryType::Expense, &conn).unwrap();
        let transaction = create_transaction(
            Transaction::build(CategoryType::Expense, 10.0, date!(2025 - 10 - 05), category)
                .description(Some("Bus".to_owned()))
                .payment_method(Some(PaymentMethod::Card)),
            user.id,
            &conn,
        )
        .unwrap();

        let updated = update_transaction(
            transaction.id,
            user.id,
            TransactionUpdate {
                amount: Some(15.0),
                payment_method: Some(None),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(updated.amount, 15.0);
        assert_eq!(updated.description.as_deref(), Some("Bus"));
        assert_eq!(updated.payment_method, None);
        assert_eq!(updated.date, transaction.date);
    }

    #[test]
    fn update_rejects_type_change_without_matching_category() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let category = find_or_create_unspecified(CategoryType::Expense, &conn).unwrap();
        let transaction = create_transaction(
            Transaction::build(CategoryType::Expense, 10.0, date!(2025 - 10 - 05), category),
            user.id,
            &conn,
        )
        .unwrap();

        let result = update_transaction(
            transaction.id,
            user.id,
            TransactionUpdate {
                transaction_type: Some(CategoryType::Income),
                ..Default::default()
            },
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(category)));
    }
}
