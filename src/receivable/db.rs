//! Database operations for receivables.

use rusqlite::{Connection, Row};
use time::{Date, OffsetDateTime};

use crate::{
    Error, UserID,
    category::{CategoryType, validate_category},
    database_id::DatabaseId,
    lifecycle::{
        ensure_unsettled, refresh_overdue, status_after_due_date_change, unsettled_status,
    },
    nullable,
    receivable::{NewReceivableForm, Receivable, ReceivableStatus, ReceivableUpdate},
    validate::{optional_text, positive_amount, required_text},
};

const RECEIVABLE_COLUMNS: &str = "id, user_id, debtor_name, description, total_amount, \
    due_date, received_at, status, category_id, settlement_transaction_id, created_at, updated_at";

/// Create a receivable. It starts OVERDUE if `due_date` is before `today`, otherwise OPEN.
///
/// # Errors
/// - [Error::EmptyField] if the debtor name is empty,
/// - [Error::NonPositiveAmount] if the total amount is not greater than zero,
/// - [Error::InvalidCategory] if the category is not a visible income category.
pub fn create_receivable(
    form: NewReceivableForm,
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Receivable, Error> {
    let debtor_name = required_text(&form.debtor_name, "debtor name")?;
    let total_amount = positive_amount(form.total_amount, "total amount")?;

    if let Some(category_id) = form.category_id {
        validate_category(category_id, CategoryType::Income, user_id, connection)?;
    }

    let status: ReceivableStatus = unsettled_status(form.due_date, today);
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(&format!(
            "INSERT INTO receivable (user_id, debtor_name, description, total_amount, due_date,
                status, category_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             RETURNING {RECEIVABLE_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                user_id.as_i64(),
                debtor_name,
                optional_text(form.description),
                total_amount,
                form.due_date,
                status,
                form.category_id,
                now,
            ],
            map_receivable_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a receivable owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the receivable does not exist or belongs to another user.
pub fn get_receivable(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Receivable, Error> {
    connection
        .prepare(&format!(
            "SELECT {RECEIVABLE_COLUMNS} FROM receivable WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, user_id.as_i64()), map_receivable_row)
        .map_err(|error| error.into())
}

/// Get the user's receivables ordered by status (open, overdue, received) and then due date.
///
/// Open receivables past their due date are marked overdue before they are read.
pub fn get_receivables(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<Receivable>, Error> {
    refresh_overdue::<Receivable>(user_id, today, connection)?;

    connection
        .prepare(&format!(
            "SELECT {RECEIVABLE_COLUMNS} FROM receivable WHERE user_id = ?1
             ORDER BY CASE status WHEN 'OPEN' THEN 0 WHEN 'OVERDUE' THEN 1 ELSE 2 END,
                due_date ASC, id ASC"
        ))?
        .query_map([user_id.as_i64()], map_receivable_row)?
        .map(|maybe_receivable| maybe_receivable.map_err(Error::from))
        .collect()
}

/// Apply a partial update to a receivable that has not been received.
///
/// The status is recomputed from the due date, so a stale OPEN status
/// becomes OVERDUE even when the due date is not part of the update.
///
/// # Errors
/// - [Error::NotFound] if the receivable does not exist or belongs to another user,
/// - [Error::SettledReadOnly] if the receivable has been received,
/// - the validation errors of [create_receivable].
pub fn update_receivable(
    id: DatabaseId,
    user_id: UserID,
    update: ReceivableUpdate,
    today: Date,
    connection: &Connection,
) -> Result<Receivable, Error> {
    let current = get_receivable(id, user_id, connection)?;
    ensure_unsettled::<Receivable>(current.status)?;

    let debtor_name = match update.debtor_name {
        Some(name) => required_text(&name, "debtor name")?,
        None => current.debtor_name,
    };
    let total_amount = match update.total_amount {
        Some(amount) => positive_amount(amount, "total amount")?,
        None => current.total_amount,
    };
    let category_id = nullable::apply(update.category_id, current.category_id);

    if let Some(category_id) = category_id {
        validate_category(category_id, CategoryType::Income, user_id, connection)?;
    }

    let due_date = update.due_date.unwrap_or(current.due_date);
    let status = status_after_due_date_change(current.status, due_date, today);

    connection
        .prepare(&format!(
            "UPDATE receivable
             SET debtor_name = ?1, description = ?2, total_amount = ?3, due_date = ?4,
                status = ?5, category_id = ?6, updated_at = ?7
             WHERE id = ?8 AND user_id = ?9
             RETURNING {RECEIVABLE_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                debtor_name,
                optional_text(nullable::apply(update.description, current.description)),
                total_amount,
                due_date,
                status,
                category_id,
                OffsetDateTime::now_utc(),
                id,
                user_id.as_i64(),
            ],
            map_receivable_row,
        )
        .map_err(|error| error.into())
}

/// Delete a receivable owned by `user_id`. Its settlement transaction is kept.
///
/// # Errors
/// Returns [Error::NotFound] if the receivable does not exist or belongs to another user.
pub fn delete_receivable(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM receivable WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get up to `limit` of the user's unsettled receivables, soonest due date first.
///
/// Statuses must be refreshed with [refresh_overdue] beforehand for them to be current.
pub fn get_pending_receivables(
    user_id: UserID,
    limit: usize,
    connection: &Connection,
) -> Result<Vec<Receivable>, Error> {
    connection
        .prepare(&format!(
            "SELECT {RECEIVABLE_COLUMNS} FROM receivable
             WHERE user_id = ?1 AND status IN ('OPEN', 'OVERDUE')
             ORDER BY due_date ASC, id ASC
             LIMIT ?2"
        ))?
        .query_map((user_id.as_i64(), limit as i64), map_receivable_row)?
        .map(|maybe_receivable| maybe_receivable.map_err(Error::from))
        .collect()
}

/// Create the receivable table.
pub fn create_receivable_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS receivable (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            debtor_name TEXT NOT NULL,
            description TEXT,
            total_amount REAL NOT NULL CHECK (total_amount > 0),
            due_date TEXT NOT NULL,
            received_at TEXT,
            status TEXT NOT NULL DEFAULT 'OPEN',
            category_id INTEGER,
            settlement_transaction_id INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE SET NULL,
            FOREIGN KEY(settlement_transaction_id) REFERENCES \"transaction\"(id) ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_receivable_user_due ON receivable(user_id, due_date);",
    )?;

    Ok(())
}

fn map_receivable_row(row: &Row) -> Result<Receivable, rusqlite::Error> {
    Ok(Receivable {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        debtor_name: row.get(2)?,
        description: row.get(3)?,
        total_amount: row.get(4)?,
        due_date: row.get(5)?,
        received_at: row.get(6)?,
        status: row.get(7)?,
        category_id: row.get(8)?,
        settlement_transaction_id: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

#[cfg(test)]
mod receivable_query_tests {
    use time::macros::date;

    use crate::{
        Error,
        category::{CategoryName, CategoryType, create_category},
        lifecycle::{reopen, settle},
        receivable::{
            NewReceivableForm, Receivable, ReceivableStatus, ReceivableUpdate, create_receivable,
            get_receivable, get_receivables, update_receivable,
        },
        test_utils::{must_create_test_user, must_open_test_db},
        transaction::get_transaction,
    };

    const TODAY: time::Date = date!(2025 - 06 - 15);

    fn receivable_form(debtor_name: &str, due_date: time::Date) -> NewReceivableForm {
        NewReceivableForm {
            debtor_name: debtor_name.to_owned(),
            description: None,
            total_amount: 250.0,
            due_date,
            category_id: None,
        }
    }

    #[test]
    fn receiving_records_income_in_own_category() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let side_job = create_category(
            &CategoryName::new_unchecked("Side job"),
            CategoryType::Income,
            user.id,
            &conn,
        )
        .unwrap();
        let receivable = create_receivable(
            NewReceivableForm {
                category_id: Some(side_job.id),
                ..receivable_form("Alice", date!(2025 - 07 - 01))
            },
            user.id,
            TODAY,
            &conn,
        )
        .unwrap();

        let transaction = settle::<Receivable>(receivable.id, user.id, TODAY, &conn).unwrap();

        assert_eq!(transaction.transaction_type, CategoryType::Income);
        assert_eq!(transaction.category_id, side_job.id);
        assert_eq!(transaction.amount, 250.0);
        assert_eq!(transaction.date, TODAY);
        assert_eq!(
            transaction.description.as_deref(),
            Some("Payment received from Alice")
        );
        let received = get_receivable(receivable.id, user.id, &conn).unwrap();
        assert_eq!(received.status, ReceivableStatus::Received);
        assert!(received.received_at.is_some());
        assert_eq!(received.settlement_transaction_id, Some(transaction.id));
    }

    #[test]
    fn rejects_expense_category() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let rent = create_category(
            &CategoryName::new_unchecked("Rent"),
            CategoryType::Expense,
            user.id,
            &conn,
        )
        .unwrap();

        let result = create_receivable(
            NewReceivableForm {
                category_id: Some(rent.id),
                ..receivable_form("Alice", TODAY)
            },
            user.id,
            TODAY,
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidCategory(rent.id)));
    }

    #[test]
    fn reopening_past_due_receivable_makes_it_overdue() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let receivable = create_receivable(
            receivable_form("Bob", date!(2025 - 06 - 20)),
            user.id,
            TODAY,
            &conn,
        )
        .unwrap();
        let transaction = settle::<Receivable>(receivable.id, user.id, TODAY, &conn).unwrap();

        reopen::<Receivable>(receivable.id, user.id, date!(2025 - 07 - 01), &conn).unwrap();

        let reopened = get_receivable(receivable.id, user.id, &conn).unwrap();
        assert_eq!(reopened.status, ReceivableStatus::Overdue);
        assert_eq!(reopened.received_at, None);
        assert_eq!(reopened.settlement_transaction_id, None);
        assert_eq!(get_transaction(transaction.id, user.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn listing_refreshes_overdue_status() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        create_receivable(
            receivable_form("Carol", date!(2025 - 06 - 20)),
            user.id,
            TODAY,
            &conn,
        )
        .unwrap();

        let before = get_receivables(user.id, TODAY, &conn).unwrap();
        let after = get_receivables(user.id, date!(2025 - 06 - 21), &conn).unwrap();

        assert_eq!(before[0].status, ReceivableStatus::Open);
        assert_eq!(after[0].status, ReceivableStatus::Overdue);
    }

    #[test]
    fn received_receivable_cannot_be_edited() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let receivable =
            create_receivable(receivable_form("Dan", TODAY), user.id, TODAY, &conn).unwrap();
        settle::<Receivable>(receivable.id, user.id, TODAY, &conn).unwrap();

        let result = update_receivable(
            receivable.id,
            user.id,
            ReceivableUpdate {
                total_amount: Some(1.0),
                ..Default::default()
            },
            TODAY,
            &conn,
        );

        assert_eq!(result, Err(Error::SettledReadOnly("receivable")));
    }

    #[test]
    fn editing_other_fields_refreshes_stale_status() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let receivable = create_receivable(
            receivable_form("Dan", date!(2025 - 06 - 20)),
            user.id,
            TODAY,
            &conn,
        )
        .unwrap();
        assert_eq!(receivable.status, ReceivableStatus::Open);

        let updated = update_receivable(
            receivable.id,
            user.id,
            ReceivableUpdate {
                debtor_name: Some("Dana".to_owned()),
                ..Default::default()
            },
            date!(2025 - 06 - 21),
            &conn,
        )
        .unwrap();

        assert_eq!(updated.status, ReceivableStatus::Overdue);
        assert_eq!(
            get_receivable(receivable.id, user.id, &conn).unwrap().status,
            ReceivableStatus::Overdue
        );
    }
}
