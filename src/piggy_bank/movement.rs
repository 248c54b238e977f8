//! Deposits into and withdrawals from piggy banks.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    database_id::DatabaseId,
    piggy_bank::{MovementForm, MovementType, PiggyBankTransaction, get_piggy_bank},
    validate::{optional_text, positive_amount},
};

const MOVEMENT_COLUMNS: &str = "id, piggy_bank_id, amount, type, description, created_at";

/// Record a deposit or withdrawal and update the piggy bank's balance, in one SQL transaction.
///
/// # Errors
/// - [Error::NotFound] if the piggy bank does not exist or belongs to another user,
/// - [Error::NonPositiveAmount] if the amount is not greater than zero,
/// - [Error::InsufficientFunds] if a withdrawal is larger than the balance.
pub fn add_transaction(
    piggy_bank_id: DatabaseId,
    user_id: UserID,
    form: MovementForm,
    connection: &Connection,
) -> Result<PiggyBankTransaction, Error> {
    let amount = positive_amount(form.amount, "amount")?;

    let tx = connection.unchecked_transaction()?;
    let piggy_bank = get_piggy_bank(piggy_bank_id, user_id, &tx)?;

    let new_balance = match form.movement_type {
        MovementType::Deposit => piggy_bank.current_amount + amount,
        MovementType::Withdrawal => piggy_bank.current_amount - amount,
    };
    // Balances are kept to the cent.
    let new_balance = (new_balance * 100.0).round() / 100.0;

    if new_balance < 0.0 {
        return Err(Error::InsufficientFunds(piggy_bank.current_amount));
    }

    let now = OffsetDateTime::now_utc();
    let transaction = tx
        .prepare(&format!(
            "INSERT INTO piggy_bank_transaction (piggy_bank_id, amount, type, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {MOVEMENT_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                piggy_bank_id,
                amount,
                form.movement_type,
                optional_text(form.description),
                now,
            ],
            map_movement_row,
        )?;

    tx.execute(
        "UPDATE piggy_bank SET current_amount = ?1, updated_at = ?2 WHERE id = ?3",
        rusqlite::params![new_balance, now, piggy_bank_id],
    )?;

    tx.commit()?;
    tracing::debug!(
        "recorded {} of {amount:.2} in piggy bank {piggy_bank_id}",
        form.movement_type
    );

    Ok(transaction)
}

/// Get the movements of a piggy bank owned by `user_id`, newest first.
///
/// # Errors
/// Returns [Error::NotFound] if the piggy bank does not exist or belongs to another user.
pub fn get_piggy_bank_transactions(
    piggy_bank_id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<PiggyBankTransaction>, Error> {
    get_piggy_bank(piggy_bank_id, user_id, connection)?;

    get_recent_transactions(piggy_bank_id, None, connection)
}

/// Get up to `limit` movements of a piggy bank, newest first. Ownership is not checked.
pub(crate) fn get_recent_transactions(
    piggy_bank_id: DatabaseId,
    limit: Option<usize>,
    connection: &Connection,
) -> Result<Vec<PiggyBankTransaction>, Error> {
    // SQLite treats a negative limit as no limit.
    let limit = limit.map_or(-1, |limit| limit as i64);

    connection
        .prepare(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM piggy_bank_transaction WHERE piggy_bank_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2"
        ))?
        .query_map((piggy_bank_id, limit), map_movement_row)?
        .map(|maybe_movement| maybe_movement.map_err(Error::from))
        .collect()
}

/// Create the table of piggy bank movements.
pub fn create_piggy_bank_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS piggy_bank_transaction (
            id INTEGER PRIMARY KEY,
            piggy_bank_id INTEGER NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            type TEXT NOT NULL CHECK (type IN ('DEPOSIT', 'WITHDRAWAL')),
            description TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(piggy_bank_id) REFERENCES piggy_bank(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_piggy_bank_transaction_piggy_bank
            ON piggy_bank_transaction(piggy_bank_id, created_at);",
    )?;

    Ok(())
}

fn map_movement_row(row: &Row) -> Result<PiggyBankTransaction, rusqlite::Error> {
    Ok(PiggyBankTransaction {
        id: row.get(0)?,
        piggy_bank_id: row.get(1)?,
        amount: row.get(2)?,
        movement_type: row.get(3)?,
        description: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod movement_tests {
    use crate::{
        Error,
        piggy_bank::{
            MovementForm, MovementType, NewPiggyBankForm, PeriodType, add_transaction,
            create_piggy_bank, get_piggy_bank, get_piggy_bank_transactions,
        },
        test_utils::{must_create_test_user, must_create_user, must_open_test_db},
    };

    fn movement(movement_type: MovementType, amount: f64) -> MovementForm {
        MovementForm {
            amount,
            movement_type,
            description: Some("  ".to_owned()),
        }
    }

    fn must_create_piggy_bank(conn: &rusqlite::Connection, user_id: crate::UserID) -> i64 {
        create_piggy_bank(
            NewPiggyBankForm {
                name: "Emergency fund".to_owned(),
                description: None,
                target_amount: None,
                amount_per_period: 100.0,
                period_type: PeriodType::Month,
            },
            None,
            user_id,
            conn,
        )
        .unwrap()
        .id
    }

    #[test]
    fn deposits_and_withdrawals_update_balance() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let id = must_create_piggy_bank(&conn, user.id);

        add_transaction(id, user.id, movement(MovementType::Deposit, 100.0), &conn).unwrap();
        let withdrawal =
            add_transaction(id, user.id, movement(MovementType::Withdrawal, 40.0), &conn)
                .unwrap();

        assert_eq!(withdrawal.amount, 40.0);
        assert_eq!(withdrawal.movement_type, MovementType::Withdrawal);
        assert_eq!(withdrawal.description, None);
        assert_eq!(get_piggy_bank(id, user.id, &conn).unwrap().current_amount, 60.0);
    }

    #[test]
    fn overdraw_is_rejected_and_balance_unchanged() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let id = must_create_piggy_bank(&conn, user.id);
        add_transaction(id, user.id, movement(MovementType::Deposit, 25.0), &conn).unwrap();

        let result = add_transaction(id, user.id, movement(MovementType::Withdrawal, 25.01), &conn);

        assert_eq!(result, Err(Error::InsufficientFunds(25.0)));
        assert_eq!(get_piggy_bank(id, user.id, &conn).unwrap().current_amount, 25.0);
        assert_eq!(get_piggy_bank_transactions(id, user.id, &conn).unwrap().len(), 1);
    }

    #[test]
    fn withdrawing_whole_balance_is_allowed() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let id = must_create_piggy_bank(&conn, user.id);
        add_transaction(id, user.id, movement(MovementType::Deposit, 25.0), &conn).unwrap();

        add_transaction(id, user.id, movement(MovementType::Withdrawal, 25.0), &conn).unwrap();

        assert_eq!(get_piggy_bank(id, user.id, &conn).unwrap().current_amount, 0.0);
    }

    #[test]
    fn rejects_non_positive_amount() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let id = must_create_piggy_bank(&conn, user.id);

        let result = add_transaction(id, user.id, movement(MovementType::Deposit, -5.0), &conn);

        assert_eq!(result, Err(Error::NonPositiveAmount("amount")));
    }

    #[test]
    fn other_users_piggy_bank_is_not_found() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let other_user = must_create_user("other@example.com", &conn);
        let id = must_create_piggy_bank(&conn, user.id);

        assert_eq!(
            add_transaction(id, other_user.id, movement(MovementType::Deposit, 5.0), &conn),
            Err(Error::NotFound)
        );
        assert_eq!(
            get_piggy_bank_transactions(id, other_user.id, &conn),
            Err(Error::NotFound)
        );
    }
}
