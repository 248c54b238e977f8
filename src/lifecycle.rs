//! The status lifecycle shared by debts and receivables.
//!
//! An obligation is OPEN until its due date passes, then OVERDUE. Settling it
//! (paying a debt, receiving a receivable) records a ledger transaction and
//! moves it to the settled status. Reopening deletes that transaction and
//! puts the obligation back to OPEN or OVERDUE depending on its due date.

use rusqlite::{
    Connection, OptionalExtension,
    types::{FromSql, ToSql},
};
use time::{Date, OffsetDateTime};

use crate::{
    Error, UserID,
    category::{CategoryType, resolve_category},
    database_id::{CategoryId, DatabaseId, TransactionId},
    transaction::{Transaction, create_transaction},
};

/// A status enum with an open, an overdue and a settled state.
pub trait LifecycleStatus: Copy + PartialEq + ToSql + FromSql {
    /// Not settled and not past its due date.
    const OPEN: Self;
    /// Not settled and past its due date.
    const OVERDUE: Self;
    /// Paid or received.
    const SETTLED: Self;

    /// Whether the obligation has been settled.
    fn is_settled(self) -> bool {
        self == Self::SETTLED
    }
}

/// The status of an unsettled obligation due on `due_date`.
pub fn unsettled_status<S: LifecycleStatus>(due_date: Date, today: Date) -> S {
    if due_date < today { S::OVERDUE } else { S::OPEN }
}

/// The status after moving the due date of an unsettled obligation.
///
/// A past due date makes it overdue. A current or future due date reopens an
/// overdue obligation and leaves an open one as is.
pub fn status_after_due_date_change<S: LifecycleStatus>(
    current: S,
    new_due_date: Date,
    today: Date,
) -> S {
    if new_due_date < today {
        S::OVERDUE
    } else if current == S::OVERDUE {
        S::OPEN
    } else {
        current
    }
}

/// A table of obligations that follow the lifecycle.
pub trait Obligation {
    /// The status enum stored in the `status` column.
    type Status: LifecycleStatus;

    /// The name used in error messages, e.g. "debt".
    const NOUN: &'static str;
    /// The table the obligations are stored in.
    const TABLE: &'static str;
    /// The column holding the settlement instant.
    const SETTLED_AT_COLUMN: &'static str;
    /// The column naming the other party.
    const COUNTERPART_COLUMN: &'static str;
    /// The type of the ledger transaction recorded on settlement.
    const TRANSACTION_TYPE: CategoryType;

    /// The description of the ledger transaction recorded on settlement.
    fn settlement_description(counterpart: &str) -> String;
}

/// Check that an obligation can be edited.
///
/// # Errors
/// Returns [Error::SettledReadOnly] if the obligation has been settled.
pub fn ensure_unsettled<O: Obligation>(status: O::Status) -> Result<(), Error> {
    if status.is_settled() {
        Err(Error::SettledReadOnly(O::NOUN))
    } else {
        Ok(())
    }
}

/// Mark every open obligation of the user that is past its due date as overdue.
///
/// Returns the number of obligations that changed.
pub fn refresh_overdue<O: Obligation>(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<usize, Error> {
    let updated = connection.execute(
        &format!(
            "UPDATE {table} SET status = ?1, updated_at = ?2
             WHERE user_id = ?3 AND status = ?4 AND due_date < ?5 AND {settled_at} IS NULL",
            table = O::TABLE,
            settled_at = O::SETTLED_AT_COLUMN,
        ),
        rusqlite::params![
            O::Status::OVERDUE,
            OffsetDateTime::now_utc(),
            user_id.as_i64(),
            O::Status::OPEN,
            today,
        ],
    )?;

    if updated > 0 {
        tracing::debug!("marked {updated} {} rows overdue for user {user_id}", O::NOUN);
    }

    Ok(updated)
}

struct SettlementRow<S> {
    status: S,
    total_amount: f64,
    due_date: Date,
    category_id: Option<CategoryId>,
    counterpart: String,
    settlement_transaction_id: Option<TransactionId>,
}

fn get_settlement_row<O: Obligation>(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<SettlementRow<O::Status>, Error> {
    connection
        .query_row(
            &format!(
                "SELECT status, total_amount, due_date, category_id, {counterpart},
                    settlement_transaction_id
                 FROM {table} WHERE id = ?1 AND user_id = ?2",
                counterpart = O::COUNTERPART_COLUMN,
                table = O::TABLE,
            ),
            (id, user_id.as_i64()),
            |row| {
                Ok(SettlementRow {
                    status: row.get(0)?,
                    total_amount: row.get(1)?,
                    due_date: row.get(2)?,
                    category_id: row.get(3)?,
                    counterpart: row.get(4)?,
                    settlement_transaction_id: row.get(5)?,
                })
            },
        )
        .optional()?
        .ok_or(Error::NotFound)
}

/// Settle an obligation: record a ledger transaction for its total amount dated
/// `today` and move it to the settled status, in one SQL transaction.
///
/// The transaction uses the obligation's category when it is still usable,
/// otherwise the "Unspecified" category of the matching type.
///
/// # Errors
/// - [Error::NotFound] if the obligation does not exist or belongs to another user,
/// - [Error::AlreadySettled] if the obligation has already been settled.
pub fn settle<O: Obligation>(
    id: DatabaseId,
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let tx = connection.unchecked_transaction()?;
    let row = get_settlement_row::<O>(id, user_id, &tx)?;

    if row.status.is_settled() {
        return Err(Error::AlreadySettled(O::NOUN));
    }

    let category_id = resolve_category(row.category_id, O::TRANSACTION_TYPE, user_id, &tx)?;
    let transaction = create_transaction(
        Transaction::build(O::TRANSACTION_TYPE, row.total_amount, today, category_id)
            .description(Some(O::settlement_description(&row.counterpart))),
        user_id,
        &tx,
    )?;

    tx.execute(
        &format!(
            "UPDATE {table}
             SET status = ?1, {settled_at} = ?2, settlement_transaction_id = ?3, updated_at = ?2
             WHERE id = ?4 AND user_id = ?5",
            table = O::TABLE,
            settled_at = O::SETTLED_AT_COLUMN,
        ),
        rusqlite::params![
            O::Status::SETTLED,
            OffsetDateTime::now_utc(),
            transaction.id,
            id,
            user_id.as_i64(),
        ],
    )?;

    tx.commit()?;
    tracing::info!("settled {} {id} with transaction {}", O::NOUN, transaction.id);

    Ok(transaction)
}

/// Reopen a settled obligation and delete the ledger transaction recorded when
/// it was settled, in one SQL transaction.
///
/// The status becomes OVERDUE if the due date has passed, otherwise OPEN.
///
/// # Errors
/// - [Error::NotFound] if the obligation does not exist or belongs to another user,
/// - [Error::NotSettled] if the obligation has not been settled.
pub fn reopen<O: Obligation>(
    id: DatabaseId,
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<(), Error> {
    let tx = connection.unchecked_transaction()?;
    let row = get_settlement_row::<O>(id, user_id, &tx)?;

    if !row.status.is_settled() {
        return Err(Error::NotSettled(O::NOUN));
    }

    tx.execute(
        &format!(
            "UPDATE {table}
             SET status = ?1, {settled_at} = NULL, settlement_transaction_id = NULL, updated_at = ?2
             WHERE id = ?3 AND user_id = ?4",
            table = O::TABLE,
            settled_at = O::SETTLED_AT_COLUMN,
        ),
        rusqlite::params![
            unsettled_status::<O::Status>(row.due_date, today),
            OffsetDateTime::now_utc(),
            id,
            user_id.as_i64(),
        ],
    )?;

    if let Some(transaction_id) = row.settlement_transaction_id {
        tx.execute(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
            (transaction_id, user_id.as_i64()),
        )?;
    }

    tx.commit()?;
    tracing::info!("reopened {} {id}", O::NOUN);

    Ok(())
}

#[cfg(test)]
mod status_tests {
    use time::macros::date;

    use crate::{
        debt::DebtStatus,
        lifecycle::{status_after_due_date_change, unsettled_status},
    };

    const TODAY: time::Date = date!(2025 - 06 - 15);

    #[test]
    fn past_due_date_is_overdue() {
        assert_eq!(
            unsettled_status::<DebtStatus>(date!(2025 - 06 - 14), TODAY),
            DebtStatus::Overdue
        );
    }

    #[test]
    fn due_today_is_open() {
        assert_eq!(unsettled_status::<DebtStatus>(TODAY, TODAY), DebtStatus::Open);
    }

    #[test]
    fn moving_due_date_forward_reopens_overdue() {
        assert_eq!(
            status_after_due_date_change(DebtStatus::Overdue, TODAY, TODAY),
            DebtStatus::Open
        );
    }

    #[test]
    fn moving_due_date_back_makes_overdue() {
        assert_eq!(
            status_after_due_date_change(DebtStatus::Open, date!(2025 - 01 - 01), TODAY),
            DebtStatus::Overdue
        );
    }

    #[test]
    fn moving_due_date_forward_keeps_open() {
        assert_eq!(
            status_after_due_date_change(DebtStatus::Open, date!(2025 - 12 - 01), TODAY),
            DebtStatus::Open
        );
    }
}
