//! Splitting a purchase into monthly installments.

use rusqlite::Connection;
use time::{Date, Month};

use crate::{
    Error, UserID,
    transaction::{InstallmentPosition, Transaction, TransactionBuilder, create_transaction},
};

/// The largest number of installments a purchase can be split into.
pub const MAX_INSTALLMENTS: u32 = 120;

/// Split `total` into `count` amounts that add up to `total` to the cent.
///
/// Every installment gets the same whole number of cents and the last one
/// also gets the remainder.
///
/// # Errors
/// - [Error::InvalidInstallments] if `count` is zero or more than [MAX_INSTALLMENTS],
/// - [Error::NonPositiveAmount] if an installment would be less than one cent.
pub fn split_amount(total: f64, count: u32) -> Result<Vec<f64>, Error> {
    if count == 0 || count > MAX_INSTALLMENTS {
        return Err(Error::InvalidInstallments(count));
    }

    let total_cents = (total * 100.0).round() as i64;
    let base_cents = total_cents / i64::from(count);

    if base_cents <= 0 {
        return Err(Error::NonPositiveAmount("installment amount"));
    }

    let remainder = total_cents - base_cents * i64::from(count);
    let amounts = (1..=count)
        .map(|index| {
            let cents = if index == count {
                base_cents + remainder
            } else {
                base_cents
            };
            cents as f64 / 100.0
        })
        .collect();

    Ok(amounts)
}

/// The date `months` calendar months after `date`.
///
/// The day is clamped to the length of the target month, e.g. one month
/// after 31 January is 28 or 29 February.
///
/// # Errors
/// Returns [Error::InvalidDate] if the result is outside the supported range.
pub fn add_months(date: Date, months: u32) -> Result<Date, Error> {
    let month_index = date.month() as i64 - 1 + i64::from(months);
    let year = i64::from(date.year()) + month_index / 12;
    let year = i32::try_from(year).map_err(|_| Error::InvalidDate(format!("year {year}")))?;
    let month = Month::try_from((month_index % 12 + 1) as u8)
        .map_err(|error| Error::InvalidDate(error.to_string()))?;

    (1..=date.day())
        .rev()
        .find_map(|day| Date::from_calendar_date(year, month, day).ok())
        .ok_or_else(|| Error::InvalidDate(format!("{year}-{month}-{}", date.day())))
}

/// Create a purchase split into `installments_total` monthly transactions.
///
/// `builder.amount` is the total amount. The first installment is dated
/// `builder.date` and every later installment is one month after the one
/// before it and points at the first installment through `parent_id`.
/// Every row is written in a single SQL transaction.
///
/// Returns the created transactions in installment order.
///
/// # Errors
/// - [Error::InvalidInstallments] if `installments_total` is out of range,
/// - the errors of [split_amount], [add_months] and [create_transaction].
pub fn create_installments(
    builder: TransactionBuilder,
    installments_total: u32,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let amounts = split_amount(builder.amount, installments_total)?;

    let tx = connection.unchecked_transaction()?;
    let mut transactions = Vec::with_capacity(amounts.len());
    let mut parent_id = None;

    for (offset, amount) in amounts.into_iter().enumerate() {
        let offset = offset as u32;
        let installment = builder
            .clone()
            .installment(Some(InstallmentPosition {
                index: offset + 1,
                total: installments_total,
                parent_id,
            }));
        let installment = TransactionBuilder {
            amount,
            date: add_months(builder.date, offset)?,
            ..installment
        };

        let transaction = create_transaction(installment, user_id, &tx)?;
        parent_id.get_or_insert(transaction.id);
        transactions.push(transaction);
    }

    tx.commit()?;

    tracing::debug!(
        "created {} installments for user {user_id}",
        transactions.len()
    );

    Ok(transactions)
}


#[cfg(test)]
mod add_months_tests {
    use time::macros::date;

    use crate::transaction::add_months;

    #[test]
    fn adds_months_within_year() {
        assert_eq!(add_months(date!(2025 - 01 - 15), 2), Ok(date!(2025 - 03 - 15)));
    }

    #[test]
    fn rolls_over_year() {
        assert_eq!(add_months(date!(2025 - 11 - 10), 3), Ok(date!(2026 - 02 - 10)));
    }

    #[test]
    fn clamps_to_end_of_month() {
        assert_eq!(add_months(date!(2025 - 01 - 31), 1), Ok(date!(2025 - 02 - 28)));
        assert_eq!(add_months(date!(2024 - 01 - 31), 1), Ok(date!(2024 - 02 - 29)));
        assert_eq!(add_months(date!(2025 - 03 - 31), 1), Ok(date!(2025 - 04 - 30)));
    }

    #[test]
    fn zero_months_is_same_date() {
        assert_eq!(add_months(date!(2025 - 06 - 30), 0), Ok(date!(2025 - 06 - 30)));
    }
}
