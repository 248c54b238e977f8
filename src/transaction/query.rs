//! Database query helpers for listing transactions.

use rusqlite::{Connection, ToSql};
use serde::Deserialize;
use time::Date;

use crate::{
    Error, UserID,
    category::CategoryType,
    database_id::CategoryId,
    transaction::{Transaction, core::TRANSACTION_SELECT, map_transaction_row},
};

/// Optional filters for listing transactions. Every filter that is set must match.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    /// Only include transactions on or after this date.
    pub start_date: Option<Date>,
    /// Only include transactions on or before this date.
    pub end_date: Option<Date>,
    /// Only include transactions in this category.
    pub category_id: Option<CategoryId>,
    /// Only include incomes or only expenses.
    #[serde(rename = "type")]
    pub transaction_type: Option<CategoryType>,
    /// Only include transactions with this importance flag.
    pub is_important: Option<bool>,
}

/// Get the user's transactions matching `filters`, newest first.
///
/// Transactions on the same date are ordered by ID so the order stays stable
/// after updates.
///
/// # Errors
/// Returns [Error::InvalidDateRange] if the end date is before the start date,
/// or [Error::SqlError] if the query fails.
pub fn get_transactions(
    user_id: UserID,
    filters: &TransactionFilters,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    if let (Some(start), Some(end)) = (filters.start_date, filters.end_date) {
        if end < start {
            return Err(Error::InvalidDateRange);
        }
    }

    let user_id = user_id.as_i64();
    let mut clauses = vec!["t.user_id = ?"];
    let mut params: Vec<&dyn ToSql> = vec![&user_id];

    if let Some(start_date) = &filters.start_date {
        clauses.push("t.date >= ?");
        params.push(start_date);
    }

    if let Some(end_date) = &filters.end_date {
        clauses.push("t.date <= ?");
        params.push(end_date);
    }

    if let Some(category_id) = &filters.category_id {
        clauses.push("t.category_id = ?");
        params.push(category_id);
    }

    if let Some(transaction_type) = &filters.transaction_type {
        clauses.push("t.type = ?");
        params.push(transaction_type);
    }

    if let Some(is_important) = &filters.is_important {
        clauses.push("t.is_important = ?");
        params.push(is_important);
    }

    let query = format!(
        "{TRANSACTION_SELECT} WHERE {} ORDER BY t.date DESC, t.id DESC",
        clauses.join(" AND ")
    );

    connection
        .prepare(&query)?
        .query_map(params.as_slice(), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        Error,
        category::{CategoryName, CategoryType, create_category, find_or_create_unspecified},
        test_utils::{must_create_test_user, must_create_user, must_open_test_db},
        transaction::{Transaction, create_transaction},
    };

    use super::{TransactionFilters, get_transactions};

    #[test]
    fn orders_by_date_descending() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let category = find_or_create_unspecified(CategoryType::Expense, &conn).unwrap();
        for date in [date!(2025 - 01 - 02), date!(2025 - 01 - 03), date!(2025 - 01 - 01)] {
            create_transaction(
                Transaction::build(CategoryType::Expense, 1.0, date, category),
                user.id,
                &conn,
            )
            .unwrap();
        }

        let got = get_transactions(user.id, &TransactionFilters::default(), &conn).unwrap();

        assert_eq!(
            got.iter().map(|t| t.date).collect::<Vec<_>>(),
            vec![date!(2025 - 01 - 03), date!(2025 - 01 - 02), date!(2025 - 01 - 01)]
        );
    }

    #[test]
    fn filters_are_combined() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let expense = find_or_create_unspecified(CategoryType::Expense, &conn).unwrap();
        let income = find_or_create_unspecified(CategoryType::Income, &conn).unwrap();
        let pets = create_category(
            &CategoryName::new_unchecked("Pets"),
            CategoryType::Expense,
            user.id,
            &conn,
        )
        .unwrap();
        let want = create_transaction(
            Transaction::build(CategoryType::Expense, 20.0, date!(2025 - 02 - 10), pets.id)
                .is_important(true),
            user.id,
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(CategoryType::Expense, 20.0, date!(2025 - 02 - 11), pets.id),
            user.id,
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(CategoryType::Expense, 20.0, date!(2025 - 02 - 12), expense)
                .is_important(true),
            user.id,
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(CategoryType::Income, 20.0, date!(2025 - 03 - 01), income)
                .is_important(true),
            user.id,
            &conn,
        )
        .unwrap();

        let got = get_transactions(
            user.id,
            &TransactionFilters {
                start_date: Some(date!(2025 - 02 - 01)),
                end_date: Some(date!(2025 - 02 - 28)),
                category_id: Some(pets.id),
                transaction_type: Some(CategoryType::Expense),
                is_important: Some(true),
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![want]);
    }

    #[test]
    fn excludes_other_users() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);
        let other_user = must_create_user("other@example.com", &conn);
        let category = find_or_create_unspecified(CategoryType::Expense, &conn).unwrap();
        create_transaction(
            Transaction::build(CategoryType::Expense, 1.0, date!(2025 - 01 - 01), category),
            other_user.id,
            &conn,
        )
        .unwrap();

        let got = get_transactions(user.id, &TransactionFilters::default(), &conn).unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn rejects_reversed_date_range() {
        let conn = must_open_test_db();
        let user = must_create_test_user(&conn);

        let result = get_transactions(
            user.id,
            &TransactionFilters {
                start_date: Some(date!(2025 - 02 - 01)),
                end_date: Some(date!(2025 - 01 - 01)),
                ..Default::default()
            },
            &conn,
        );

        assert_eq!(result, Err(Error::InvalidDateRange));
    }
}
