//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/debts/{debt_id}', use [format_endpoint].

/// The liveness check.
pub const HEALTH: &str = "/health";
/// The route for static uploaded images.
pub const UPLOADS: &str = "/uploads";

/// The route for registering a new user.
pub const REGISTER: &str = "/api/v1/auth/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/v1/auth/login";
/// The route for exchanging a refresh token for a new token pair.
pub const REFRESH: &str = "/api/v1/auth/refresh";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/v1/auth/logout";
/// The route for getting the current user.
pub const ME: &str = "/api/v1/auth/me";

/// The route for setting the user's initial balance.
pub const ONBOARDING_INITIAL_BALANCE: &str = "/api/v1/onboarding/initial-balance";
/// The route for the dashboard summary.
pub const DASHBOARD_SUMMARY: &str = "/api/v1/dashboard/summary";

/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/v1/categories";
/// The route to update or delete a category.
pub const CATEGORY: &str = "/api/v1/categories/{category_id}";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/v1/transactions";
/// The route to update or delete a transaction.
pub const TRANSACTION: &str = "/api/v1/transactions/{transaction_id}";

/// The route to list and create recurring incomes.
pub const RECURRING_INCOMES: &str = "/api/v1/recurring-incomes";
/// The route to update or delete a recurring income.
pub const RECURRING_INCOME: &str = "/api/v1/recurring-incomes/{recurring_id}";
/// The route to create this month's transaction for every active recurring income.
pub const RECURRING_INCOMES_APPLY_ALL: &str = "/api/v1/recurring-incomes/create-all-transactions";
/// The route to create this month's transaction for one recurring income.
pub const RECURRING_INCOME_APPLY: &str = "/api/v1/recurring-incomes/{recurring_id}/create-transaction";

/// The route to list and create recurring expenses.
pub const RECURRING_EXPENSES: &str = "/api/v1/recurring-expenses";
/// The route to update or delete a recurring expense.
pub const RECURRING_EXPENSE: &str = "/api/v1/recurring-expenses/{recurring_id}";
/// The route to create this month's transaction for every active recurring expense.
pub const RECURRING_EXPENSES_APPLY_ALL: &str =
    "/api/v1/recurring-expenses/create-all-transactions";
/// The route to create this month's transaction for one recurring expense.
pub const RECURRING_EXPENSE_APPLY: &str =
    "/api/v1/recurring-expenses/{recurring_id}/create-transaction";

/// The route to list and create debts.
pub const DEBTS: &str = "/api/v1/debts";
/// The route to update or delete a debt.
pub const DEBT: &str = "/api/v1/debts/{debt_id}";
/// The route to mark a debt as paid.
pub const DEBT_MARK_PAID: &str = "/api/v1/debts/{debt_id}/mark-paid";
/// The route to reopen a paid debt.
pub const DEBT_UNMARK_PAID: &str = "/api/v1/debts/{debt_id}/unmark-paid";

/// The route to list and create receivables.
pub const RECEIVABLES: &str = "/api/v1/receivables";
/// The route to update or delete a receivable.
pub const RECEIVABLE: &str = "/api/v1/receivables/{receivable_id}";
/// The route to mark a receivable as received.
pub const RECEIVABLE_MARK_RECEIVED: &str = "/api/v1/receivables/{receivable_id}/mark-received";
/// The route to reopen a received receivable.
pub const RECEIVABLE_UNMARK_RECEIVED: &str =
    "/api/v1/receivables/{receivable_id}/unmark-received";

/// The route to list and create wishlist items.
pub const WISHLIST: &str = "/api/v1/wishlist";
/// The route to get, update or delete a wishlist item.
pub const WISHLIST_ITEM: &str = "/api/v1/wishlist/{item_id}";

/// The route to list and create piggy banks.
pub const PIGGY_BANKS: &str = "/api/v1/piggy-banks";
/// The route to get, update or delete a piggy bank.
pub const PIGGY_BANK: &str = "/api/v1/piggy-banks/{piggy_bank_id}";
/// The route to list and record piggy bank deposits and withdrawals.
pub const PIGGY_BANK_TRANSACTIONS: &str = "/api/v1/piggy-banks/{piggy_bank_id}/transactions";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::HEALTH,
            endpoints::UPLOADS,
            endpoints::REGISTER,
            endpoints::LOG_IN,
            endpoints::REFRESH,
            endpoints::LOG_OUT,
            endpoints::ME,
            endpoints::ONBOARDING_INITIAL_BALANCE,
            endpoints::DASHBOARD_SUMMARY,
            endpoints::CATEGORIES,
            endpoints::TRANSACTIONS,
            endpoints::RECURRING_INCOMES,
            endpoints::RECURRING_INCOMES_APPLY_ALL,
            endpoints::RECURRING_EXPENSES,
            endpoints::RECURRING_EXPENSES_APPLY_ALL,
            endpoints::DEBTS,
            endpoints::RECEIVABLES,
            endpoints::WISHLIST,
            endpoints::PIGGY_BANKS,
        ] {
            assert_endpoint_is_valid_uri(endpoint);
        }
    }

    #[test]
    fn formatted_endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::CATEGORY,
            endpoints::TRANSACTION,
            endpoints::RECURRING_INCOME,
            endpoints::RECURRING_INCOME_APPLY,
            endpoints::RECURRING_EXPENSE,
            endpoints::RECURRING_EXPENSE_APPLY,
            endpoints::DEBT,
            endpoints::DEBT_MARK_PAID,
            endpoints::DEBT_UNMARK_PAID,
            endpoints::RECEIVABLE,
            endpoints::RECEIVABLE_MARK_RECEIVED,
            endpoints::RECEIVABLE_UNMARK_RECEIVED,
            endpoints::WISHLIST_ITEM,
            endpoints::PIGGY_BANK,
            endpoints::PIGGY_BANK_TRANSACTIONS,
        ] {
            assert_endpoint_is_valid_uri(&format_endpoint(endpoint, 42));
        }
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/debts/{debt_id}/mark-paid", 1);

        assert_eq!(formatted_path, "/debts/1/mark-paid");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
