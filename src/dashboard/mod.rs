//! The dashboard: balances, monthly figures and upcoming debts and receivables.

mod handlers;
mod summary;

pub use handlers::get_dashboard_summary_endpoint;
pub use summary::{DashboardSummary, PENDING_ITEMS_LIMIT, get_dashboard_summary};
