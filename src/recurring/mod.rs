//! Recurring incomes and expenses: monthly templates that are turned into
//! transactions on demand.
//!
//! Both kinds share one table and one set of handlers. The handlers are
//! generic over [RecurringKind] and are routed once per kind.

mod apply;
mod apply_endpoint;
mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use apply::{AppliedItems, create_all_transactions, create_transaction_from_item};
pub use apply_endpoint::{apply_all_recurring_endpoint, apply_recurring_endpoint};
pub use create::create_recurring_endpoint;
pub use db::{
    create_recurring, create_recurring_table, delete_recurring, get_active_recurring_items,
    get_recurring, get_recurring_items, update_recurring,
};
pub use delete::delete_recurring_endpoint;
pub use domain::{
    Expenses, Incomes, NewRecurringForm, RecurringItem, RecurringKind, RecurringUpdate,
};
pub use edit::update_recurring_endpoint;
pub use list::list_recurring_endpoint;
