//! Debts: money the user owes, tracked from open to paid.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;
mod mark_paid;

pub use create::create_debt_endpoint;
pub use db::{
    create_debt, create_debt_table, delete_debt, get_debt, get_debts, get_pending_debts,
    update_debt,
};
pub use delete::delete_debt_endpoint;
pub use domain::{Debt, DebtPriority, DebtStatus, DebtUpdate, NewDebtForm, Recurrence};
pub use edit::update_debt_endpoint;
pub use list::list_debts_endpoint;
pub use mark_paid::{mark_debt_paid_endpoint, unmark_debt_paid_endpoint};
