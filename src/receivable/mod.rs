//! Receivables: money owed to the user, tracked from open to received.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;
mod mark_received;

pub use create::create_receivable_endpoint;
pub use db::{
    create_receivable, create_receivable_table, delete_receivable, get_pending_receivables,
    get_receivable, get_receivables, update_receivable,
};
pub use delete::delete_receivable_endpoint;
pub use domain::{NewReceivableForm, Receivable, ReceivableStatus, ReceivableUpdate};
pub use edit::update_receivable_endpoint;
pub use list::list_receivables_endpoint;
pub use mark_received::{mark_receivable_received_endpoint, unmark_receivable_received_endpoint};
