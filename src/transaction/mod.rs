//! Income and expense transactions, including purchases split into installments.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod installments;
mod list_endpoint;
mod query;

pub use core::{
    InstallmentPosition, PaymentMethod, Transaction, TransactionBuilder, TransactionUpdate,
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    map_transaction_row, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::update_transaction_endpoint;
pub use installments::{MAX_INSTALLMENTS, add_months, create_installments, split_amount};
pub use list_endpoint::list_transactions_endpoint;
pub use query::{TransactionFilters, get_transactions};
