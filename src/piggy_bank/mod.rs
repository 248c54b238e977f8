//! Piggy banks: savings goals whose balance changes through deposits and withdrawals.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod movement;
mod movement_endpoint;
mod read;

pub use create::create_piggy_bank_endpoint;
pub use db::{
    RECENT_TRANSACTIONS_LIMIT, create_piggy_bank, create_piggy_bank_table, delete_piggy_bank,
    get_piggy_bank, get_piggy_bank_with_transactions, get_piggy_banks, update_piggy_bank,
};
pub use delete::delete_piggy_bank_endpoint;
pub use domain::{
    MovementForm, MovementType, NewPiggyBankForm, PeriodType, PiggyBank, PiggyBankTransaction,
    PiggyBankUpdate, PiggyBankWithTransactions,
};
pub use edit::update_piggy_bank_endpoint;
pub use movement::{
    add_transaction, create_piggy_bank_transaction_table, get_piggy_bank_transactions,
};
pub use movement_endpoint::{add_piggy_bank_transaction_endpoint, list_piggy_bank_transactions_endpoint};
pub use read::{get_piggy_bank_endpoint, list_piggy_banks_endpoint};

pub(crate) use movement::get_recent_transactions;
