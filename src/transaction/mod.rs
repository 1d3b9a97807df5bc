//! Transactions and the balance ledger updater.
//!
//! The only entity whose writes have a side effect on another entity: every
//! create, update and delete also adjusts the owning account's balance, inside
//! one atomic unit.

mod core;
mod endpoints;
mod ledger;

pub use core::{
    NewTransaction, Transaction, TransactionFilter, TransactionId, TransactionKind,
    create_transaction_table, get_transaction, get_transactions, map_transaction_row,
};
pub use endpoints::{
    TransactionData, create_transaction_endpoint, delete_transaction_endpoint,
    get_transactions_endpoint, update_transaction_endpoint,
};
pub use ledger::{balance_delta, create_transaction, delete_transaction, update_transaction};
