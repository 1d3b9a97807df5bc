//! Accounts: the places money lives and the balances the ledger keeps honest.

mod core;
mod endpoints;

pub use core::{
    Account, AccountId, AccountKind, NewAccount, create_account, create_account_table,
    delete_account, get_account, get_accounts, update_account,
};
pub use endpoints::{
    create_account_endpoint, delete_account_endpoint, get_accounts_endpoint,
    update_account_endpoint,
};
