//! The income and expense transactions logged against a budget period.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod new_transaction_page;
mod transactions_page;

pub use core::{
    Category, NewTransaction, Transaction, TransactionId, TransactionKind, create_transaction,
    create_transaction_table, delete_transaction, delete_transactions_for_user,
    get_transactions_for_period, get_transactions_for_user,
};
pub use create_endpoint::{CreateTransactionState, create_transaction_endpoint};
pub use delete_endpoint::{DeleteTransactionState, delete_transaction_endpoint};
pub use new_transaction_page::get_new_transaction_page;
pub use transactions_page::{TransactionsPageState, get_transactions_page};
