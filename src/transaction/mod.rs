//! Transaction storage and listing.
//!
//! This module contains everything related to the transaction records:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing and querying transactions
//! - The handler for the paginated, searchable transaction listing

mod core;
mod query;
mod transactions_endpoint;

pub use self::core::{
    Transaction, TransactionBuilder, count_transactions, create_transaction,
    create_transaction_table,
};
pub use query::{
    TransactionFilter, TransactionPage, count_transactions_without_sale_date,
    get_transactions_in_month, query_transactions,
};
pub use transactions_endpoint::{TransactionsQuery, get_transactions, list_transactions};
