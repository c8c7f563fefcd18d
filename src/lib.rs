//! Cashback wallet ledger: balances derived from a user's transaction
//! history and validated withdrawal requests.

pub mod config;
pub mod csv;
pub mod domain;
pub mod error;
pub mod store;

pub use domain::{
    ledger::{
        compute_balance, compute_inflows, compute_outflows, compute_pending_net, LedgerSummary,
    },
    transaction::{NewTransaction, Transaction, TransactionKind, TransactionStatus},
    withdrawal::{
        create_withdrawal_request, request_withdrawal, validate_withdrawal, AmountInput,
        PayoutMethod, WithdrawalRequest,
    },
};
pub use error::{Error, Result};
pub use store::{CsvStore, InMemoryStore, Session, TransactionStore};
