use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::transaction::TransactionStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("withdrawal amount must be a positive number")]
    InvalidAmount,
    #[error("requested {requested} but only {available} is available")]
    InsufficientBalance { requested: Decimal, available: Decimal },
    #[error("transaction amount {amount} is negative")]
    NegativeAmount { amount: Decimal },
    #[error("a payout key is required to receive the withdrawal")]
    MissingPayoutKey,
    #[error("transaction cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: TransactionStatus,
        to: TransactionStatus,
    },
    #[error("transaction {id} does not exist")]
    UnknownTransaction { id: Uuid },
}

pub type Result<T> = std::result::Result<T, Error>;
