use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{Error, Result};

#[derive(Debug, Deserialize, Serialize, Hash, PartialEq, Eq, Clone, Copy, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Cashback,
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    /// Cashback and deposits credit the ledger, withdrawals debit it.
    pub fn is_inflow(self) -> bool {
        matches!(self, Self::Cashback | Self::Deposit)
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cashback => write!(f, "cashback"),
            Self::Deposit => write!(f, "deposit"),
            Self::Withdrawal => write!(f, "withdrawal"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Hash, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// `pending -> completed | failed`, nothing leaves a terminal state.
    pub fn can_transition_to(self, next: Self) -> bool {
        !self.is_terminal() && next.is_terminal()
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A ledger row. Amounts are never negative, the direction comes from `kind`.
#[derive(Debug, Deserialize, Serialize, Hash, PartialEq, Eq, Clone)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn signed_amount(&self) -> Decimal {
        if self.kind.is_inflow() {
            self.amount
        } else {
            -self.amount
        }
    }

    /// Rows coming from storage must keep a non-negative amount.
    pub fn check_amount(&self) -> Result<()> {
        ensure_non_negative(self.amount)
    }

    /// Applies an external approval outcome.
    pub fn transition(&mut self, next: TransactionStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }

        self.status = next;
        Ok(())
    }
}

/// Record handed to a store to be appended. The store owns `id`,
/// `created_at` and stamps the owner from the session.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub status: Option<TransactionStatus>,
    pub description: Option<String>,
}

impl NewTransaction {
    /// Materializes the record with store-assigned fields. Missing status
    /// defaults to pending.
    pub fn into_transaction(
        self,
        id: Uuid,
        user_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<Transaction> {
        ensure_non_negative(self.amount)?;

        Ok(Transaction {
            id,
            user_id,
            kind: self.kind,
            amount: self.amount,
            status: self.status.unwrap_or_default(),
            description: self.description,
            created_at,
        })
    }
}

fn ensure_non_negative(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(Error::NegativeAmount { amount });
    }

    Ok(())
}
