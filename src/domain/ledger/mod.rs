use itertools::Itertools;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::transaction::{Transaction, TransactionKind, TransactionStatus};

/// Available balance: completed inflows minus completed withdrawals.
///
/// Pending and failed transactions never count. An empty ledger yields zero.
/// Every figure in this module saturates at the `Decimal` range instead of
/// overflowing.
pub fn compute_balance<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> Decimal {
    signed_sum(txns, TransactionStatus::Completed)
}

/// Completed cashback and deposits.
pub fn compute_inflows<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> Decimal {
    txns.into_iter()
        .filter(|tx| tx.status == TransactionStatus::Completed && tx.kind.is_inflow())
        .fold(Decimal::ZERO, |acc, tx| acc.saturating_add(tx.amount))
}

/// Completed withdrawals.
pub fn compute_outflows<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> Decimal {
    txns.into_iter()
        .filter(|tx| {
            tx.status == TransactionStatus::Completed && tx.kind == TransactionKind::Withdrawal
        })
        .fold(Decimal::ZERO, |acc, tx| acc.saturating_add(tx.amount))
}

/// Money in flight: pending transactions with the balance sign convention.
pub fn compute_pending_net<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> Decimal {
    signed_sum(txns, TransactionStatus::Pending)
}

fn signed_sum<'a>(
    txns: impl IntoIterator<Item = &'a Transaction>,
    status: TransactionStatus,
) -> Decimal {
    txns.into_iter()
        .filter(|tx| tx.status == status)
        .fold(Decimal::ZERO, |acc, tx| acc.saturating_add(tx.signed_amount()))
}

/// History view for a single kind, keeping the input order.
pub fn filter_by_kind(txns: &[Transaction], kind: TransactionKind) -> Vec<&Transaction> {
    txns.iter().filter(|tx| tx.kind == kind).collect()
}

/// Newest first. Ties keep their relative order.
pub fn newest_first(mut txns: Vec<Transaction>) -> Vec<Transaction> {
    txns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    txns
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct LedgerSummary {
    pub balance: Decimal,
    pub inflows: Decimal,
    pub outflows: Decimal,
    pub pending_net: Decimal,
}

impl LedgerSummary {
    /// Always a full recompute over the given transactions.
    pub fn from_transactions(txns: &[Transaction]) -> Self {
        let summary = Self {
            balance: compute_balance(txns),
            inflows: compute_inflows(txns),
            outflows: compute_outflows(txns),
            pending_net: compute_pending_net(txns),
        };

        tracing::debug!(
            transactions = txns.len(),
            balance = %summary.balance,
            pending = %summary.pending_net,
            "ledger summarized"
        );

        summary
    }

    /// Summaries for every user found in a mixed ledger, ordered by user id.
    pub fn per_user(txns: impl IntoIterator<Item = Transaction>) -> Vec<(Uuid, Self)> {
        txns.into_iter()
            .into_group_map_by(|tx| tx.user_id)
            .into_iter()
            .map(|(user, txns)| (user, Self::from_transactions(&txns)))
            .sorted_by_key(|(user, _)| *user)
            .collect()
    }
}
