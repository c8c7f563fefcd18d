use std::str::FromStr;

use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{
    error::{Error, Result},
    ledger::compute_balance,
    transaction::{NewTransaction, Transaction, TransactionKind, TransactionStatus},
};
use crate::store::{Session, TransactionStore};

/// Where the withdrawn money is sent.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PayoutMethod {
    /// Instant payment alias (CPF, e-mail, phone or random key).
    #[default]
    Pix,
    /// Bank, branch and account.
    Bank,
}

impl std::fmt::Display for PayoutMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pix => write!(f, "pix"),
            Self::Bank => write!(f, "bank"),
        }
    }
}

/// Amount as typed by the user or already parsed.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AmountInput {
    Text(String),
    Value(Decimal),
}

impl AmountInput {
    /// Strictly parsed amount; `None` when the text is not a number.
    fn parse(&self) -> Option<Decimal> {
        match self {
            Self::Text(text) => Decimal::from_str(text.trim()).ok(),
            Self::Value(value) => Some(*value),
        }
    }
}

impl From<&str> for AmountInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for AmountInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Decimal> for AmountInput {
    fn from(value: Decimal) -> Self {
        Self::Value(value)
    }
}

/// A withdrawal that passed validation and is ready to be appended.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct WithdrawalRequest {
    pub amount: Decimal,
    pub method: PayoutMethod,
    pub payout_key: String,
    pub status: TransactionStatus,
}

impl WithdrawalRequest {
    pub fn via(mut self, method: PayoutMethod) -> Self {
        self.method = method;
        self
    }

    pub fn description(&self) -> String {
        format!("Withdrawal via {}: {}", self.method, self.payout_key)
    }

    fn into_record(self) -> NewTransaction {
        NewTransaction {
            kind: TransactionKind::Withdrawal,
            amount: self.amount,
            status: Some(self.status),
            description: Some(self.description()),
        }
    }
}

/// Checks a withdrawal against the available balance.
///
/// Rules are checked in order and the first failure is reported: the amount
/// must be a positive number, must not exceed `current_balance`, and a payout
/// key must be given. The key is trimmed and the method defaults to
/// [`PayoutMethod::Pix`].
pub fn validate_withdrawal(
    amount: impl Into<AmountInput>,
    current_balance: Decimal,
    payout_key: &str,
) -> Result<WithdrawalRequest> {
    let amount: AmountInput = amount.into();
    let amount = amount
        .parse()
        .filter(|amount| *amount > Decimal::ZERO)
        .ok_or(Error::InvalidAmount)?;

    if amount > current_balance {
        return Err(Error::InsufficientBalance {
            requested: amount,
            available: current_balance,
        });
    }

    let payout_key = payout_key.trim();
    if payout_key.is_empty() {
        return Err(Error::MissingPayoutKey);
    }

    Ok(WithdrawalRequest {
        amount: amount.normalize(),
        method: PayoutMethod::default(),
        payout_key: payout_key.to_owned(),
        status: TransactionStatus::Pending,
    })
}

/// Appends the request as a pending withdrawal owned by the session user.
///
/// Store failures are returned as they are; nothing is retried.
pub fn create_withdrawal_request<S: TransactionStore + ?Sized>(
    store: &mut S,
    session: &Session,
    request: WithdrawalRequest,
) -> crate::error::Result<Transaction> {
    store.append_transaction(session, request.into_record())
}

/// Fetches the session user's ledger, recomputes the balance from scratch,
/// validates and appends the withdrawal.
pub fn request_withdrawal<S: TransactionStore + ?Sized>(
    store: &mut S,
    session: &Session,
    amount: impl Into<AmountInput>,
    method: PayoutMethod,
    payout_key: &str,
) -> crate::error::Result<Transaction> {
    let txns = store.list_transactions(session)?;
    let balance = compute_balance(&txns);

    let request = validate_withdrawal(amount, balance, payout_key)
        .inspect_err(|err| {
            tracing::warn!(user = %session.user_id, %balance, %err, "withdrawal rejected");
        })?
        .via(method);

    create_withdrawal_request(store, session, request)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;
    use crate::{domain::ledger::compute_pending_net, store::InMemoryStore};

    #[rstest]
    #[case::negative(AmountInput::Value(dec!(-5)), dec!(100), "x", Error::InvalidAmount)]
    #[case::zero(AmountInput::Value(dec!(0)), dec!(100), "x", Error::InvalidAmount)]
    #[case::unparseable("abc".into(), dec!(100), "x", Error::InvalidAmount)]
    #[case::blank_amount("  ".into(), dec!(100), "x", Error::InvalidAmount)]
    #[case::over_balance(
        AmountInput::Value(dec!(150)),
        dec!(100),
        "x",
        Error::InsufficientBalance { requested: dec!(150), available: dec!(100) }
    )]
    #[case::empty_key(AmountInput::Value(dec!(50)), dec!(100), "", Error::MissingPayoutKey)]
    #[case::blank_key(AmountInput::Value(dec!(50)), dec!(100), "   ", Error::MissingPayoutKey)]
    #[case::amount_checked_first(AmountInput::Value(dec!(-1)), dec!(0), "", Error::InvalidAmount)]
    #[case::balance_before_key(
        AmountInput::Value(dec!(10)),
        dec!(5),
        "",
        Error::InsufficientBalance { requested: dec!(10), available: dec!(5) }
    )]
    fn rejects_invalid_withdrawals(
        #[case] amount: AmountInput,
        #[case] balance: Decimal,
        #[case] key: &str,
        #[case] expected: Error,
    ) {
        assert_eq!(validate_withdrawal(amount, balance, key), Err(expected));
    }

    #[test]
    fn valid_withdrawal_is_pending() {
        let request = validate_withdrawal(dec!(50), dec!(100), "pix-key").unwrap();

        assert_eq!(request.amount, dec!(50));
        assert_eq!(request.status, TransactionStatus::Pending);
        assert_eq!(request.method, PayoutMethod::Pix);
        assert_eq!(request.payout_key, "pix-key");
    }

    #[test]
    fn text_amounts_are_trimmed_and_normalized() {
        let request = validate_withdrawal(" 25.50 ", dec!(25.5), " key ").unwrap();

        assert_eq!(request.amount, dec!(25.5));
        assert_eq!(request.amount.to_string(), "25.5");
        assert_eq!(request.payout_key, "key");
    }

    #[test]
    fn whole_balance_can_be_withdrawn() {
        assert!(validate_withdrawal(dec!(100), dec!(100), "k").is_ok());
    }

    #[test]
    fn description_encodes_method_and_key() {
        let request = validate_withdrawal(dec!(1), dec!(1), "001 1234 56789-0")
            .unwrap()
            .via(PayoutMethod::Bank);

        assert_eq!(request.description(), "Withdrawal via bank: 001 1234 56789-0");
    }

    #[test]
    fn payout_method_parses_case_insensitively() {
        assert_eq!(
            <PayoutMethod as ValueEnum>::from_str("PIX", true),
            Ok(PayoutMethod::Pix)
        );
        assert_eq!(
            <PayoutMethod as ValueEnum>::from_str("bank", true),
            Ok(PayoutMethod::Bank)
        );
        assert!(<PayoutMethod as ValueEnum>::from_str("wire", true).is_err());
    }

    #[test]
    fn created_withdrawal_moves_pending_not_balance() {
        let session = Session::new(Uuid::new_v4());
        let mut store = InMemoryStore::new();
        store
            .append_transaction(
                &session,
                NewTransaction {
                    kind: TransactionKind::Cashback,
                    amount: dec!(45.23),
                    status: Some(TransactionStatus::Completed),
                    description: None,
                },
            )
            .unwrap();

        let created =
            request_withdrawal(&mut store, &session, "20", PayoutMethod::Pix, "pix-key").unwrap();

        assert_eq!(created.kind, TransactionKind::Withdrawal);
        assert_eq!(created.status, TransactionStatus::Pending);
        assert_eq!(created.description.as_deref(), Some("Withdrawal via pix: pix-key"));

        let txns = store.list_transactions(&session).unwrap();
        assert_eq!(compute_balance(&txns), dec!(45.23));
        assert_eq!(compute_pending_net(&txns), dec!(-20));
    }

    #[test]
    fn rejected_request_appends_nothing() {
        let session = Session::new(Uuid::new_v4());
        let mut store = InMemoryStore::new();

        let err = request_withdrawal(&mut store, &session, "10", PayoutMethod::Pix, "k")
            .unwrap_err();

        assert!(matches!(
            err,
            crate::error::Error::BusinessError(Error::InsufficientBalance { .. })
        ));
        assert!(store.list_transactions(&session).unwrap().is_empty());
    }
}
