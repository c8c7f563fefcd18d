use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::{
        ledger::newest_first,
        transaction::{Transaction, TransactionKind, TransactionStatus},
    },
    error::Result,
};

/// Parse [`Transaction`]s from a reader.
///
/// This function assumes the content is a valid CSV, otherwise it will throw an
/// error.
/// Rows repeating an already seen id are dropped, the first one wins: the
/// ledger is append-only so a repeated id means the file was written twice.
/// Negative amounts are rejected.
pub fn read(reader: impl Read) -> Result<Vec<Transaction>> {
    let txns: Vec<Transaction> = Reader::from_reader(reader)
        .into_deserialize()
        .collect::<csv::Result<_>>()?;

    for tx in &txns {
        tx.check_amount()?;
    }

    Ok(txns.into_iter().unique_by(|tx| tx.id).collect())
}

pub fn write<'a>(txns: impl IntoIterator<Item = &'a Transaction>, writer: impl Write) -> Result<()> {
    let mut writer = Writer::from_writer(writer);

    for tx in txns {
        writer.serialize(tx)?;
    }

    writer.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct StatementLine<'a> {
    date: DateTime<Utc>,
    id: Uuid,
    #[serde(rename = "type")]
    kind: TransactionKind,
    status: TransactionStatus,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
    description: &'a str,
}

/// Account statement export: signed amounts, newest first.
pub fn write_statement(txns: Vec<Transaction>, writer: impl Write) -> Result<()> {
    let mut writer = Writer::from_writer(writer);

    for tx in &newest_first(txns) {
        writer.serialize(StatementLine {
            date: tx.created_at,
            id: tx.id,
            kind: tx.kind,
            status: tx.status,
            amount: tx.signed_amount(),
            description: tx.description.as_deref().unwrap_or("-"),
        })?;
    }

    writer.flush()?;
    Ok(())
}
