//! Persistence seam for the ledger.
//!
//! Aggregations never talk to storage: callers fetch through a
//! [`TransactionStore`], summarize, and append new records through it.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use chrono::Utc;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::{
    domain::{
        error::Error as DomainError,
        ledger::newest_first,
        transaction::{NewTransaction, Transaction, TransactionStatus},
    },
    error::Result,
};

/// Who is acting. Passed explicitly to every store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
}

impl Session {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

pub trait TransactionStore {
    /// The session user's transactions, newest first.
    fn list_transactions(&self, session: &Session) -> Result<Vec<Transaction>>;

    /// Assigns id and creation time, stamps the session user as owner.
    fn append_transaction(
        &mut self,
        session: &Session,
        record: NewTransaction,
    ) -> Result<Transaction>;

    /// External approval outcome for a pending transaction.
    fn update_status(&mut self, id: Uuid, status: TransactionStatus) -> Result<Transaction>;
}

fn transition(txns: &mut [Transaction], id: Uuid, status: TransactionStatus) -> Result<Transaction> {
    let tx = txns
        .iter_mut()
        .find(|tx| tx.id == id)
        .ok_or(DomainError::UnknownTransaction { id })?;
    tx.transition(status)?;

    tracing::info!(%id, %status, "transaction status updated");
    Ok(tx.clone())
}

fn stamp(session: &Session, record: NewTransaction) -> Result<Transaction> {
    let tx = record.into_transaction(Uuid::new_v4(), session.user_id, Utc::now())?;
    tracing::info!(
        id = %tx.id,
        user = %tx.user_id,
        kind = %tx.kind,
        amount = %tx.amount,
        "transaction appended"
    );
    Ok(tx)
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    txns: Vec<Transaction>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transactions(txns: impl IntoIterator<Item = Transaction>) -> Self {
        Self {
            txns: txns.into_iter().collect(),
        }
    }
}

impl TransactionStore for InMemoryStore {
    fn list_transactions(&self, session: &Session) -> Result<Vec<Transaction>> {
        let owned = self
            .txns
            .iter()
            .filter(|tx| tx.user_id == session.user_id)
            .cloned()
            .collect();

        Ok(newest_first(owned))
    }

    fn append_transaction(
        &mut self,
        session: &Session,
        record: NewTransaction,
    ) -> Result<Transaction> {
        let tx = stamp(session, record)?;
        self.txns.push(tx.clone());
        Ok(tx)
    }

    fn update_status(&mut self, id: Uuid, status: TransactionStatus) -> Result<Transaction> {
        transition(&mut self.txns, id, status)
    }
}

/// Ledger kept in a single CSV file. A missing file is an empty ledger.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every row in the file, for all users.
    pub fn load(&self) -> Result<Vec<Transaction>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        crate::csv::read(File::open(&self.path)?)
    }

    /// Writes next to the ledger and renames over it, so a failed write
    /// leaves the previous file intact.
    fn save(&self, txns: &[Transaction]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir)?;
        crate::csv::write(txns, &mut file)?;
        file.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

impl TransactionStore for CsvStore {
    fn list_transactions(&self, session: &Session) -> Result<Vec<Transaction>> {
        let mut txns = self.load()?;
        txns.retain(|tx| tx.user_id == session.user_id);
        Ok(newest_first(txns))
    }

    fn append_transaction(
        &mut self,
        session: &Session,
        record: NewTransaction,
    ) -> Result<Transaction> {
        let mut txns = self.load()?;
        let tx = stamp(session, record)?;
        txns.push(tx.clone());
        self.save(&txns)?;
        Ok(tx)
    }

    fn update_status(&mut self, id: Uuid, status: TransactionStatus) -> Result<Transaction> {
        let mut txns = self.load()?;
        let tx = transition(&mut txns, id, status)?;
        self.save(&txns)?;
        Ok(tx)
    }
}
