//! Ledger handle for concurrent callers.
//!
//! Every operation holds one lock for its whole duration: a transfer reads
//! and mutates both accounts inside a single critical section, and two
//! transfers over the same pair in opposite directions cannot deadlock.

use std::sync::Arc;
use tokio::sync::Mutex;

use super::{DepositError, Ledger, LedgerError, TransferError, WithdrawalError};
use crate::Amount;
use crate::model::{AccountId, Command, LogEntry};

/// Cloneable, lock-protected [`Ledger`]. Reads return owned snapshots.
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    pub async fn apply(&self, command: Command) -> Result<(), LedgerError> {
        self.inner.lock().await.apply(command)
    }

    pub async fn deposit(&self, id: &str, amount: Amount) -> Result<(), DepositError> {
        self.inner.lock().await.deposit(id, amount)
    }

    pub async fn withdraw(&self, id: &str, amount: Amount) -> Result<(), WithdrawalError> {
        self.inner.lock().await.withdraw(id, amount)
    }

    pub async fn transfer(&self, from: &str, to: &str, amount: Amount) -> Result<(), TransferError> {
        self.inner.lock().await.transfer(from, to, amount)
    }

    pub async fn balance(&self, id: &str) -> Option<Amount> {
        self.inner.lock().await.get_account(id).map(|a| a.balance())
    }

    /// Owned `(id, owner, balance)` rows in insertion order.
    pub async fn balances(&self) -> Vec<(AccountId, String, Amount)> {
        self.inner
            .lock()
            .await
            .all_balances()
            .map(|(id, owner, balance)| (id.to_owned(), owner.to_owned(), balance))
            .collect()
    }

    pub async fn history(&self, id: &str) -> Option<Vec<LogEntry>> {
        self.inner.lock().await.history(id).map(<[LogEntry]>::to_vec)
    }

    /// Recover the ledger once every other handle has been dropped.
    pub fn into_inner(self) -> Option<Ledger> {
        Arc::into_inner(self.inner).map(Mutex::into_inner)
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self::new(ledger)
    }
}
