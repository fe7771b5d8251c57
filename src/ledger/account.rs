use tracing::warn;

use crate::Amount;
use crate::ledger::AccountError;
use crate::model::{AccountId, EntryKind, LogEntry};

/// A named balance with its append-only transaction log.
#[derive(Debug, Clone)]
pub struct Account {
    id: AccountId,
    owner: String,
    balance: Amount,
    log: Vec<LogEntry>,
}

impl Account {
    /// Create an account; the log starts with a single `Created` entry.
    ///
    /// A negative initial balance is accepted but reported.
    pub fn new(id: impl Into<AccountId>, owner: impl Into<String>, initial: Amount) -> Self {
        let id = id.into();
        if initial.is_negative() {
            warn!(account = %id, initial = %initial, "account opened with negative balance");
        }
        Self {
            id,
            owner: owner.into(),
            balance: initial,
            log: vec![LogEntry::new(EntryKind::Created, initial, initial)],
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Read-only view of the log, oldest entry first.
    pub fn transaction_log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Credit `amount`. Deposits have no cap; only an `i64` overflow of the
    /// balance is refused, and then neither balance nor log change.
    pub fn deposit(&mut self, amount: Amount) -> Result<(), AccountError> {
        if amount.is_negative() {
            warn!(account = %self.id, amount = %amount, "negative deposit");
        }
        self.balance = self.credited(amount)?;
        self.log
            .push(LogEntry::new(EntryKind::Deposit, amount, self.balance));
        Ok(())
    }

    /// Debit `amount` if the balance covers it.
    ///
    /// A withdrawal rejected for insufficient funds is still recorded as
    /// `WithdrawFailed`; an overflow leaves the log untouched.
    pub fn withdraw(&mut self, amount: Amount) -> Result<(), AccountError> {
        if self.balance < amount {
            self.log
                .push(LogEntry::new(EntryKind::WithdrawFailed, amount, self.balance));
            return Err(AccountError::InsufficientFunds {
                available: self.balance,
                requested: amount,
            });
        }

        let overflow = AccountError::Overflow {
            balance: self.balance,
            amount,
        };
        let debit = amount.checked_neg().ok_or(overflow)?;
        let balance = self.balance.checked_sub(amount).ok_or(overflow)?;

        self.balance = balance;
        self.log
            .push(LogEntry::new(EntryKind::Withdraw, debit, self.balance));
        Ok(())
    }

    /// Balance after crediting `amount`, without applying it.
    pub(crate) fn credited(&self, amount: Amount) -> Result<Amount, AccountError> {
        self.balance
            .checked_add(amount)
            .ok_or(AccountError::Overflow {
                balance: self.balance,
                amount,
            })
    }

    /// `amount` is positive; the ledger rejects anything else before a transfer.
    pub(crate) fn record_transfer_out(&mut self, to: &str, amount: Amount) {
        let debit = amount.checked_neg().unwrap_or(Amount::ZERO);
        self.log.push(LogEntry::transfer(
            EntryKind::TransferOut,
            to,
            debit,
            self.balance,
        ));
    }

    pub(crate) fn record_transfer_in(&mut self, from: &str, amount: Amount) {
        self.log.push(LogEntry::transfer(
            EntryKind::TransferIn,
            from,
            amount,
            self.balance,
        ));
    }
}
