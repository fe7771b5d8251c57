//! Core domain types for the ledger.

use serde::Serialize;
use std::fmt;

use crate::Amount;

/// Account identifier.
pub type AccountId = String;

/// Kind of event recorded in an account's transaction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    Created,
    Deposit,
    Withdraw,
    /// A withdrawal rejected for insufficient funds; the balance is unchanged.
    WithdrawFailed,
    TransferOut,
    TransferIn,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryKind::Created => "CREATED",
            EntryKind::Deposit => "DEPOSIT",
            EntryKind::Withdraw => "WITHDRAW",
            EntryKind::WithdrawFailed => "WITHDRAW FAILED",
            EntryKind::TransferOut => "TRANSFER OUT",
            EntryKind::TransferIn => "TRANSFER IN",
        };
        f.write_str(label)
    }
}

/// Immutable record of one balance-affecting (or failed) event.
///
/// `amount` is the signed effect on the balance, except for `Created` (the
/// initial balance) and `WithdrawFailed` (the requested amount).
/// `balance` is the balance right after the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub kind: EntryKind,
    pub amount: Amount,
    pub balance: Amount,
    /// The other side of a transfer.
    pub counterparty: Option<AccountId>,
}

impl LogEntry {
    pub fn new(kind: EntryKind, amount: Amount, balance: Amount) -> Self {
        Self {
            kind,
            amount,
            balance,
            counterparty: None,
        }
    }

    pub fn transfer(
        kind: EntryKind,
        counterparty: &str,
        amount: Amount,
        balance: Amount,
    ) -> Self {
        Self {
            kind,
            amount,
            balance,
            counterparty: Some(counterparty.to_owned()),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind)?;
        match (&self.kind, &self.counterparty) {
            (EntryKind::TransferOut, Some(to)) => write!(f, " to {to}")?,
            (EntryKind::TransferIn, Some(from)) => write!(f, " from {from}")?,
            _ => {}
        }
        let sign = if self.amount.is_negative() { "" } else { "+" };
        match self.kind {
            EntryKind::Created | EntryKind::WithdrawFailed => write!(f, " {}", self.amount)?,
            _ => write!(f, " {sign}{}", self.amount)?,
        }
        write!(f, " | balance: {}", self.balance)
    }
}

/// A command representing the possible inputs of the ledger.
#[derive(Debug, Clone)]
pub enum Command {
    /// Create (or replace) an account with an initial balance.
    Open {
        account: AccountId,
        owner: String,
        initial: Amount,
    },
    /// Credit funds to an account.
    Deposit { account: AccountId, amount: Amount },
    /// Debit funds from an account, if it holds enough.
    Withdrawal { account: AccountId, amount: Amount },
    /// Move funds between two accounts, all or nothing.
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Amount,
    },
}
