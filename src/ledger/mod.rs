//! Account ledger.
//!
//! The ledger owns every account and coordinates deposits, withdrawals and
//! transfers between them. Accounts are reported in insertion order.
//! Also supports async stream of commands.

use std::collections::HashMap;
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::Amount;
use crate::model::{AccountId, Command, LogEntry};

mod account;
pub use account::Account;

mod error;
pub use error::{AccountError, DepositError, LedgerError, TransferError, WithdrawalError};

mod shared;
pub use shared::SharedLedger;

/// The account ledger.
#[derive(Debug, Default)]
pub struct Ledger {
    accounts: Vec<Account>,
    /// Position of each account in `accounts`
    index: HashMap<AccountId, usize>,
}

/// Public API
impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the ledger with the given command stream
    pub async fn run(&mut self, mut stream: impl Stream<Item = Command> + Unpin) {
        while let Some(command) = stream.next().await {
            // a failed command never stops the ledger; `apply` already logged it
            let _ = self.apply(command);
        }
    }

    /// Insert an account keyed by its id.
    ///
    /// An existing account with the same id is replaced in place and returned.
    pub fn add_account(&mut self, account: Account) -> Option<Account> {
        match self.index.get(account.id()) {
            Some(&idx) => {
                warn!(account = %account.id(), "replacing existing account");
                Some(std::mem::replace(&mut self.accounts[idx], account))
            }
            None => {
                self.index
                    .insert(account.id().to_owned(), self.accounts.len());
                self.accounts.push(account);
                None
            }
        }
    }

    pub fn get_account(&self, id: &str) -> Option<&Account> {
        self.index.get(id).map(|&idx| &self.accounts[idx])
    }

    /// Return all accounts in insertion order.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> + '_ {
        self.accounts.iter()
    }

    /// `(id, owner, balance)` for every account, in insertion order.
    pub fn all_balances(&self) -> impl Iterator<Item = (&str, &str, Amount)> + '_ {
        self.accounts
            .iter()
            .map(|account| (account.id(), account.owner(), account.balance()))
    }

    /// Transaction log of one account
    pub fn history(&self, id: &str) -> Option<&[LogEntry]> {
        self.get_account(id).map(Account::transaction_log)
    }

    pub fn deposit(&mut self, id: &str, amount: Amount) -> Result<(), DepositError> {
        let account = self
            .get_account_mut(id)
            .ok_or_else(|| DepositError::AccountNotFound(id.to_owned()))?;
        account
            .deposit(amount)
            .map_err(|e| DepositError::Rejected(id.to_owned(), e))
    }

    pub fn withdraw(&mut self, id: &str, amount: Amount) -> Result<(), WithdrawalError> {
        let account = self
            .get_account_mut(id)
            .ok_or_else(|| WithdrawalError::AccountNotFound(id.to_owned()))?;
        account
            .withdraw(amount)
            .map_err(|e| WithdrawalError::Rejected(id.to_owned(), e))
    }

    /// Move `amount` from one account to another:
    /// - Ensure the amount is positive and both accounts exist
    /// - Ensure the destination can absorb the amount
    /// - Withdraw from the source (a rejection is logged there as `WithdrawFailed`)
    /// - Deposit on the destination
    /// - Record `TransferOut` / `TransferIn` legs on both sides
    ///
    /// The checks before the withdrawal have no side effects. `from == to` is
    /// allowed and leaves the balance unchanged.
    pub fn transfer(&mut self, from: &str, to: &str, amount: Amount) -> Result<(), TransferError> {
        if !amount.is_positive() {
            return Err(TransferError::InvalidAmount(amount));
        }

        let from_idx = *self
            .index
            .get(from)
            .ok_or_else(|| TransferError::AccountNotFound(from.to_owned()))?;
        let to_idx = *self
            .index
            .get(to)
            .ok_or_else(|| TransferError::AccountNotFound(to.to_owned()))?;

        if from_idx != to_idx {
            self.accounts[to_idx]
                .credited(amount)
                .map_err(|e| TransferError::Rejected(to.to_owned(), e))?;
        }

        self.accounts[from_idx]
            .withdraw(amount)
            .map_err(|e| TransferError::Rejected(from.to_owned(), e))?;

        // the destination was checked above and the source just gave up
        // `amount`, so this credit always fits
        self.accounts[to_idx]
            .deposit(amount)
            .map_err(|e| TransferError::Rejected(to.to_owned(), e))?;
        self.accounts[from_idx].record_transfer_out(to, amount);
        self.accounts[to_idx].record_transfer_in(from, amount);

        Ok(())
    }

    /// Apply a single command on top of the current ledger state
    pub fn apply(&mut self, command: Command) -> Result<(), LedgerError> {
        match command {
            Command::Open {
                account,
                owner,
                initial,
            } => {
                info!(account = %account, owner = %owner, initial = %initial, "open applied");
                self.add_account(Account::new(account, owner, initial));
            }
            Command::Deposit { account, amount } => {
                let result = self.deposit(&account, amount);
                Self::log_result("deposit", &account, None, amount, &result);
                result?;
            }
            Command::Withdrawal { account, amount } => {
                let result = self.withdraw(&account, amount);
                Self::log_result("withdrawal", &account, None, amount, &result);
                result?;
            }
            Command::Transfer { from, to, amount } => {
                let result = self.transfer(&from, &to, amount);
                Self::log_result("transfer", &from, Some(&to), amount, &result);
                result?;
            }
        }
        Ok(())
    }
}

/// Private API
impl Ledger {
    fn get_account_mut(&mut self, id: &str) -> Option<&mut Account> {
        let idx = *self.index.get(id)?;
        Some(&mut self.accounts[idx])
    }

    /// Small helper to log `apply` results
    fn log_result<E: std::fmt::Display>(
        kind: &str,
        account: &str,
        counterparty: Option<&str>,
        amount: Amount,
        result: &Result<(), E>,
    ) {
        match (result, counterparty) {
            (Ok(()), Some(to)) => {
                info!(account = %account, to = %to, amount = %amount, "{kind} applied");
            }
            (Ok(()), None) => {
                info!(account = %account, amount = %amount, "{kind} applied");
            }
            (Err(e), Some(to)) => {
                info!(
                    account = %account,
                    to = %to,
                    amount = %amount,
                    reason = %e,
                    "{kind} skipped"
                );
            }
            (Err(e), None) => {
                info!(account = %account, amount = %amount, reason = %e, "{kind} skipped");
            }
        }
    }
}
