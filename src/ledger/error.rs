//! Error types for ledger operations.

use thiserror::Error;

use crate::Amount;
use crate::model::AccountId;

/// Top-level error returned by [`Ledger::apply`](super::Ledger::apply).
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("deposit failed: {0}")]
    Deposit(#[from] DepositError),

    #[error("withdrawal failed: {0}")]
    Withdrawal(#[from] WithdrawalError),

    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

/// Balance change refused by a single account. The balance is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: Amount, requested: Amount },

    #[error("balance {balance} cannot absorb {amount} without overflow")]
    Overflow { balance: Amount, amount: Amount },
}

/// Error during deposit processing.
#[derive(Debug, Error)]
pub enum DepositError {
    #[error("account {0} not found")]
    AccountNotFound(AccountId),
    #[error("account {0}: {1}")]
    Rejected(AccountId, AccountError),
}

/// Error during withdrawal processing.
#[derive(Debug, Error)]
pub enum WithdrawalError {
    #[error("account {0} not found")]
    AccountNotFound(AccountId),
    #[error("account {0}: {1}")]
    Rejected(AccountId, AccountError),
}

/// Error during transfer processing.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("transfer amount must be positive, got {0}")]
    InvalidAmount(Amount),
    #[error("account {0} not found")]
    AccountNotFound(AccountId),
    #[error("account {0}: {1}")]
    Rejected(AccountId, AccountError),
}
