pub mod amount;
pub mod csv;
pub mod ledger;
pub mod model;

pub use amount::Amount;
pub use ledger::{Account, Ledger, SharedLedger};
pub use model::{AccountId, Command, EntryKind, LogEntry};
