use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::model::{EntryKind, LogEntry};
use crate::{Amount, Command};

/// Errors that can occur when reading or writing csv
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open command file: {0}")]
    Open(#[source] csv::Error),

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized command type '{kind}'")]
    UnrecognizedType { line: usize, kind: String },

    #[error("line {line}: {kind} missing amount")]
    MissingAmount { line: usize, kind: String },

    #[error("line {line}: {kind} amount {value} is not a representable amount")]
    InvalidAmount { line: usize, kind: String, value: f64 },

    #[error("line {line}: {kind} missing {field}")]
    MissingField {
        line: usize,
        kind: String,
        field: &'static str,
    },

    #[error("failed to write csv: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush csv: {0}")]
    Flush(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct InputRow {
    r#type: String,
    account: Option<String>,
    counterparty: Option<String>,
    owner: Option<String>,
    amount: Option<f64>,
}

#[derive(Debug, Serialize)]
struct BalanceRow<'a> {
    account: &'a str,
    owner: &'a str,
    balance: Amount,
}

#[derive(Debug, Serialize)]
struct HistoryRow<'a> {
    seq: usize,
    kind: EntryKind,
    amount: Amount,
    balance: Amount,
    counterparty: Option<&'a str>,
}

impl InputRow {
    fn required(
        value: Option<String>,
        line: usize,
        kind: &str,
        field: &'static str,
    ) -> Result<String, CsvError> {
        value.ok_or_else(|| CsvError::MissingField {
            line,
            kind: kind.to_string(),
            field,
        })
    }

    /// Parse the optional amount column; `None` when the column is empty.
    fn parsed_amount(&self, line: usize) -> Result<Option<Amount>, CsvError> {
        self.amount
            .map(|value| {
                Amount::try_from_float(value).ok_or_else(|| CsvError::InvalidAmount {
                    line,
                    kind: self.r#type.clone(),
                    value,
                })
            })
            .transpose()
    }

    fn amount(&self, line: usize) -> Result<Amount, CsvError> {
        self.parsed_amount(line)?
            .ok_or_else(|| CsvError::MissingAmount {
                line,
                kind: self.r#type.clone(),
            })
    }

    fn into_command(self, line: usize) -> Result<Command, CsvError> {
        let kind = self.r#type.as_str();
        match kind {
            "open" => Ok(Command::Open {
                initial: self.parsed_amount(line)?.unwrap_or_default(),
                owner: Self::required(self.owner, line, "open", "owner")?,
                account: Self::required(self.account, line, "open", "account")?,
            }),
            "deposit" => Ok(Command::Deposit {
                amount: self.amount(line)?,
                account: Self::required(self.account, line, "deposit", "account")?,
            }),
            "withdraw" | "withdrawal" => Ok(Command::Withdrawal {
                amount: self.amount(line)?,
                account: Self::required(self.account, line, "withdraw", "account")?,
            }),
            "transfer" => Ok(Command::Transfer {
                amount: self.amount(line)?,
                from: Self::required(self.account, line, "transfer", "account")?,
                to: Self::required(self.counterparty, line, "transfer", "counterparty")?,
            }),
            other => Err(CsvError::UnrecognizedType {
                line,
                kind: other.to_string(),
            }),
        }
    }
}

/// Read commands from a csv file.
///
/// Rows that fail to parse are yielded as errors and do not stop iteration.
pub fn read_commands(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Command, CsvError>>, CsvError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(CsvError::Open)?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            row.into_command(line)
        }))
}

/// Write `(account, owner, balance)` rows in csv format
pub fn write_balances<'a, W: io::Write>(
    writer: W,
    balances: impl IntoIterator<Item = (&'a str, &'a str, Amount)>,
) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(writer);

    for (account, owner, balance) in balances {
        writer.serialize(BalanceRow {
            account,
            owner,
            balance,
        })?;
    }

    writer.flush()?;
    Ok(())
}

/// Write an account's transaction log in csv format, oldest entry first
pub fn write_history<'a, W: io::Write>(
    writer: W,
    entries: impl IntoIterator<Item = &'a LogEntry>,
) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(writer);

    for (idx, entry) in entries.into_iter().enumerate() {
        writer.serialize(HistoryRow {
            seq: idx + 1,
            kind: entry.kind,
            amount: entry.amount,
            balance: entry.balance,
            counterparty: entry.counterparty.as_deref(),
        })?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Account, Ledger};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "type,account,counterparty,owner,amount\n";

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn read(body: &str) -> Vec<Result<Command, CsvError>> {
        let file = write_csv(&format!("{HEADER}{body}"));
        read_commands(file.path()).unwrap().collect()
    }

    #[test]
    fn read_open() {
        let results = read("open,A,,Alice,100\n");
        assert_eq!(results.len(), 1);

        match results.into_iter().next().unwrap().unwrap() {
            Command::Open {
                account,
                owner,
                initial,
            } => {
                assert_eq!(account, "A");
                assert_eq!(owner, "Alice");
                assert_eq!(initial, Amount::from_float(100.0));
            }
            other => panic!("expected open, got {other:?}"),
        }
    }

    #[test]
    fn read_open_without_amount_starts_at_zero() {
        let results = read("open,A,,Alice,\n");
        assert!(matches!(
            &results[0],
            Ok(Command::Open { initial, .. }) if *initial == Amount::ZERO
        ));
    }

    #[test]
    fn read_transfer() {
        let results = read("transfer,A,B,,10.5\n");

        match results.into_iter().next().unwrap().unwrap() {
            Command::Transfer { from, to, amount } => {
                assert_eq!(from, "A");
                assert_eq!(to, "B");
                assert_eq!(amount, Amount::from_float(10.5));
            }
            other => panic!("expected transfer, got {other:?}"),
        }
    }

    #[test]
    fn read_with_whitespace() {
        let file = write_csv("type, account, counterparty, owner, amount\nwithdraw, A, , , 5.25\n");
        let results: Vec<_> = read_commands(file.path()).unwrap().collect();
        assert!(matches!(
            &results[0],
            Ok(Command::Withdrawal { account, amount })
                if account == "A" && *amount == Amount::from_float(5.25)
        ));
    }

    #[test]
    fn read_returns_error_for_unknown_type() {
        let results = read("open,A,,Alice,1\nrefund,A,,,10.0\n");
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert!(matches!(err, CsvError::UnrecognizedType { line: 3, .. }));
    }

    #[test]
    fn read_returns_error_for_missing_amount() {
        let results = read("deposit,A,,,\n");
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(err, CsvError::MissingAmount { line: 2, .. }));
    }

    #[test]
    fn read_returns_error_for_invalid_amount() {
        let results = read("open,A,,Alice,1\ndeposit,A,,,NaN\ndeposit,A,,,1e30\nopen,B,,Bob,inf\ndeposit,A,,,2\n");
        assert_eq!(results.len(), 5);
        assert!(results[0].is_ok());
        for (idx, line) in [(1, 3), (2, 4), (3, 5)] {
            let err = results[idx].as_ref().unwrap_err();
            assert!(
                matches!(err, CsvError::InvalidAmount { line: l, .. } if *l == line),
                "row {idx}: {err}"
            );
        }
        assert!(matches!(
            &results[4],
            Ok(Command::Deposit { amount, .. }) if *amount == Amount::from_float(2.0)
        ));
    }

    #[test]
    fn read_returns_error_for_missing_counterparty() {
        let results = read("transfer,A,,,1\n");
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(
            err,
            CsvError::MissingField {
                line: 2,
                field: "counterparty",
                ..
            }
        ));
    }

    #[test]
    fn read_missing_file_fails() {
        let result = read_commands("/nonexistent/commands.csv");
        assert!(matches!(result, Err(CsvError::Open(_))));
    }

    #[test]
    fn write_balances_in_order() {
        let mut ledger = Ledger::new();
        ledger.add_account(Account::new("B", "Bob", Amount::from_float(65.0)));
        ledger.add_account(Account::new("A", "Alice", Amount::ZERO));

        let mut out = Vec::new();
        write_balances(&mut out, ledger.all_balances()).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "account,owner,balance\nB,Bob,65.0000\nA,Alice,0.0000\n"
        );
    }

    #[test]
    fn write_history_rows() {
        let mut ledger = Ledger::new();
        ledger.add_account(Account::new("A", "Alice", Amount::from_float(100.0)));
        ledger.add_account(Account::new("B", "Bob", Amount::ZERO));
        ledger
            .transfer("A", "B", Amount::from_float(60.0))
            .unwrap();
        let _ = ledger.withdraw("A", Amount::from_float(1000.0));

        let mut out = Vec::new();
        write_history(&mut out, ledger.history("A").unwrap()).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "seq,kind,amount,balance,counterparty\n\
             1,CREATED,100.0000,100.0000,\n\
             2,WITHDRAW,-60.0000,40.0000,\n\
             3,TRANSFER_OUT,-60.0000,40.0000,B\n\
             4,WITHDRAW_FAILED,1000.0000,40.0000,\n"
        );
    }
}
