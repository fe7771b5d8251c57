use std::env;
use std::io;
use std::process::ExitCode;

use bank_ledger::Ledger;
use bank_ledger::csv::{read_commands, write_balances, write_history};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(
            "warn".parse().expect("static directive is valid"),
        ))
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        error!("usage: bank-ledger <commands.csv> [account]");
        return ExitCode::FAILURE;
    };
    let account = args.next();

    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let commands = match read_commands(path.clone()) {
        Ok(commands) => commands,
        Err(e) => {
            error!(path, "{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut ledger = Ledger::new();
    let (cmd_sender, cmd_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in commands {
            match result {
                Ok(command) => {
                    if cmd_sender.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    ledger.run(ReceiverStream::new(cmd_receiver)).await;

    let stdout = io::stdout();
    let written = match account {
        None => write_balances(stdout.lock(), ledger.all_balances()),
        Some(id) => match ledger.history(&id) {
            Some(entries) => write_history(stdout.lock(), entries),
            None => {
                error!(account = %id, "account not found");
                return ExitCode::FAILURE;
            }
        },
    };

    if let Err(e) = written {
        error!("{e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
