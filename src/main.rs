#[macro_use]
mod errors;
mod command;
mod repl;
mod storage;

use clap::Parser;
use std::fs::OpenOptions;
use std::io;
use std::process::ExitCode;
use storage::table::Table;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "goqlite", version = VERSION, about = "Tiny single-table database.")]
struct Cli {
    /// Path to the database file, created if it does not yet exist.
    db_file: String,
}

fn main() -> ExitCode {
    // clap reports a missing positional argument with exit code 2; the
    // REPL contract wants plain usage text and exit code 1 instead, so
    // the arity is checked by hand before handing off to clap.
    if std::env::args().count() < 2 {
        println!("Usage: ./goqlite DB_FILE_NAME");
        return ExitCode::from(1);
    }
    let cli = Cli::parse();

    let log_path = format!("{}.log", cli.db_file);
    let log_file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&log_path)
        .expect("failed to open log file");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut table = match Table::db_open(&cli.db_file) {
        Ok(table) => table,
        Err(e) => {
            tracing::error!(error = %e, "failed to open database file");
            println!("{e}");
            return ExitCode::from(1);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    match repl::run(&mut table, stdin.lock(), stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "exiting after fatal error");
            println!("{e}");
            ExitCode::from(1)
        }
    }
}
