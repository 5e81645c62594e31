#[macro_use]
mod errors;
mod btree;
mod console;
mod cursor;
mod node;
mod pager;
mod repl;
mod row;
mod statement;
mod table;

use std::fs::OpenOptions;

use clap::Parser;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A tiny single-table, single-user SQL-like database.
#[derive(Parser)]
#[command(name = "minidb", version = VERSION, about = "Tiny SQL-like database.")]
struct Cli {
    /// Path to the database file. Required; there is no default.
    filename: Option<String>,
}

fn main() {
    let log_file = OpenOptions::new()
        .append(true)
        .create(true)
        .open("minidb.log")
        .expect("Failed to open log file");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")))
        .init();

    let cli = Cli::parse();
    let Some(filename) = cli.filename else {
        println!("Must supply a database filename.");
        std::process::exit(1);
    };

    if let Err(e) = repl::run(&filename) {
        fatal!(e);
    }
}
