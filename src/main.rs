use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rust_rowstore::repl::Repl;
use rust_rowstore::{TABLE_MAX_PAGES, Table};

/// A tiny persistent table of (id, name, email) rows
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Database file, created if it does not exist
    db_file: PathBuf,

    /// Maximum number of pages the table may use
    #[arg(long, default_value_t = TABLE_MAX_PAGES)]
    max_pages: usize,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// Parses the command line. Argument errors and their usage text go to
/// stdout; `--help` and `--version` keep clap's handling.
fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let mut stdout = io::stdout();
            let _ = write!(stdout, "{}", e.render());
            let _ = stdout.flush();
            std::process::exit(e.exit_code());
        }
        Err(e) => e.exit(),
    }
}

fn main() -> Result<()> {
    let args = parse_args();

    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut table = Table::open_with_max_pages(&args.db_file, args.max_pages)
        .with_context(|| format!("Failed to open {}", args.db_file.display()))?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    Repl::new(stdin.lock(), stdout.lock()).run(&mut table)?;

    table.close().context("Failed to close table")
}
