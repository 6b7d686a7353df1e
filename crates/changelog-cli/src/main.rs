//! The `changelog` command.
//!
//! Three ways in: directive ingestion from stdin (the default), a
//! query rendered as a table or DocBook list (`--list`), and an RSS
//! feed when invoked as a CGI program (`REQUEST_URI` set).

mod cgi;

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::error;

use changelog_core::{
    apply_line, scan, scan_exact_module, sort_changes, ChangeRecord, DocbookRenderer,
    ModuleScope, Render, RssRenderer, SqliteChangeStore, StoreError, TableRenderer,
};

/// Database file name inside the home directory.
const DB_FILE: &str = "changelog.db";

/// Home directory forced in CGI mode.
const CGI_HOME: &str = "/var/db/changelog";

#[derive(Parser, Debug)]
#[command(name = "changelog", about = "Capture and display per-module changes")]
struct Cli {
    /// Directory holding the changelog database
    #[arg(short = 'H', long, default_value = ".")]
    home: PathBuf,

    /// Render records whose key matches this glob (table, or DocBook
    /// when the DOCBOOK environment variable is set)
    #[arg(short = 'l', long = "list")]
    list: Option<String>,

    /// Print seed directives for a new module and exit
    #[arg(short = 'm', long = "module")]
    module: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), StoreError> {
    // A web server invocation bypasses argument parsing entirely.
    if let Some(request) = cgi::detect() {
        cgi::send_rss_header();
        let store = open_store(Path::new(CGI_HOME))?;
        let records = collect(scan_exact_module(&store, request.module.as_deref())?);
        print!("{}", RssRenderer.render(&records));
        return Ok(());
    }

    let cli = Cli::parse();

    // Bootstrap mode: emit the seed directives for a new module,
    // without touching the store. Meant to be piped back in.
    if let Some(module) = cli.module {
        println!(":{} Module Description", module);
        println!("@*({})", module);
        return Ok(());
    }

    let store = open_store(&cli.home)?;

    if let Some(pattern) = cli.list {
        let records = collect(scan(&store, &pattern)?);
        if std::env::var_os("DOCBOOK").is_some() {
            print!("{}", DocbookRenderer.render(&records));
        } else {
            print!("{}", TableRenderer.render(&records));
        }
        return Ok(());
    }

    ingest_stdin(&store)
}

fn open_store(home: &Path) -> Result<SqliteChangeStore, StoreError> {
    SqliteChangeStore::open(&home.join(DB_FILE))
}

fn collect(mut records: Vec<ChangeRecord>) -> Vec<ChangeRecord> {
    sort_changes(&mut records);
    records
}

/// Read directives line by line, threading the active scope through.
fn ingest_stdin(store: &SqliteChangeStore) -> Result<(), StoreError> {
    read_directives(store, io::stdin().lock())
}

fn read_directives<R: BufRead>(store: &SqliteChangeStore, input: R) -> Result<(), StoreError> {
    let mut scope = ModuleScope::empty();

    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            // Treat a read failure as end of input.
            Err(_) => break,
        };
        let now = chrono::Utc::now().timestamp();
        // Ingestion is silent about per-line failures; the scope in
        // effect before the bad line stays in effect after it.
        match apply_line(store, scope.clone(), &line, now) {
            Ok(next) => scope = next,
            Err(e) => tracing::debug!(error = %e, "directive failed, line skipped"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_accepts_short_and_long_forms() {
        let cli = Cli::try_parse_from(["changelog", "-H", "/var/tmp"]).unwrap();
        assert_eq!(cli.home, PathBuf::from("/var/tmp"));

        let cli = Cli::try_parse_from(["changelog", "--home", "/var/tmp"]).unwrap();
        assert_eq!(cli.home, PathBuf::from("/var/tmp"));

        let cli = Cli::try_parse_from(["changelog"]).unwrap();
        assert_eq!(cli.home, PathBuf::from("."));
    }

    #[test]
    fn list_and_module_flags_parse() {
        let cli = Cli::try_parse_from(["changelog", "-l", "core*"]).unwrap();
        assert_eq!(cli.list.as_deref(), Some("core*"));

        let cli = Cli::try_parse_from(["changelog", "-m", "core"]).unwrap();
        assert_eq!(cli.module.as_deref(), Some("core"));
    }

    #[test]
    fn seed_directives_resolve_their_own_module() {
        // The pair `-m` prints must select the module it defined once
        // piped back in.
        let store = SqliteChangeStore::open_in_memory().unwrap();
        let input = ":core Module Description\n@*(core)\n!Crash on startup.\n";
        read_directives(&store, input.as_bytes()).unwrap();

        let records = scan(&store, "*").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].module, "core");
    }
}
