//! `tcc-table` binary
//!
//! One-shot snapshot of macOS TCC permission records: runs the collector
//! once and prints one JSON object per record on stdout. Stands in for a
//! table-host integration, which would call the same `generate` operation
//! and ship the rows over its own transport.

#![allow(clippy::print_stdout)]

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tcc_core::{COLUMNS, Collector, ColumnType, SourcePaths, SystemAccounts};

#[derive(Parser, Debug)]
#[command(name = "tcc-table")]
#[command(version, about = "Dump macOS TCC privacy-permission records as table rows")]
struct Args {
    /// Path of the system-wide TCC database
    #[arg(long, env = "TCC_TABLE_SYSTEM_DB")]
    system_db: Option<PathBuf>,

    /// Directory whose subdirectories name local user accounts
    #[arg(long, env = "TCC_TABLE_USERS_DIR")]
    users_dir: Option<PathBuf>,

    /// Log level filter (e.g. "info", "debug", "warn")
    #[arg(long, default_value = "info", env = "TCC_TABLE_LOG_LEVEL")]
    log_level: String,

    /// Output logs as JSON (for structured log aggregation)
    #[arg(long, env = "TCC_TABLE_LOG_JSON")]
    log_json: bool,

    /// Print only the number of records
    #[arg(long)]
    count: bool,

    /// Print the produced table schema and exit
    #[arg(long)]
    columns: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tcc_core::tracing_init::init_tracing(
        &format!("tcc_core={level},tcc_cli={level}", level = args.log_level),
        args.log_json,
    );

    if args.columns {
        for (name, column_type) in COLUMNS {
            let rendered = match column_type {
                ColumnType::Text => "TEXT",
                ColumnType::Integer => "INTEGER",
            };
            println!("{name}\t{rendered}");
        }
        return Ok(());
    }

    let mut paths = SourcePaths::default();
    if let Some(system_db) = args.system_db {
        paths.system_db = system_db;
    }
    if let Some(users_dir) = args.users_dir {
        paths.users_dir = users_dir;
    }

    let collector = Collector::new(paths, SystemAccounts);
    let rows = collector.generate().await?;

    if args.count {
        println!("{}", rows.len());
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for row in &rows {
        serde_json::to_writer(&mut out, row)?;
        writeln!(out)?;
    }
    Ok(())
}
