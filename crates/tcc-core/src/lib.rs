//! `tcc-table` Core Library
//!
//! Reads macOS Transparency, Consent, and Control (TCC) permission databases
//! and normalizes their `access` rows into a fixed fifteen-column table:
//! - Source discovery for the system database and per-user databases
//! - Read-only SQLite access, one short-lived connection per source
//! - Row normalization (nullable and blob columns render as strings)
//! - Collection orchestration with per-source failure isolation

pub mod collector;
pub mod error;
pub mod locator;
pub mod reader;
pub mod record;
pub mod tracing_init;

pub use collector::Collector;
pub use error::{CollectError, SourceError};
pub use locator::{AccountResolver, Locator, Source, SourcePaths, SystemAccounts};
pub use record::{COLUMNS, ColumnType, Origin, PermissionRecord};
