//! Error types for TCC collection.
//!
//! Missing database files and unresolvable accounts are normal branches and
//! never appear here; only the users-directory scan and a present system
//! database can fail the whole collection.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reading a single TCC database.
#[derive(Debug, Error)]
pub enum SourceError {
    /// File could not be opened as a SQLite database
    #[error("cannot open database: {0}")]
    Open(String),

    /// Statement failed before producing any row (missing `access` table,
    /// foreign schema)
    #[error("query failed: {0}")]
    Query(String),

    /// Cursor failed after partial iteration; rows already decoded from the
    /// source are discarded
    #[error("cursor failed after partial read: {0}")]
    Cursor(String),
}

/// Failure of the whole collection.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Users directory could not be enumerated
    #[error("cannot read users directory {}: {message}", path.display())]
    UsersDir { path: PathBuf, message: String },

    /// System database is present but unreadable
    #[error("system TCC database {}: {source}", path.display())]
    System { path: PathBuf, source: SourceError },
}
