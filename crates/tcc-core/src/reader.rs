//! Reads one TCC database and normalizes its rows.
//!
//! Each source gets its own short-lived read-only connection, released
//! before the next source is opened. The read is all-or-nothing per source:
//! a cursor failure mid-iteration discards rows already decoded. Individual
//! rows that fail to decode are skipped, not fatal.

use futures::TryStreamExt;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{ConnectOptions, Connection, Row};
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::locator::Source;
use crate::record::PermissionRecord;

/// The one fixed projection over the `access` table. Origin and owner are
/// injected from the source tag, not selected.
const ACCESS_QUERY: &str = "\
    SELECT service, client, client_type, auth_value, auth_reason, auth_version, \
           csreq, policy_id, indirect_object_identifier_type, \
           indirect_object_identifier, indirect_object_code_identity, flags, \
           last_modified \
    FROM access";

/// Read every decodable row from one database.
pub async fn read_records(source: &Source) -> Result<Vec<PermissionRecord>, SourceError> {
    debug!(path = %source.path.display(), origin = source.origin.as_str(), "reading TCC database");

    let mut conn = SqliteConnectOptions::new()
        .filename(&source.path)
        .read_only(true)
        .connect()
        .await
        .map_err(|err| SourceError::Open(err.to_string()))?;

    let result = fetch_rows(&mut conn, source).await;

    // One open handle at a time: release before the caller moves on,
    // whatever the outcome.
    conn.close().await.ok();
    result
}

async fn fetch_rows(
    conn: &mut SqliteConnection,
    source: &Source,
) -> Result<Vec<PermissionRecord>, SourceError> {
    let mut rows = sqlx::query(ACCESS_QUERY).fetch(conn);
    let mut records = Vec::new();
    let mut saw_rows = false;

    loop {
        match rows.try_next().await {
            Ok(Some(row)) => {
                saw_rows = true;
                match decode_row(&row, source) {
                    Ok(record) => records.push(record),
                    Err(err) => {
                        warn!(path = %source.path.display(), error = %err, "skipping undecodable row");
                    }
                }
            }
            Ok(None) => break,
            // An error before any row means the statement itself failed
            // (missing table, foreign schema); after rows, the cursor died.
            Err(err) if saw_rows => return Err(SourceError::Cursor(err.to_string())),
            Err(err) => return Err(SourceError::Query(err.to_string())),
        }
    }

    debug!(path = %source.path.display(), rows = records.len(), "TCC database read");
    Ok(records)
}

fn decode_row(row: &SqliteRow, source: &Source) -> Result<PermissionRecord, sqlx::Error> {
    Ok(PermissionRecord {
        origin: source.origin,
        owner_username: source.username.clone(),
        service: row.try_get("service")?,
        client: row.try_get("client")?,
        client_type: row.try_get("client_type")?,
        auth_value: row.try_get("auth_value")?,
        auth_reason: row.try_get("auth_reason")?,
        auth_version: row.try_get("auth_version")?,
        csreq: row.try_get("csreq")?,
        policy_id: row.try_get("policy_id")?,
        indirect_object_identifier_type: row.try_get("indirect_object_identifier_type")?,
        indirect_object_identifier: row.try_get("indirect_object_identifier")?,
        indirect_object_code_identity: row.try_get("indirect_object_code_identity")?,
        flags: row.try_get("flags")?,
        last_modified: row.try_get("last_modified")?,
    })
}
