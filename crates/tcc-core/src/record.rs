//! Permission record model and string rendering.
//!
//! A [`PermissionRecord`] keeps the column types the database declares;
//! [`PermissionRecord::into_row`] renders the flat string map the host table
//! expects. The rendering rule for absent values lives here and nowhere
//! else: a nullable column with no value becomes `""`, never `"null"` or
//! `"0"`, and blob columns render as lower-case hex (`""` when absent).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which database a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Machine-wide database under /Library
    System,
    /// A specific user's database under their home directory
    User,
}

impl Origin {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// Declared type of a produced table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
}

/// The produced table schema: fixed names and types, never varies between
/// invocations. Hex-rendered blob columns are text.
pub const COLUMNS: [(&str, ColumnType); 15] = [
    ("origin", ColumnType::Text),
    ("owner_username", ColumnType::Text),
    ("service", ColumnType::Text),
    ("client", ColumnType::Text),
    ("client_type", ColumnType::Integer),
    ("auth_value", ColumnType::Integer),
    ("auth_reason", ColumnType::Integer),
    ("auth_version", ColumnType::Integer),
    ("csreq", ColumnType::Text),
    ("policy_id", ColumnType::Text),
    ("indirect_object_identifier_type", ColumnType::Integer),
    ("indirect_object_identifier", ColumnType::Text),
    ("indirect_object_code_identity", ColumnType::Text),
    ("flags", ColumnType::Integer),
    ("last_modified", ColumnType::Integer),
];

/// One normalized row of the `access` table, tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub origin: Origin,
    /// Empty iff `origin` is [`Origin::System`]
    pub owner_username: String,
    pub service: String,
    pub client: String,
    pub client_type: i64,
    pub auth_value: i64,
    pub auth_reason: i64,
    pub auth_version: i64,
    pub csreq: Option<Vec<u8>>,
    pub policy_id: Option<String>,
    pub indirect_object_identifier_type: Option<i64>,
    pub indirect_object_identifier: Option<String>,
    pub indirect_object_code_identity: Option<Vec<u8>>,
    pub flags: Option<i64>,
    pub last_modified: i64,
}

impl PermissionRecord {
    /// Render the record as the flat string map the host table consumes.
    /// Keys are exactly the [`COLUMNS`] names.
    pub fn into_row(self) -> BTreeMap<String, String> {
        let mut row = BTreeMap::new();
        let mut put = |name: &str, value: String| {
            row.insert(name.to_string(), value);
        };

        put("origin", self.origin.as_str().to_string());
        put("owner_username", self.owner_username);
        put("service", self.service);
        put("client", self.client);
        put("client_type", self.client_type.to_string());
        put("auth_value", self.auth_value.to_string());
        put("auth_reason", self.auth_reason.to_string());
        put("auth_version", self.auth_version.to_string());
        put("csreq", hex_or_empty(self.csreq.as_deref()));
        put("policy_id", self.policy_id.unwrap_or_default());
        put(
            "indirect_object_identifier_type",
            int_or_empty(self.indirect_object_identifier_type),
        );
        put(
            "indirect_object_identifier",
            self.indirect_object_identifier.unwrap_or_default(),
        );
        put(
            "indirect_object_code_identity",
            hex_or_empty(self.indirect_object_code_identity.as_deref()),
        );
        put("flags", int_or_empty(self.flags));
        put("last_modified", self.last_modified.to_string());

        row
    }
}

/// Lower-case hex of the blob, `""` when the column was NULL.
fn hex_or_empty(bytes: Option<&[u8]>) -> String {
    bytes.map(hex::encode).unwrap_or_default()
}

/// Decimal rendering, `""` when the column was NULL.
fn int_or_empty(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample(origin: Origin, username: &str) -> PermissionRecord {
        PermissionRecord {
            origin,
            owner_username: username.to_string(),
            service: "kTCCServiceCamera".to_string(),
            client: "com.example.app".to_string(),
            client_type: 0,
            auth_value: 2,
            auth_reason: 4,
            auth_version: 1,
            csreq: None,
            policy_id: None,
            indirect_object_identifier_type: None,
            indirect_object_identifier: None,
            indirect_object_code_identity: None,
            flags: None,
            last_modified: 1_700_000_000,
        }
    }

    #[test]
    fn hex_rendering() {
        assert_eq!(hex_or_empty(Some(&[])), "");
        assert_eq!(hex_or_empty(Some(&[0x01, 0xFF])), "01ff");
        assert_eq!(hex_or_empty(None), "");
    }

    #[test]
    fn absent_values_render_empty() {
        let row = sample(Origin::User, "alice").into_row();
        assert_eq!(row["csreq"], "");
        assert_eq!(row["policy_id"], "");
        assert_eq!(row["indirect_object_identifier_type"], "");
        assert_eq!(row["indirect_object_identifier"], "");
        assert_eq!(row["flags"], "");
        assert!(!row.values().any(|v| v.eq_ignore_ascii_case("null")));
    }

    #[test]
    fn present_values_render_verbatim() {
        let mut record = sample(Origin::System, "");
        record.csreq = Some(vec![0xFA, 0xDE, 0x0C, 0x00]);
        record.policy_id = Some("7".to_string());
        record.flags = Some(0);
        let row = record.into_row();
        assert_eq!(row["origin"], "system");
        assert_eq!(row["owner_username"], "");
        assert_eq!(row["csreq"], "fade0c00");
        assert_eq!(row["policy_id"], "7");
        assert_eq!(row["flags"], "0");
        assert_eq!(row["auth_value"], "2");
        assert_eq!(row["last_modified"], "1700000000");
    }

    #[test]
    fn row_keys_match_declared_columns() {
        let row = sample(Origin::User, "alice").into_row();
        let declared: Vec<&str> = COLUMNS.iter().map(|(name, _)| *name).collect();
        let mut keys: Vec<&str> = row.keys().map(String::as_str).collect();
        keys.sort_unstable();
        let mut expected = declared.clone();
        expected.sort_unstable();
        assert_eq!(keys, expected);
        assert_eq!(declared.len(), 15);
    }
}
