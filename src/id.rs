//! Opaque document ids
//!
//! An id names both the table a document lives in and its key within that
//! table, so a lookup scoped to one table can reject ids minted for another.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::model::Variant;

/// Store-assigned identifier of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId {
    table: Variant,
    value: Uuid,
}

impl DocumentId {
    /// Mint a fresh id in `table`
    pub fn new(table: Variant) -> Self {
        Self {
            table,
            value: Uuid::new_v4(),
        }
    }

    /// Table the document lives in
    pub fn table(&self) -> Variant {
        self.table
    }

    /// Encode to the opaque string form
    pub fn encode(&self) -> String {
        BASE64.encode(format!("{}:{}", self.table, self.value))
    }

    /// Decode from the opaque string form
    pub fn decode(encoded: &str) -> crate::Result<Self> {
        let invalid = || crate::Error::InvalidId(encoded.to_string());

        let bytes = BASE64.decode(encoded.as_bytes()).map_err(|_| invalid())?;
        let raw = String::from_utf8(bytes).map_err(|_| invalid())?;
        let (table, value) = raw.split_once(':').ok_or_else(invalid)?;

        Ok(Self {
            table: table.parse().map_err(|_| invalid())?,
            value: Uuid::parse_str(value).map_err(|_| invalid())?,
        })
    }

    /// Decode, keeping the id only if it belongs to `table`
    ///
    /// Malformed ids and ids of another table both come back as `None`.
    pub fn decode_in(encoded: &str, table: Variant) -> Option<Self> {
        Self::decode(encoded).ok().filter(|id| id.table == table)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for DocumentId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::decode(s)
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::decode(&encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_string_form_parses_back() {
        let id = DocumentId::new(Variant::Human);
        let parsed: DocumentId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.table(), Variant::Human);
    }

    #[test]
    fn test_decode_in_rejects_other_table() {
        let droid = DocumentId::new(Variant::Droid);
        assert_eq!(DocumentId::decode_in(&droid.encode(), Variant::Droid), Some(droid));
        assert_eq!(DocumentId::decode_in(&droid.encode(), Variant::Human), None);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            DocumentId::decode("not an id"),
            Err(crate::Error::InvalidId(_))
        ));
        assert!(DocumentId::decode(&BASE64.encode("Wookiee:1234")).is_err());
        assert!(DocumentId::decode(&BASE64.encode("Human:not-a-uuid")).is_err());
        assert_eq!(DocumentId::decode_in("", Variant::Human), None);
    }

    #[test]
    fn test_serde_uses_string_form() {
        let id = DocumentId::new(Variant::Droid);
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.encode()));

        let back: DocumentId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }
}
