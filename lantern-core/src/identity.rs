//! Identity types for lantern payloads

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ValidationError;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Identifier of a story-API item (story, comment, job, poll).
///
/// Serialized transparently as the bare integer the story API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl FromStr for ItemId {
    type Err = ValidationError;

    /// Parse a route parameter such as `"8863"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| ValidationError::InvalidValue {
                field: "item_id".to_string(),
                reason: format!("{:?} is not a numeric id: {}", s, e),
            })
    }
}

/// Convert unix seconds into a [`Timestamp`].
pub fn timestamp_from_unix(secs: i64) -> Result<Timestamp, ValidationError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| ValidationError::InvalidValue {
            field: "time".to_string(),
            reason: format!("{} is out of range", secs),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_parse() {
        assert_eq!("8863".parse::<ItemId>().unwrap(), ItemId::new(8863));
        assert_eq!(" 42 ".parse::<ItemId>().unwrap(), ItemId::new(42));
        assert!("abc".parse::<ItemId>().is_err());
        assert!("".parse::<ItemId>().is_err());
        assert!("-1".parse::<ItemId>().is_err());
    }

    #[test]
    fn test_item_id_serde_transparent() {
        let id: ItemId = serde_json::from_str("123").unwrap();
        assert_eq!(id, ItemId::new(123));
        assert_eq!(serde_json::to_string(&id).unwrap(), "123");
    }

    #[test]
    fn test_timestamp_from_unix() {
        let ts = timestamp_from_unix(1_175_714_200).unwrap();
        assert_eq!(ts.timestamp(), 1_175_714_200);
        assert!(timestamp_from_unix(i64::MAX).is_err());
    }
}
