use crate::error::{TahfidzError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

/// Progress tag of a memorization entry.
///
/// Stored remotely with the program's own vocabulary (`setor`, `hafal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MemorizationStatus {
    /// Recited to a teacher but not yet confirmed as memorized.
    #[default]
    #[serde(rename = "setor")]
    Submitted,
    #[serde(rename = "hafal")]
    Memorized,
    #[serde(rename = "pending")]
    Pending,
}

impl MemorizationStatus {
    pub const ALL: [MemorizationStatus; 3] = [
        MemorizationStatus::Submitted,
        MemorizationStatus::Memorized,
        MemorizationStatus::Pending,
    ];

    /// Value as stored in the remote collection.
    pub fn wire_value(&self) -> &'static str {
        match self {
            MemorizationStatus::Submitted => "setor",
            MemorizationStatus::Memorized => "hafal",
            MemorizationStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for MemorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemorizationStatus::Submitted => write!(f, "submitted"),
            MemorizationStatus::Memorized => write!(f, "memorized"),
            MemorizationStatus::Pending => write!(f, "pending"),
        }
    }
}

impl FromStr for MemorizationStatus {
    type Err = TahfidzError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "submitted" | "setor" => Ok(MemorizationStatus::Submitted),
            "memorized" | "memorised" | "hafal" => Ok(MemorizationStatus::Memorized),
            "pending" => Ok(MemorizationStatus::Pending),
            _ => Err(TahfidzError::Parse(format!(
                "Invalid memorization status: {}",
                s
            ))),
        }
    }
}

/// Accepts record identifiers serialized as either strings or integers.
pub(crate) fn de_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

pub(crate) fn de_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Text(s)) => Some(s),
        Some(RawId::Number(n)) => Some(n.to_string()),
        None => None,
    })
}

/// Drops blank optional text so it is sent as `null`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_both_vocabularies() {
        assert_eq!(
            "setor".parse::<MemorizationStatus>().unwrap(),
            MemorizationStatus::Submitted
        );
        assert_eq!(
            "Memorized".parse::<MemorizationStatus>().unwrap(),
            MemorizationStatus::Memorized
        );
        assert!("unknown".parse::<MemorizationStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_wire_value() {
        let json = serde_json::to_string(&MemorizationStatus::Memorized).unwrap();
        assert_eq!(json, "\"hafal\"");
    }

    #[test]
    fn test_id_accepts_numbers() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(deserialize_with = "de_id")]
            id: String,
        }
        let row: Row = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(row.id, "42");
    }
}
