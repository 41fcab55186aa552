use super::types::{de_id, non_blank};
use crate::error::Result;
use crate::validation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(deserialize_with = "de_id")]
    pub id: String,

    #[serde(rename = "nama")]
    pub name: String,

    /// Cohort label, e.g. "pagi" (morning) or "sore" (afternoon).
    #[serde(rename = "kelas", default)]
    pub class_label: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Student {
    pub fn to_draft(&self) -> StudentDraft {
        StudentDraft {
            name: self.name.clone(),
            class_label: self.class_label.clone(),
        }
    }

    pub fn class_or_dash(&self) -> &str {
        self.class_label.as_deref().unwrap_or("-")
    }
}

/// Form payload for creating or replacing a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDraft {
    #[serde(rename = "nama")]
    pub name: String,

    #[serde(rename = "kelas")]
    pub class_label: Option<String>,
}

impl StudentDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_label: None,
        }
    }

    pub fn with_class(mut self, class_label: impl Into<String>) -> Self {
        self.class_label = Some(class_label.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validation::validate_name(&self.name)
    }

    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            class_label: non_blank(self.class_label),
        }
    }
}

/// Minimal student projection embedded in other records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRef {
    #[serde(deserialize_with = "de_id")]
    pub id: String,

    #[serde(rename = "nama")]
    pub name: String,

    #[serde(rename = "kelas", default)]
    pub class_label: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_wire_names() {
        let draft = StudentDraft::new("Ahmad").with_class("pagi");
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["nama"], "Ahmad");
        assert_eq!(json["kelas"], "pagi");
    }

    #[test]
    fn test_normalized_drops_blank_class() {
        let draft = StudentDraft::new("  Ahmad ").with_class("  ").normalized();
        assert_eq!(draft.name, "Ahmad");
        assert_eq!(draft.class_label, None);
    }

    #[test]
    fn test_validate_requires_name() {
        assert!(StudentDraft::new(" ").validate().is_err());
        assert!(StudentDraft::new("Fatimah").validate().is_ok());
    }
}
