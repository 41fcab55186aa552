use super::student::StudentRef;
use super::types::{MemorizationStatus, de_id};
use crate::error::Result;
use crate::validation;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One memorization log line (hafalan) for a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorizationEntry {
    #[serde(deserialize_with = "de_id")]
    pub id: String,

    #[serde(rename = "santri_id", default, deserialize_with = "super::types::de_opt_id")]
    pub student_id: Option<String>,

    #[serde(rename = "surah")]
    pub chapter: String,

    #[serde(rename = "ayat_awal")]
    pub verse_start: u32,

    #[serde(rename = "ayat_akhir")]
    pub verse_end: u32,

    #[serde(default)]
    pub status: MemorizationStatus,

    #[serde(rename = "tanggal")]
    pub date: NaiveDate,

    #[serde(rename = "santri", default, skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentRef>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl MemorizationEntry {
    pub fn verse_count(&self) -> u32 {
        self.verse_end.saturating_sub(self.verse_start) + 1
    }

    pub fn verse_range(&self) -> String {
        format!("{}-{}", self.verse_start, self.verse_end)
    }

    pub fn student_name(&self) -> &str {
        self.student.as_ref().map(|s| s.name.as_str()).unwrap_or("-")
    }

    pub fn to_draft(&self) -> MemorizationDraft {
        MemorizationDraft {
            student_id: self.student_id.clone().unwrap_or_default(),
            chapter: self.chapter.clone(),
            verse_start: self.verse_start,
            verse_end: self.verse_end,
            status: self.status,
            date: self.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorizationDraft {
    #[serde(rename = "santri_id")]
    pub student_id: String,

    #[serde(rename = "surah")]
    pub chapter: String,

    #[serde(rename = "ayat_awal")]
    pub verse_start: u32,

    #[serde(rename = "ayat_akhir")]
    pub verse_end: u32,

    pub status: MemorizationStatus,

    #[serde(rename = "tanggal")]
    pub date: NaiveDate,
}

impl MemorizationDraft {
    pub fn validate(&self) -> Result<()> {
        validation::validate_required("Student", &self.student_id)?;
        validation::validate_required("Chapter", &self.chapter)?;
        validation::validate_verse_range(self.verse_start, self.verse_end)
    }

    pub fn normalized(self) -> Self {
        Self {
            student_id: self.student_id.trim().to_string(),
            chapter: self.chapter.trim().to_string(),
            ..self
        }
    }
}
