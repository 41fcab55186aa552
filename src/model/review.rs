use super::student::StudentRef;
use super::teacher::TeacherRef;
use super::types::{de_id, de_opt_id, non_blank};
use crate::error::Result;
use crate::validation;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A review session (murajaah) heard by a teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEntry {
    #[serde(deserialize_with = "de_id")]
    pub id: String,

    #[serde(rename = "santri_id", default, deserialize_with = "de_opt_id")]
    pub student_id: Option<String>,

    #[serde(rename = "guru_id", default, deserialize_with = "de_opt_id")]
    pub teacher_id: Option<String>,

    #[serde(rename = "surah")]
    pub chapter: String,

    #[serde(rename = "ayat_awal", default)]
    pub verse_start: Option<u32>,

    #[serde(rename = "ayat_akhir", default)]
    pub verse_end: Option<u32>,

    #[serde(rename = "kualitas", default)]
    pub quality: Option<String>,

    #[serde(rename = "catatan", default)]
    pub notes: Option<String>,

    #[serde(rename = "tanggal")]
    pub date: NaiveDate,

    #[serde(rename = "santri", default, skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentRef>,

    #[serde(rename = "guru", default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<TeacherRef>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ReviewEntry {
    pub fn verse_range(&self) -> String {
        match (self.verse_start, self.verse_end) {
            (Some(a), Some(b)) => format!("{}-{}", a, b),
            _ => "-".to_string(),
        }
    }

    pub fn student_name(&self) -> &str {
        self.student.as_ref().map(|s| s.name.as_str()).unwrap_or("-")
    }

    pub fn teacher_name(&self) -> &str {
        self.teacher.as_ref().map(|t| t.name.as_str()).unwrap_or("-")
    }

    pub fn to_draft(&self) -> ReviewDraft {
        ReviewDraft {
            student_id: self.student_id.clone().unwrap_or_default(),
            teacher_id: self.teacher_id.clone().unwrap_or_default(),
            chapter: self.chapter.clone(),
            verse_start: self.verse_start,
            verse_end: self.verse_end,
            quality: self.quality.clone(),
            notes: self.notes.clone(),
            date: self.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDraft {
    #[serde(rename = "santri_id")]
    pub student_id: String,

    #[serde(rename = "guru_id")]
    pub teacher_id: String,

    #[serde(rename = "surah")]
    pub chapter: String,

    #[serde(rename = "ayat_awal")]
    pub verse_start: Option<u32>,

    #[serde(rename = "ayat_akhir")]
    pub verse_end: Option<u32>,

    #[serde(rename = "kualitas")]
    pub quality: Option<String>,

    #[serde(rename = "catatan")]
    pub notes: Option<String>,

    #[serde(rename = "tanggal")]
    pub date: NaiveDate,
}

impl ReviewDraft {
    pub fn validate(&self) -> Result<()> {
        validation::validate_required("Student", &self.student_id)?;
        validation::validate_required("Teacher", &self.teacher_id)?;
        validation::validate_required("Chapter", &self.chapter)?;
        match (self.verse_start, self.verse_end) {
            (Some(start), Some(end)) => validation::validate_verse_range(start, end)?,
            (None, None) => {}
            _ => {
                return Err(crate::error::TahfidzError::Validation(
                    "Both starting and ending verse are required when either is given"
                        .to_string(),
                ));
            }
        }
        if let Some(notes) = &self.notes {
            validation::validate_notes(notes)?;
        }
        Ok(())
    }

    pub fn normalized(self) -> Self {
        Self {
            student_id: self.student_id.trim().to_string(),
            teacher_id: self.teacher_id.trim().to_string(),
            chapter: self.chapter.trim().to_string(),
            quality: non_blank(self.quality),
            notes: non_blank(self.notes),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ReviewDraft {
        ReviewDraft {
            student_id: "s1".to_string(),
            teacher_id: "g1".to_string(),
            chapter: "Yasin".to_string(),
            verse_start: Some(1),
            verse_end: Some(12),
            quality: Some("lancar".to_string()),
            notes: None,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    #[test]
    fn test_requires_teacher() {
        let mut d = draft();
        d.teacher_id = String::new();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_half_open_range_rejected() {
        let mut d = draft();
        d.verse_end = None;
        assert!(d.validate().is_err());
        d.verse_start = None;
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut d = draft();
        d.verse_start = Some(30);
        assert!(d.validate().is_err());
    }
}
