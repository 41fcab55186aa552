use crate::error::{TahfidzError, Result};
use crate::gateway::ReadQuery;
use crate::model::{
    MemorizationDraft, MemorizationEntry, MemorizationStatus, ReviewDraft, ReviewEntry, Student,
    StudentDraft, Teacher, TeacherDraft,
};
use crate::validation;
use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// How a filter value turns into a gateway predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Case-insensitive substring match.
    Search,
    Exact,
    /// Exact match on a memorization status, accepting either vocabulary.
    Status,
    /// Inclusive lower bound on a date column.
    From,
    /// Inclusive upper bound on a date column.
    Until,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    /// Name used on the command line and in report summaries.
    pub key: &'static str,
    /// Remote column the predicate applies to.
    pub column: &'static str,
    pub kind: FilterKind,
}

impl FilterField {
    pub const fn new(key: &'static str, column: &'static str, kind: FilterKind) -> Self {
        Self { key, column, kind }
    }

    /// Canonical form of a user-entered value; `None` means "no filter".
    pub fn normalize(&self, value: &str) -> Result<Option<String>> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        let normalized = match self.kind {
            FilterKind::Search | FilterKind::Exact => value.to_string(),
            FilterKind::Status => value.parse::<MemorizationStatus>()?.wire_value().to_string(),
            FilterKind::From | FilterKind::Until => {
                validation::parse_date(self.key, value)?.to_string()
            }
        };
        Ok(Some(normalized))
    }

    pub fn apply(&self, query: ReadQuery, value: &str) -> ReadQuery {
        match self.kind {
            FilterKind::Search => query.contains(self.column, value),
            FilterKind::Exact | FilterKind::Status => query.eq(self.column, value),
            FilterKind::From => query.gte(self.column, value),
            FilterKind::Until => query.lte(self.column, value),
        }
    }
}

/// Describes one remote collection to the generic list machinery.
///
/// Implemented by zero-sized markers ([`Students`], [`Teachers`],
/// [`Memorizations`], [`Reviews`]); the controller, the CLI and the report
/// exporter only ever talk to this trait.
pub trait Resource {
    type Record: DeserializeOwned + Serialize + Clone;
    type Draft: Serialize + Clone;

    const COLLECTION: &'static str;
    /// Singular noun used in notices ("Student created").
    const NOUN: &'static str;
    const PLURAL: &'static str;
    /// Report and listing title.
    const TITLE: &'static str;
    const SORT_FIELD: &'static str;
    const DEFAULT_ASCENDING: bool;
    const FILTERS: &'static [FilterField];
    /// Column headers matching [`cells`](Self::cells).
    const COLUMNS: &'static [&'static str];

    /// Read of the whole collection including embedded references.
    fn base_query() -> ReadQuery {
        ReadQuery::new(Self::COLLECTION)
    }

    fn validate(draft: &Self::Draft) -> Result<()>;

    fn normalize(draft: Self::Draft) -> Self::Draft;

    fn id(record: &Self::Record) -> &str;

    /// Short human label, used in delete prompts.
    fn label(record: &Self::Record) -> String;

    fn draft_of(record: &Self::Record) -> Self::Draft;

    fn cells(record: &Self::Record, date_format: &str) -> Vec<String>;

    /// Per-category counts shown under overview reports.
    fn summary(_records: &[Self::Record]) -> Vec<(String, usize)> {
        Vec::new()
    }

    fn filter(key: &str) -> Result<&'static FilterField> {
        Self::FILTERS.iter().find(|f| f.key == key).ok_or_else(|| {
            let known: Vec<&str> = Self::FILTERS.iter().map(|f| f.key).collect();
            TahfidzError::Validation(format!(
                "Unknown filter '{}' for {} (expected one of: {})",
                key,
                Self::COLLECTION,
                known.join(", ")
            ))
        })
    }
}

fn fmt_date(date: NaiveDate, format: &str) -> String {
    date.format(format).to_string()
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

pub struct Students;

impl Resource for Students {
    type Record = Student;
    type Draft = StudentDraft;

    const COLLECTION: &'static str = "santri";
    const NOUN: &'static str = "Student";
    const PLURAL: &'static str = "students";
    const TITLE: &'static str = "Student List";
    const SORT_FIELD: &'static str = "nama";
    const DEFAULT_ASCENDING: bool = true;
    const FILTERS: &'static [FilterField] = &[
        FilterField::new("search", "nama", FilterKind::Search),
        FilterField::new("class", "kelas", FilterKind::Exact),
    ];
    const COLUMNS: &'static [&'static str] = &["Name", "Class", "Registered"];

    fn validate(draft: &StudentDraft) -> Result<()> {
        draft.validate()
    }

    fn normalize(draft: StudentDraft) -> StudentDraft {
        draft.normalized()
    }

    fn id(record: &Student) -> &str {
        &record.id
    }

    fn label(record: &Student) -> String {
        record.name.clone()
    }

    fn draft_of(record: &Student) -> StudentDraft {
        record.to_draft()
    }

    fn cells(record: &Student, date_format: &str) -> Vec<String> {
        vec![
            record.name.clone(),
            record.class_or_dash().to_string(),
            record
                .created_at
                .map(|t| fmt_date(t.date_naive(), date_format))
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

pub struct Teachers;

impl Resource for Teachers {
    type Record = Teacher;
    type Draft = TeacherDraft;

    const COLLECTION: &'static str = "guru";
    const NOUN: &'static str = "Teacher";
    const PLURAL: &'static str = "teachers";
    const TITLE: &'static str = "Teacher List";
    const SORT_FIELD: &'static str = "nama";
    const DEFAULT_ASCENDING: bool = true;
    const FILTERS: &'static [FilterField] = &[
        FilterField::new("search", "nama", FilterKind::Search),
        FilterField::new("from", "tanggal_bergabung", FilterKind::From),
        FilterField::new("to", "tanggal_bergabung", FilterKind::Until),
    ];
    const COLUMNS: &'static [&'static str] = &["Name", "Joined", "Contact", "Address"];

    fn validate(draft: &TeacherDraft) -> Result<()> {
        draft.validate()
    }

    fn normalize(draft: TeacherDraft) -> TeacherDraft {
        draft.normalized()
    }

    fn id(record: &Teacher) -> &str {
        &record.id
    }

    fn label(record: &Teacher) -> String {
        record.name.clone()
    }

    fn draft_of(record: &Teacher) -> TeacherDraft {
        record.to_draft()
    }

    fn cells(record: &Teacher, date_format: &str) -> Vec<String> {
        vec![
            record.name.clone(),
            record
                .joined_on
                .map(|d| fmt_date(d, date_format))
                .unwrap_or_else(|| "-".to_string()),
            or_dash(record.contact.as_deref()),
            or_dash(record.address.as_deref()),
        ]
    }
}

pub struct Memorizations;

impl Resource for Memorizations {
    type Record = MemorizationEntry;
    type Draft = MemorizationDraft;

    const COLLECTION: &'static str = "hafalan";
    const NOUN: &'static str = "Memorization entry";
    const PLURAL: &'static str = "memorization entries";
    const TITLE: &'static str = "Memorization Report";
    const SORT_FIELD: &'static str = "tanggal";
    const DEFAULT_ASCENDING: bool = false;
    const FILTERS: &'static [FilterField] = &[
        FilterField::new("chapter", "surah", FilterKind::Search),
        FilterField::new("student", "santri_id", FilterKind::Exact),
        FilterField::new("status", "status", FilterKind::Status),
        FilterField::new("from", "tanggal", FilterKind::From),
        FilterField::new("to", "tanggal", FilterKind::Until),
    ];
    const COLUMNS: &'static [&'static str] =
        &["Date", "Student", "Class", "Chapter", "Verses", "Status"];

    fn base_query() -> ReadQuery {
        ReadQuery::new(Self::COLLECTION).embed("santri", "santri", "santri_id", &["id", "nama", "kelas"])
    }

    fn validate(draft: &MemorizationDraft) -> Result<()> {
        draft.validate()
    }

    fn normalize(draft: MemorizationDraft) -> MemorizationDraft {
        draft.normalized()
    }

    fn id(record: &MemorizationEntry) -> &str {
        &record.id
    }

    fn label(record: &MemorizationEntry) -> String {
        format!(
            "{} {} ({})",
            record.chapter,
            record.verse_range(),
            record.student_name()
        )
    }

    fn draft_of(record: &MemorizationEntry) -> MemorizationDraft {
        record.to_draft()
    }

    fn cells(record: &MemorizationEntry, date_format: &str) -> Vec<String> {
        vec![
            fmt_date(record.date, date_format),
            record.student_name().to_string(),
            or_dash(
                record
                    .student
                    .as_ref()
                    .and_then(|s| s.class_label.as_deref()),
            ),
            record.chapter.clone(),
            record.verse_range(),
            record.status.to_string(),
        ]
    }

    fn summary(records: &[MemorizationEntry]) -> Vec<(String, usize)> {
        MemorizationStatus::ALL
            .iter()
            .map(|status| {
                let count = records.iter().filter(|r| r.status == *status).count();
                (status.to_string(), count)
            })
            .collect()
    }
}

pub struct Reviews;

impl Resource for Reviews {
    type Record = ReviewEntry;
    type Draft = ReviewDraft;

    const COLLECTION: &'static str = "murajaah";
    const NOUN: &'static str = "Review";
    const PLURAL: &'static str = "reviews";
    const TITLE: &'static str = "Review Report";
    const SORT_FIELD: &'static str = "tanggal";
    const DEFAULT_ASCENDING: bool = false;
    const FILTERS: &'static [FilterField] = &[
        FilterField::new("chapter", "surah", FilterKind::Search),
        FilterField::new("student", "santri_id", FilterKind::Exact),
        FilterField::new("teacher", "guru_id", FilterKind::Exact),
        FilterField::new("quality", "kualitas", FilterKind::Exact),
        FilterField::new("from", "tanggal", FilterKind::From),
        FilterField::new("to", "tanggal", FilterKind::Until),
    ];
    const COLUMNS: &'static [&'static str] = &[
        "Date", "Student", "Teacher", "Chapter", "Verses", "Quality", "Notes",
    ];

    fn base_query() -> ReadQuery {
        ReadQuery::new(Self::COLLECTION)
            .embed("santri", "santri", "santri_id", &["id", "nama", "kelas"])
            .embed("guru", "guru", "guru_id", &["id", "nama"])
    }

    fn validate(draft: &ReviewDraft) -> Result<()> {
        draft.validate()
    }

    fn normalize(draft: ReviewDraft) -> ReviewDraft {
        draft.normalized()
    }

    fn id(record: &ReviewEntry) -> &str {
        &record.id
    }

    fn label(record: &ReviewEntry) -> String {
        format!("{} review of {}", record.student_name(), record.chapter)
    }

    fn draft_of(record: &ReviewEntry) -> ReviewDraft {
        record.to_draft()
    }

    fn cells(record: &ReviewEntry, date_format: &str) -> Vec<String> {
        vec![
            fmt_date(record.date, date_format),
            record.student_name().to_string(),
            record.teacher_name().to_string(),
            record.chapter.clone(),
            record.verse_range(),
            or_dash(record.quality.as_deref()),
            or_dash(record.notes.as_deref()),
        ]
    }

    fn summary(records: &[ReviewEntry]) -> Vec<(String, usize)> {
        let mut counts: std::collections::BTreeMap<String, usize> = Default::default();
        for record in records {
            let quality = record.quality.clone().unwrap_or_else(|| "-".to_string());
            *counts.entry(quality).or_default() += 1;
        }
        counts.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_filter_lists_known_keys() {
        let err = Students::filter("colour").unwrap_err();
        assert!(err.to_string().contains("search, class"));
    }

    #[test]
    fn test_status_filter_accepts_english() {
        let field = Memorizations::filter("status").unwrap();
        assert_eq!(field.normalize("memorized").unwrap(), Some("hafal".to_string()));
        assert!(field.normalize("sleeping").is_err());
    }

    #[test]
    fn test_blank_value_clears() {
        let field = Students::filter("class").unwrap();
        assert_eq!(field.normalize("   ").unwrap(), None);
    }

    #[test]
    fn test_date_filter_validates() {
        let field = Reviews::filter("from").unwrap();
        assert_eq!(
            field.normalize("2024-02-01").unwrap(),
            Some("2024-02-01".to_string())
        );
        assert!(field.normalize("01/02/2024").is_err());
    }

    #[test]
    fn test_memorization_summary_counts_every_status() {
        let entry = |status| MemorizationEntry {
            id: "h".to_string(),
            student_id: None,
            chapter: "Al-Mulk".to_string(),
            verse_start: 1,
            verse_end: 5,
            status,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            student: None,
            created_at: None,
        };
        let records = vec![
            entry(MemorizationStatus::Memorized),
            entry(MemorizationStatus::Memorized),
            entry(MemorizationStatus::Pending),
        ];
        assert_eq!(
            Memorizations::summary(&records),
            vec![
                ("submitted".to_string(), 0),
                ("memorized".to_string(), 2),
                ("pending".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_memorization_query_embeds_student() {
        assert_eq!(
            Memorizations::base_query().select_clause(),
            "*,santri:santri_id(id,nama,kelas)"
        );
    }
}
