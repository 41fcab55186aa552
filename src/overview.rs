//! Program overview: a page of students, each with their latest memorization
//! entry and latest review.

use crate::error::Result;
use crate::gateway::{Gateway, ReadQuery, select_all};
use crate::list::{ListController, Memorizations, QueryIntent, Resource, Reviews, Students, decode_page};
use crate::model::{MemorizationEntry, ReviewEntry, Student};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Serialize)]
pub struct OverviewRow {
    pub student: Student,
    pub latest_memorization: Option<MemorizationEntry>,
    pub latest_review: Option<ReviewEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramOverview {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
    pub filters: BTreeMap<String, String>,
    pub rows: Vec<OverviewRow>,
    /// Set when the student page itself could not be read.
    pub error: Option<String>,
    pub memorization_error: Option<String>,
    pub review_error: Option<String>,
}

/// Loads one overview page.
///
/// Students are listed through the same controller as `student list`, so
/// search, class filter, sort and page clamping behave identically. The latest
/// entries are then read in one batch per collection for every student on the
/// page; a failed batch leaves its column empty and records the error.
pub async fn load<G: Gateway>(gateway: &G, intent: QueryIntent, page_size: u32) -> Result<ProgramOverview> {
    let mut students = ListController::<Students, _>::new(gateway, page_size).with_intent(intent);
    students.refresh().await;

    let ids: Vec<String> = students
        .rows()
        .iter()
        .map(|s| Students::id(s).to_string())
        .collect();

    let (memorizations, memorization_error) = if ids.is_empty() {
        (HashMap::new(), None)
    } else {
        match latest_by_student::<Memorizations, G>(gateway, &ids).await {
            Ok(latest) => (latest, None),
            Err(e) => {
                tracing::warn!(error = %e, "latest memorization entries unavailable");
                (HashMap::new(), Some(e.user_message()))
            }
        }
    };
    let (reviews, review_error) = if ids.is_empty() {
        (HashMap::new(), None)
    } else {
        match latest_by_student::<Reviews, G>(gateway, &ids).await {
            Ok(latest) => (latest, None),
            Err(e) => {
                tracing::warn!(error = %e, "latest reviews unavailable");
                (HashMap::new(), Some(e.user_message()))
            }
        }
    };

    let rows = students
        .rows()
        .iter()
        .map(|student| OverviewRow {
            student: student.clone(),
            latest_memorization: memorizations.get(&student.id).cloned(),
            latest_review: reviews.get(&student.id).cloned(),
        })
        .collect();

    Ok(ProgramOverview {
        page: students.page(),
        page_size: students.page_size(),
        total: students.total(),
        total_pages: students.total_pages(),
        filters: students.filters().clone(),
        rows,
        error: students.error().map(str::to_string),
        memorization_error,
        review_error,
    })
}

/// Records that belong to a student and carry a date.
trait Dated: Resource {
    fn student_id(record: &Self::Record) -> Option<&str>;
    fn date(record: &Self::Record) -> NaiveDate;
}

impl Dated for Memorizations {
    fn student_id(record: &MemorizationEntry) -> Option<&str> {
        record.student_id.as_deref()
    }

    fn date(record: &MemorizationEntry) -> NaiveDate {
        record.date
    }
}

impl Dated for Reviews {
    fn student_id(record: &ReviewEntry) -> Option<&str> {
        record.student_id.as_deref()
    }

    fn date(record: &ReviewEntry) -> NaiveDate {
        record.date
    }
}

/// Newest record per student among `ids`; the first of equal dates wins.
async fn latest_by_student<R: Dated, G: Gateway>(
    gateway: &G,
    ids: &[String],
) -> Result<HashMap<String, R::Record>> {
    let query = ReadQuery::new(R::COLLECTION)
        .is_in("santri_id", ids.iter().cloned())
        .order_by("tanggal", false);
    let page = decode_page::<R>(select_all(gateway, &query).await?)?;

    let mut latest: HashMap<String, R::Record> = HashMap::new();
    for record in page.rows {
        let Some(student_id) = R::student_id(&record).map(str::to_string) else {
            continue;
        };
        let newer = latest
            .get(&student_id)
            .is_none_or(|current| R::date(&record) > R::date(current));
        if newer {
            latest.insert(student_id, record);
        }
    }
    Ok(latest)
}

/// "Today", "Yesterday", or the date in `format`.
pub fn short_date(date: NaiveDate, today: NaiveDate, format: &str) -> String {
    if date == today {
        "Today".to_string()
    } else if today.checked_sub_days(Days::new(1)) == Some(date) {
        "Yesterday".to_string()
    } else {
        date.format(format).to_string()
    }
}
