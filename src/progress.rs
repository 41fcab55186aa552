//! Per-student progress: profile, recent history and a memorization summary.

use crate::error::Result;
use crate::gateway::{Gateway, select_all};
use crate::list::{ListController, Memorizations, QueryIntent, Reviews, Students, decode_page};
use crate::model::{MemorizationEntry, MemorizationStatus, ReviewEntry, Student};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    /// Verses across every entry, whatever its status.
    pub total_verses: u32,
    /// Verses in entries marked memorized.
    pub memorized_verses: u32,
    /// Entry count per status, in [`MemorizationStatus::ALL`] order.
    pub entries_by_status: Vec<(MemorizationStatus, usize)>,
    /// Verse totals keyed by `YYYY-MM`.
    pub verses_by_month: BTreeMap<String, u32>,
    /// Mean of the monthly totals, rounded.
    pub monthly_average: u32,
    pub best_month: Option<(String, u32)>,
    pub latest: Option<MemorizationEntry>,
}

impl ProgressSummary {
    pub fn from_entries(entries: &[MemorizationEntry]) -> Self {
        let mut verses_by_month: BTreeMap<String, u32> = BTreeMap::new();
        for entry in entries {
            *verses_by_month
                .entry(entry.date.format("%Y-%m").to_string())
                .or_default() += entry.verse_count();
        }

        let total_verses: u32 = verses_by_month.values().sum();
        let monthly_average = if verses_by_month.is_empty() {
            0
        } else {
            let months = verses_by_month.len() as f64;
            (f64::from(total_verses) / months).round() as u32
        };
        // earliest month wins a tie
        let best_month = verses_by_month
            .iter()
            .fold(None::<(&String, u32)>, |best, (month, verses)| match best {
                Some((_, top)) if top >= *verses => best,
                _ => Some((month, *verses)),
            })
            .map(|(month, verses)| (month.clone(), verses));

        let memorized_verses = entries
            .iter()
            .filter(|e| e.status == MemorizationStatus::Memorized)
            .map(MemorizationEntry::verse_count)
            .sum();
        let entries_by_status = MemorizationStatus::ALL
            .iter()
            .map(|s| (*s, entries.iter().filter(|e| e.status == *s).count()))
            .collect();
        let latest = entries
            .iter()
            .max_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)))
            .cloned();

        Self {
            total_verses,
            memorized_verses,
            entries_by_status,
            verses_by_month,
            monthly_average,
            best_month,
            latest,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentProgress {
    pub student: Student,
    /// One page of memorization history, newest first.
    pub history: Vec<MemorizationEntry>,
    pub history_total: u64,
    /// Set when the history page could not be read.
    pub history_error: Option<String>,
    /// One page of reviews, newest first.
    pub reviews: Vec<ReviewEntry>,
    pub reviews_total: u64,
    pub reviews_error: Option<String>,
    pub summary: ProgressSummary,
}

/// Loads the detail view of one student.
///
/// `page` selects the history and review pages; out-of-range pages are
/// clamped the same way list screens clamp them.
pub async fn load<G: Gateway>(
    gateway: &G,
    student_id: &str,
    page: u32,
    page_size: u32,
) -> Result<StudentProgress> {
    let student = ListController::<Students, _>::new(gateway, page_size)
        .get(student_id)
        .await?;

    let mut history_intent = QueryIntent::for_resource::<Memorizations>();
    history_intent.set_filter::<Memorizations>("student", student_id)?;
    let all = decode_page::<Memorizations>(
        select_all(gateway, &history_intent.to_full_query::<Memorizations>()).await?,
    )?;
    let summary = ProgressSummary::from_entries(&all.rows);

    history_intent.page = page.max(1);
    let mut history = ListController::<Memorizations, _>::new(gateway, page_size)
        .with_intent(history_intent);
    history.refresh().await;
    if let Some(error) = history.error() {
        tracing::warn!(student_id, %error, "memorization history unavailable");
    }

    let mut review_intent = QueryIntent::for_resource::<Reviews>();
    review_intent.set_filter::<Reviews>("student", student_id)?;
    review_intent.page = page.max(1);
    let mut reviews = ListController::<Reviews, _>::new(gateway, page_size).with_intent(review_intent);
    reviews.refresh().await;
    if let Some(error) = reviews.error() {
        tracing::warn!(student_id, %error, "review history unavailable");
    }

    Ok(StudentProgress {
        student,
        history: history.rows().to_vec(),
        history_total: history.total(),
        history_error: history.error().map(str::to_string),
        reviews: reviews.rows().to_vec(),
        reviews_total: reviews.total(),
        reviews_error: reviews.error().map(str::to_string),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use chrono::NaiveDate;
    use serde_json::json;

    fn entry(date: &str, start: u32, end: u32, status: MemorizationStatus) -> MemorizationEntry {
        MemorizationEntry {
            id: format!("{}-{}", date, start),
            student_id: Some("s1".to_string()),
            chapter: "An-Naba".to_string(),
            verse_start: start,
            verse_end: end,
            status,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            student: None,
            created_at: None,
        }
    }

    #[test]
    fn test_summary_groups_by_month() {
        let entries = vec![
            entry("2024-01-05", 1, 10, MemorizationStatus::Memorized),
            entry("2024-01-20", 11, 15, MemorizationStatus::Submitted),
            entry("2024-02-02", 1, 20, MemorizationStatus::Memorized),
        ];
        let summary = ProgressSummary::from_entries(&entries);

        assert_eq!(summary.total_verses, 35);
        assert_eq!(summary.memorized_verses, 30);
        assert_eq!(summary.verses_by_month.get("2024-01"), Some(&15));
        assert_eq!(summary.verses_by_month.get("2024-02"), Some(&20));
        assert_eq!(summary.monthly_average, 18);
        assert_eq!(summary.best_month, Some(("2024-02".to_string(), 20)));
        assert_eq!(summary.latest.unwrap().date.to_string(), "2024-02-02");
        assert_eq!(
            summary.entries_by_status,
            vec![
                (MemorizationStatus::Submitted, 1),
                (MemorizationStatus::Memorized, 2),
                (MemorizationStatus::Pending, 0),
            ]
        );
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = ProgressSummary::from_entries(&[]);
        assert_eq!(summary.total_verses, 0);
        assert_eq!(summary.monthly_average, 0);
        assert!(summary.best_month.is_none());
        assert!(summary.latest.is_none());
    }

    #[tokio::test]
    async fn test_load_scopes_to_one_student() {
        let gw = MemoryGateway::new()
            .with_rows(
                "santri",
                vec![
                    json!({"id": "s1", "nama": "Ahmad", "kelas": "pagi"}),
                    json!({"id": "s2", "nama": "Bilal", "kelas": "sore"}),
                ],
            )
            .with_rows("guru", vec![json!({"id": "g1", "nama": "Ustadz Hasan"})])
            .with_rows(
                "hafalan",
                vec![
                    json!({"id": "h1", "santri_id": "s1", "surah": "Al-Mulk", "ayat_awal": 1, "ayat_akhir": 10, "status": "hafal", "tanggal": "2024-03-01"}),
                    json!({"id": "h2", "santri_id": "s1", "surah": "Al-Mulk", "ayat_awal": 11, "ayat_akhir": 20, "status": "setor", "tanggal": "2024-04-01"}),
                    json!({"id": "h3", "santri_id": "s2", "surah": "Al-Qalam", "ayat_awal": 1, "ayat_akhir": 52, "status": "hafal", "tanggal": "2024-04-02"}),
                ],
            )
            .with_rows(
                "murajaah",
                vec![json!({"id": "m1", "santri_id": "s1", "guru_id": "g1", "surah": "Al-Mulk", "kualitas": "baik", "tanggal": "2024-04-03"})],
            );

        let progress = load(&gw, "s1", 1, 1).await.unwrap();
        assert_eq!(progress.student.name, "Ahmad");
        assert_eq!(progress.history_total, 2);
        assert_eq!(progress.history.len(), 1);
        assert_eq!(progress.history[0].id, "h2");
        assert_eq!(progress.summary.total_verses, 20);
        assert_eq!(progress.reviews_total, 1);
        assert_eq!(progress.reviews[0].teacher_name(), "Ustadz Hasan");
    }

    #[tokio::test]
    async fn test_failed_history_reads_are_reported() {
        let gw = MemoryGateway::new()
            .with_rows("santri", vec![json!({"id": "s1", "nama": "Ahmad"})]);

        // reads: profile, summary, history page, review page
        let progress = load_with_failing_read(&gw, 3).await;
        assert_eq!(progress.history_error.as_deref(), Some("store offline"));
        assert!(progress.reviews_error.is_none());

        let progress = load_with_failing_read(&gw, 4).await;
        assert!(progress.history_error.is_none());
        assert_eq!(progress.reviews_error.as_deref(), Some("store offline"));
        assert!(progress.reviews.is_empty());
    }

    /// Runs `load` with the `nth` gateway read (1-based) failing.
    async fn load_with_failing_read(gw: &MemoryGateway, nth: u32) -> StudentProgress {
        let failing = FailNth { inner: gw, nth, seen: std::sync::atomic::AtomicU32::new(0) };
        load(&failing, "s1", 1, 10).await.unwrap()
    }

    struct FailNth<'a> {
        inner: &'a MemoryGateway,
        nth: u32,
        seen: std::sync::atomic::AtomicU32,
    }

    impl Gateway for FailNth<'_> {
        async fn select(&self, query: &crate::gateway::ReadQuery) -> Result<crate::gateway::Page<serde_json::Value>> {
            let n = self.seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
            if n == self.nth {
                return Err(crate::error::TahfidzError::Gateway {
                    status: 503,
                    message: "store offline".to_string(),
                });
            }
            self.inner.select(query).await
        }

        async fn insert(&self, collection: &str, row: serde_json::Value) -> Result<serde_json::Value> {
            self.inner.insert(collection, row).await
        }

        async fn update(&self, collection: &str, id: &str, patch: serde_json::Value) -> Result<()> {
            self.inner.update(collection, id, patch).await
        }

        async fn delete(&self, collection: &str, id: &str) -> Result<()> {
            self.inner.delete(collection, id).await
        }
    }

    #[tokio::test]
    async fn test_load_unknown_student() {
        let gw = MemoryGateway::new();
        assert!(load(&gw, "missing", 1, 10).await.is_err());
    }
}
