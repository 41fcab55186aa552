use super::intent::{QueryIntent, SortDirection};
use super::resource::Resource;
use crate::error::{TahfidzError, Result};
use crate::gateway::{Gateway, Page, ReadQuery};
use serde_json::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient feedback for a mutation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Modal {
    #[default]
    Closed,
    Create,
    /// Editing the row with this id.
    Edit(String),
}

/// A read issued by [`ListController::begin_refresh`].
///
/// The read counts as in flight only while the ticket (or a clone) is alive;
/// dropping it unanswered lets the next refresh of the same intent go out.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    seq: u64,
    query: ReadQuery,
    live: Arc<()>,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &ReadQuery {
        &self.query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Rows replaced with the response.
    Applied,
    /// The read failed; the error banner is set.
    Failed,
    /// A newer read was issued meanwhile; the response was dropped.
    Stale,
    /// The same intent was already in flight; nothing was issued.
    Coalesced,
}

struct InFlight {
    seq: u64,
    intent: QueryIntent,
    live: Weak<()>,
}

/// State of one list screen: query intent, fetched rows and UI flags.
///
/// Every intent change re-reads through the gateway. Reads are
/// sequence-numbered: only the response to the most recently issued read is
/// applied, and a read for an intent identical to the one in flight is not
/// issued again.
pub struct ListController<'g, R: Resource, G: Gateway> {
    gateway: &'g G,
    page_size: u32,
    intent: QueryIntent,
    rows: Vec<R::Record>,
    total: u64,
    loaded: bool,
    error: Option<String>,
    form_error: Option<String>,
    modal: Modal,
    notices: Vec<Notice>,
    last_seq: u64,
    in_flight: Option<InFlight>,
    _resource: PhantomData<R>,
}

impl<'g, R: Resource, G: Gateway> ListController<'g, R, G> {
    pub fn new(gateway: &'g G, page_size: u32) -> Self {
        Self {
            gateway,
            page_size: page_size.max(1),
            intent: QueryIntent::for_resource::<R>(),
            rows: Vec::new(),
            total: 0,
            loaded: false,
            error: None,
            form_error: None,
            modal: Modal::Closed,
            notices: Vec::new(),
            last_seq: 0,
            in_flight: None,
            _resource: PhantomData,
        }
    }

    /// Starts from a prepared intent without fetching.
    pub fn with_intent(mut self, intent: QueryIntent) -> Self {
        self.intent = intent;
        self
    }

    pub fn gateway(&self) -> &'g G {
        self.gateway
    }

    pub fn intent(&self) -> &QueryIntent {
        &self.intent
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.intent.filters
    }

    pub fn sort(&self) -> SortDirection {
        self.intent.sort
    }

    pub fn page(&self) -> u32 {
        self.intent.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn rows(&self) -> &[R::Record] {
        &self.rows
    }

    /// Exact count of all rows matching the filters.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Zero for an empty result.
    pub fn total_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.page_size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn is_loading(&self) -> bool {
        self.live_in_flight().is_some()
    }

    pub fn has_loaded(&self) -> bool {
        self.loaded
    }

    /// Banner text of the last failed read.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Inline error of the last rejected form.
    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn open_create(&mut self) {
        self.modal = Modal::Create;
        self.form_error = None;
    }

    /// Opens the edit form for `record`, returning its prefilled draft.
    pub fn open_edit(&mut self, record: &R::Record) -> R::Draft {
        self.modal = Modal::Edit(R::id(record).to_string());
        self.form_error = None;
        R::draft_of(record)
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::Closed;
        self.form_error = None;
    }

    pub async fn set_filter(&mut self, key: &str, value: &str) -> Result<RefreshOutcome> {
        self.intent.set_filter::<R>(key, value)?;
        self.intent.page = 1;
        Ok(self.refresh().await)
    }

    pub async fn clear_filters(&mut self) -> RefreshOutcome {
        self.intent.filters.clear();
        self.intent.page = 1;
        self.refresh().await
    }

    pub async fn set_sort(&mut self, direction: SortDirection) -> RefreshOutcome {
        self.intent.sort = direction;
        self.intent.page = 1;
        self.refresh().await
    }

    pub async fn toggle_sort(&mut self) -> RefreshOutcome {
        self.set_sort(self.intent.sort.toggled()).await
    }

    /// Moves to page `n`, clamped to `[1, max(total_pages, 1)]`.
    pub async fn set_page(&mut self, n: u32) -> RefreshOutcome {
        self.intent.page = n.clamp(1, self.total_pages().max(1));
        self.refresh().await
    }

    pub async fn next_page(&mut self) -> RefreshOutcome {
        self.set_page(self.intent.page.saturating_add(1)).await
    }

    pub async fn prev_page(&mut self) -> RefreshOutcome {
        self.set_page(self.intent.page.saturating_sub(1)).await
    }

    /// Re-reads the current intent.
    ///
    /// When the current page no longer exists (rows were deleted, or the
    /// intent was prepared with a page past the end) the page is clamped and
    /// read once more.
    pub async fn refresh(&mut self) -> RefreshOutcome {
        let outcome = self.fetch().await;
        if outcome == RefreshOutcome::Applied {
            let last = self.total_pages().max(1);
            if self.intent.page > last {
                tracing::debug!(page = self.intent.page, last, "page out of range, clamping");
                self.intent.page = last;
                return self.fetch().await;
            }
        }
        outcome
    }

    async fn fetch(&mut self) -> RefreshOutcome {
        let Some(ticket) = self.begin_refresh() else {
            return RefreshOutcome::Coalesced;
        };
        let result = self.gateway.select(ticket.query()).await;
        self.complete_refresh(ticket, result)
    }

    /// Issues a ticket for the current intent, or `None` when a read for an
    /// identical intent is already in flight.
    pub fn begin_refresh(&mut self) -> Option<Ticket> {
        if let Some(in_flight) = self.live_in_flight() {
            if in_flight.intent == self.intent {
                tracing::debug!(seq = in_flight.seq, "identical read in flight, coalescing");
                return None;
            }
        }
        self.last_seq += 1;
        let live = Arc::new(());
        self.in_flight = Some(InFlight {
            seq: self.last_seq,
            intent: self.intent.clone(),
            live: Arc::downgrade(&live),
        });
        Some(Ticket {
            seq: self.last_seq,
            query: self.intent.to_query::<R>(self.page_size),
            live,
        })
    }

    /// The outstanding read, unless its ticket was dropped unanswered.
    fn live_in_flight(&self) -> Option<&InFlight> {
        self.in_flight
            .as_ref()
            .filter(|in_flight| in_flight.live.strong_count() > 0)
    }

    /// Applies a read result if `ticket` is the most recently issued one.
    pub fn complete_refresh(&mut self, ticket: Ticket, result: Result<Page<Value>>) -> RefreshOutcome {
        if ticket.seq != self.last_seq {
            tracing::debug!(seq = ticket.seq, latest = self.last_seq, "discarding stale response");
            return RefreshOutcome::Stale;
        }
        self.in_flight = None;

        match result.and_then(decode_page::<R>) {
            Ok(page) => {
                tracing::debug!(
                    collection = R::COLLECTION,
                    rows = page.rows.len(),
                    total = page.total,
                    "list refreshed"
                );
                self.rows = page.rows;
                self.total = page.total;
                self.loaded = true;
                self.error = None;
                RefreshOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(collection = R::COLLECTION, error = %e, "list refresh failed");
                self.error = Some(e.user_message());
                if !self.loaded {
                    self.rows.clear();
                    self.total = 0;
                }
                RefreshOutcome::Failed
            }
        }
    }

    /// Fetches one record by id, outside the current page.
    pub async fn get(&self, id: &str) -> Result<R::Record> {
        let query = R::base_query().eq("id", id).range(0, 1);
        let page = decode_page::<R>(self.gateway.select(&query).await?)?;
        page.rows
            .into_iter()
            .next()
            .ok_or_else(|| TahfidzError::NotFound(format!("{} {}", R::NOUN, id)))
    }

    pub async fn create(&mut self, draft: R::Draft) -> Result<R::Record> {
        let draft = self.check_form(draft)?;
        let payload = serde_json::to_value(&draft)?;
        let row = match self.gateway.insert(R::COLLECTION, payload).await {
            Ok(row) => row,
            Err(e) => {
                self.notify_failure("create", &e);
                return Err(e);
            }
        };
        self.notify(NoticeLevel::Success, format!("{} created", R::NOUN));
        self.modal = Modal::Closed;
        self.refresh().await;
        decode_row::<R>(row)
    }

    /// Replaces every mutable field of the record with the draft.
    pub async fn update(&mut self, id: &str, draft: R::Draft) -> Result<()> {
        let draft = self.check_form(draft)?;
        let payload = serde_json::to_value(&draft)?;
        if let Err(e) = self.gateway.update(R::COLLECTION, id, payload).await {
            self.notify_failure("update", &e);
            return Err(e);
        }
        self.notify(NoticeLevel::Success, format!("{} updated", R::NOUN));
        self.modal = Modal::Closed;
        self.refresh().await;
        Ok(())
    }

    /// Deletes after confirmation. Returns `false` when the user declined.
    pub async fn delete(&mut self, id: &str, mut confirm: impl Confirm) -> Result<bool> {
        let prompt = match self.rows.iter().find(|r| R::id(r) == id) {
            Some(record) => format!("Delete {} '{}'?", R::NOUN.to_lowercase(), R::label(record)),
            None => format!("Delete {} {}?", R::NOUN.to_lowercase(), id),
        };
        if !confirm.confirm(&prompt) {
            tracing::debug!(collection = R::COLLECTION, id, "delete declined");
            return Ok(false);
        }
        if let Err(e) = self.gateway.delete(R::COLLECTION, id).await {
            self.notify_failure("delete", &e);
            return Err(e);
        }
        self.notify(NoticeLevel::Success, format!("{} deleted", R::NOUN));
        self.refresh().await;
        Ok(true)
    }

    fn check_form(&mut self, draft: R::Draft) -> Result<R::Draft> {
        let draft = R::normalize(draft);
        if let Err(e) = R::validate(&draft) {
            self.form_error = Some(e.user_message());
            return Err(e);
        }
        self.form_error = None;
        Ok(draft)
    }

    fn notify(&mut self, level: NoticeLevel, message: String) {
        match level {
            NoticeLevel::Success => tracing::info!(collection = R::COLLECTION, %message),
            NoticeLevel::Error => tracing::warn!(collection = R::COLLECTION, %message),
        }
        self.notices.push(Notice { level, message });
    }

    fn notify_failure(&mut self, action: &str, error: &TahfidzError) {
        self.notify(
            NoticeLevel::Error,
            format!(
                "Failed to {} {}: {}",
                action,
                R::NOUN.to_lowercase(),
                error.user_message()
            ),
        );
    }
}

pub(crate) fn decode_row<R: Resource>(row: Value) -> Result<R::Record> {
    serde_json::from_value(row)
        .map_err(|e| TahfidzError::Parse(format!("Unexpected {} row: {}", R::COLLECTION, e)))
}

pub(crate) fn decode_page<R: Resource>(page: Page<Value>) -> Result<Page<R::Record>> {
    let rows = page
        .rows
        .into_iter()
        .map(decode_row::<R>)
        .collect::<Result<Vec<_>>>()?;
    Ok(Page {
        rows,
        total: page.total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::list::resource::{Memorizations, Students};
    use crate::model::{MemorizationDraft, MemorizationStatus, StudentDraft};
    use chrono::NaiveDate;
    use serde_json::json;

    fn school() -> MemoryGateway {
        let mut rows = Vec::new();
        for i in 0..25 {
            rows.push(json!({"id": format!("p{:02}", i), "nama": format!("Pagi {:02}", i), "kelas": "pagi"}));
        }
        for i in 0..10 {
            rows.push(json!({"id": format!("s{:02}", i), "nama": format!("Sore {:02}", i), "kelas": "sore"}));
        }
        MemoryGateway::new().with_rows("santri", rows)
    }

    fn always(answer: bool) -> impl FnMut(&str) -> bool {
        move |_| answer
    }

    #[tokio::test]
    async fn test_filter_by_class_pages_results() {
        let gw = school();
        let mut list = ListController::<Students, _>::new(&gw, 10);
        list.set_filter("class", "pagi").await.unwrap();

        assert_eq!(list.rows().len(), 10);
        assert!(list.rows().iter().all(|s| s.class_label.as_deref() == Some("pagi")));
        assert_eq!(list.total(), 25);
        assert_eq!(list.total_pages(), 3);
    }

    #[tokio::test]
    async fn test_filter_and_sort_reset_page_but_page_change_does_not() {
        let gw = school();
        let mut list = ListController::<Students, _>::new(&gw, 10);
        list.refresh().await;
        list.set_page(3).await;
        assert_eq!(list.page(), 3);

        list.set_filter("search", "a").await.unwrap();
        assert_eq!(list.page(), 1);

        list.next_page().await;
        assert_eq!(list.page(), 2);
        assert_eq!(list.filters().get("search").map(String::as_str), Some("a"));

        list.toggle_sort().await;
        assert_eq!(list.page(), 1);
        assert_eq!(list.sort(), SortDirection::Descending);
        assert_eq!(list.rows()[0].name, "Pagi 24");
    }

    #[tokio::test]
    async fn test_set_page_clamps() {
        let gw = school();
        let mut list = ListController::<Students, _>::new(&gw, 10);
        list.refresh().await;
        list.set_page(99).await;
        assert_eq!(list.page(), 4);
        assert_eq!(list.rows().len(), 5);

        list.set_page(0).await;
        assert_eq!(list.page(), 1);
        list.prev_page().await;
        assert_eq!(list.page(), 1);
    }

    #[tokio::test]
    async fn test_empty_result_has_zero_pages() {
        let gw = school();
        let mut list = ListController::<Students, _>::new(&gw, 10);
        list.set_filter("class", "malam").await.unwrap();
        assert!(list.rows().is_empty());
        assert_eq!(list.total_pages(), 0);
        assert_eq!(list.page(), 1);

        list.set_page(5).await;
        assert_eq!(list.page(), 1);
    }

    #[tokio::test]
    async fn test_prepared_intent_past_the_end_is_clamped() {
        let gw = school();
        let mut intent = QueryIntent::for_resource::<Students>();
        intent.set_filter::<Students>("class", "sore").unwrap();
        intent.page = 7;
        let mut list = ListController::<Students, _>::new(&gw, 10).with_intent(intent);
        list.refresh().await;
        assert_eq!(list.page(), 1);
        assert_eq!(list.rows().len(), 10);
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let gw = school();
        let mut list = ListController::<Students, _>::new(&gw, 10);
        list.refresh().await;
        let first = list.rows().to_vec();
        list.refresh().await;
        assert_eq!(list.rows(), first.as_slice());
    }

    #[tokio::test]
    async fn test_unknown_filter_rejected_without_read() {
        let gw = school();
        let mut list = ListController::<Students, _>::new(&gw, 10);
        assert!(list.set_filter("colour", "red").await.is_err());
        assert_eq!(gw.stats().reads, 0);
    }

    #[tokio::test]
    async fn test_create_round_trip() {
        let gw = school();
        let mut list = ListController::<Students, _>::new(&gw, 10);
        list.open_create();
        let created = list
            .create(StudentDraft::new(" Zainab ").with_class("sore"))
            .await
            .unwrap();
        assert_eq!(list.modal(), &Modal::Closed);
        assert_eq!(list.notices()[0].level, NoticeLevel::Success);

        list.set_filter("search", "Zainab").await.unwrap();
        let fetched = &list.rows()[0];
        assert_eq!(fetched.name, "Zainab");
        assert_eq!(fetched.class_label.as_deref(), Some("sore"));
        assert_eq!(fetched.id, created.id);
        assert!(fetched.created_at.is_some());
    }

    #[tokio::test]
    async fn test_inverted_verse_range_never_reaches_gateway() {
        let gw = MemoryGateway::new();
        let mut list = ListController::<Memorizations, _>::new(&gw, 10);
        list.open_create();
        let draft = MemorizationDraft {
            student_id: "s1".to_string(),
            chapter: "Al-Mulk".to_string(),
            verse_start: 10,
            verse_end: 5,
            status: MemorizationStatus::Submitted,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };

        assert!(list.create(draft).await.is_err());
        assert_eq!(gw.stats().total(), 0);
        assert!(list.form_error().is_some_and(|e| e.contains("cannot be greater")));
        assert_eq!(list.modal(), &Modal::Create);
    }

    #[tokio::test]
    async fn test_declined_delete_makes_no_call() {
        let gw = school();
        let mut list = ListController::<Students, _>::new(&gw, 10);
        list.refresh().await;
        gw.reset_stats();

        let mut prompts = Vec::new();
        let deleted = list
            .delete("p00", |prompt: &str| {
                prompts.push(prompt.to_string());
                false
            })
            .await
            .unwrap();

        assert!(!deleted);
        assert_eq!(gw.stats().total(), 0);
        assert_eq!(prompts, vec!["Delete student 'Pagi 00'?".to_string()]);
        assert!(list.rows().iter().any(|s| s.id == "p00"));
    }

    #[tokio::test]
    async fn test_confirmed_delete_refreshes() {
        let gw = school();
        let mut list = ListController::<Students, _>::new(&gw, 10);
        list.refresh().await;
        assert!(list.delete("p00", always(true)).await.unwrap());
        assert_eq!(list.total(), 34);
        assert!(list.rows().iter().all(|s| s.id != "p00"));
    }

    #[tokio::test]
    async fn test_deleting_last_row_of_last_page_steps_back() {
        let gw = MemoryGateway::new().with_rows(
            "santri",
            (0..11)
                .map(|i| json!({"id": format!("x{}", i), "nama": format!("N{:02}", i)}))
                .collect(),
        );
        let mut list = ListController::<Students, _>::new(&gw, 10);
        list.refresh().await;
        list.set_page(2).await;
        assert_eq!(list.rows().len(), 1);

        list.delete("x10", always(true)).await.unwrap();
        assert_eq!(list.page(), 1);
        assert_eq!(list.rows().len(), 10);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_rows() {
        let gw = school();
        let mut list = ListController::<Students, _>::new(&gw, 10);
        list.refresh().await;
        let before = list.rows().to_vec();

        gw.fail_next("connection reset");
        assert_eq!(list.refresh().await, RefreshOutcome::Failed);
        assert_eq!(list.error(), Some("connection reset"));
        assert_eq!(list.rows(), before.as_slice());
        assert!(!list.is_loading());

        list.refresh().await;
        assert_eq!(list.error(), None);
    }

    #[tokio::test]
    async fn test_failed_first_load_is_empty() {
        let gw = school();
        let mut list = ListController::<Students, _>::new(&gw, 10);
        gw.fail_next("offline");
        list.refresh().await;
        assert!(list.rows().is_empty());
        assert!(!list.has_loaded());
        assert!(list.error().is_some());
    }

    #[tokio::test]
    async fn test_gateway_failure_on_update_leaves_state() {
        let gw = school();
        let mut list = ListController::<Students, _>::new(&gw, 10);
        list.refresh().await;
        let record = list.rows()[0].clone();
        let mut draft = list.open_edit(&record);
        draft.name = "Renamed".to_string();

        gw.fail_next("permission denied");
        assert!(list.update(&record.id, draft).await.is_err());

        let notices = list.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(notices[0].message.contains("permission denied"));
        assert_eq!(list.modal(), &Modal::Edit(record.id.clone()));
        assert_eq!(list.rows()[0], record);
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let gw = school();
        let mut list = ListController::<Students, _>::new(&gw, 10);

        let old = list.begin_refresh().unwrap();
        let old_result = gw.select(old.query()).await;

        // a newer intent is issued and resolves first
        list.set_filter("class", "sore").await.unwrap();
        assert!(list.rows().iter().all(|s| s.class_label.as_deref() == Some("sore")));

        assert_eq!(list.complete_refresh(old, old_result), RefreshOutcome::Stale);
        assert_eq!(list.total(), 10);
        assert!(list.rows().iter().all(|s| s.class_label.as_deref() == Some("sore")));
    }

    #[tokio::test]
    async fn test_identical_intent_is_coalesced() {
        let gw = school();
        let mut list = ListController::<Students, _>::new(&gw, 10);

        let ticket = list.begin_refresh().unwrap();
        assert!(list.is_loading());
        assert!(list.begin_refresh().is_none());
        assert_eq!(list.refresh().await, RefreshOutcome::Coalesced);

        let result = gw.select(ticket.query()).await;
        assert_eq!(list.complete_refresh(ticket, result), RefreshOutcome::Applied);
        assert_eq!(gw.stats().reads, 1);
        assert!(!list.is_loading());
    }

    #[tokio::test]
    async fn test_dropped_ticket_does_not_block_reads() {
        let gw = school();
        let mut list = ListController::<Students, _>::new(&gw, 10);

        let ticket = list.begin_refresh().unwrap();
        assert!(list.is_loading());
        drop(ticket);
        assert!(!list.is_loading());

        assert_eq!(list.refresh().await, RefreshOutcome::Applied);
        assert_eq!(list.refresh().await, RefreshOutcome::Applied);
        assert_eq!(gw.stats().reads, 2);
        assert_eq!(list.rows().len(), 10);
        assert!(!list.is_loading());
    }

    /// Never answers its first read.
    struct StallOnce {
        inner: MemoryGateway,
        stalled: std::sync::atomic::AtomicBool,
    }

    impl Gateway for StallOnce {
        async fn select(&self, query: &ReadQuery) -> Result<Page<Value>> {
            if !self.stalled.swap(true, std::sync::atomic::Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            self.inner.select(query).await
        }

        async fn insert(&self, collection: &str, row: Value) -> Result<Value> {
            self.inner.insert(collection, row).await
        }

        async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<()> {
            self.inner.update(collection, id, patch).await
        }

        async fn delete(&self, collection: &str, id: &str) -> Result<()> {
            self.inner.delete(collection, id).await
        }
    }

    #[tokio::test]
    async fn test_timed_out_refresh_does_not_block_reads() {
        let gw = StallOnce {
            inner: school(),
            stalled: std::sync::atomic::AtomicBool::new(false),
        };
        let mut list = ListController::<Students, _>::new(&gw, 10);

        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), list.refresh()).await;
        assert!(timed_out.is_err());
        assert!(!list.is_loading());

        assert_eq!(list.refresh().await, RefreshOutcome::Applied);
        assert_eq!(list.total(), 35);
        assert!(!list.is_loading());
    }

    #[tokio::test]
    async fn test_get_missing_record() {
        let gw = school();
        let list = ListController::<Students, _>::new(&gw, 10);
        assert!(list.get("p03").await.is_ok());
        assert!(matches!(
            list.get("nope").await,
            Err(TahfidzError::NotFound(_))
        ));
    }
}
