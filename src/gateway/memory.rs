//! In-process gateway with the same query semantics as the remote store.
//!
//! Backs the `local` backend (persisted as one JSON document) and doubles as
//! the gateway used by tests: it counts every call and can be told to fail
//! the next one.

use super::Gateway;
use super::query::{Page, Predicate, ReadQuery};
use super::session::{Authenticator, Session, SessionUser};
use crate::error::{TahfidzError, Result};
use chrono::Utc;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::NamedTempFile;

const ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    collections: BTreeMap<String, Vec<Value>>,
}

/// Number of calls received, per operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallStats {
    pub reads: usize,
    pub inserts: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl CallStats {
    pub fn writes(&self) -> usize {
        self.inserts + self.updates + self.deletes
    }

    pub fn total(&self) -> usize {
        self.reads + self.writes()
    }
}

#[derive(Default)]
pub struct MemoryGateway {
    data: Mutex<StoreData>,
    path: Option<PathBuf>,
    stats: Mutex<CallStats>,
    failure: Mutex<Option<String>>,
    users: BTreeMap<String, String>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens (or starts) a store persisted at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let data = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)
                .map_err(|e| TahfidzError::Storage(format!("Corrupt store {}: {}", path.display(), e)))?
        } else {
            StoreData::default()
        };
        Ok(Self {
            data: Mutex::new(data),
            path: Some(path.to_path_buf()),
            ..Self::default()
        })
    }

    /// Seeds a collection without counting calls.
    pub fn with_rows(self, collection: &str, rows: Vec<Value>) -> Self {
        {
            let mut data = self.data();
            let target = data.collections.entry(collection.to_string()).or_default();
            for row in rows {
                if let Value::Object(obj) = row {
                    target.push(Value::Object(Self::stamp(obj)));
                }
            }
        }
        self
    }

    /// Registers credentials accepted by [`Authenticator::sign_in`].
    pub fn with_user(mut self, email: &str, password: &str) -> Self {
        self.users.insert(email.to_string(), password.to_string());
        self
    }

    /// Makes the next call fail with `message`.
    pub fn fail_next(&self, message: &str) {
        *lock(&self.failure) = Some(message.to_string());
    }

    pub fn stats(&self) -> CallStats {
        *lock(&self.stats)
    }

    pub fn reset_stats(&self) {
        *lock(&self.stats) = CallStats::default();
    }

    /// Row count of a collection, bypassing the call counters.
    pub fn count(&self, collection: &str) -> usize {
        self.data()
            .collections
            .get(collection)
            .map(|rows| rows.len())
            .unwrap_or(0)
    }

    fn data(&self) -> MutexGuard<'_, StoreData> {
        lock(&self.data)
    }

    fn record(&self, bump: impl FnOnce(&mut CallStats)) -> Result<()> {
        {
            let mut stats = lock(&self.stats);
            bump(&mut *stats);
        }
        if let Some(message) = lock(&self.failure).take() {
            tracing::debug!(%message, "injected gateway failure");
            return Err(TahfidzError::Gateway {
                status: 503,
                message,
            });
        }
        Ok(())
    }

    fn stamp(mut obj: Map<String, Value>) -> Map<String, Value> {
        if obj.get("id").and_then(value_text).is_none() {
            let id = nanoid::format(nanoid::rngs::default, &ID_ALPHABET, 12);
            obj.insert("id".to_string(), Value::String(id));
        }
        obj.entry("created_at")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
        obj
    }

    fn persist(&self, data: &StoreData) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let dir = path
            .parent()
            .ok_or_else(|| TahfidzError::Storage("Store path has no parent directory".to_string()))?;
        std::fs::create_dir_all(dir)?;

        // Write to a temp file in the same directory, then rename over the target
        let mut temp_file = NamedTempFile::new_in(dir)
            .map_err(|e| TahfidzError::Storage(format!("Failed to create temp file: {}", e)))?;
        use std::io::Write;
        temp_file
            .write_all(serde_json::to_string_pretty(data)?.as_bytes())
            .map_err(|e| TahfidzError::Storage(format!("Failed to write to temp file: {}", e)))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| TahfidzError::Storage(format!("Failed to sync temp file: {}", e)))?;
        temp_file
            .persist(path)
            .map_err(|e| TahfidzError::Storage(format!("Failed to persist temp file: {}", e)))?;
        Ok(())
    }
}

impl Gateway for MemoryGateway {
    async fn select(&self, query: &ReadQuery) -> Result<Page<Value>> {
        self.record(|s| s.reads += 1)?;
        tracing::debug!(collection = %query.collection, predicates = query.predicates.len(), "select");

        let matchers = query
            .predicates
            .iter()
            .map(Matcher::compile)
            .collect::<Result<Vec<_>>>()?;

        let data = self.data();
        let rows: &[Value] = data
            .collections
            .get(&query.collection)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);

        let mut matched: Vec<&Value> = rows
            .iter()
            .filter(|row| matchers.iter().all(|m| m.matches(row)))
            .collect();

        if let Some(order) = &query.order {
            matched.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.field), b.get(&order.field));
                if order.ascending { ord } else { ord.reverse() }
            });
        }

        let total = matched.len() as u64;
        let windowed: Vec<&Value> = match query.window {
            Some(w) => matched
                .into_iter()
                .skip(w.offset as usize)
                .take(w.limit as usize)
                .collect(),
            None => matched,
        };

        let rows = windowed
            .into_iter()
            .map(|row| project(row, query, &data))
            .collect();
        Ok(Page { rows, total })
    }

    async fn insert(&self, collection: &str, row: Value) -> Result<Value> {
        self.record(|s| s.inserts += 1)?;
        let Value::Object(obj) = row else {
            return Err(TahfidzError::Validation(
                "Inserted row must be an object".to_string(),
            ));
        };
        let obj = Self::stamp(obj);

        let mut data = self.data();
        let rows = data.collections.entry(collection.to_string()).or_default();
        let id = obj.get("id").and_then(value_text).unwrap_or_default();
        if rows
            .iter()
            .any(|r| r.get("id").and_then(value_text).as_deref() == Some(id.as_str()))
        {
            return Err(TahfidzError::Gateway {
                status: 409,
                message: format!("Duplicate id {} in {}", id, collection),
            });
        }
        rows.push(Value::Object(obj.clone()));
        self.persist(&data)?;
        tracing::info!(collection, %id, "inserted row");
        Ok(Value::Object(obj))
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<()> {
        self.record(|s| s.updates += 1)?;
        let Value::Object(patch) = patch else {
            return Err(TahfidzError::Validation(
                "Update payload must be an object".to_string(),
            ));
        };

        let mut data = self.data();
        let row = data
            .collections
            .get_mut(collection)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|r| r.get("id").and_then(value_text).as_deref() == Some(id))
            })
            .ok_or_else(|| TahfidzError::NotFound(format!("{}/{}", collection, id)))?;

        if let Value::Object(existing) = row {
            for (key, value) in patch {
                if key != "id" {
                    existing.insert(key, value);
                }
            }
        }
        self.persist(&data)?;
        tracing::info!(collection, id, "updated row");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.record(|s| s.deletes += 1)?;
        let mut data = self.data();
        let rows = data
            .collections
            .get_mut(collection)
            .ok_or_else(|| TahfidzError::NotFound(format!("{}/{}", collection, id)))?;
        let pos = rows
            .iter()
            .position(|r| r.get("id").and_then(value_text).as_deref() == Some(id))
            .ok_or_else(|| TahfidzError::NotFound(format!("{}/{}", collection, id)))?;
        rows.remove(pos);
        self.persist(&data)?;
        tracing::info!(collection, id, "deleted row");
        Ok(())
    }
}

impl Authenticator for MemoryGateway {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        match self.users.get(email) {
            Some(expected) if expected == password => {
                let token = nanoid::format(nanoid::rngs::default, &ID_ALPHABET, 24);
                Ok(Session::new(
                    token,
                    3600,
                    SessionUser {
                        id: format!("local-{}", email),
                        email: email.to_string(),
                    },
                ))
            }
            _ => Err(TahfidzError::Gateway {
                status: 400,
                message: "Invalid login credentials".to_string(),
            }),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

enum Matcher {
    Eq { field: String, value: String },
    Pattern { field: String, regex: Regex },
    Gte { field: String, value: String },
    Lte { field: String, value: String },
    AnyOf { field: String, values: Vec<String> },
}

impl Matcher {
    fn compile(predicate: &Predicate) -> Result<Self> {
        Ok(match predicate {
            Predicate::Eq { field, value } => Matcher::Eq {
                field: field.clone(),
                value: value.clone(),
            },
            Predicate::ILike { field, pattern } => Matcher::Pattern {
                field: field.clone(),
                regex: like_to_regex(pattern)?,
            },
            Predicate::Gte { field, value } => Matcher::Gte {
                field: field.clone(),
                value: value.clone(),
            },
            Predicate::Lte { field, value } => Matcher::Lte {
                field: field.clone(),
                value: value.clone(),
            },
            Predicate::In { field, values } => Matcher::AnyOf {
                field: field.clone(),
                values: values.clone(),
            },
        })
    }

    fn matches(&self, row: &Value) -> bool {
        let text = |field: &str| row.get(field).and_then(value_text);
        match self {
            Matcher::Eq { field, value } => text(field).as_deref() == Some(value.as_str()),
            Matcher::Pattern { field, regex } => {
                text(field).map(|t| regex.is_match(&t)).unwrap_or(false)
            }
            Matcher::Gte { field, value } => text(field)
                .map(|t| compare_text(&t, value) != Ordering::Less)
                .unwrap_or(false),
            Matcher::Lte { field, value } => text(field)
                .map(|t| compare_text(&t, value) != Ordering::Greater)
                .unwrap_or(false),
            Matcher::AnyOf { field, values } => text(field)
                .map(|t| values.iter().any(|v| *v == t))
                .unwrap_or(false),
        }
    }
}

/// Translates a SQL `LIKE` pattern into an anchored case-insensitive regex.
fn like_to_regex(pattern: &str) -> Result<Regex> {
    let mut body = String::with_capacity(pattern.len() + 8);
    for c in pattern.chars() {
        match c {
            '%' => body.push_str(".*"),
            '_' => body.push('.'),
            other => body.push_str(&regex::escape(&other.to_string())),
        }
    }
    RegexBuilder::new(&format!("^{}$", body))
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| TahfidzError::Parse(format!("Invalid pattern '{}': {}", pattern, e)))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

/// Nulls sort after values in ascending order.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.and_then(value_text);
    let b = b.and_then(value_text);
    match (a, b) {
        (Some(x), Some(y)) => match (x.parse::<f64>(), y.parse::<f64>()) {
            (Ok(p), Ok(q)) => p.partial_cmp(&q).unwrap_or(Ordering::Equal),
            _ => x.to_lowercase().cmp(&y.to_lowercase()),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn pick_columns(row: &Value, columns: &[String]) -> Value {
    if columns.is_empty() || columns.iter().any(|c| c == "*") {
        return row.clone();
    }
    let mut out = Map::new();
    for column in columns {
        if let Some(v) = row.get(column) {
            out.insert(column.clone(), v.clone());
        }
    }
    Value::Object(out)
}

fn project(row: &Value, query: &ReadQuery, data: &StoreData) -> Value {
    let mut out = pick_columns(row, &query.columns);
    for embed in &query.embeds {
        let key = row.get(&embed.foreign_key).and_then(value_text);
        let target = key.and_then(|key| {
            data.collections.get(&embed.collection).and_then(|rows| {
                rows.iter()
                    .find(|r| r.get("id").and_then(value_text).as_deref() == Some(key.as_str()))
            })
        });
        let embedded = target
            .map(|t| pick_columns(t, &embed.columns))
            .unwrap_or(Value::Null);
        if let Value::Object(obj) = &mut out {
            obj.insert(embed.alias.clone(), embedded);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn students() -> MemoryGateway {
        MemoryGateway::new().with_rows(
            "santri",
            vec![
                json!({"id": "1", "nama": "Ahmad", "kelas": "pagi"}),
                json!({"id": "2", "nama": "budi", "kelas": "sore"}),
                json!({"id": "3", "nama": "Cahya", "kelas": "pagi"}),
            ],
        )
    }

    #[tokio::test]
    async fn test_select_filters_orders_and_counts() {
        let gw = students();
        let page = gw
            .select(
                &ReadQuery::new("santri")
                    .eq("kelas", "pagi")
                    .order_by("nama", false),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.rows[0]["nama"], "Cahya");
        assert_eq!(page.rows[1]["nama"], "Ahmad");
    }

    #[tokio::test]
    async fn test_ilike_is_case_insensitive() {
        let gw = students();
        let page = gw
            .select(&ReadQuery::new("santri").contains("nama", "BU"))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0]["id"], "2");
    }

    #[tokio::test]
    async fn test_in_matches_any_listed_value() {
        let gw = students();
        let page = gw
            .select(
                &ReadQuery::new("santri")
                    .is_in("id", ["1", "3", "42"])
                    .order_by("id", true),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.rows[0]["id"], "1");
        assert_eq!(page.rows[1]["id"], "3");

        let none = gw
            .select(&ReadQuery::new("santri").is_in("id", Vec::<String>::new()))
            .await
            .unwrap();
        assert_eq!(none.total, 0);
    }

    #[tokio::test]
    async fn test_window_keeps_total() {
        let gw = students();
        let page = gw
            .select(&ReadQuery::new("santri").order_by("nama", true).range(1, 1))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0]["nama"], "budi");
    }

    #[tokio::test]
    async fn test_range_predicates_on_dates() {
        let gw = MemoryGateway::new().with_rows(
            "hafalan",
            vec![
                json!({"id": "a", "tanggal": "2024-01-10"}),
                json!({"id": "b", "tanggal": "2024-02-10"}),
                json!({"id": "c", "tanggal": "2024-03-10"}),
            ],
        );
        let page = gw
            .select(
                &ReadQuery::new("hafalan")
                    .gte("tanggal", "2024-02-01")
                    .lte("tanggal", "2024-03-10"),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_embed_resolves_foreign_key() {
        let gw = students().with_rows(
            "hafalan",
            vec![
                json!({"id": "h1", "santri_id": "3", "surah": "Al-Fatihah"}),
                json!({"id": "h2", "santri_id": "99", "surah": "Al-Ikhlas"}),
            ],
        );
        let page = gw
            .select(
                &ReadQuery::new("hafalan")
                    .columns(&["id", "surah"])
                    .embed("santri", "santri", "santri_id", &["id", "nama"])
                    .order_by("id", true),
            )
            .await
            .unwrap();
        assert_eq!(page.rows[0]["santri"]["nama"], "Cahya");
        assert!(page.rows[0].get("santri_id").is_none());
        assert!(page.rows[1]["santri"].is_null());
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamp() {
        let gw = MemoryGateway::new();
        let row = gw.insert("guru", json!({"nama": "Hasan"})).await.unwrap();
        assert!(row["id"].as_str().is_some_and(|id| id.len() == 12));
        assert!(row["created_at"].is_string());
        assert_eq!(gw.count("guru"), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_row() {
        let gw = students();
        assert!(matches!(
            gw.update("santri", "404", json!({"nama": "x"})).await,
            Err(TahfidzError::NotFound(_))
        ));
        assert!(matches!(
            gw.delete("santri", "404").await,
            Err(TahfidzError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let gw = students();
        gw.update("santri", "2", json!({"nama": "Budi", "id": "evil"}))
            .await
            .unwrap();
        let page = gw
            .select(&ReadQuery::new("santri").eq("id", "2"))
            .await
            .unwrap();
        assert_eq!(page.rows[0]["nama"], "Budi");
        assert_eq!(page.rows[0]["kelas"], "sore");
    }

    #[tokio::test]
    async fn test_fail_next_is_one_shot_and_counted() {
        let gw = students();
        gw.fail_next("offline");
        let err = gw.select(&ReadQuery::new("santri")).await.unwrap_err();
        assert_eq!(err.user_message(), "offline");
        assert!(gw.select(&ReadQuery::new("santri")).await.is_ok());
        assert_eq!(gw.stats().reads, 2);
    }

    #[tokio::test]
    async fn test_persisted_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");

        let gw = MemoryGateway::open(&path).unwrap();
        gw.insert("santri", json!({"nama": "Ahmad"})).await.unwrap();
        drop(gw);

        let reopened = MemoryGateway::open(&path).unwrap();
        assert_eq!(reopened.count("santri"), 1);
    }

    #[tokio::test]
    async fn test_sign_in() {
        let gw = MemoryGateway::new().with_user("admin@tahfidz.test", "secret");
        let session = gw.sign_in("admin@tahfidz.test", "secret").await.unwrap();
        assert_eq!(session.user.email, "admin@tahfidz.test");
        assert!(gw.sign_in("admin@tahfidz.test", "wrong").await.is_err());
    }
}
