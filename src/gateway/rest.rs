//! PostgREST-compatible HTTP gateway (the hosted backend's table API).

use super::Gateway;
use super::query::{Page, Predicate, ReadQuery};
use super::session::{Authenticator, Session, SessionUser};
use crate::error::{TahfidzError, Result};
use crate::validation;
use regex::Regex;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_RANGE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use std::sync::{LazyLock, RwLock};
use std::time::Duration;
use url::Url;

static CONTENT_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+-\d+|\*)/(\d+|\*)$").expect("content-range regex is valid")
});

pub struct RestGateway {
    http: reqwest::Client,
    base: Url,
    api_key: String,
    access_token: RwLock<Option<String>>,
}

impl RestGateway {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| TahfidzError::Config(format!("Invalid gateway URL '{}': {}", base_url, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("tahfidz/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            base,
            api_key: api_key.to_string(),
            access_token: RwLock::new(None),
        })
    }

    /// Attaches a session token to every following request.
    pub fn with_session(self, session: &Session) -> Self {
        self.set_access_token(Some(session.access_token.clone()));
        self
    }

    pub fn set_access_token(&self, token: Option<String>) {
        let mut slot = self
            .access_token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *slot = token;
    }

    fn bearer(&self) -> String {
        let token = self
            .access_token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        format!("Bearer {}", token.unwrap_or_else(|| self.api_key.clone()))
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(&self.api_key)?);
        headers.insert(reqwest::header::AUTHORIZATION, header_value(&self.bearer())?);
        Ok(headers)
    }

    pub fn table_url(&self, collection: &str) -> Result<Url> {
        self.base
            .join(&format!("rest/v1/{}", collection))
            .map_err(|e| TahfidzError::Config(format!("Invalid collection '{}': {}", collection, e)))
    }

    /// Full read URL including filters and ordering.
    pub fn select_url(&self, query: &ReadQuery) -> Result<Url> {
        let mut url = self.table_url(&query.collection)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", &query.select_clause());
            for predicate in &query.predicates {
                let (field, value) = match predicate {
                    Predicate::Eq { field, value } => (field, format!("eq.{}", value)),
                    Predicate::ILike { field, pattern } => {
                        (field, format!("ilike.{}", pattern.replace('%', "*")))
                    }
                    Predicate::Gte { field, value } => (field, format!("gte.{}", value)),
                    Predicate::Lte { field, value } => (field, format!("lte.{}", value)),
                    Predicate::In { field, values } => (field, in_list(values)),
                };
                pairs.append_pair(field, &value);
            }
            if let Some(order) = &query.order {
                let dir = if order.ascending { "asc" } else { "desc" };
                pairs.append_pair("order", &format!("{}.{}", order.field, dir));
            }
        }
        Ok(url)
    }

    fn row_url(&self, collection: &str, id: &str) -> Result<Url> {
        validation::validate_id(id)?;
        let mut url = self.table_url(collection)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{}", id));
        Ok(url)
    }
}

impl Gateway for RestGateway {
    async fn select(&self, query: &ReadQuery) -> Result<Page<Value>> {
        let url = self.select_url(query)?;
        tracing::debug!(%url, "select");

        let mut request = self
            .http
            .get(url)
            .headers(self.headers()?)
            .header("Prefer", "count=exact");
        if let Some(w) = query.window {
            let last = w.offset + w.limit.max(1) - 1;
            request = request
                .header("Range-Unit", "items")
                .header("Range", format!("{}-{}", w.offset, last));
        }

        read_page(request.send().await?).await
    }

    async fn insert(&self, collection: &str, row: Value) -> Result<Value> {
        let resp = self
            .http
            .post(self.table_url(collection)?)
            .headers(self.headers()?)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let resp = check_response(resp).await?;
        let mut created: Vec<Value> = resp.json().await?;
        tracing::info!(collection, "inserted row");
        created
            .pop()
            .ok_or_else(|| TahfidzError::Parse("Insert returned no representation".to_string()))
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<()> {
        let resp = self
            .http
            .patch(self.row_url(collection, id)?)
            .headers(self.headers()?)
            .header("Prefer", "return=minimal")
            .json(&patch)
            .send()
            .await?;
        check_response(resp).await?;
        tracing::info!(collection, id, "updated row");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let resp = self
            .http
            .delete(self.row_url(collection, id)?)
            .headers(self.headers()?)
            .send()
            .await?;
        check_response(resp).await?;
        tracing::info!(collection, id, "deleted row");
        Ok(())
    }

    fn requires_session(&self) -> bool {
        true
    }
}

impl Authenticator for RestGateway {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            #[serde(default)]
            refresh_token: Option<String>,
            #[serde(default = "default_expires_in")]
            expires_in: i64,
            user: TokenUser,
        }
        #[derive(Deserialize)]
        struct TokenUser {
            id: String,
            #[serde(default)]
            email: Option<String>,
        }
        fn default_expires_in() -> i64 {
            3600
        }

        let mut url = self
            .base
            .join("auth/v1/token")
            .map_err(|e| TahfidzError::Config(e.to_string()))?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let resp = self
            .http
            .post(url)
            .header("apikey", header_value(&self.api_key)?)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let token: TokenResponse = check_response(resp).await?.json().await?;

        let mut session = Session::new(
            token.access_token,
            token.expires_in,
            SessionUser {
                id: token.user.id,
                email: token.user.email.unwrap_or_else(|| email.to_string()),
            },
        );
        session.refresh_token = token.refresh_token;
        self.set_access_token(Some(session.access_token.clone()));
        tracing::info!(user = %session.user.email, "signed in");
        Ok(session)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| TahfidzError::Config("Credential contains invalid header characters".to_string()))
}

/// PostgREST list operand, e.g. `in.("a1","b2")`. Values are quoted so commas
/// and parentheses inside them stay literal.
fn in_list(values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// Total row count from a `Content-Range` header such as `0-9/35`.
pub fn parse_content_range(value: &str) -> Option<u64> {
    CONTENT_RANGE_RE
        .captures(value.trim())
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Rows and exact total of a select response.
///
/// A window starting past the last row is answered with 416 and
/// `Content-Range: */N`; that is an empty page of a collection of `N` rows,
/// so callers can clamp the page like any other short result.
pub async fn read_page(resp: reqwest::Response) -> Result<Page<Value>> {
    let total = resp
        .headers()
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range);
    if resp.status() == StatusCode::RANGE_NOT_SATISFIABLE {
        if let Some(total) = total {
            tracing::debug!(total, "window past the last row");
            return Ok(Page {
                rows: Vec::new(),
                total,
            });
        }
    }
    let resp = check_response(resp).await?;
    let rows: Vec<Value> = resp.json().await?;
    let total = total.unwrap_or(rows.len() as u64);
    Ok(Page { rows, total })
}

/// Maps non-success responses to [`TahfidzError::Gateway`], pulling the
/// human-readable message out of the error body when there is one.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        if body.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            body.clone()
        }
    });
    tracing::warn!(status = status.as_u16(), %message, "gateway request failed");
    if status.as_u16() == 401 {
        return Err(TahfidzError::Unauthenticated);
    }
    Err(TahfidzError::Gateway {
        status: status.as_u16(),
        message,
    })
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error_description", "msg", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn install_provider() {
        let _ = rustls::crypto::ring::default_provider().install_default();
    }

    fn gateway() -> RestGateway {
        install_provider();
        RestGateway::new("https://example.supabase.co", "anon-key").unwrap()
    }

    fn mock_response(status: u16, body: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body.to_string())
                .unwrap(),
        )
    }

    #[test]
    fn test_select_url_encodes_predicates() {
        let query = ReadQuery::new("santri")
            .contains("nama", "ah")
            .eq("kelas", "pagi")
            .order_by("nama", true);
        let url = gateway().select_url(&query).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(url.path(), "/rest/v1/santri");
        assert!(pairs.contains(&("select".to_string(), "*".to_string())));
        assert!(pairs.contains(&("nama".to_string(), "ilike.*ah*".to_string())));
        assert!(pairs.contains(&("kelas".to_string(), "eq.pagi".to_string())));
        assert!(pairs.contains(&("order".to_string(), "nama.asc".to_string())));
    }

    #[test]
    fn test_select_url_encodes_in_list() {
        let query = ReadQuery::new("hafalan").is_in("santri_id", ["a1", "b,2"]);
        let url = gateway().select_url(&query).unwrap();
        let value = url
            .query_pairs()
            .find(|(k, _)| k == "santri_id")
            .map(|(_, v)| v.into_owned());
        assert_eq!(value.as_deref(), Some(r#"in.("a1","b,2")"#));

        let empty = ReadQuery::new("hafalan").is_in("santri_id", Vec::<String>::new());
        let url = gateway().select_url(&empty).unwrap();
        assert!(url.query_pairs().any(|(k, v)| k == "santri_id" && v == "in.()"));
    }

    #[test]
    fn test_base_path_is_preserved() {
        install_provider();
        let gw = RestGateway::new("http://localhost:54321/proxy", "k").unwrap();
        assert_eq!(
            gw.table_url("guru").unwrap().as_str(),
            "http://localhost:54321/proxy/rest/v1/guru"
        );
    }

    #[test]
    fn test_row_url_rejects_malformed_id() {
        let gw = gateway();
        let url = gw.row_url("santri", "42").unwrap();
        assert_eq!(url.query(), Some("id=eq.42"));
        assert!(gw.row_url("santri", "1,or=(id.gt.0)").is_err());
        assert!(gw.row_url("santri", "").is_err());
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-9/35"), Some(35));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-9/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn test_session_token_replaces_api_key() {
        let gw = gateway();
        assert_eq!(gw.bearer(), "Bearer anon-key");
        gw.set_access_token(Some("jwt".to_string()));
        assert_eq!(gw.bearer(), "Bearer jwt");
    }

    #[test]
    fn test_requires_session() {
        assert!(gateway().requires_session());
    }

    #[tokio::test]
    async fn test_check_response_extracts_message() {
        let resp = mock_response(409, r#"{"code":"23505","message":"duplicate key"}"#);
        match check_response(resp).await {
            Err(TahfidzError::Gateway { status, message }) => {
                assert_eq!(status, 409);
                assert_eq!(message, "duplicate key");
            }
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_check_response_unauthorized() {
        let resp = mock_response(401, "");
        assert!(matches!(
            check_response(resp).await,
            Err(TahfidzError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_check_response_success() {
        assert!(check_response(mock_response(200, "[]")).await.is_ok());
    }

    fn ranged_response(status: u16, content_range: &str, body: String) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .header("Content-Range", content_range)
                .body(body)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_read_page_past_the_end_is_empty() {
        let resp = ranged_response(
            416,
            "*/35",
            r#"{"code":"PGRST103","message":"Requested range not satisfiable"}"#.to_string(),
        );
        let page = read_page(resp).await.unwrap();
        assert!(page.rows.is_empty());
        assert_eq!(page.total, 35);
    }

    #[tokio::test]
    async fn test_read_page_416_without_total_is_an_error() {
        let resp = mock_response(416, r#"{"message":"Requested range not satisfiable"}"#);
        assert!(matches!(
            read_page(resp).await,
            Err(TahfidzError::Gateway { status: 416, .. })
        ));
    }

    #[tokio::test]
    async fn test_read_page_uses_content_range_total() {
        let resp = ranged_response(206, "0-1/35", r#"[{"id":1},{"id":2}]"#.to_string());
        let page = read_page(resp).await.unwrap();
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.total, 35);
    }

    /// Answers reads the way PostgREST does, including 416 past the end.
    struct PostgrestLike {
        rows: Vec<Value>,
    }

    impl Gateway for PostgrestLike {
        async fn select(&self, query: &ReadQuery) -> Result<Page<Value>> {
            let total = self.rows.len() as u64;
            let window = query.window.unwrap_or(crate::gateway::Window {
                offset: 0,
                limit: total,
            });
            let resp = if window.offset >= total {
                ranged_response(416, &format!("*/{}", total), "{}".to_string())
            } else {
                let end = (window.offset + window.limit).min(total);
                let rows = &self.rows[window.offset as usize..end as usize];
                ranged_response(
                    206,
                    &format!("{}-{}/{}", window.offset, end - 1, total),
                    serde_json::to_string(rows).unwrap(),
                )
            };
            read_page(resp).await
        }

        async fn insert(&self, _: &str, row: Value) -> Result<Value> {
            Ok(row)
        }

        async fn update(&self, _: &str, _: &str, _: Value) -> Result<()> {
            Ok(())
        }

        async fn delete(&self, _: &str, _: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_page_past_the_end_clamps_over_rest() {
        use crate::list::{ListController, QueryIntent, RefreshOutcome, Students};

        let rows = (0..35)
            .map(|i| serde_json::json!({"id": i, "nama": format!("Santri {:02}", i)}))
            .collect();
        let gw = PostgrestLike { rows };
        let mut intent = QueryIntent::for_resource::<Students>();
        intent.page = 5;
        let mut list = ListController::<Students, _>::new(&gw, 10).with_intent(intent);

        assert_eq!(list.refresh().await, RefreshOutcome::Applied);
        assert_eq!(list.page(), 4);
        assert_eq!(list.total_pages(), 4);
        assert_eq!(list.rows().len(), 5);
        assert!(list.error().is_none());
    }
}
