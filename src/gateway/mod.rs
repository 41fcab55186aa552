//! Remote data gateway.
//!
//! The gateway is the only owner of entity data: it answers filtered,
//! ordered, windowed reads and performs insert/update/delete by id.
//!
//! ## Components
//!
//! - [`Gateway`]: the CRUD + query contract
//! - [`ReadQuery`]: predicates, ordering, window and embedded references
//! - [`RestGateway`]: PostgREST-compatible HTTP client for the hosted backend
//! - [`MemoryGateway`]: in-process store (local backend and tests)
//! - [`SessionStore`]: persisted sign-in session

mod memory;
mod query;
mod rest;
mod session;

pub use memory::{CallStats, MemoryGateway};
pub use query::{Embed, Order, Page, Predicate, ReadQuery, Window};
pub use rest::{RestGateway, check_response, parse_content_range, read_page};
pub use session::{Authenticator, Session, SessionStore, SessionUser};

use crate::config::{BackendKind, TahfidzConfig};
use crate::error::{TahfidzError, Result};
use serde_json::Value;
use std::path::Path;

/// Authenticated CRUD and query access to named collections.
#[allow(async_fn_in_trait)]
pub trait Gateway {
    async fn select(&self, query: &ReadQuery) -> Result<Page<Value>>;

    /// Inserts a row; returns it with the gateway-assigned `id` and `created_at`.
    async fn insert(&self, collection: &str, row: Value) -> Result<Value>;

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<()>;

    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    /// Whether calls need a signed-in session.
    fn requires_session(&self) -> bool {
        false
    }
}

impl<G: Gateway + ?Sized> Gateway for &G {
    async fn select(&self, query: &ReadQuery) -> Result<Page<Value>> {
        (**self).select(query).await
    }

    async fn insert(&self, collection: &str, row: Value) -> Result<Value> {
        (**self).insert(collection, row).await
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<()> {
        (**self).update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        (**self).delete(collection, id).await
    }

    fn requires_session(&self) -> bool {
        (**self).requires_session()
    }
}

/// Reads every row matching `query`, ignoring its window.
///
/// Servers may cap a single response (PostgREST `max-rows`); when the first
/// answer holds fewer rows than its exact total, the rest is read in
/// follow-up windows of the same size.
pub async fn select_all<G: Gateway>(gateway: &G, query: &ReadQuery) -> Result<Page<Value>> {
    let mut unwindowed = query.clone();
    unwindowed.window = None;
    let mut page = gateway.select(&unwindowed).await?;
    let batch = page.rows.len() as u64;

    while (page.rows.len() as u64) < page.total && batch > 0 {
        let next = unwindowed.clone().range(page.rows.len() as u64, batch);
        let more = gateway.select(&next).await?;
        if more.rows.is_empty() {
            tracing::warn!(
                collection = %query.collection,
                read = page.rows.len(),
                total = page.total,
                "rows vanished while paging, result is short"
            );
            break;
        }
        tracing::debug!(collection = %query.collection, offset = page.rows.len(), rows = more.rows.len(), "read follow-up window");
        page.rows.extend(more.rows);
    }
    Ok(page)
}

/// The gateway selected by configuration.
pub enum Backend {
    Local(MemoryGateway),
    Rest(RestGateway),
}

impl Backend {
    pub fn from_config(config: &TahfidzConfig, project_root: &Path) -> Result<Self> {
        match config.gateway.backend {
            BackendKind::Local => {
                let path = config.data_path(project_root).join("store.json");
                tracing::debug!(path = %path.display(), "opening local store");
                Ok(Backend::Local(MemoryGateway::open(&path)?))
            }
            BackendKind::Rest => {
                let url = config.gateway.resolved_url().ok_or_else(|| {
                    TahfidzError::Config(
                        "gateway.url is not set (or set TAHFIDZ_URL)".to_string(),
                    )
                })?;
                let api_key = config.gateway.resolved_api_key().ok_or_else(|| {
                    TahfidzError::Config(
                        "gateway.api_key is not set (or set TAHFIDZ_API_KEY)".to_string(),
                    )
                })?;
                let gateway = RestGateway::new(&url, &api_key)?;
                let sessions = SessionStore::new(&config.data_path(project_root));
                match sessions.load()? {
                    Some(session) => Ok(Backend::Rest(gateway.with_session(&session))),
                    None => Ok(Backend::Rest(gateway)),
                }
            }
        }
    }
}

impl Gateway for Backend {
    async fn select(&self, query: &ReadQuery) -> Result<Page<Value>> {
        match self {
            Backend::Local(g) => g.select(query).await,
            Backend::Rest(g) => g.select(query).await,
        }
    }

    async fn insert(&self, collection: &str, row: Value) -> Result<Value> {
        match self {
            Backend::Local(g) => g.insert(collection, row).await,
            Backend::Rest(g) => g.insert(collection, row).await,
        }
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<()> {
        match self {
            Backend::Local(g) => g.update(collection, id, patch).await,
            Backend::Rest(g) => g.update(collection, id, patch).await,
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        match self {
            Backend::Local(g) => g.delete(collection, id).await,
            Backend::Rest(g) => g.delete(collection, id).await,
        }
    }

    fn requires_session(&self) -> bool {
        match self {
            Backend::Local(g) => g.requires_session(),
            Backend::Rest(g) => g.requires_session(),
        }
    }
}

impl Authenticator for Backend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        match self {
            Backend::Local(g) => g.sign_in(email, password).await,
            Backend::Rest(g) => g.sign_in(email, password).await,
        }
    }
}
