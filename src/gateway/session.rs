//! Authenticated session state.
//!
//! A session is obtained once through [`Authenticator::sign_in`] and then
//! persisted under the data directory so later invocations reuse it.

use crate::error::{TahfidzError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user: SessionUser,
}

impl Session {
    pub fn new(access_token: String, expires_in_secs: i64, user: SessionUser) -> Self {
        Self {
            access_token,
            refresh_token: None,
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
            user,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Credential check against a gateway's auth endpoint.
#[allow(async_fn_in_trait)]
pub trait Authenticator {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;
}

/// File-backed session slot (`<data>/session.json`).
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(data_path: &Path) -> Self {
        Self {
            path: data_path.join("session.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored session, if one exists and has not expired.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let session: Session = serde_json::from_str(&content)?;
        if session.is_expired() {
            tracing::debug!(user = %session.user.email, "stored session expired");
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Like [`load`](Self::load) but fails when no valid session exists.
    pub fn require(&self) -> Result<Session> {
        self.load()?.ok_or(TahfidzError::Unauthenticated)
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| TahfidzError::Storage("Session path has no parent".to_string()))?;
        std::fs::create_dir_all(dir)?;
        let mut temp_file = NamedTempFile::new_in(dir)?;
        temp_file.write_all(serde_json::to_string_pretty(session)?.as_bytes())?;
        temp_file
            .persist(&self.path)
            .map_err(|e| TahfidzError::Storage(format!("Failed to persist session: {}", e)))?;
        Ok(())
    }

    /// Removes the stored session. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(expires_in: i64) -> Session {
        Session::new(
            "token".to_string(),
            expires_in,
            SessionUser {
                id: "u1".to_string(),
                email: "admin@tahfidz.test".to_string(),
            },
        )
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());
        assert!(store.load().unwrap().is_none());

        let s = session(3600);
        store.save(&s).unwrap();
        assert_eq!(store.load().unwrap(), Some(s));
    }

    #[test]
    fn test_expired_session_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());
        store.save(&session(-10)).unwrap();

        assert!(store.load().unwrap().is_none());
        assert!(matches!(store.require(), Err(TahfidzError::Unauthenticated)));
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());
        store.save(&session(60)).unwrap();
        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
    }
}
