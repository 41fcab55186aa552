mod export;
mod init;
mod memorization;
mod overview;
mod resource;
mod review;
mod session;
mod settings;
mod student;
mod teacher;
mod utils;

pub use export::handle_export;
pub use init::handle_init;
pub use memorization::handle_memorization;
pub use overview::handle_overview;
pub use review::handle_review;
pub use session::{handle_login, handle_logout, handle_whoami};
pub use settings::handle_settings;
pub use student::handle_student;
pub use teacher::handle_teacher;

use crate::config::{CONFIG_FILE_NAME, TahfidzConfig};
use crate::gateway::{Backend, Gateway, SessionStore};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Common context passed to all command handlers
pub struct CommandContext {
    pub config: TahfidzConfig,
    pub root: PathBuf,
}

impl CommandContext {
    pub fn new(config: TahfidzConfig, root: PathBuf) -> Self {
        Self { config, root }
    }

    /// Finds the project from the current directory upward.
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let (config, root) =
            TahfidzConfig::load(&cwd).context("Failed to load tahfidz configuration")?;
        Ok(Self::new(config, root))
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn sessions(&self) -> SessionStore {
        SessionStore::new(&self.config.data_path(&self.root))
    }

    /// The configured gateway, without checking for a session.
    pub fn backend(&self) -> Result<Backend> {
        Ok(Backend::from_config(&self.config, &self.root)?)
    }

    /// The configured gateway, ready for data commands.
    ///
    /// Fails when the backend needs a session and none is stored.
    pub fn connect(&self) -> Result<Backend> {
        let backend = self.backend()?;
        if backend.requires_session() {
            self.sessions().require()?;
        }
        Ok(backend)
    }
}
