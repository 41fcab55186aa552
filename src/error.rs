use thiserror::Error;

#[derive(Error, Debug)]
pub enum TahfidzError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Gateway error ({status}): {message}")]
    Gateway { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not signed in. Run 'tahfidz login' first.")]
    Unauthenticated,

    #[error("Nothing to export: no records match the current filters")]
    EmptyExport,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Project not initialized. Run 'tahfidz init' first.")]
    NotInitialized,

    #[error("Project already initialized at {0}")]
    AlreadyInitialized(String),
}

impl TahfidzError {
    /// Message suitable for a toast or banner.
    pub fn user_message(&self) -> String {
        match self {
            TahfidzError::Gateway { message, .. } => message.clone(),
            TahfidzError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TahfidzError>;
