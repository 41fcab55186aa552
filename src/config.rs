//! Settings for one tahfidz project.
//!
//! The settings object is built once at startup ([`TahfidzConfig::load`]),
//! handed to whoever needs it, and written back explicitly
//! ([`TahfidzConfig::save`]). Nothing reads settings from global state.

use crate::error::{TahfidzError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".tahfidz.yml";

/// Version tag written into settings exports.
pub const EXPORT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TahfidzConfig {
    #[serde(default)]
    pub admin: AdminSettings,

    #[serde(default)]
    pub display: DisplaySettings,

    #[serde(default)]
    pub tahfidz: ProgramSettings,

    #[serde(default)]
    pub general: GeneralSettings,

    #[serde(default)]
    pub gateway: GatewaySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSettings {
    #[serde(default = "default_admin_name")]
    pub name: String,

    #[serde(default = "default_admin_email")]
    pub email: String,
}

fn default_admin_name() -> String {
    "Admin Tahfidz".to_string()
}

fn default_admin_email() -> String {
    "admin@tahfidz.com".to_string()
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            name: default_admin_name(),
            email: default_admin_email(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub theme: Theme,

    #[serde(default)]
    pub font_size: FontSize,

    /// Colored output in the terminal.
    #[serde(default = "default_true")]
    pub animations: bool,

    #[serde(default)]
    pub data_saving: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            font_size: FontSize::default(),
            animations: true,
            data_saving: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSettings {
    /// Target number of memorization submissions per week.
    #[serde(default = "default_weekly_target")]
    pub weekly_target: u32,

    #[serde(default = "default_assessment_type")]
    pub assessment_type: String,

    #[serde(default = "default_reminder_type")]
    pub reminder_type: String,

    #[serde(default = "default_true")]
    pub auto_save: bool,

    #[serde(default = "default_true")]
    pub notification_sound: bool,

    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,
}

fn default_true() -> bool {
    true
}

fn default_weekly_target() -> u32 {
    3
}

fn default_assessment_type() -> String {
    "weekly".to_string()
}

fn default_reminder_type() -> String {
    "popup".to_string()
}

fn default_items_per_page() -> u32 {
    10
}

impl Default for ProgramSettings {
    fn default() -> Self {
        Self {
            weekly_target: default_weekly_target(),
            assessment_type: default_assessment_type(),
            reminder_type: default_reminder_type(),
            auto_save: true,
            notification_sound: true,
            items_per_page: default_items_per_page(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// chrono format string used when printing dates.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_language() -> String {
    "id".to_string()
}

fn default_timezone() -> String {
    "Asia/Jakarta".to_string()
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            language: default_language(),
            timezone: default_timezone(),
            date_format: default_date_format(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSON store under the data directory.
    #[default]
    Local,
    /// Hosted PostgREST backend.
    Rest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewaySettings {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Data directory relative to the project root.
    #[serde(default = "default_data_path")]
    pub data_path: String,
}

fn default_data_path() -> String {
    ".tahfidz".to_string()
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            url: None,
            api_key: None,
            data_path: default_data_path(),
        }
    }
}

impl GatewaySettings {
    pub fn resolved_url(&self) -> Option<String> {
        std::env::var("TAHFIDZ_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.url.clone())
    }

    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var("TAHFIDZ_API_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.api_key.clone())
    }
}

/// Whether `format` renders a bare calendar date. Time and offset specifiers
/// fail when applied to a date alone, so they are rejected here.
fn formats_plain_date(format: &str) -> bool {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return false;
    }
    let Some(sample) = NaiveDate::from_ymd_opt(2024, 1, 31) else {
        return false;
    };
    let mut out = String::new();
    write!(out, "{}", sample.format(format)).is_ok()
}

/// Wrapped form produced by [`TahfidzConfig::export`].
#[derive(Debug, Serialize, Deserialize)]
struct SettingsExport {
    settings: TahfidzConfig,
    exported_at: String,
    version: String,
}

impl TahfidzConfig {
    pub fn load(start_path: &Path) -> Result<(Self, PathBuf)> {
        let config_path = Self::find_config_file(start_path)?;
        let content = std::fs::read_to_string(&config_path)?;
        let config: TahfidzConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        let project_root = config_path
            .parent()
            .ok_or_else(|| TahfidzError::Config("Config file has no parent directory".to_string()))?
            .to_path_buf();
        Ok((config, project_root))
    }

    pub fn find_config_file(start_path: &Path) -> Result<PathBuf> {
        let mut current = start_path.to_path_buf();
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Ok(config_path);
            }
            if !current.pop() {
                return Err(TahfidzError::NotInitialized);
            }
        }
    }

    pub fn data_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.gateway.data_path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Page size used by list screens, never zero.
    pub fn page_size(&self) -> u32 {
        self.tahfidz.items_per_page.max(1)
    }

    /// Sets one value addressed as `section.key`, e.g. `tahfidz.items_per_page`.
    ///
    /// The value is parsed as YAML, so `true`, `12` and `dark` all work.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (section, field) = key.split_once('.').ok_or_else(|| {
            TahfidzError::Config(format!("Setting key must be 'section.key', got '{}'", key))
        })?;

        let mut tree = serde_yaml::to_value(&*self)?;
        let section_map = tree
            .get_mut(section)
            .and_then(|s| s.as_mapping_mut())
            .ok_or_else(|| TahfidzError::Config(format!("Unknown settings section '{}'", section)))?;
        let field_key = serde_yaml::Value::String(field.to_string());
        let known = section_map.contains_key(&field_key)
            || (section == "gateway" && matches!(field, "url" | "api_key"));
        if !known {
            return Err(TahfidzError::Config(format!("Unknown setting '{}'", key)));
        }
        let parsed: serde_yaml::Value = serde_yaml::from_str(value)
            .unwrap_or_else(|_| serde_yaml::Value::String(value.to_string()));
        section_map.insert(field_key, parsed);

        let updated: TahfidzConfig = serde_yaml::from_value(tree)
            .map_err(|e| TahfidzError::Config(format!("Invalid value for '{}': {}", key, e)))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reads one value addressed as `section.key`.
    pub fn get(&self, key: &str) -> Result<serde_yaml::Value> {
        let (section, field) = key.split_once('.').ok_or_else(|| {
            TahfidzError::Config(format!("Setting key must be 'section.key', got '{}'", key))
        })?;
        let tree = serde_yaml::to_value(self)?;
        tree.get(section)
            .and_then(|s| s.get(field))
            .cloned()
            .ok_or_else(|| TahfidzError::Config(format!("Unknown setting '{}'", key)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.tahfidz.items_per_page == 0 || self.tahfidz.items_per_page > 100 {
            return Err(TahfidzError::Config(
                "tahfidz.items_per_page must be between 1 and 100".to_string(),
            ));
        }
        if self.general.date_format.is_empty() || !formats_plain_date(&self.general.date_format) {
            return Err(TahfidzError::Config(format!(
                "general.date_format '{}' is not a valid date format",
                self.general.date_format
            )));
        }
        if self.gateway.data_path.trim().is_empty() {
            return Err(TahfidzError::Config(
                "gateway.data_path cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Restores every section except the gateway connection.
    pub fn reset(&mut self) {
        let gateway = self.gateway.clone();
        *self = TahfidzConfig {
            gateway,
            ..TahfidzConfig::default()
        };
    }

    /// JSON export wrapped with a timestamp and version.
    pub fn export(&self) -> Result<String> {
        let mut settings = self.clone();
        settings.gateway.api_key = None;
        let export = SettingsExport {
            settings,
            exported_at: Utc::now().to_rfc3339(),
            version: EXPORT_VERSION.to_string(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Accepts either an export produced by [`export`](Self::export) or a
    /// bare settings object. The gateway connection is kept from `self`.
    pub fn import(&mut self, json: &str) -> Result<()> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|_| TahfidzError::Parse("Settings file is not valid JSON".to_string()))?;
        let inner = value.get("settings").cloned().unwrap_or(value);
        let mut imported: TahfidzConfig = serde_json::from_value(inner)
            .map_err(|e| TahfidzError::Parse(format!("Invalid settings: {}", e)))?;
        imported.validate()?;
        imported.gateway = self.gateway.clone();
        *self = imported;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_searches_upward() {
        let temp_dir = TempDir::new().unwrap();
        let config = TahfidzConfig::default();
        config
            .save(&temp_dir.path().join(CONFIG_FILE_NAME))
            .unwrap();
        let nested = temp_dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (loaded, root) = TahfidzConfig::load(&nested).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(root, temp_dir.path());
    }

    #[test]
    fn test_missing_config_is_not_initialized() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            TahfidzConfig::load(temp_dir.path()),
            Err(TahfidzError::NotInitialized)
        ));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: TahfidzConfig =
            serde_yaml::from_str("tahfidz:\n  items_per_page: 25\n").unwrap();
        assert_eq!(config.page_size(), 25);
        assert_eq!(config.tahfidz.weekly_target, 3);
        assert_eq!(config.gateway.backend, BackendKind::Local);
    }

    #[test]
    fn test_set_typed_values() {
        let mut config = TahfidzConfig::default();
        config.set("tahfidz.items_per_page", "20").unwrap();
        config.set("display.theme", "dark").unwrap();
        config.set("display.animations", "false").unwrap();
        assert_eq!(config.tahfidz.items_per_page, 20);
        assert_eq!(config.display.theme, Theme::Dark);
        assert!(!config.display.animations);
    }

    #[test]
    fn test_set_rejects_unknown_and_invalid() {
        let mut config = TahfidzConfig::default();
        assert!(config.set("display.colour", "red").is_err());
        assert!(config.set("nosection.x", "1").is_err());
        assert!(config.set("tahfidz.items_per_page", "0").is_err());
        assert!(config.set("display.theme", "neon").is_err());
        assert!(config.set("general.date_format", "%Q").is_err());
        assert!(config.set("general.date_format", "%d %H").is_err());
        assert!(config.set("general.date_format", "%d/%m/%Y %H:%M").is_err());
        assert_eq!(config.general.date_format, "%d/%m/%Y");
        assert_eq!(config, TahfidzConfig::default());
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut config = TahfidzConfig::default();
        config.set("admin.name", "Ustadz Ali").unwrap();
        let exported = config.export().unwrap();

        let mut other = TahfidzConfig::default();
        other.import(&exported).unwrap();
        assert_eq!(other.admin.name, "Ustadz Ali");
    }

    #[test]
    fn test_import_bare_settings_and_garbage() {
        let mut config = TahfidzConfig::default();
        config
            .import(r#"{"display": {"theme": "dark"}}"#)
            .unwrap();
        assert_eq!(config.display.theme, Theme::Dark);
        assert!(config.import("not json").is_err());
    }

    #[test]
    fn test_reset_keeps_gateway() {
        let mut config = TahfidzConfig::default();
        config.gateway.backend = BackendKind::Rest;
        config.set("tahfidz.weekly_target", "7").unwrap();
        config.reset();
        assert_eq!(config.tahfidz.weekly_target, 3);
        assert_eq!(config.gateway.backend, BackendKind::Rest);
    }

    #[test]
    fn test_export_omits_api_key() {
        let mut config = TahfidzConfig::default();
        config.gateway.api_key = Some("secret".to_string());
        assert!(!config.export().unwrap().contains("secret"));
    }
}
