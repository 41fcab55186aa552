use crate::cli::commands::BackendArg;
use crate::config::{CONFIG_FILE_NAME, GatewaySettings, TahfidzConfig};
use crate::error::TahfidzError;
use anyhow::Result;
use colored::Colorize;

pub fn handle_init(backend: BackendArg, url: Option<String>, data_path: Option<String>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config_path = cwd.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        return Err(TahfidzError::AlreadyInitialized(config_path.display().to_string()).into());
    }

    let defaults = GatewaySettings::default();
    let config = TahfidzConfig {
        gateway: GatewaySettings {
            backend: backend.into(),
            url,
            data_path: data_path.unwrap_or(defaults.data_path),
            ..GatewaySettings::default()
        },
        ..TahfidzConfig::default()
    };
    config.validate()?;

    let data_path = config.data_path(&cwd);
    std::fs::create_dir_all(&data_path)?;
    config.save(&config_path)?;

    println!(
        "{} tahfidz project in {}",
        "Initialized".green(),
        cwd.display()
    );
    println!("  Config:  {}", config_path.display());
    println!("  Data:    {}", data_path.display());
    if matches!(backend, BackendArg::Rest) {
        if config.gateway.url.is_none() {
            println!("  Set the backend URL with `tahfidz settings set gateway.url <URL>`.");
        }
        println!("  Set gateway.api_key (or TAHFIDZ_API_KEY), then run `tahfidz login`.");
    }

    Ok(())
}
