use super::CommandContext;
use super::utils::confirm;
use crate::cli::commands::SettingsAction;
use anyhow::{Context, Result};
use colored::Colorize;

pub fn handle_settings(mut ctx: CommandContext, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show { json } => {
            let mut shown = ctx.config.clone();
            if shown.gateway.api_key.is_some() {
                shown.gateway.api_key = Some("********".to_string());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                print!("{}", serde_yaml::to_string(&shown)?);
            }
        }
        SettingsAction::Get { key } => {
            let value = ctx.config.get(&key)?;
            match value {
                serde_yaml::Value::String(s) => println!("{}", s),
                other => print!("{}", serde_yaml::to_string(&other)?),
            }
        }
        SettingsAction::Set { key, value } => {
            ctx.config.set(&key, &value)?;
            ctx.config.save(&ctx.config_path())?;
            println!("{} {} = {}", "Updated".green(), key.cyan(), value);
        }
        SettingsAction::Reset { force } => {
            if !force && !confirm("Reset all settings to their defaults?") {
                println!("Cancelled.");
                return Ok(());
            }
            ctx.config.reset();
            ctx.config.save(&ctx.config_path())?;
            println!("{}", "Settings reset to defaults".green());
        }
        SettingsAction::Export { output } => {
            let json = ctx.config.export()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("{} settings to {}", "Exported".green(), path.display());
                }
                None => println!("{}", json),
            }
        }
        SettingsAction::Import { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            ctx.config.import(&json)?;
            ctx.config.save(&ctx.config_path())?;
            println!("{} settings from {}", "Imported".green(), file.display());
        }
    }
    Ok(())
}
