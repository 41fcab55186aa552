use super::CommandContext;
use super::utils::prompt_line;
use crate::gateway::{Authenticator, Backend};
use anyhow::Result;
use colored::Colorize;

pub async fn handle_login(ctx: &CommandContext, email: String, password: Option<String>) -> Result<()> {
    let gateway = match ctx.backend()? {
        Backend::Local(_) => {
            println!("The local backend does not require signing in.");
            return Ok(());
        }
        Backend::Rest(gateway) => gateway,
    };

    let password = match password {
        Some(p) => p,
        None => prompt_line("Password: ")?,
    };
    if password.is_empty() {
        anyhow::bail!("Password is required");
    }

    let session = gateway.sign_in(email.trim(), &password).await?;
    ctx.sessions().save(&session)?;

    println!(
        "{} as {}",
        "Signed in".green(),
        session.user.email.cyan()
    );
    Ok(())
}

pub fn handle_logout(ctx: &CommandContext) -> Result<()> {
    if ctx.sessions().clear()? {
        println!("{}", "Signed out".green());
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub fn handle_whoami(ctx: &CommandContext, json: bool) -> Result<()> {
    let session = ctx.sessions().load()?;

    if json {
        let value = match &session {
            Some(s) => serde_json::json!({
                "signed_in": true,
                "user": s.user,
                "expires_at": s.expires_at,
            }),
            None => serde_json::json!({ "signed_in": false }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match session {
        Some(s) => {
            println!("{} ({})", s.user.email.cyan().bold(), s.user.id);
            println!("Session expires {}", s.expires_at.format("%Y-%m-%d %H:%M UTC"));
        }
        None => println!("Not signed in."),
    }
    Ok(())
}
