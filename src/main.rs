use anyhow::Result;
use clap::Parser;

use tahfidz::cli::handlers::{self, CommandContext};
use tahfidz::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    tahfidz::logging::init(cli.verbose, cli.log_file.clone());

    // reqwest is built without a default TLS provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    tokio::runtime::Runtime::new()?.block_on(run(cli.command))
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Init {
            backend,
            url,
            data_path,
        } => handlers::handle_init(backend, url, data_path),
        Commands::Login { email, password } => {
            let ctx = CommandContext::load()?;
            handlers::handle_login(&ctx, email, password).await
        }
        Commands::Logout => handlers::handle_logout(&CommandContext::load()?),
        Commands::Whoami { json } => handlers::handle_whoami(&CommandContext::load()?, json),
        Commands::Student { action } => {
            let ctx = CommandContext::load()?;
            handlers::handle_student(&ctx, action).await
        }
        Commands::Memorization { action } => {
            let ctx = CommandContext::load()?;
            handlers::handle_memorization(&ctx, action).await
        }
        Commands::Review { action } => {
            let ctx = CommandContext::load()?;
            handlers::handle_review(&ctx, action).await
        }
        Commands::Overview(args) => {
            let ctx = CommandContext::load()?;
            handlers::handle_overview(&ctx, args).await
        }
        Commands::Teacher { action } => {
            let ctx = CommandContext::load()?;
            handlers::handle_teacher(&ctx, action).await
        }
        Commands::Export {
            resource,
            filters,
            format,
            output,
            stdout,
        } => {
            let ctx = CommandContext::load()?;
            handlers::handle_export(&ctx, resource, filters, format, output, stdout).await
        }
        Commands::Settings { action } => {
            handlers::handle_settings(CommandContext::load()?, action)
        }
    }
}
