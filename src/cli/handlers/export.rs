use super::CommandContext;
use super::utils::build_intent;
use crate::cli::commands::{FormatArg, ResourceArg};
use crate::list::{Memorizations, Resource, Reviews, Students, Teachers};
use crate::report::{self, ReportFormat, ReportOptions};
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

pub async fn handle_export(
    ctx: &CommandContext,
    resource: ResourceArg,
    filters: Vec<String>,
    format: FormatArg,
    output: Option<PathBuf>,
    stdout: bool,
) -> Result<()> {
    let format = ReportFormat::from(format);
    match resource {
        ResourceArg::Students => export::<Students>(ctx, &filters, format, output, stdout).await,
        ResourceArg::Memorization => {
            export::<Memorizations>(ctx, &filters, format, output, stdout).await
        }
        ResourceArg::Reviews => export::<Reviews>(ctx, &filters, format, output, stdout).await,
        ResourceArg::Teachers => export::<Teachers>(ctx, &filters, format, output, stdout).await,
    }
}

async fn export<R: Resource>(
    ctx: &CommandContext,
    filters: &[String],
    format: ReportFormat,
    output: Option<PathBuf>,
    stdout: bool,
) -> Result<()> {
    let backend = ctx.connect()?;
    let intent = build_intent::<R>(filters)?;
    let options = ReportOptions {
        subtitle: format!("Prepared by {}", ctx.config.admin.name),
        date_format: ctx.config.general.date_format.clone(),
        ..ReportOptions::default()
    };

    let report = report::export::<R, _>(&backend, &intent, &options).await?;

    if stdout {
        print!("{}", report.render(format)?);
        return Ok(());
    }

    let dir = match output {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let path = report.save(format, &dir)?;
    println!(
        "{} {} {} to {}",
        "Exported".green(),
        report.rows.len(),
        R::PLURAL,
        path.display()
    );
    Ok(())
}
