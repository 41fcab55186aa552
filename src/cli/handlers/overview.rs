use super::CommandContext;
use super::utils::{list_intent, print_grid};
use crate::cli::commands::ListArgs;
use crate::list::Students;
use crate::overview::{self, ProgramOverview, short_date};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use colored::Colorize;

pub async fn handle_overview(ctx: &CommandContext, args: ListArgs) -> Result<()> {
    let backend = ctx.connect()?;
    let intent = list_intent::<Students>(&args)?;
    let overview = overview::load(&backend, intent, ctx.config.page_size()).await?;

    if let Some(error) = &overview.error {
        anyhow::bail!(
            "Failed to load students: {}. Run the command again to retry.",
            error
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }
    print_overview(
        &overview,
        &ctx.config.general.date_format,
        Local::now().date_naive(),
    );
    Ok(())
}

fn print_overview(overview: &ProgramOverview, date_format: &str, today: NaiveDate) {
    if let Some(error) = &overview.memorization_error {
        eprintln!("{}", format!("Failed to load memorization entries: {}", error).red());
    }
    if let Some(error) = &overview.review_error {
        eprintln!("{}", format!("Failed to load reviews: {}", error).red());
    }

    if overview.rows.is_empty() {
        println!("No students found.");
        return;
    }

    let header: Vec<String> = ["ID", "Name", "Class", "Latest memorization", "Latest review"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<Vec<String>> = overview
        .rows
        .iter()
        .map(|row| {
            let memorization = row
                .latest_memorization
                .as_ref()
                .map(|m| {
                    format!(
                        "{} {} {}, {}",
                        m.chapter,
                        m.verse_range(),
                        m.status,
                        short_date(m.date, today, date_format)
                    )
                })
                .unwrap_or_else(|| "-".to_string());
            let review = row
                .latest_review
                .as_ref()
                .map(|r| {
                    format!(
                        "{} {}, {}",
                        r.chapter,
                        r.verse_range(),
                        short_date(r.date, today, date_format)
                    )
                })
                .unwrap_or_else(|| "-".to_string());
            vec![
                row.student.id.clone(),
                row.student.name.clone(),
                row.student.class_or_dash().to_string(),
                memorization,
                review,
            ]
        })
        .collect();

    print_grid(&header, &rows);
    println!(
        "{}",
        format!(
            "Page {} of {} ({} students)",
            overview.page, overview.total_pages, overview.total
        )
        .dimmed()
    );
}
