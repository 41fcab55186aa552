use super::CommandContext;
use super::resource;
use super::utils::{optional_text, print_table};
use crate::cli::commands::StudentAction;
use crate::list::{Memorizations, Reviews, Students};
use crate::model::StudentDraft;
use crate::progress::{self, StudentProgress};
use anyhow::Result;
use colored::Colorize;

pub async fn handle_student(ctx: &CommandContext, action: StudentAction) -> Result<()> {
    match action {
        StudentAction::List(args) => resource::list::<Students>(ctx, args).await,
        StudentAction::Add { name, class, json } => {
            let draft = StudentDraft {
                name,
                class_label: class,
            };
            resource::add::<Students>(ctx, draft, json).await
        }
        StudentAction::Edit {
            id,
            name,
            class,
            json,
        } => {
            let apply = |draft: &mut StudentDraft| -> Result<()> {
                if let Some(name) = name {
                    draft.name = name;
                }
                if let Some(class) = class {
                    draft.class_label = optional_text(class);
                }
                Ok(())
            };
            resource::edit::<Students, _>(ctx, &id, apply, json).await
        }
        StudentAction::Delete { id, force, json } => {
            resource::delete::<Students>(ctx, &id, force, json).await
        }
        StudentAction::Show { id, page, json } => handle_show(ctx, &id, page, json).await,
    }
}

async fn handle_show(ctx: &CommandContext, id: &str, page: u32, json: bool) -> Result<()> {
    let backend = ctx.connect()?;
    let progress = progress::load(&backend, id, page, ctx.config.page_size()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&progress)?);
        return Ok(());
    }
    print_progress(ctx, &progress);
    Ok(())
}

fn print_progress(ctx: &CommandContext, progress: &StudentProgress) {
    let date_format = ctx.config.general.date_format.as_str();
    let student = &progress.student;
    let summary = &progress.summary;

    println!("{} {}", student.id.cyan().bold(), student.name.bold());
    println!("Class:      {}", student.class_or_dash());
    if let Some(created) = student.created_at {
        println!("Registered: {}", created.format(date_format));
    }

    println!();
    println!("{}", "Progress".bold());
    println!(
        "  Verses:          {} ({} memorized)",
        summary.total_verses, summary.memorized_verses
    );
    println!("  Monthly average: {} verses", summary.monthly_average);
    if let Some((month, verses)) = &summary.best_month {
        println!("  Best month:      {} ({} verses)", month, verses);
    }
    let by_status: Vec<String> = summary
        .entries_by_status
        .iter()
        .map(|(status, count)| format!("{} {}", status, count))
        .collect();
    println!("  Entries:         {}", by_status.join(", "));
    if let Some(latest) = &summary.latest {
        println!(
            "  Latest:          {} {} on {}",
            latest.chapter,
            latest.verse_range(),
            latest.date.format(date_format)
        );
    }

    println!();
    println!(
        "{} ({} total)",
        "Memorization history".bold(),
        progress.history_total
    );
    if let Some(error) = &progress.history_error {
        println!("  {}", format!("Failed to load memorization history: {}", error).red());
    } else if progress.history.is_empty() {
        println!("  No memorization entries yet.");
    } else {
        print_table::<Memorizations>(&progress.history, date_format);
    }

    println!();
    println!("{} ({} total)", "Reviews".bold(), progress.reviews_total);
    if let Some(error) = &progress.reviews_error {
        println!("  {}", format!("Failed to load reviews: {}", error).red());
    } else if progress.reviews.is_empty() {
        println!("  No reviews yet.");
    } else {
        print_table::<Reviews>(&progress.reviews, date_format);
    }
}
