//! Commands shared by every record type: list, add, edit, delete and show.

use super::CommandContext;
use super::utils::{confirm, list_intent, mutation_error, print_notices, print_page, print_record};
use crate::cli::commands::ListArgs;
use crate::list::{ListController, Resource};
use anyhow::Result;
use colored::Colorize;

pub async fn list<R: Resource>(ctx: &CommandContext, args: ListArgs) -> Result<()> {
    let backend = ctx.connect()?;
    let intent = list_intent::<R>(&args)?;
    let mut list = ListController::<R, _>::new(&backend, ctx.config.page_size()).with_intent(intent);
    list.refresh().await;

    if let Some(error) = list.error() {
        anyhow::bail!(
            "Failed to load {}: {}. Run the command again to retry.",
            R::PLURAL,
            error
        );
    }

    if args.json {
        let output = serde_json::json!({
            "page": list.page(),
            "page_size": list.page_size(),
            "total": list.total(),
            "total_pages": list.total_pages(),
            "sort": list.sort().to_string(),
            "filters": list.filters(),
            "rows": list.rows(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_page(&list, &ctx.config.general.date_format);
    }
    Ok(())
}

pub async fn add<R: Resource>(ctx: &CommandContext, draft: R::Draft, json: bool) -> Result<()> {
    let backend = ctx.connect()?;
    let mut list = ListController::<R, _>::new(&backend, ctx.config.page_size());
    list.open_create();

    let record = match list.create(draft).await {
        Ok(record) => record,
        Err(e) => return Err(mutation_error(&mut list, e)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_notices(&list.take_notices());
        println!("  {} {}", R::id(&record).cyan(), R::label(&record));
    }
    Ok(())
}

/// Loads the record, lets `apply` change its draft, then saves the whole draft.
pub async fn edit<R, F>(ctx: &CommandContext, id: &str, apply: F, json: bool) -> Result<()>
where
    R: Resource,
    F: FnOnce(&mut R::Draft) -> Result<()>,
{
    let backend = ctx.connect()?;
    let mut list = ListController::<R, _>::new(&backend, ctx.config.page_size());
    let record = list.get(id).await?;
    let mut draft = list.open_edit(&record);
    apply(&mut draft)?;

    if let Err(e) = list.update(id, draft).await {
        return Err(mutation_error(&mut list, e));
    }
    let updated = list.get(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&updated)?);
    } else {
        print_notices(&list.take_notices());
        println!("  {} {}", R::id(&updated).cyan(), R::label(&updated));
    }
    Ok(())
}

pub async fn delete<R: Resource>(ctx: &CommandContext, id: &str, force: bool, json: bool) -> Result<()> {
    let backend = ctx.connect()?;
    let mut list = ListController::<R, _>::new(&backend, ctx.config.page_size());
    let record = list.get(id).await?;
    let prompt = format!("Delete {} '{}'?", R::NOUN.to_lowercase(), R::label(&record));
    let skip_prompt = force || json;

    let deleted = match list.delete(id, |_: &str| skip_prompt || confirm(&prompt)).await {
        Ok(deleted) => deleted,
        Err(e) => return Err(mutation_error(&mut list, e)),
    };
    if !deleted {
        println!("Cancelled.");
        return Ok(());
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "action": "deleted",
                "id": id
            }))?
        );
    } else {
        print_notices(&list.take_notices());
    }
    Ok(())
}

pub async fn show<R: Resource>(ctx: &CommandContext, id: &str, json: bool) -> Result<()> {
    let backend = ctx.connect()?;
    let list = ListController::<R, _>::new(&backend, ctx.config.page_size());
    let record = list.get(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record::<R>(&record, &ctx.config.general.date_format);
    }
    Ok(())
}
