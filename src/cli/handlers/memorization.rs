use super::CommandContext;
use super::resource;
use super::utils::date_or_today;
use crate::cli::commands::MemorizationAction;
use crate::list::Memorizations;
use crate::model::MemorizationDraft;
use crate::validation;
use anyhow::Result;

pub async fn handle_memorization(ctx: &CommandContext, action: MemorizationAction) -> Result<()> {
    match action {
        MemorizationAction::List(args) => resource::list::<Memorizations>(ctx, args).await,
        MemorizationAction::Add {
            student,
            chapter,
            start,
            end,
            status,
            date,
            json,
        } => {
            let draft = MemorizationDraft {
                student_id: student,
                chapter,
                verse_start: start,
                verse_end: end,
                status: status.into(),
                date: date_or_today(date.as_deref())?,
            };
            resource::add::<Memorizations>(ctx, draft, json).await
        }
        MemorizationAction::Edit {
            id,
            student,
            chapter,
            start,
            end,
            status,
            date,
            json,
        } => {
            let apply = |draft: &mut MemorizationDraft| -> Result<()> {
                if let Some(student) = student {
                    draft.student_id = student;
                }
                if let Some(chapter) = chapter {
                    draft.chapter = chapter;
                }
                if let Some(start) = start {
                    draft.verse_start = start;
                }
                if let Some(end) = end {
                    draft.verse_end = end;
                }
                if let Some(status) = status {
                    draft.status = status.into();
                }
                if let Some(date) = date {
                    draft.date = validation::parse_date("Date", &date)?;
                }
                Ok(())
            };
            resource::edit::<Memorizations, _>(ctx, &id, apply, json).await
        }
        MemorizationAction::Delete { id, force, json } => {
            resource::delete::<Memorizations>(ctx, &id, force, json).await
        }
        MemorizationAction::Show { id, json } => {
            resource::show::<Memorizations>(ctx, &id, json).await
        }
    }
}
