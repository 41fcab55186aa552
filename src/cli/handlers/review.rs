use super::CommandContext;
use super::resource;
use super::utils::{date_or_today, optional_text};
use crate::cli::commands::ReviewAction;
use crate::list::Reviews;
use crate::model::ReviewDraft;
use crate::validation;
use anyhow::Result;

pub async fn handle_review(ctx: &CommandContext, action: ReviewAction) -> Result<()> {
    match action {
        ReviewAction::List(args) => resource::list::<Reviews>(ctx, args).await,
        ReviewAction::Add {
            student,
            teacher,
            chapter,
            start,
            end,
            quality,
            notes,
            date,
            json,
        } => {
            let draft = ReviewDraft {
                student_id: student,
                teacher_id: teacher,
                chapter,
                verse_start: start,
                verse_end: end,
                quality,
                notes,
                date: date_or_today(date.as_deref())?,
            };
            resource::add::<Reviews>(ctx, draft, json).await
        }
        ReviewAction::Edit {
            id,
            student,
            teacher,
            chapter,
            start,
            end,
            quality,
            notes,
            date,
            json,
        } => {
            let apply = |draft: &mut ReviewDraft| -> Result<()> {
                if let Some(student) = student {
                    draft.student_id = student;
                }
                if let Some(teacher) = teacher {
                    draft.teacher_id = teacher;
                }
                if let Some(chapter) = chapter {
                    draft.chapter = chapter;
                }
                if start.is_some() {
                    draft.verse_start = start;
                }
                if end.is_some() {
                    draft.verse_end = end;
                }
                if let Some(quality) = quality {
                    draft.quality = optional_text(quality);
                }
                if let Some(notes) = notes {
                    draft.notes = optional_text(notes);
                }
                if let Some(date) = date {
                    draft.date = validation::parse_date("Date", &date)?;
                }
                Ok(())
            };
            resource::edit::<Reviews, _>(ctx, &id, apply, json).await
        }
        ReviewAction::Delete { id, force, json } => {
            resource::delete::<Reviews>(ctx, &id, force, json).await
        }
        ReviewAction::Show { id, json } => resource::show::<Reviews>(ctx, &id, json).await,
    }
}
