use super::CommandContext;
use super::resource;
use super::utils::optional_text;
use crate::cli::commands::TeacherAction;
use crate::list::Teachers;
use crate::model::TeacherDraft;
use crate::validation;
use anyhow::Result;

pub async fn handle_teacher(ctx: &CommandContext, action: TeacherAction) -> Result<()> {
    match action {
        TeacherAction::List(args) => resource::list::<Teachers>(ctx, args).await,
        TeacherAction::Add {
            name,
            joined,
            contact,
            address,
            json,
        } => {
            let joined_on = joined
                .map(|d| validation::parse_date("Joined", &d))
                .transpose()?;
            let draft = TeacherDraft {
                name,
                joined_on,
                contact,
                address,
            };
            resource::add::<Teachers>(ctx, draft, json).await
        }
        TeacherAction::Edit {
            id,
            name,
            joined,
            contact,
            address,
            json,
        } => {
            let apply = |draft: &mut TeacherDraft| -> Result<()> {
                if let Some(name) = name {
                    draft.name = name;
                }
                if let Some(joined) = joined {
                    draft.joined_on = match optional_text(joined) {
                        Some(d) => Some(validation::parse_date("Joined", &d)?),
                        None => None,
                    };
                }
                if let Some(contact) = contact {
                    draft.contact = optional_text(contact);
                }
                if let Some(address) = address {
                    draft.address = optional_text(address);
                }
                Ok(())
            };
            resource::edit::<Teachers, _>(ctx, &id, apply, json).await
        }
        TeacherAction::Delete { id, force, json } => {
            resource::delete::<Teachers>(ctx, &id, force, json).await
        }
        TeacherAction::Show { id, json } => resource::show::<Teachers>(ctx, &id, json).await,
    }
}
