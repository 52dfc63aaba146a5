use jotwall_core::{NoteColor, SaveOutcome};

use crate::commands::common::{open_signed_in_hub, resolve_new_draft};
use crate::error::CliError;

pub async fn run_add(
    title: Option<String>,
    content_parts: &[String],
    color: NoteColor,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let draft = resolve_new_draft(title, content_parts, color)?;

    let hub = open_signed_in_hub(global_profile).await?;
    let lifecycle = hub.lifecycle();
    lifecycle.begin_create()?;

    match lifecycle.save(draft).await? {
        SaveOutcome::Created(note) => println!("{}", note.id),
        SaveOutcome::Updated(id) => println!("{id}"),
    }
    Ok(())
}
