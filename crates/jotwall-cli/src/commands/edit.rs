use jotwall_core::{Note, NoteColor, NoteDraft, SaveOutcome};

use crate::commands::common::{
    capture_editor_input_with_initial, open_signed_in_hub, parse_editor_draft,
    render_editor_draft, resolve_note,
};
use crate::error::CliError;

/// Field replacements given on the command line.
#[derive(Debug, Default)]
pub struct EditOverrides {
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: Option<NoteColor>,
}

impl EditOverrides {
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.color.is_none()
    }

    pub fn apply(self, note: &Note) -> NoteDraft {
        NoteDraft::new(
            self.title.unwrap_or_else(|| note.title.clone()),
            self.content.unwrap_or_else(|| note.content.clone()),
            self.color.unwrap_or(note.color),
        )
    }
}

pub async fn run_edit(
    id: &str,
    overrides: EditOverrides,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let hub = open_signed_in_hub(global_profile).await?;
    let note = resolve_note(hub.store(), id)?;

    let draft = if overrides.is_empty() {
        let initial = render_editor_draft(&note.to_draft());
        let Some(edited) = capture_editor_input_with_initial(&initial)? else {
            return Err(CliError::EmptyContent);
        };
        parse_editor_draft(&edited, note.color)
    } else {
        overrides.apply(&note)
    };

    if draft == note.to_draft() {
        println!("{}", note.id);
        return Ok(());
    }

    let lifecycle = hub.lifecycle();
    lifecycle.begin_edit(note)?;
    match lifecycle.save(draft).await? {
        SaveOutcome::Updated(id) => println!("{id}"),
        SaveOutcome::Created(created) => println!("{}", created.id),
    }
    Ok(())
}
