use chrono::Utc;
use jotwall_core::{Note, NoteColor};

use crate::commands::common::{
    format_note_lines, note_to_list_item, open_signed_in_hub, NoteListItem,
};
use crate::error::CliError;

pub async fn run_list(
    limit: usize,
    color: Option<NoteColor>,
    as_json: bool,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let hub = open_signed_in_hub(global_profile).await?;
    let notes = filter_notes(&hub.store().list(), color, limit);
    let now = Utc::now();

    if as_json {
        let json_items = notes
            .iter()
            .map(|note| note_to_list_item(note, now))
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if notes.is_empty() {
        println!("No notes yet. Add one with `jotwall add`.");
    } else {
        for line in format_note_lines(&notes, now) {
            println!("{line}");
        }
    }

    Ok(())
}

/// Newest-first notes, optionally restricted to one color.
pub fn filter_notes(notes: &[Note], color: Option<NoteColor>, limit: usize) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| color.is_none_or(|color| note.color == color))
        .take(limit)
        .cloned()
        .collect()
}
