use std::env;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use jotwall_core::config::ClientConfig;
use jotwall_core::{Note, NoteColor, NoteDraft, NoteId, NoteStore, SessionHub};
use serde::Serialize;

use crate::auth::KeyringSessionStore;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

const SHORT_ID_LEN: usize = 13;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub color: NoteColor,
    pub color_name: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub relative_time: String,
}

/// Session hub for the resolved profile, not yet initialized.
pub fn build_hub(profile: Option<&str>) -> Result<(SessionHub, String), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile);
    let stored = config
        .profile(&profile_name)
        .map(CliProfile::client_config)
        .unwrap_or_default();

    let resolved = stored.or(ClientConfig::from_env()).resolve()?.ok_or_else(|| {
        CliError::Config(format!(
            "Profile '{profile_name}' missing Supabase config. Set SUPABASE_URL and SUPABASE_ANON_KEY via `jotwall config init --profile {profile_name}`."
        ))
    })?;

    let hub = resolved.session_hub(KeyringSessionStore::new(&profile_name))?;
    Ok((hub, profile_name))
}

/// Session hub with the stored session restored and its notes loaded.
pub async fn open_hub(profile: Option<&str>) -> Result<(SessionHub, String), CliError> {
    let (hub, profile_name) = build_hub(profile)?;
    hub.initialize().await?;
    tracing::debug!("Opened profile '{}'", profile_name);
    Ok((hub, profile_name))
}

/// Like [`open_hub`] but fails unless a session was restored.
pub async fn open_signed_in_hub(global_profile: Option<&str>) -> Result<SessionHub, CliError> {
    let (hub, profile_name) = open_hub(global_profile).await?;
    if hub.is_authenticated() {
        Ok(hub)
    } else {
        Err(CliError::NotSignedIn(profile_name))
    }
}

/// Find a cached note by full id or unique id prefix.
pub fn resolve_note(store: &NoteStore, note_query: &str) -> Result<Note, CliError> {
    let note_query = normalize_note_identifier(note_query)?;
    let notes = store.list();
    select_note(&notes, &note_query)
}

pub fn select_note(notes: &[Note], note_query: &str) -> Result<Note, CliError> {
    let exact_id = NoteId::from(note_query.to_string());
    if let Some(note) = notes.iter().find(|note| note.id == exact_id) {
        return Ok(note.clone());
    }

    let matching = notes
        .iter()
        .filter(|note| note.id.has_prefix(note_query))
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Err(CliError::NoteNotFound(note_query.to_string())),
        [note] => Ok((*note).clone()),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(|note| short_id(&note.id))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousNoteId(format!(
                "ID prefix '{note_query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn short_id(id: &NoteId) -> String {
    id.as_str().chars().take(SHORT_ID_LEN).collect()
}

pub fn format_note_lines(notes: &[Note], now: DateTime<Utc>) -> Vec<String> {
    notes
        .iter()
        .map(|note| {
            let short_id = short_id(&note.id);
            let title = truncate_chars(note.display_title(), 24);
            let preview = note_preview(note, 40);
            let relative_time = note.relative_time(now);
            format!(
                "{short_id:<13}  {:<7}  {title:<24}  {preview:<40}  {relative_time}",
                note.color.name()
            )
        })
        .collect()
}

pub fn note_to_list_item(note: &Note, now: DateTime<Utc>) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        content: note.content.clone(),
        color: note.color,
        color_name: note.color.name(),
        created_at: note.created_at,
        updated_at: note.updated_at,
        relative_time: note.relative_time(now),
    }
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, max_chars)
}

pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = value.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    normalize_content(id).ok_or(CliError::EmptyNoteId)
}

/// Editor buffer layout: title on the first line, a blank line, then content.
pub fn render_editor_draft(draft: &NoteDraft) -> String {
    format!("{}\n\n{}\n", draft.title, draft.content)
}

pub fn parse_editor_draft(text: &str, color: NoteColor) -> NoteDraft {
    let text = text.trim_start_matches(['\n', '\r']);
    let (title, content) = text.split_once('\n').unwrap_or((text, ""));
    NoteDraft::new(title, content, color)
}

/// Draft for `add`: explicit args first, then piped stdin, then the editor.
pub fn resolve_new_draft(
    title: Option<String>,
    content_parts: &[String],
    color: NoteColor,
) -> Result<NoteDraft, CliError> {
    let title = title.unwrap_or_default();
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(NoteDraft::new(title, content, color));
    }
    if let Some(content) = read_piped_stdin()? {
        return Ok(NoteDraft::new(title, content, color));
    }
    if normalize_content(&title).is_some() {
        return Ok(NoteDraft::new(title, "", color));
    }

    let initial = render_editor_draft(&NoteDraft::new(&title, "", color));
    match capture_editor_input_with_initial(&initial)? {
        Some(edited) => Ok(parse_editor_draft(&edited, color)),
        None => Err(CliError::EmptyContent),
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

/// Ask a yes/no question on the terminal; anything but `y`/`yes` is no.
pub fn confirm(prompt: &str) -> Result<bool, CliError> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_affirmative(&answer))
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&note_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(CliError::EditorFailed("empty EDITOR command".into()));
    };

    let status = Command::new(program)
        .args(parts)
        .arg(file_path)
        .status()
        .map_err(|error| CliError::EditorFailed(format!("`{editor}`: {error}")))?;
    if status.success() {
        Ok(())
    } else {
        Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        )))
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("jotwall-note-{}-{now}.md", std::process::id()))
}
