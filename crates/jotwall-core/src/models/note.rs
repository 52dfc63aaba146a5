//! Note model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::NoteColor;
use crate::{Error, Result};

/// Backend-assigned note identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id starts with the given prefix (used for short ids).
    #[must_use]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NoteId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("note id cannot be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A note row as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier, assigned by the backend
    pub id: NoteId,
    /// Owning user
    pub user_id: String,
    #[serde(default)]
    pub title: String,
    /// Body text
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub color: NoteColor,
    pub created_at: DateTime<Utc>,
    /// Sole display sort key (descending)
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Title for confirmation prompts and card headers.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }

    /// Relative "last edited" label, as shown on note cards.
    #[must_use]
    pub fn relative_time(&self, now: DateTime<Utc>) -> String {
        format_relative_time(self.updated_at, now)
    }

    /// Current editable fields of this note.
    #[must_use]
    pub fn to_draft(&self) -> NoteDraft {
        NoteDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            color: self.color,
        }
    }
}

/// User-editable fields of a note, as submitted from the compose form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub color: NoteColor,
}

impl NoteDraft {
    /// Build a draft, trimming surrounding whitespace from title and content.
    pub fn new(title: impl AsRef<str>, content: impl AsRef<str>, color: NoteColor) -> Self {
        Self {
            title: title.as_ref().trim().to_string(),
            content: content.as_ref().trim().to_string(),
            color,
        }
    }

    /// A draft with neither title nor content.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }

    /// Reject blank drafts.
    pub fn validate(&self) -> Result<()> {
        if self.is_blank() {
            return Err(Error::Validation(
                "Please add a title or content".to_string(),
            ));
        }
        Ok(())
    }
}

/// Format how long ago `then` was, relative to `now`.
///
/// Minutes up to an hour, hours up to a day, then "Yesterday", days up to a
/// week, and a short month/day date beyond that.
#[must_use]
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let days = elapsed.num_days();

    if days <= 0 {
        let hours = elapsed.num_hours();
        if hours <= 0 {
            let minutes = elapsed.num_minutes();
            return if minutes <= 1 {
                "Just now".to_string()
            } else {
                format!("{minutes}m ago")
            };
        }
        return format!("{hours}h ago");
    }
    if days == 1 {
        return "Yesterday".to_string();
    }
    if days < 7 {
        return format!("{days}d ago");
    }
    then.format("%b %-d").to_string()
}
