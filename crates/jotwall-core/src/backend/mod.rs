//! Row-level CRUD over the hosted `notes` table.
//!
//! The backend is the authority for ids, timestamps, ownership and
//! concurrency. Implementations surface its failures unchanged; the
//! [`NoteStore`](crate::store::NoteStore) decides what to cache.

mod memory;
mod supabase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::Session;
use crate::models::{Note, NoteColor, NoteDraft, NoteId};
use crate::Result;

pub use memory::{BackendCalls, MemoryBackend};
pub use supabase::{normalize_rest_url, SupabaseNotesBackend};

/// Insert payload: `{user_id, title, content, color}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNoteRow {
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub color: NoteColor,
}

impl NewNoteRow {
    pub fn from_draft(user_id: impl Into<String>, draft: NoteDraft) -> Self {
        Self {
            user_id: user_id.into(),
            title: draft.title,
            content: draft.content,
            color: draft.color,
        }
    }
}

/// Update payload: `{title, content, color, updated_at}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteChanges {
    pub title: String,
    pub content: String,
    pub color: NoteColor,
    pub updated_at: DateTime<Utc>,
}

impl NoteChanges {
    pub fn from_draft(draft: NoteDraft, updated_at: DateTime<Utc>) -> Self {
        Self {
            title: draft.title,
            content: draft.content,
            color: draft.color,
            updated_at,
        }
    }
}

/// Persistence collaborator scoped to the session's owner.
#[async_trait]
pub trait NotesBackend: Send + Sync {
    /// `select * order by updated_at desc`
    async fn select_notes(&self, session: &Session) -> Result<Vec<Note>>;

    /// Insert a row; the backend assigns id and timestamps.
    async fn insert_note(&self, session: &Session, row: NewNoteRow) -> Result<Note>;

    /// `update ... where id = ?`; `NotFound` when no row matched.
    async fn update_note(&self, session: &Session, id: &NoteId, changes: NoteChanges)
        -> Result<()>;

    /// `delete where id = ?`
    async fn delete_note(&self, session: &Session, id: &NoteId) -> Result<()>;
}
