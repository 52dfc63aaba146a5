//! In-memory mirror of the signed-in user's notes.
//!
//! The cache is only ever replaced whole: a refresh installs a complete,
//! freshly fetched list or leaves the previous one in place. Every mutation
//! is followed by a full refetch instead of a local patch, so the cache never
//! shows a partially applied change. Concurrent refreshes race; the last one
//! to complete wins.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use tokio::sync::watch;

use crate::auth::Session;
use crate::backend::{NewNoteRow, NoteChanges, NotesBackend};
use crate::models::{Note, NoteDraft, NoteId};
use crate::{Error, Result};

#[derive(Default)]
struct Cache {
    notes: Arc<[Note]>,
    /// Bumped on clear; refreshes started before a clear are discarded.
    generation: u64,
}

/// Data-access handle over a [`NotesBackend`]. Clones share the cache.
#[derive(Clone)]
pub struct NoteStore {
    backend: Arc<dyn NotesBackend>,
    session: watch::Receiver<Option<Session>>,
    cache: Arc<RwLock<Cache>>,
}

impl NoteStore {
    pub fn new(backend: Arc<dyn NotesBackend>, session: watch::Receiver<Option<Session>>) -> Self {
        Self {
            backend,
            session,
            cache: Arc::new(RwLock::new(Cache::default())),
        }
    }

    /// Snapshot of the cached notes, newest `updated_at` first.
    pub fn list(&self) -> Arc<[Note]> {
        Arc::clone(&self.read().notes)
    }

    /// Look up a cached note.
    pub fn get(&self, id: &NoteId) -> Option<Note> {
        self.read().notes.iter().find(|note| &note.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().notes.is_empty()
    }

    /// Drop every cached note (sign-out, session expiry).
    pub fn clear(&self) {
        let mut cache = self.write();
        cache.notes = Arc::from(Vec::new());
        cache.generation += 1;
        tracing::debug!("Cleared note cache");
    }

    /// Refetch the full list from the backend and replace the cache.
    ///
    /// On failure the cache is left untouched.
    pub async fn refresh(&self) -> Result<()> {
        let session = self.current_session()?;
        let generation = self.read().generation;

        let mut notes = self.backend.select_notes(&session).await?;
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let mut cache = self.write();
        if cache.generation != generation {
            tracing::debug!("Discarding refresh that started before the cache was cleared");
            return Ok(());
        }
        tracing::debug!(count = notes.len(), "Refreshed note cache");
        cache.notes = Arc::from(notes);
        Ok(())
    }

    /// Insert a note, then refresh so the cache carries server-assigned fields.
    pub async fn add(&self, draft: NoteDraft) -> Result<Note> {
        draft.validate()?;
        let session = self.current_session()?;

        let row = NewNoteRow::from_draft(session.user_id(), draft);
        let note = self.backend.insert_note(&session, row).await?;
        tracing::debug!(id = %note.id, "Inserted note");

        self.refresh_after_mutation().await;
        Ok(note)
    }

    /// Overwrite title, content and color of an existing note.
    pub async fn update(&self, id: &NoteId, draft: NoteDraft) -> Result<()> {
        let session = self.current_session()?;

        let changes = NoteChanges::from_draft(draft, Utc::now());
        self.backend.update_note(&session, id, changes).await?;
        tracing::debug!(%id, "Updated note");

        self.refresh_after_mutation().await;
        Ok(())
    }

    pub async fn remove(&self, id: &NoteId) -> Result<()> {
        let session = self.current_session()?;

        self.backend.delete_note(&session, id).await?;
        tracing::debug!(%id, "Deleted note");

        self.refresh_after_mutation().await;
        Ok(())
    }

    /// The mutation is already committed; a failed refetch only leaves the
    /// cache stale until the next refresh.
    async fn refresh_after_mutation(&self) {
        if let Err(error) = self.refresh().await {
            tracing::warn!("Failed to refresh notes after mutation: {}", error);
        }
    }

    fn current_session(&self) -> Result<Session> {
        self.session.borrow().clone().ok_or(Error::NotAuthenticated)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Cache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Cache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}
