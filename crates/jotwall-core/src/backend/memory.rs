//! In-process notes table, for tests and offline runs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use super::{NewNoteRow, NoteChanges, NotesBackend};
use crate::auth::Session;
use crate::models::{Note, NoteId};
use crate::{Error, Result};

/// Number of calls received per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendCalls {
    pub select: usize,
    pub insert: usize,
    pub update: usize,
    pub delete: usize,
}

impl BackendCalls {
    /// Total insert/update/delete calls.
    #[must_use]
    pub const fn mutations(&self) -> usize {
        self.insert + self.update + self.delete
    }
}

#[derive(Default)]
struct Counters {
    select: AtomicUsize,
    insert: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
}

#[derive(Default)]
struct Table {
    rows: Vec<Note>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Table {
    /// Strictly increasing server clock, so inserts never tie.
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + TimeDelta::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

/// Owner-scoped notes table held in memory.
///
/// Clones share the same table. Every call counts towards [`BackendCalls`];
/// `set_offline(true)` makes every call fail like a dropped connection.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    table: Arc<Mutex<Table>>,
    calls: Arc<Counters>,
    offline: Arc<AtomicBool>,
    latency: Option<Duration>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` before touching the table.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    #[must_use]
    pub fn calls(&self) -> BackendCalls {
        BackendCalls {
            select: self.calls.select.load(Ordering::SeqCst),
            insert: self.calls.insert.load(Ordering::SeqCst),
            update: self.calls.update.load(Ordering::SeqCst),
            delete: self.calls.delete.load(Ordering::SeqCst),
        }
    }

    /// Rows as stored, regardless of owner.
    #[must_use]
    pub fn rows(&self) -> Vec<Note> {
        self.lock().rows.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn enter(&self, counter: &AtomicUsize) -> Result<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Store("network request failed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl NotesBackend for MemoryBackend {
    async fn select_notes(&self, session: &Session) -> Result<Vec<Note>> {
        self.enter(&self.calls.select).await?;
        let table = self.lock();
        let mut notes: Vec<Note> = table
            .rows
            .iter()
            .filter(|note| note.user_id == session.user_id())
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(notes)
    }

    async fn insert_note(&self, session: &Session, row: NewNoteRow) -> Result<Note> {
        self.enter(&self.calls.insert).await?;
        if row.user_id != session.user_id() {
            return Err(Error::Store(
                "new row violates row-level security policy".to_string(),
            ));
        }
        let mut table = self.lock();
        let stamp = table.next_stamp();
        let note = Note {
            id: NoteId::from(Uuid::now_v7().to_string()),
            user_id: row.user_id,
            title: row.title,
            content: row.content,
            color: row.color,
            created_at: stamp,
            updated_at: stamp,
        };
        table.rows.push(note.clone());
        Ok(note)
    }

    async fn update_note(
        &self,
        session: &Session,
        id: &NoteId,
        changes: NoteChanges,
    ) -> Result<()> {
        self.enter(&self.calls.update).await?;
        let mut table = self.lock();
        let note = table
            .rows
            .iter_mut()
            .find(|note| &note.id == id && note.user_id == session.user_id())
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        note.title = changes.title;
        note.content = changes.content;
        note.color = changes.color;
        note.updated_at = changes.updated_at;
        Ok(())
    }

    async fn delete_note(&self, session: &Session, id: &NoteId) -> Result<()> {
        self.enter(&self.calls.delete).await?;
        let mut table = self.lock();
        table
            .rows
            .retain(|note| !(&note.id == id && note.user_id == session.user_id()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionUser;
    use crate::models::{NoteColor, NoteDraft};

    fn session(user: &str) -> Session {
        Session {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: i64::MAX,
            user: SessionUser {
                id: user.to_string(),
                email: None,
            },
        }
    }

    fn row(user: &str, title: &str) -> NewNoteRow {
        NewNoteRow::from_draft(user, NoteDraft::new(title, "", NoteColor::White))
    }

    #[tokio::test]
    async fn select_is_scoped_to_owner_and_newest_first() {
        let backend = MemoryBackend::new();
        let alice = session("alice");
        let bob = session("bob");

        backend.insert_note(&alice, row("alice", "first")).await.unwrap();
        backend.insert_note(&bob, row("bob", "other")).await.unwrap();
        backend.insert_note(&alice, row("alice", "second")).await.unwrap();

        let titles: Vec<String> = backend
            .select_notes(&alice)
            .await
            .unwrap()
            .into_iter()
            .map(|note| note.title)
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn update_of_unknown_or_foreign_row_is_not_found() {
        let backend = MemoryBackend::new();
        let alice = session("alice");
        let note = backend.insert_note(&alice, row("alice", "mine")).await.unwrap();

        let changes = NoteChanges::from_draft(NoteDraft::default(), Utc::now());
        let error = backend
            .update_note(&session("bob"), &note.id, changes)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn offline_backend_fails_and_still_counts_calls() {
        let backend = MemoryBackend::new();
        backend.set_offline(true);
        let error = backend.select_notes(&session("alice")).await.unwrap_err();
        assert!(matches!(error, Error::Store(_)));
        assert_eq!(backend.calls().select, 1);
    }

    #[tokio::test]
    async fn insert_rejects_rows_for_other_owners() {
        let backend = MemoryBackend::new();
        let error = backend
            .insert_note(&session("alice"), row("bob", "spoof"))
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Store(_)));
        assert!(backend.rows().is_empty());
    }
}
