//! Compose/delete flow as an explicit state machine.
//!
//! Exactly one of `Idle`, `Composing` or `ConfirmingDelete` is active. A
//! save or delete marks the state busy for the duration of the store call;
//! further requests are rejected until it settles. Failures keep the state
//! (minus the busy flag) so the user can retry or cancel.

use std::sync::{Arc, Mutex, PoisonError};

use crate::models::{Note, NoteDraft, NoteId};
use crate::store::NoteStore;
use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LifecycleState {
    #[default]
    Idle,
    /// Create when `note` is `None`, edit otherwise.
    Composing { note: Option<Note>, busy: bool },
    ConfirmingDelete { note: Note, busy: bool },
}

impl LifecycleState {
    const fn describe(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Composing { .. } => "composing a note",
            Self::ConfirmingDelete { .. } => "confirming a delete",
        }
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Composing { busy: true, .. } | Self::ConfirmingDelete { busy: true, .. }
        )
    }

    fn set_busy(&mut self, value: bool) {
        if let Self::Composing { busy, .. } | Self::ConfirmingDelete { busy, .. } = self {
            *busy = value;
        }
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(Note),
    Updated(NoteId),
}

/// Visible state plus bookkeeping that outlives a [`NoteLifecycle::reset`].
#[derive(Debug, Default)]
struct Slot {
    state: LifecycleState,
    /// Bumped by `reset`; an in-flight call only settles the state it started from.
    epoch: u64,
    /// A store mutation is running, whether or not its state was reset since.
    pending: bool,
}

/// Settles the in-flight call, clearing the busy flag if it is dropped early.
struct InFlight<'a> {
    slot: &'a Mutex<Slot>,
    epoch: u64,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, succeeded: bool) {
        let mut slot = lock(self.slot);
        slot.pending = false;
        if slot.epoch == self.epoch {
            if succeeded {
                slot.state = LifecycleState::Idle;
            } else {
                slot.state.set_busy(false);
            }
        }
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut slot = lock(self.slot);
        slot.pending = false;
        if slot.epoch == self.epoch {
            slot.state.set_busy(false);
        }
    }
}

/// Lifecycle handle; clones share the same state.
#[derive(Clone)]
pub struct NoteLifecycle {
    store: NoteStore,
    slot: Arc<Mutex<Slot>>,
}

impl NoteLifecycle {
    pub fn new(store: NoteStore) -> Self {
        Self {
            store,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    pub fn state(&self) -> LifecycleState {
        lock(&self.slot).state.clone()
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    /// Open the compose form for a new note.
    pub fn begin_create(&self) -> Result<()> {
        let next = LifecycleState::Composing {
            note: None,
            busy: false,
        };
        self.open(next, "start a new note")
    }

    /// Open the compose form pre-filled with `note`.
    pub fn begin_edit(&self, note: Note) -> Result<()> {
        let next = LifecycleState::Composing {
            note: Some(note),
            busy: false,
        };
        self.open(next, "edit a note")
    }

    /// Ask for confirmation before deleting `note`.
    pub fn begin_delete(&self, note: Note) -> Result<()> {
        self.open(
            LifecycleState::ConfirmingDelete { note, busy: false },
            "delete a note",
        )
    }

    /// Close the open form or confirmation without changes.
    pub fn cancel(&self) -> Result<()> {
        let mut slot = lock(&self.slot);
        if slot.state == LifecycleState::Idle {
            return Err(Error::InvalidTransition {
                from: slot.state.describe(),
                action: "cancel",
            });
        }
        if slot.state.is_busy() {
            return Err(Error::Busy);
        }
        slot.state = LifecycleState::Idle;
        Ok(())
    }

    /// Submit the compose form: add when creating, update when editing.
    pub async fn save(&self, draft: NoteDraft) -> Result<SaveOutcome> {
        let (editing, epoch) = {
            let mut slot = lock(&self.slot);
            let from = slot.state.describe();
            let LifecycleState::Composing { note, busy } = &mut slot.state else {
                return Err(Error::InvalidTransition {
                    from,
                    action: "save",
                });
            };
            if *busy {
                return Err(Error::Busy);
            }
            draft.validate()?;
            *busy = true;
            let editing = note.as_ref().map(|note| note.id.clone());
            slot.pending = true;
            (editing, slot.epoch)
        };

        let in_flight = InFlight {
            slot: &self.slot,
            epoch,
            settled: false,
        };
        let result = match editing {
            Some(id) => self
                .store
                .update(&id, draft)
                .await
                .map(|()| SaveOutcome::Updated(id)),
            None => self.store.add(draft).await.map(SaveOutcome::Created),
        };
        in_flight.settle(result.is_ok());

        if let Err(error) = &result {
            tracing::warn!("Failed to save note: {}", error);
        }
        result
    }

    /// Delete the note awaiting confirmation.
    pub async fn confirm_delete(&self) -> Result<NoteId> {
        let (id, epoch) = {
            let mut slot = lock(&self.slot);
            let from = slot.state.describe();
            let LifecycleState::ConfirmingDelete { note, busy } = &mut slot.state else {
                return Err(Error::InvalidTransition {
                    from,
                    action: "delete",
                });
            };
            if *busy {
                return Err(Error::Busy);
            }
            *busy = true;
            let id = note.id.clone();
            slot.pending = true;
            (id, slot.epoch)
        };

        let in_flight = InFlight {
            slot: &self.slot,
            epoch,
            settled: false,
        };
        let result = self.store.remove(&id).await;
        in_flight.settle(result.is_ok());

        match result {
            Ok(()) => Ok(id),
            Err(error) => {
                tracing::warn!("Failed to delete note: {}", error);
                Err(error)
            }
        }
    }

    /// Force back to `Idle`, e.g. when the session ends.
    ///
    /// A mutation already in flight keeps running; until it settles, new
    /// forms are rejected with [`Error::Busy`].
    pub fn reset(&self) {
        let mut slot = lock(&self.slot);
        slot.state = LifecycleState::Idle;
        slot.epoch = slot.epoch.wrapping_add(1);
    }

    fn open(&self, next: LifecycleState, action: &'static str) -> Result<()> {
        let mut slot = lock(&self.slot);
        if slot.state != LifecycleState::Idle {
            return Err(Error::InvalidTransition {
                from: slot.state.describe(),
                action,
            });
        }
        if slot.pending {
            return Err(Error::Busy);
        }
        slot.state = next;
        Ok(())
    }
}

fn lock(slot: &Mutex<Slot>) -> std::sync::MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
