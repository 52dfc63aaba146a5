//! Signed-in state shared by every consumer of the note store.
//!
//! The hub owns the current session, broadcasts changes over a watch channel
//! and ties the note cache to the session: a new session triggers a full
//! load, losing the session clears the cache and resets the lifecycle.

use std::sync::Arc;

use tokio::sync::watch;

use crate::auth::{AuthProvider, Session, SignUpOutcome};
use crate::backend::NotesBackend;
use crate::lifecycle::NoteLifecycle;
use crate::store::NoteStore;
use crate::Result;

pub struct SessionHub {
    auth: Arc<dyn AuthProvider>,
    sender: watch::Sender<Option<Session>>,
    store: NoteStore,
    lifecycle: NoteLifecycle,
}

impl SessionHub {
    pub fn new(auth: Arc<dyn AuthProvider>, backend: Arc<dyn NotesBackend>) -> Self {
        let (sender, receiver) = watch::channel(None);
        let store = NoteStore::new(backend, receiver);
        let lifecycle = NoteLifecycle::new(store.clone());
        Self {
            auth,
            sender,
            store,
            lifecycle,
        }
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn lifecycle(&self) -> &NoteLifecycle {
        &self.lifecycle
    }

    pub fn current(&self) -> Option<Session> {
        self.sender.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.sender.borrow().is_some()
    }

    pub fn user_id(&self) -> Option<String> {
        self.sender
            .borrow()
            .as_ref()
            .map(|session| session.user_id().to_string())
    }

    /// "Session changed" notifications, starting from the current value.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }

    /// Restore a persisted session, if any, and load its notes.
    pub async fn initialize(&self) -> Result<Option<Session>> {
        let session = self.auth.restore_session().await?;
        self.set_session(session.clone()).await?;
        Ok(session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.auth.sign_in(email, password).await?;
        self.set_session(Some(session.clone())).await?;
        Ok(session)
    }

    /// Register an account. Providers that require email confirmation leave
    /// the hub signed out.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let outcome = self.auth.sign_up(email, password).await?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            self.set_session(Some(session.clone())).await?;
        }
        Ok(outcome)
    }

    /// End the session remotely and always tear down local state.
    pub async fn sign_out(&self) -> Result<()> {
        let remote = match self.current() {
            Some(session) => self.auth.sign_out(&session).await,
            None => Ok(()),
        };
        self.set_session(None).await?;
        remote.map_err(|error| {
            tracing::warn!("Remote sign-out failed: {}", error);
            error.into()
        })
    }

    /// Publish a session change and bring the note cache in line with it.
    pub async fn set_session(&self, session: Option<Session>) -> Result<()> {
        let signed_in = session.is_some();
        let previous = self.sender.send_replace(session);
        let user_changed = previous.as_ref().map(Session::user_id) != self.user_id().as_deref();

        if !signed_in {
            self.store.clear();
            self.lifecycle.reset();
            return Ok(());
        }
        if user_changed {
            self.store.clear();
            self.lifecycle.reset();
        }
        self.store.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::auth::{AuthError, AuthResult, SessionUser};
    use crate::backend::MemoryBackend;
    use crate::models::{NoteColor, NoteDraft};
    use crate::Error;

    #[derive(Default)]
    struct FakeAuth {
        persisted: Option<Session>,
        sign_outs: AtomicUsize,
        require_confirmation: bool,
    }

    fn session(user: &str) -> Session {
        Session {
            access_token: format!("{user}-access"),
            refresh_token: format!("{user}-refresh"),
            expires_at: i64::MAX,
            user: SessionUser {
                id: user.to_string(),
                email: Some(format!("{user}@example.com")),
            },
        }
    }

    #[async_trait]
    impl AuthProvider for FakeAuth {
        async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
            if password != "correct-horse" {
                return Err(AuthError::Api("Invalid login credentials (400)".to_string()));
            }
            Ok(session(email.split('@').next().unwrap_or(email)))
        }

        async fn sign_up(&self, email: &str, _password: &str) -> AuthResult<SignUpOutcome> {
            if self.require_confirmation {
                return Ok(SignUpOutcome::ConfirmationRequired);
            }
            Ok(SignUpOutcome::SignedIn(session(
                email.split('@').next().unwrap_or(email),
            )))
        }

        async fn sign_out(&self, _session: &Session) -> AuthResult<()> {
            self.sign_outs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn restore_session(&self) -> AuthResult<Option<Session>> {
            Ok(self.persisted.clone())
        }
    }

    fn hub_with(auth: FakeAuth, backend: &MemoryBackend) -> SessionHub {
        SessionHub::new(Arc::new(auth), Arc::new(backend.clone()))
    }

    #[tokio::test]
    async fn starts_signed_out_with_empty_cache() {
        let backend = MemoryBackend::new();
        let hub = hub_with(FakeAuth::default(), &backend);

        assert!(hub.initialize().await.unwrap().is_none());
        assert!(!hub.is_authenticated());
        assert!(hub.store().is_empty());
        assert_eq!(backend.calls().select, 0);
    }

    #[tokio::test]
    async fn restored_session_loads_notes() {
        let backend = MemoryBackend::new();
        let seed = hub_with(FakeAuth::default(), &backend);
        seed.sign_in("alice@example.com", "correct-horse").await.unwrap();
        seed.store()
            .add(NoteDraft::new("kept", "", NoteColor::Blue))
            .await
            .unwrap();

        let auth = FakeAuth {
            persisted: Some(session("alice")),
            ..FakeAuth::default()
        };
        let hub = hub_with(auth, &backend);
        hub.initialize().await.unwrap();

        assert_eq!(hub.user_id().as_deref(), Some("alice"));
        assert_eq!(hub.store().len(), 1);
    }

    #[tokio::test]
    async fn auth_errors_surface_verbatim() {
        let backend = MemoryBackend::new();
        let hub = hub_with(FakeAuth::default(), &backend);

        let error = hub.sign_in("alice@example.com", "wrong").await.unwrap_err();
        assert_eq!(
            error.to_string(),
            "Auth API error: Invalid login credentials (400)"
        );
        assert!(matches!(error, Error::Auth(_)));
        assert!(!hub.is_authenticated());
    }

    #[tokio::test]
    async fn sign_out_clears_cache_and_notifies_subscribers() {
        let backend = MemoryBackend::new();
        let hub = hub_with(FakeAuth::default(), &backend);
        let mut changes = hub.subscribe();

        hub.sign_in("alice@example.com", "correct-horse").await.unwrap();
        assert!(changes.has_changed().unwrap());
        assert!(changes.borrow_and_update().is_some());

        hub.store()
            .add(NoteDraft::new("secret", "", NoteColor::White))
            .await
            .unwrap();
        hub.lifecycle().begin_create().unwrap();

        hub.sign_out().await.unwrap();

        assert!(changes.has_changed().unwrap());
        assert!(changes.borrow_and_update().is_none());
        assert!(hub.store().is_empty());
        assert_eq!(
            hub.lifecycle().state(),
            crate::lifecycle::LifecycleState::Idle
        );
        assert!(matches!(
            hub.store().refresh().await,
            Err(Error::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn switching_users_never_shows_previous_notes() {
        let backend = MemoryBackend::new();
        let hub = hub_with(FakeAuth::default(), &backend);
        hub.sign_in("alice@example.com", "correct-horse").await.unwrap();
        hub.store()
            .add(NoteDraft::new("alice only", "", NoteColor::White))
            .await
            .unwrap();

        backend.set_offline(true);
        let result = hub.sign_in("bob@example.com", "correct-horse").await;

        assert!(matches!(result, Err(Error::Store(_))));
        assert_eq!(hub.user_id().as_deref(), Some("bob"));
        assert!(hub.store().is_empty());
    }

    #[tokio::test]
    async fn sign_up_requiring_confirmation_stays_signed_out() {
        let backend = MemoryBackend::new();
        let auth = FakeAuth {
            require_confirmation: true,
            ..FakeAuth::default()
        };
        let hub = hub_with(auth, &backend);

        let outcome = hub.sign_up("new@example.com", "secret1").await.unwrap();
        assert_eq!(outcome, SignUpOutcome::ConfirmationRequired);
        assert!(!hub.is_authenticated());
    }

    #[tokio::test]
    async fn sign_up_with_session_signs_in() {
        let backend = MemoryBackend::new();
        let hub = hub_with(FakeAuth::default(), &backend);

        hub.sign_up("carol@example.com", "secret1").await.unwrap();
        assert_eq!(hub.user_id().as_deref(), Some("carol"));
        assert_eq!(backend.calls().select, 1);
    }
}
