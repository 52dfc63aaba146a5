//! Client configuration.
//!
//! Provides `ClientConfig`, the safe-to-ship Supabase project URL and anon key
//! every client needs to reach auth and the notes table. Secrets never live
//! here; the user's session is kept by a [`SessionPersistence`] store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, SessionPersistence, SupabaseAuthClient};
use crate::backend::SupabaseNotesBackend;
use crate::session::SessionHub;
use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

/// Environment variables consulted for the project URL, in order.
pub const URL_ENV_VARS: [&str; 2] = ["SUPABASE_URL", "EXPO_PUBLIC_SUPABASE_URL"];
/// Environment variables consulted for the anon key, in order.
pub const ANON_KEY_ENV_VARS: [&str; 2] = ["SUPABASE_ANON_KEY", "EXPO_PUBLIC_SUPABASE_ANON_KEY"];

/// Possibly-partial client configuration from one source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_anon_key: Option<String>,
}

impl ClientConfig {
    pub fn new(supabase_url: Option<String>, supabase_anon_key: Option<String>) -> Self {
        Self {
            supabase_url: normalize_text_option(supabase_url),
            supabase_anon_key: normalize_text_option(supabase_anon_key),
        }
    }

    /// Read from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read through an arbitrary variable lookup (first non-empty wins).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let first = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| normalize_text_option(lookup(name)))
        };
        Self::new(first(&URL_ENV_VARS), first(&ANON_KEY_ENV_VARS))
    }

    /// Fill unset fields from `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            supabase_url: normalize_text_option(self.supabase_url)
                .or_else(|| normalize_text_option(fallback.supabase_url)),
            supabase_anon_key: normalize_text_option(self.supabase_anon_key)
                .or_else(|| normalize_text_option(fallback.supabase_anon_key)),
        }
    }

    /// Validate into a usable configuration.
    ///
    /// `Ok(None)` when nothing is configured; an error when only one of the
    /// two values is set or the URL is malformed.
    pub fn resolve(&self) -> Result<Option<ResolvedConfig>> {
        let (url, anon_key) = match (
            normalize_text_option(self.supabase_url.clone()),
            normalize_text_option(self.supabase_anon_key.clone()),
        ) {
            (None, None) => return Ok(None),
            (Some(url), Some(anon_key)) => (url, anon_key),
            _ => return Err(AuthError::NotConfigured.into()),
        };

        if !is_http_url(&url) {
            return Err(Error::Config(
                "Supabase URL must include http:// or https://".to_string(),
            ));
        }

        Ok(Some(ResolvedConfig {
            supabase_url: url.trim_end_matches('/').to_string(),
            supabase_anon_key: anon_key,
        }))
    }
}

/// Complete, validated client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl ResolvedConfig {
    pub fn auth_client<S: SessionPersistence>(&self, store: S) -> Result<SupabaseAuthClient<S>> {
        Ok(SupabaseAuthClient::new(
            &self.supabase_url,
            self.supabase_anon_key.clone(),
            store,
        )?)
    }

    pub fn notes_backend(&self) -> Result<SupabaseNotesBackend> {
        SupabaseNotesBackend::new(&self.supabase_url, self.supabase_anon_key.clone())
    }

    /// Wire a session hub against this Supabase project.
    pub fn session_hub<S: SessionPersistence>(&self, store: S) -> Result<SessionHub> {
        let auth = self.auth_client(store)?;
        let backend = self.notes_backend()?;
        Ok(SessionHub::new(Arc::new(auth), Arc::new(backend)))
    }
}
