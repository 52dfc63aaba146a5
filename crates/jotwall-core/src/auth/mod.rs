//! Supabase auth client and the auth collaborator seam.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::util::{compact_text, service_url, unix_timestamp_now};

/// A session this close to expiry is treated as expired.
const EXPIRY_SKEW_SECONDS: i64 = 60;
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
}

/// Credential bundle for the signed-in user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub user: SessionUser,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }

    /// Identifier of the owning user.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    /// The account exists but the email address must be confirmed first.
    ConfirmationRequired,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Supabase auth is not configured.")]
    NotConfigured,
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("{0}")]
    InvalidCredentials(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Auth API error: {0}")]
    Api(String),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Where a signed-in session is kept between runs.
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> AuthResult<Option<Session>>;
    fn save_session(&self, session: &Session) -> AuthResult<()>;
    fn clear_session(&self) -> AuthResult<()>;
}

/// Process-local session persistence.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<Option<Session>>>,
}

impl MemorySessionStore {
    fn slot(&self) -> AuthResult<MutexGuard<'_, Option<Session>>> {
        self.slot
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))
    }
}

impl SessionPersistence for MemorySessionStore {
    fn load_session(&self) -> AuthResult<Option<Session>> {
        Ok(self.slot()?.clone())
    }

    fn save_session(&self, session: &Session) -> AuthResult<()> {
        *self.slot()? = Some(session.clone());
        Ok(())
    }

    fn clear_session(&self) -> AuthResult<()> {
        *self.slot()? = None;
        Ok(())
    }
}

/// Authentication collaborator.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session>;
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome>;
    async fn sign_out(&self, session: &Session) -> AuthResult<()>;
    /// Load a persisted session, refreshing it when expired.
    async fn restore_session(&self) -> AuthResult<Option<Session>>;
}

/// GoTrue client that keeps the current session in `S`.
#[derive(Clone)]
pub struct SupabaseAuthClient<S: SessionPersistence> {
    endpoint: String,
    anon_key: String,
    http: Client,
    store: S,
}

impl<S: SessionPersistence> SupabaseAuthClient<S> {
    pub fn new(url: impl AsRef<str>, anon_key: impl Into<String>, store: S) -> AuthResult<Self> {
        let endpoint = service_url(url.as_ref(), "/auth/v1")
            .map_err(|error| AuthError::InvalidConfiguration(error.message()))?;
        let anon_key = anon_key.into().trim().to_string();
        if anon_key.is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Supabase anon key must not be empty",
            ));
        }

        Ok(Self {
            endpoint,
            anon_key,
            http: Client::builder().build()?,
            store,
        })
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(format!("{}/{path}", self.endpoint))
            .header("apikey", &self.anon_key)
    }

    /// `POST /token` for the given grant; the answer must carry a session.
    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> AuthResult<Session> {
        let request = self
            .post("token")
            .bearer_auth(&self.anon_key)
            .query(&[("grant_type", grant_type)])
            .json(&body);
        let session = read_grant(request.send().await?).await?.ok_or_else(|| {
            AuthError::Api(format!("`{grant_type}` grant returned no session"))
        })?;
        self.store.save_session(&session)?;
        Ok(session)
    }
}

#[async_trait]
impl<S: SessionPersistence> AuthProvider for SupabaseAuthClient<S> {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        validate_credentials(email, password)?;
        let session = self
            .token_grant(
                "password",
                json!({ "email": email.trim(), "password": password }),
            )
            .await?;
        tracing::debug!(user = %session.user.id, "Signed in");
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        validate_credentials(email, password)?;
        let request = self
            .post("signup")
            .bearer_auth(&self.anon_key)
            .json(&json!({ "email": email.trim(), "password": password }));

        let Some(session) = read_grant(request.send().await?).await? else {
            return Ok(SignUpOutcome::ConfirmationRequired);
        };
        self.store.save_session(&session)?;
        Ok(SignUpOutcome::SignedIn(session))
    }

    async fn sign_out(&self, session: &Session) -> AuthResult<()> {
        let response = self
            .post("logout")
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        // An already-revoked token still counts as signed out.
        if response.status() != StatusCode::UNAUTHORIZED {
            ensure_success(response).await?;
        }
        self.store.clear_session()
    }

    async fn restore_session(&self) -> AuthResult<Option<Session>> {
        let Some(stored) = self.store.load_session()? else {
            return Ok(None);
        };
        if !stored.is_expired() {
            return Ok(Some(stored));
        }

        let refreshed = self
            .token_grant(
                "refresh_token",
                json!({ "refresh_token": stored.refresh_token }),
            )
            .await;
        match refreshed {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                tracing::warn!("Stored session could not be refreshed: {}", error);
                self.store.clear_session()?;
                Ok(None)
            }
        }
    }
}

/// Client-side checks run before any auth request.
pub fn validate_credentials(email: &str, password: &str) -> AuthResult<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::InvalidCredentials("Please fill in all fields"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::InvalidCredentials(
            "Password must be at least 6 characters",
        ));
    }
    Ok(())
}

/// Body of a GoTrue `/token` or `/signup` answer.
///
/// With email confirmation enabled `/signup` returns the bare user, so no
/// `access_token` means "no session yet" rather than an error.
#[derive(Debug, Deserialize)]
struct GrantResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<SessionUser>,
}

impl GrantResponse {
    fn into_session(self) -> AuthResult<Option<Session>> {
        let Some(access_token) = self.access_token else {
            return Ok(None);
        };
        let (Some(refresh_token), Some(user)) = (self.refresh_token, self.user) else {
            return Err(AuthError::Api(
                "Token response is missing the refresh token or user".to_string(),
            ));
        };
        let expires_at = self
            .expires_at
            .or_else(|| {
                self.expires_in
                    .map(|seconds| unix_timestamp_now().saturating_add(seconds))
            })
            .ok_or_else(|| AuthError::Api("Token response has no expiry".to_string()))?;

        Ok(Some(Session {
            access_token,
            refresh_token,
            expires_at,
            user,
        }))
    }
}

async fn read_grant(response: Response) -> AuthResult<Option<Session>> {
    let response = ensure_success(response).await?;
    response.json::<GrantResponse>().await?.into_session()
}

async fn ensure_success(response: Response) -> AuthResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AuthError::Api(api_error_message(status, &body)))
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

/// Human-readable message for a failed Supabase call, tagged with the status.
pub(crate) fn api_error_message(status: StatusCode, body: &str) -> String {
    let provided = serde_json::from_str::<ErrorBody>(body).ok().and_then(|body| {
        body.message
            .or(body.msg)
            .or(body.error_description)
            .or(body.error)
    });
    let detail = provided.map_or_else(|| compact_text(body), |text| text.trim().to_string());

    let code = status.as_u16();
    if detail.is_empty() {
        format!("HTTP {code}")
    } else {
        format!("{detail} ({code})")
    }
}
