//! PostgREST client for the Supabase `notes` table.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use super::{NewNoteRow, NoteChanges, NotesBackend};
use crate::auth::{api_error_message, AuthError, Session};
use crate::models::{Note, NoteId};
use crate::util::{normalize_text_option, service_url};
use crate::{Error, Result};

const NOTES_TABLE: &str = "notes";
const HTTP_TIMEOUT_SECS: u64 = 15;

#[derive(Clone)]
pub struct SupabaseNotesBackend {
    rest_url: String,
    anon_key: String,
    client: Client,
}

impl SupabaseNotesBackend {
    pub fn new(url: impl AsRef<str>, anon_key: impl Into<String>) -> Result<Self> {
        let rest_url = normalize_rest_url(url.as_ref())?;
        let anon_key = normalize_text_option(Some(anon_key.into()))
            .ok_or_else(|| Error::Config("Supabase anon key must not be empty".to_string()))?;

        Ok(Self {
            rest_url,
            anon_key,
            client: Client::builder()
                .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()?,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/{NOTES_TABLE}", self.rest_url)
    }

    fn authorized(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
    }

    fn id_filter(id: &NoteId) -> String {
        format!("eq.{}", urlencoding::encode(id.as_str()))
    }

    async fn checked(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = api_error_message(status, &body);
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Auth(AuthError::Api(message)));
        }
        Err(Error::Store(message))
    }
}

#[async_trait]
impl NotesBackend for SupabaseNotesBackend {
    async fn select_notes(&self, session: &Session) -> Result<Vec<Note>> {
        let request = self.authorized(
            self.client
                .get(self.table_url())
                .query(&[("select", "*"), ("order", "updated_at.desc")]),
            session,
        );
        let response = Self::checked(request.send().await?).await?;
        Ok(response.json::<Vec<Note>>().await?)
    }

    async fn insert_note(&self, session: &Session, row: NewNoteRow) -> Result<Note> {
        let request = self.authorized(
            self.client
                .post(self.table_url())
                .header("Prefer", "return=representation")
                .json(&[row]),
            session,
        );
        let response = Self::checked(request.send().await?).await?;
        response
            .json::<Vec<Note>>()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Store("insert returned no row".to_string()))
    }

    async fn update_note(
        &self,
        session: &Session,
        id: &NoteId,
        changes: NoteChanges,
    ) -> Result<()> {
        let request = self.authorized(
            self.client
                .patch(format!("{}?id={}", self.table_url(), Self::id_filter(id)))
                .header("Prefer", "return=representation")
                .json(&changes),
            session,
        );
        let response = Self::checked(request.send().await?).await?;
        let updated = response.json::<Vec<Note>>().await?;
        if updated.is_empty() {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn delete_note(&self, session: &Session, id: &NoteId) -> Result<()> {
        let request = self.authorized(
            self.client
                .delete(format!("{}?id={}", self.table_url(), Self::id_filter(id))),
            session,
        );
        Self::checked(request.send().await?).await?;
        Ok(())
    }
}

/// Normalize a project URL to its PostgREST base (`.../rest/v1`).
pub fn normalize_rest_url(url: &str) -> Result<String> {
    service_url(url, "/rest/v1").map_err(|error| Error::Config(error.message().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_rest_url_appends_rest_path() {
        assert_eq!(
            normalize_rest_url("https://demo.supabase.co/").unwrap(),
            "https://demo.supabase.co/rest/v1"
        );
        assert_eq!(
            normalize_rest_url("https://demo.supabase.co/rest/v1").unwrap(),
            "https://demo.supabase.co/rest/v1"
        );
    }

    #[test]
    fn normalize_rest_url_rejects_missing_scheme() {
        assert!(matches!(
            normalize_rest_url("demo.supabase.co"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn backend_requires_anon_key() {
        assert!(matches!(
            SupabaseNotesBackend::new("https://demo.supabase.co", "  "),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn id_filter_is_url_encoded() {
        let id: NoteId = "a b&c".parse().unwrap();
        assert_eq!(SupabaseNotesBackend::id_filter(&id), "eq.a%20b%26c");
    }

    #[test]
    fn changes_serialize_with_backend_column_names() {
        let changes = NoteChanges {
            title: "T".to_string(),
            content: "B".to_string(),
            color: crate::models::NoteColor::Sky,
            updated_at: chrono::DateTime::from_timestamp(0, 0).unwrap(),
        };
        let value = serde_json::to_value(&changes).unwrap();
        assert_eq!(value["color"], "#e0f2fe");
        assert_eq!(value["updated_at"], "1970-01-01T00:00:00Z");
        assert!(value.get("user_id").is_none());
    }
}
