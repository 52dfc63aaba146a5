use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Note content cannot be empty")]
    EmptyContent,
    #[error("Note ID cannot be empty")]
    EmptyNoteId,
    #[error("No note found matching ID/prefix '{0}'")]
    NoteNotFound(String),
    #[error("{0}")]
    AmbiguousNoteId(String),
    #[error("Failed to launch editor: {0}")]
    EditorFailed(String),
    #[error("Profile '{0}' is not signed in. Run `jotwall auth login` first.")]
    NotSignedIn(String),
    #[error("{0}")]
    Config(String),
    #[error(transparent)]
    Core(#[from] jotwall_core::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<jotwall_core::auth::AuthError> for CliError {
    fn from(error: jotwall_core::auth::AuthError) -> Self {
        Self::Core(error.into())
    }
}
