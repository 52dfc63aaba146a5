//! Shared utility functions used across multiple modules.

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Why a project URL could not be turned into a service endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceUrlError {
    Empty,
    MissingScheme,
}

impl ServiceUrlError {
    pub const fn message(self) -> &'static str {
        match self {
            Self::Empty => "Supabase URL must not be empty",
            Self::MissingScheme => "Supabase URL must include http:// or https://",
        }
    }
}

/// Join a Supabase project URL with a service path such as `/auth/v1`.
///
/// Trailing slashes are dropped and an already-present service path is kept.
pub fn service_url(project_url: &str, service_path: &str) -> Result<String, ServiceUrlError> {
    let trimmed = project_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ServiceUrlError::Empty);
    }
    if !is_http_url(trimmed) {
        return Err(ServiceUrlError::MissingScheme);
    }
    if trimmed.ends_with(service_path) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}{service_path}"))
    }
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Current Unix timestamp in seconds.
pub fn unix_timestamp_now() -> i64 {
    chrono::Utc::now().timestamp()
}
