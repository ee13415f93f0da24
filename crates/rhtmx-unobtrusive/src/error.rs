// File: src/error.rs
// Purpose: Error type for the unobtrusive validation layer

/// Errors surfaced by the library API.
///
/// Validation failures are never errors; they travel through the lifecycle
/// hooks as data.
#[derive(Debug, thiserror::Error)]
pub enum UnobtrusiveError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

pub type Result<T> = std::result::Result<T, UnobtrusiveError>;
