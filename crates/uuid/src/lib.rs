//! Entity identifier utilities.
//!
//! Every domain entity carries a stable opaque identifier that doubles as the FHIR resource
//! id. Identifiers are stored as text (at most 38 characters) and are usually RFC 4122
//! hyphenated UUIDs, but legacy records may hold any non-blank token, so validation is
//! deliberately syntactic:
//!
//! - not blank, no surrounding whitespace
//! - at most [`MAX_UUID_LENGTH`] characters
//! - no `/`, `?` or `#`, since the value is embedded in reference strings like `Patient/<id>`
//!
//! Freshly generated identifiers are always hyphenated lowercase v4 UUIDs.

mod service;

pub use service::{EntityUuid, Uuid, MAX_UUID_LENGTH};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UuidError {
    /// Invalid input provided
    #[error("invalid entity uuid: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
