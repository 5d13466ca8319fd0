use fhir2_types::TextError;
use fhir2_uuid::UuidError;
use fhir_r4::FhirError;

/// Errors surfaced by translators.
///
/// Not-found is never an error: lookups that find nothing yield `None`.
#[derive(Debug, thiserror::Error)]
pub enum TranslatorError {
    /// The client sent something that cannot be accepted as-is (for example a reference to
    /// the wrong resource type). Never silently corrected.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid identifier: {0}")]
    Uuid(#[from] UuidError),

    #[error("invalid text: {0}")]
    Text(#[from] TextError),

    #[error("FHIR model error: {0}")]
    Fhir(#[from] FhirError),

    #[error("failed to persist {entity}: {reason}")]
    Persistence { entity: String, reason: String },
}

pub type TranslatorResult<T> = std::result::Result<T, TranslatorError>;

/// Errors raised while resolving [`CoreConfig`](crate::config::CoreConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidInput(String),

    #[error("global properties schema mismatch at {path}: {source}")]
    Schema {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
