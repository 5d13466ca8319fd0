//! FHIR R4 resource models for the OpenMRS translation layer.
//!
//! This crate provides the subset of the FHIR R4 model that the translators in `fhir2-core`
//! produce and consume:
//! - data types (`Coding`, `CodeableConcept`, `Meta`, `Period`, `FhirDate`, ...)
//! - `Reference` together with reference-string parsing
//! - the `Encounter` and `Patient` resources
//!
//! Models serialise to FHIR JSON field names. Transport (HTTP, content negotiation, bundles)
//! is the REST layer's concern; [`json`] only offers strict parse/render helpers for it.

pub mod datatypes;
pub mod encounter;
pub mod json;
pub mod patient;
pub mod reference;
pub mod resource;

pub use datatypes::{
    Address, CodeableConcept, Coding, Extension, ExtensionValue, FhirDate, HumanName, Identifier,
    IdentifierUse, Meta, NameUse, Period, TemporalPrecision,
};
pub use encounter::{Encounter, EncounterLocation, EncounterStatus};
pub use patient::{AdministrativeGender, Deceased, Patient};
pub use reference::Reference;
pub use resource::ResourceType;

/// Errors returned by the `fhir-r4` model crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
