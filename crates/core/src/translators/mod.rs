//! Bidirectional domain ↔ FHIR translators.
//!
//! Leaves first: field translators ([`birth_date`], [`gender`], [`quantity_coding`]),
//! attribute translators ([`security`], [`person_attribute`], [`visit_type`]), reference
//! translators ([`reference`]) and the composite resource translators ([`visit`], [`patient`]).
//!
//! Field translators map `None` to `None` in both directions and never fabricate a value.

pub mod birth_date;
pub mod gender;
pub mod patient;
pub mod person_attribute;
pub mod quantity_coding;
pub mod reference;
pub mod security;
pub mod visit;
pub mod visit_type;

pub use birth_date::{BirthDateTranslator, DomainBirthDate};
pub use gender::GenderTranslator;
pub use patient::PatientTranslator;
pub use person_attribute::PersonAttributeTranslator;
pub use quantity_coding::ObservationQuantityCodingTranslator;
pub use reference::{
    EncounterReferenceTranslator, LocationReferenceTranslator, ObservationReferenceTranslator,
    PatientReferenceTranslator, Referable, ReferenceTranslator,
};
pub use security::{derive_security_code, security_display, MetaSecurityTranslator, SecurityChangeSet};
pub use visit::VisitTranslator;
pub use visit_type::VisitTypeTranslator;
