//! Domain entities as the persistence layer hands them to the translators.
//!
//! These are design-level shapes, not storage rows: every entity carries its stable
//! [`EntityUuid`](fhir2_uuid::EntityUuid), its typed fields and, for visits and persons, a
//! collection of extensible [`Attribute`]s. Voided rows are retained and filtered at read time.

pub mod attribute;
pub mod clinical;
pub mod person;
pub mod visit;

pub use attribute::{Attribute, AttributeType};
pub use clinical::{Concept, ConceptNumeric, EncounterRecord, Obs};
pub use person::{Patient, PatientIdentifier, PatientIdentifierType, PersonAddress, PersonName};
pub use visit::{Location, Visit, VisitType};

use chrono::{DateTime, Utc};

/// Change-tracking fields shared by every entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Audit {
    pub date_created: Option<DateTime<Utc>>,
    pub date_changed: Option<DateTime<Utc>>,
}

impl Audit {
    pub fn created_at(date_created: DateTime<Utc>) -> Self {
        Self {
            date_created: Some(date_created),
            date_changed: None,
        }
    }

    /// Most recent change, falling back to creation time.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.date_changed.or(self.date_created)
    }

    /// Version tag derived from [`Audit::last_updated`] as epoch milliseconds.
    pub fn version_id(&self) -> Option<String> {
        self.last_updated()
            .map(|instant| instant.timestamp_millis().to_string())
    }
}

/// Entity kinds that own attribute types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Visit,
    Person,
    Location,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visit => "Visit",
            Self::Person => "Person",
            Self::Location => "Location",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity carrying extensible attributes.
pub trait Attributable {
    const KIND: EntityKind;

    fn attributes(&self) -> &[Attribute];

    fn attributes_mut(&mut self) -> &mut Vec<Attribute>;

    /// Attributes that are not voided, in insertion order.
    fn active_attributes(&self) -> Vec<&Attribute> {
        self.attributes().iter().filter(|a| a.is_active()).collect()
    }

    /// Active attributes whose type name matches `type_name` case-insensitively.
    fn active_attributes_of_type(&self, type_name: &str) -> Vec<&Attribute> {
        self.attributes()
            .iter()
            .filter(|a| a.is_active() && a.attribute_type.name.eq_ignore_case(type_name))
            .collect()
    }

    fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes_mut().push(attribute);
    }
}
