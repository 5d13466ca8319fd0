//! Patients and their names, identifiers and addresses.

use super::{Attributable, Attribute, Audit, EntityKind};
use chrono::{DateTime, NaiveDate, Utc};
use fhir2_types::NonEmptyText;
use fhir2_uuid::EntityUuid;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonName {
    pub uuid: EntityUuid,
    pub given_name: Option<String>,
    pub middle_name: Option<String>,
    pub family_name: Option<String>,
    pub preferred: bool,
    pub voided: bool,
}

impl PersonName {
    /// "Given Middle Family", skipping absent or blank parts.
    pub fn full_name(&self) -> String {
        [&self.given_name, &self.middle_name, &self.family_name]
            .into_iter()
            .flatten()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientIdentifierType {
    pub uuid: EntityUuid,
    pub name: NonEmptyText,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientIdentifier {
    pub uuid: EntityUuid,
    pub identifier: String,
    pub identifier_type: Option<PatientIdentifierType>,
    pub preferred: bool,
    pub voided: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonAddress {
    pub uuid: EntityUuid,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city_village: Option<String>,
    pub state_province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub preferred: bool,
    pub voided: bool,
}

/// A patient: a person with identifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Patient {
    pub uuid: EntityUuid,
    /// OpenMRS gender code (`M`, `F`, `O`, `U`).
    pub gender: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub birthdate_estimated: bool,
    pub dead: bool,
    pub death_date: Option<DateTime<Utc>>,
    pub names: Vec<PersonName>,
    pub identifiers: Vec<PatientIdentifier>,
    pub addresses: Vec<PersonAddress>,
    pub attributes: Vec<Attribute>,
    pub voided: bool,
    pub audit: Audit,
}

impl Patient {
    /// The preferred active name, else the first active one.
    pub fn preferred_name(&self) -> Option<&PersonName> {
        self.names
            .iter()
            .find(|n| n.preferred && !n.voided)
            .or_else(|| self.names.iter().find(|n| !n.voided))
    }

    /// The preferred active identifier, else the first active one.
    pub fn preferred_identifier(&self) -> Option<&PatientIdentifier> {
        self.identifiers
            .iter()
            .find(|i| i.preferred && !i.voided)
            .or_else(|| self.identifiers.iter().find(|i| !i.voided))
    }
}

impl Attributable for Patient {
    const KIND: EntityKind = EntityKind::Person;

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
        &mut self.attributes
    }
}
