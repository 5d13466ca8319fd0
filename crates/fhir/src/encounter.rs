//! FHIR R4 `Encounter` resource.
//!
//! OpenMRS visits and encounters both surface as `Encounter`; a `Meta.tag` in the
//! OpenMRS encounter-tag system tells the two apart.

use crate::json::FhirResource;
use crate::{CodeableConcept, Coding, Meta, Period, Reference, ResourceType};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncounterStatus {
    Planned,
    Arrived,
    Triaged,
    InProgress,
    Onleave,
    Finished,
    Cancelled,
    EnteredInError,
    #[default]
    Unknown,
}

/// A location the patient was at during the encounter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterLocation {
    pub location: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,

    #[serde(default)]
    pub status: EncounterStatus,

    #[serde(rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_: Option<Coding>,

    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub type_: Vec<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub location: Vec<EncounterLocation>,
}

impl Default for Encounter {
    fn default() -> Self {
        Self {
            resource_type: ResourceType::Encounter.as_str().to_owned(),
            id: None,
            meta: Meta::default(),
            status: EncounterStatus::default(),
            class_: None,
            type_: Vec::new(),
            subject: None,
            period: None,
            location: Vec::new(),
        }
    }
}

impl Encounter {
    /// First location entry, mirroring FHIR's `getLocationFirstRep` accessor.
    pub fn first_location(&self) -> Option<&EncounterLocation> {
        self.location.first()
    }
}

impl FhirResource for Encounter {
    const RESOURCE_TYPE: ResourceType = ResourceType::Encounter;

    fn resource_type_name(&self) -> &str {
        &self.resource_type
    }
}
