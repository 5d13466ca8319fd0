//! FHIR R4 `Patient` resource.

use crate::json::FhirResource;
use crate::{Address, Extension, FhirDate, HumanName, Identifier, Meta, ResourceType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Administrative gender codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
    Unknown,
}

/// The `deceased[x]` choice element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deceased {
    #[serde(rename = "deceasedBoolean")]
    Boolean(bool),
    #[serde(rename = "deceasedDateTime")]
    DateTime(DateTime<Utc>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<AdministrativeGender>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<FhirDate>,

    #[serde(flatten)]
    pub deceased: Option<Deceased>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<Address>,
}

impl Default for Patient {
    fn default() -> Self {
        Self {
            resource_type: ResourceType::Patient.as_str().to_owned(),
            id: None,
            meta: Meta::default(),
            extension: Vec::new(),
            identifier: Vec::new(),
            active: None,
            name: Vec::new(),
            gender: None,
            birth_date: None,
            deceased: None,
            address: Vec::new(),
        }
    }
}

impl FhirResource for Patient {
    const RESOURCE_TYPE: ResourceType = ResourceType::Patient;

    fn resource_type_name(&self) -> &str {
        &self.resource_type
    }
}
