//! Resource type names used in references, includes and search parameters.

use crate::FhirError;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceType {
    DiagnosticReport,
    Encounter,
    Location,
    Medication,
    MedicationDispense,
    MedicationRequest,
    Observation,
    Patient,
    Person,
    Practitioner,
}

impl ResourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceType::DiagnosticReport => "DiagnosticReport",
            ResourceType::Encounter => "Encounter",
            ResourceType::Location => "Location",
            ResourceType::Medication => "Medication",
            ResourceType::MedicationDispense => "MedicationDispense",
            ResourceType::MedicationRequest => "MedicationRequest",
            ResourceType::Observation => "Observation",
            ResourceType::Patient => "Patient",
            ResourceType::Person => "Person",
            ResourceType::Practitioner => "Practitioner",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = FhirError;

    /// Resource type names are case-sensitive in FHIR.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "DiagnosticReport" => ResourceType::DiagnosticReport,
            "Encounter" => ResourceType::Encounter,
            "Location" => ResourceType::Location,
            "Medication" => ResourceType::Medication,
            "MedicationDispense" => ResourceType::MedicationDispense,
            "MedicationRequest" => ResourceType::MedicationRequest,
            "Observation" => ResourceType::Observation,
            "Patient" => ResourceType::Patient,
            "Person" => ResourceType::Person,
            "Practitioner" => ResourceType::Practitioner,
            other => {
                return Err(FhirError::InvalidInput(format!(
                    "unsupported resource type '{other}'"
                )))
            }
        })
    }
}
