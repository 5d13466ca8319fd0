//! Concepts, observations and encounters.

use chrono::{DateTime, Utc};
use fhir2_uuid::EntityUuid;

/// Numeric details of a concept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConceptNumeric {
    pub units: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Concept {
    pub uuid: EntityUuid,
    pub name: Option<String>,
    /// Present only for numeric concepts.
    pub numeric: Option<ConceptNumeric>,
}

impl Concept {
    /// Units of a numeric concept, ignoring blank values.
    pub fn units(&self) -> Option<&str> {
        self.numeric
            .as_ref()
            .and_then(|n| n.units.as_deref())
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

/// An observation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Obs {
    pub uuid: EntityUuid,
    pub concept: Concept,
    pub value_numeric: Option<f64>,
    pub obs_datetime: Option<DateTime<Utc>>,
    pub voided: bool,
}

/// A clinical encounter within a visit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncounterRecord {
    pub uuid: EntityUuid,
    pub encounter_datetime: Option<DateTime<Utc>>,
    pub voided: bool,
}
