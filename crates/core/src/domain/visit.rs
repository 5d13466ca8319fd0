//! Visits, visit types and locations.

use super::{Attributable, Attribute, Audit, EntityKind, Patient};
use chrono::{DateTime, Utc};
use fhir2_types::NonEmptyText;
use fhir2_uuid::EntityUuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisitType {
    pub uuid: EntityUuid,
    pub name: NonEmptyText,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub uuid: EntityUuid,
    pub name: NonEmptyText,
    pub retired: bool,
}

/// A visit: a patient's stay at a facility, grouping clinical encounters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Visit {
    pub uuid: EntityUuid,
    pub visit_type: Option<VisitType>,
    pub patient: Option<Patient>,
    pub location: Option<Location>,
    pub start_datetime: Option<DateTime<Utc>>,
    pub stop_datetime: Option<DateTime<Utc>>,
    pub attributes: Vec<Attribute>,
    pub voided: bool,
    pub audit: Audit,
}

impl Attributable for Visit {
    const KIND: EntityKind = EntityKind::Visit;

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
        &mut self.attributes
    }
}
