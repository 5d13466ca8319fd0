//! OpenMRS visits as FHIR `Encounter` resources.
//!
//! Visits and encounters share the `Encounter` resource; visits carry the
//! `encounter-tag|visit` tag so clients can tell them apart.

use crate::config::CoreConfig;
use crate::constants::{ENCOUNTER_CLASS_SYSTEM_URI, OPENMRS_FHIR_EXT_ENCOUNTER_TAG};
use crate::domain::{Location, Visit};
use crate::lookup::EncounterClassMap;
use crate::translators::reference::{LocationReferenceTranslator, PatientReferenceTranslator};
use crate::translators::security::MetaSecurityTranslator;
use crate::translators::visit_type::VisitTypeTranslator;
use crate::TranslatorResult;
use fhir2_uuid::EntityUuid;
use fhir_r4::{Coding, Encounter, EncounterLocation, EncounterStatus, Meta, Period};
use std::sync::Arc;

pub struct VisitTranslator {
    patient_references: PatientReferenceTranslator,
    location_references: LocationReferenceTranslator,
    visit_types: VisitTypeTranslator,
    security: MetaSecurityTranslator,
    class_map: Arc<dyn EncounterClassMap>,
    default_class: String,
}

impl VisitTranslator {
    pub fn new(
        config: &CoreConfig,
        patient_references: PatientReferenceTranslator,
        location_references: LocationReferenceTranslator,
        visit_types: VisitTypeTranslator,
        security: MetaSecurityTranslator,
        class_map: Arc<dyn EncounterClassMap>,
    ) -> Self {
        Self {
            patient_references,
            location_references,
            visit_types,
            security,
            class_map,
            default_class: config.default_encounter_class().to_owned(),
        }
    }

    /// Build the encounter for a visit. Absent optional fields stay absent.
    pub fn to_fhir(&self, visit: &Visit) -> Encounter {
        let period = Period {
            start: visit.start_datetime,
            end: visit.stop_datetime,
        };

        let mut meta = Meta {
            version_id: visit.audit.version_id(),
            last_updated: visit.audit.last_updated(),
            security: self.security.to_fhir(visit),
            tag: Vec::new(),
        };
        meta.add_tag(OPENMRS_FHIR_EXT_ENCOUNTER_TAG, "visit", "Visit");

        Encounter {
            id: Some(visit.uuid.to_string()),
            meta,
            status: EncounterStatus::Unknown,
            class_: Some(self.encounter_class(visit.location.as_ref())),
            type_: self.visit_types.to_fhir(visit.visit_type.as_ref()),
            subject: self.patient_references.to_fhir(visit.patient.as_ref()),
            period: (!period.is_empty()).then_some(period),
            location: self
                .location_references
                .to_fhir(visit.location.as_ref())
                .map(|location| EncounterLocation {
                    location,
                    period: None,
                })
                .into_iter()
                .collect(),
            ..Encounter::default()
        }
    }

    /// Merge an encounter onto `existing`, or onto a fresh visit.
    ///
    /// Fields the encounter does not carry are left untouched. The visit keeps its uuid unless
    /// the encounter has an id. Security labels are applied in memory; persisting the visit is
    /// the caller's job.
    ///
    /// # Errors
    ///
    /// Returns an error when the encounter id is not a valid identifier or the subject or
    /// location reference names the wrong resource type.
    pub fn to_domain(&self, existing: Option<Visit>, encounter: &Encounter) -> TranslatorResult<Visit> {
        let mut visit = existing.unwrap_or_default();

        if let Some(id) = encounter.id.as_deref().filter(|id| !id.trim().is_empty()) {
            visit.uuid = EntityUuid::parse(id.trim())?;
        }

        if let Some(visit_type) = self.visit_types.to_domain(&encounter.type_) {
            visit.visit_type = Some(visit_type);
        }

        if let Some(period) = &encounter.period {
            visit.start_datetime = period.start;
            visit.stop_datetime = period.end;
        }

        if let Some(subject) = encounter.subject.as_ref().filter(|s| s.has_reference()) {
            visit.patient = self.patient_references.to_domain(Some(subject))?;
        }

        if let Some(location) = encounter
            .first_location()
            .map(|l| &l.location)
            .filter(|l| l.has_reference())
        {
            visit.location = self.location_references.to_domain(Some(location))?;
        }

        let changes = self.security.plan_changes(&visit, &encounter.meta.security);
        if !changes.is_empty() {
            tracing::debug!(
                visit = %visit.uuid,
                voided = changes.void.len(),
                added = changes.add.len(),
                "staging security attribute changes"
            );
            self.security.apply(&mut visit, changes);
        }

        Ok(visit)
    }

    fn encounter_class(&self, location: Option<&Location>) -> Coding {
        let code = location
            .and_then(|l| self.class_map.fhir_class(&l.uuid))
            .unwrap_or_else(|| self.default_class.clone());
        Coding {
            system: Some(ENCOUNTER_CLASS_SYSTEM_URI.to_owned()),
            code: Some(code),
            display: None,
        }
    }
}
