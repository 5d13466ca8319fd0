//! Visit types as `Encounter.type`.

use crate::constants::VISIT_TYPE_SYSTEM_URI;
use crate::domain::VisitType;
use crate::lookup::EntityLookup;
use fhir2_uuid::EntityUuid;
use fhir_r4::{CodeableConcept, Coding};
use std::sync::Arc;

pub struct VisitTypeTranslator {
    lookup: Arc<dyn EntityLookup<VisitType>>,
}

impl VisitTypeTranslator {
    pub fn new(lookup: Arc<dyn EntityLookup<VisitType>>) -> Self {
        Self { lookup }
    }

    /// A single concept coded in the visit-type system, or nothing.
    pub fn to_fhir(&self, visit_type: Option<&VisitType>) -> Vec<CodeableConcept> {
        visit_type
            .map(|vt| {
                CodeableConcept::from_coding(Coding::of(
                    VISIT_TYPE_SYSTEM_URI,
                    vt.uuid.as_str(),
                    vt.name.as_str(),
                ))
            })
            .into_iter()
            .collect()
    }

    /// Resolves the first visit-type coding that names a known visit type.
    pub fn to_domain(&self, types: &[CodeableConcept]) -> Option<VisitType> {
        types
            .iter()
            .flat_map(|concept| concept.coding.iter())
            .filter(|coding| coding.is_system(VISIT_TYPE_SYSTEM_URI))
            .filter_map(|coding| coding.code.as_deref())
            .filter_map(|code| match EntityUuid::parse(code) {
                Ok(uuid) => Some(uuid),
                Err(err) => {
                    tracing::debug!(code, error = %err, "ignoring malformed visit type code");
                    None
                }
            })
            .find_map(|uuid| self.lookup.get(&uuid))
    }
}
