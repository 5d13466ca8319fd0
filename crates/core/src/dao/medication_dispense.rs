use super::{ignore_handler, FhirDao};
use crate::constants::{
    COMMON_SEARCH_HANDLER, ENCOUNTER_REFERENCE_SEARCH_HANDLER,
    MEDICATION_REQUEST_REFERENCE_SEARCH_HANDLER, PATIENT_REFERENCE_SEARCH_HANDLER,
};
use crate::search::handlers::{
    handle_encounter_reference, handle_last_updated_immutable, handle_medication_request_reference,
    handle_patient_reference,
};
use crate::search::{CriteriaQuery, Criterion, DateRangeParam, SearchParameterMap};
use fhir_r4::ResourceType;

/// Dispense events. Never edited after creation, so `_lastUpdated` reads `dateCreated`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MedicationDispenseDao;

impl FhirDao for MedicationDispenseDao {
    const ROOT_ENTITY: &'static str = "MedicationDispense";
    const RESOURCE_TYPE: ResourceType = ResourceType::MedicationDispense;

    fn setup_search_params(&self, query: &mut CriteriaQuery, params: &SearchParameterMap) {
        for (handler, values) in params.parameters() {
            match handler {
                PATIENT_REFERENCE_SEARCH_HANDLER => values
                    .iter()
                    .for_each(|p| handle_patient_reference(query, "patient", p.param.as_references())),
                ENCOUNTER_REFERENCE_SEARCH_HANDLER => values
                    .iter()
                    .for_each(|p| handle_encounter_reference(query, "encounter", p.param.as_references())),
                MEDICATION_REQUEST_REFERENCE_SEARCH_HANDLER => values.iter().for_each(|p| {
                    handle_medication_request_reference(query, "drugOrder", p.param.as_references())
                }),
                COMMON_SEARCH_HANDLER => {
                    if let Some(criterion) = self.handle_common_search_parameters(values) {
                        query.add(criterion);
                    }
                }
                other => ignore_handler(Self::ROOT_ENTITY, other),
            }
        }
    }

    fn handle_last_updated(&self, param: &DateRangeParam) -> Option<Criterion> {
        handle_last_updated_immutable(param)
    }
}
