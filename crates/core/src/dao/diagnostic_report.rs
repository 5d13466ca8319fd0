use super::{ignore_handler, FhirDao};
use crate::constants::{
    CODED_SEARCH_HANDLER, COMMON_SEARCH_HANDLER, DATE_RANGE_SEARCH_HANDLER,
    ENCOUNTER_REFERENCE_SEARCH_HANDLER, INCLUDE_SEARCH_HANDLER, PATIENT_REFERENCE_SEARCH_HANDLER,
    RESULT_SEARCH_HANDLER, SP_ID, SP_LAST_UPDATED,
};
use crate::search::handlers::{
    handle_coded_concept, handle_date_range, handle_encounter_reference,
    handle_observation_reference, handle_patient_reference,
};
use crate::search::{CriteriaQuery, SearchParameterMap};
use fhir_r4::ResourceType;

#[derive(Clone, Copy, Debug, Default)]
pub struct DiagnosticReportDao;

impl FhirDao for DiagnosticReportDao {
    const ROOT_ENTITY: &'static str = "FhirDiagnosticReport";
    const RESOURCE_TYPE: ResourceType = ResourceType::DiagnosticReport;

    fn setup_search_params(&self, query: &mut CriteriaQuery, params: &SearchParameterMap) {
        for (handler, values) in params.parameters() {
            match handler {
                ENCOUNTER_REFERENCE_SEARCH_HANDLER => values
                    .iter()
                    .for_each(|p| handle_encounter_reference(query, "encounter", p.param.as_references())),
                PATIENT_REFERENCE_SEARCH_HANDLER => values
                    .iter()
                    .for_each(|p| handle_patient_reference(query, "subject", p.param.as_references())),
                CODED_SEARCH_HANDLER => values
                    .iter()
                    .for_each(|p| handle_coded_concept(query, "code", p.param.as_tokens())),
                DATE_RANGE_SEARCH_HANDLER => {
                    for p in values {
                        if let Some(criterion) = handle_date_range("issued", p.param.as_date_range()) {
                            query.add(criterion);
                        }
                    }
                }
                RESULT_SEARCH_HANDLER => values
                    .iter()
                    .for_each(|p| handle_observation_reference(query, "results", p.param.as_references())),
                COMMON_SEARCH_HANDLER => {
                    if let Some(criterion) = self.handle_common_search_parameters(values) {
                        query.add(criterion);
                    }
                }
                INCLUDE_SEARCH_HANDLER => self.handle_includes(query, values),
                other => ignore_handler(Self::ROOT_ENTITY, other),
            }
        }
    }

    fn param_to_prop(&self, param: &str) -> Option<String> {
        match param {
            SP_ID => Some("uuid".to_owned()),
            SP_LAST_UPDATED => Some("dateChanged".to_owned()),
            "issued" => Some("issued".to_owned()),
            "status" => Some("status".to_owned()),
            _ => None,
        }
    }
}
