use super::{ignore_handler, FhirDao};
use crate::constants::{
    COMMON_SEARCH_HANDLER, DATE_RANGE_SEARCH_HANDLER, LOCATION_REFERENCE_SEARCH_HANDLER,
    PATIENT_REFERENCE_SEARCH_HANDLER, SP_ID, SP_LAST_UPDATED,
};
use crate::search::handlers::{handle_date_range, handle_location_reference, handle_patient_reference};
use crate::search::{CriteriaQuery, SearchParameterMap};
use fhir_r4::ResourceType;

/// Visits, served as FHIR Encounters.
#[derive(Clone, Copy, Debug, Default)]
pub struct VisitDao;

impl FhirDao for VisitDao {
    const ROOT_ENTITY: &'static str = "Visit";
    const RESOURCE_TYPE: ResourceType = ResourceType::Encounter;

    fn setup_search_params(&self, query: &mut CriteriaQuery, params: &SearchParameterMap) {
        for (handler, values) in params.parameters() {
            match handler {
                PATIENT_REFERENCE_SEARCH_HANDLER => values
                    .iter()
                    .for_each(|p| handle_patient_reference(query, "patient", p.param.as_references())),
                LOCATION_REFERENCE_SEARCH_HANDLER => values
                    .iter()
                    .for_each(|p| handle_location_reference(query, "location", p.param.as_references())),
                DATE_RANGE_SEARCH_HANDLER => {
                    for p in values {
                        if let Some(criterion) =
                            handle_date_range("startDatetime", p.param.as_date_range())
                        {
                            query.add(criterion);
                        }
                    }
                }
                COMMON_SEARCH_HANDLER => {
                    if let Some(criterion) = self.handle_common_search_parameters(values) {
                        query.add(criterion);
                    }
                }
                other => ignore_handler(Self::ROOT_ENTITY, other),
            }
        }
    }

    fn param_to_prop(&self, param: &str) -> Option<String> {
        match param {
            SP_ID => Some("uuid".to_owned()),
            SP_LAST_UPDATED => Some("dateChanged".to_owned()),
            "date" => Some("startDatetime".to_owned()),
            _ => None,
        }
    }
}
