use super::{ignore_handler, FhirDao};
use crate::constants::{
    CODED_SEARCH_HANDLER, COMMON_SEARCH_HANDLER, ENCOUNTER_REFERENCE_SEARCH_HANDLER,
    PATIENT_REFERENCE_SEARCH_HANDLER, REVERSE_INCLUDE_SEARCH_HANDLER,
};
use crate::search::handlers::{
    handle_coded_concept, handle_encounter_reference, handle_last_updated_immutable,
    handle_patient_reference,
};
use crate::search::{CriteriaQuery, Criterion, DateRangeParam, SearchParameterMap};
use fhir_r4::ResourceType;

/// Drug orders, served as MedicationRequests. Orders are revised by new orders rather than
/// edited, so `_lastUpdated` reads `dateCreated`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MedicationRequestDao;

impl FhirDao for MedicationRequestDao {
    const ROOT_ENTITY: &'static str = "DrugOrder";
    const RESOURCE_TYPE: ResourceType = ResourceType::MedicationRequest;

    fn setup_search_params(&self, query: &mut CriteriaQuery, params: &SearchParameterMap) {
        for (handler, values) in params.parameters() {
            match handler {
                PATIENT_REFERENCE_SEARCH_HANDLER => values
                    .iter()
                    .for_each(|p| handle_patient_reference(query, "patient", p.param.as_references())),
                ENCOUNTER_REFERENCE_SEARCH_HANDLER => values
                    .iter()
                    .for_each(|p| handle_encounter_reference(query, "encounter", p.param.as_references())),
                CODED_SEARCH_HANDLER => values
                    .iter()
                    .for_each(|p| handle_coded_concept(query, "concept", p.param.as_tokens())),
                COMMON_SEARCH_HANDLER => {
                    if let Some(criterion) = self.handle_common_search_parameters(values) {
                        query.add(criterion);
                    }
                }
                REVERSE_INCLUDE_SEARCH_HANDLER => self.handle_includes(query, values),
                other => ignore_handler(Self::ROOT_ENTITY, other),
            }
        }
    }

    fn handle_last_updated(&self, param: &DateRangeParam) -> Option<Criterion> {
        handle_last_updated_immutable(param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::MedicationDispenseDao;
    use crate::search::{Include, IncludeResolver, ReferenceAndListParam, ReferenceParam};
    use fhir2_uuid::EntityUuid;

    #[test]
    fn patient_search_with_dispense_revinclude() {
        let mut params = SearchParameterMap::new();
        params
            .add_parameter(
                PATIENT_REFERENCE_SEARCH_HANDLER,
                ReferenceAndListParam::single(ReferenceParam::id("p-1")),
            )
            .add_parameter(
                REVERSE_INCLUDE_SEARCH_HANDLER,
                vec![Include::parse("MedicationDispense:prescription", true).expect("include")],
            );

        let query = MedicationRequestDao.build_query(&params);
        assert_eq!(
            query.to_string(),
            "FROM DrugOrder JOIN patient AS patient WHERE (voided = false AND patient.uuid = 'p-1')"
        );
        assert_eq!(query.rev_includes().len(), 1);

        let page = vec![EntityUuid::parse("order-1").expect("uuid")];
        let follow_ups = IncludeResolver.revinclude_params(query.rev_includes(), &page);
        assert_eq!(follow_ups.len(), 1);
        assert_eq!(follow_ups[0].0, ResourceType::MedicationDispense);

        let dispense_query = MedicationDispenseDao.build_query(&follow_ups[0].1);
        assert_eq!(
            dispense_query.to_string(),
            "FROM MedicationDispense JOIN drugOrder AS drugOrder WHERE (voided = false AND drugOrder.uuid = 'order-1')"
        );
    }

    #[test]
    fn code_with_system_matches_mapping() {
        let mut params = SearchParameterMap::new();
        params.add_parameter(
            CODED_SEARCH_HANDLER,
            crate::search::TokenAndListParam::single(crate::search::TokenParam::system_code(
                "http://www.nlm.nih.gov/research/umls/rxnorm",
                "161",
            )),
        );
        let query = MedicationRequestDao.build_query(&params);
        assert!(query.has_alias("concept"));
        assert!(query.has_alias("concept_conceptMappings"));
    }
}
