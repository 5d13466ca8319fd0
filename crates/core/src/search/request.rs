//! Typed search requests as the REST providers receive them.
//!
//! Each bundle files its parameters into a [`SearchParameterMap`] under the handler names the
//! matching DAO dispatches on, so providers never spell handler constants themselves.

use crate::constants::{
    ADDRESS_SEARCH_HANDLER, CITY_PROPERTY, CODED_SEARCH_HANDLER, COMMON_SEARCH_HANDLER,
    COUNTRY_PROPERTY, DATE_RANGE_SEARCH_HANDLER, ENCOUNTER_REFERENCE_SEARCH_HANDLER,
    GENDER_SEARCH_HANDLER, ID_PROPERTY, INCLUDE_SEARCH_HANDLER, LAST_UPDATED_PROPERTY,
    MEDICATION_REQUEST_REFERENCE_SEARCH_HANDLER, NAME_PROPERTY, NAME_SEARCH_HANDLER,
    PATIENT_REFERENCE_SEARCH_HANDLER, POSTAL_CODE_PROPERTY, RESULT_SEARCH_HANDLER,
    REVERSE_INCLUDE_SEARCH_HANDLER, STATE_PROPERTY,
};
use crate::search::params::{
    DateRangeParam, Include, ReferenceAndListParam, SearchParameterMap, SortSpec,
    StringAndListParam, TokenAndListParam,
};

fn add_common(map: &mut SearchParameterMap, id: &Option<TokenAndListParam>, last_updated: &Option<DateRangeParam>) {
    if let Some(id) = id {
        map.add_property_parameter(COMMON_SEARCH_HANDLER, ID_PROPERTY, id.clone());
    }
    if let Some(last_updated) = last_updated {
        map.add_property_parameter(COMMON_SEARCH_HANDLER, LAST_UPDATED_PROPERTY, *last_updated);
    }
}

fn add_includes(map: &mut SearchParameterMap, handler: &str, includes: &[Include]) {
    if !includes.is_empty() {
        map.add_parameter(handler, includes.to_vec());
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiagnosticReportSearchParams {
    pub encounter: Option<ReferenceAndListParam>,
    pub patient: Option<ReferenceAndListParam>,
    /// Used when `patient` is absent.
    pub subject: Option<ReferenceAndListParam>,
    pub issued: Option<DateRangeParam>,
    pub code: Option<TokenAndListParam>,
    pub result: Option<ReferenceAndListParam>,
    pub id: Option<TokenAndListParam>,
    pub last_updated: Option<DateRangeParam>,
    pub sort: Option<SortSpec>,
    pub includes: Vec<Include>,
}

impl DiagnosticReportSearchParams {
    pub fn to_search_parameter_map(&self) -> SearchParameterMap {
        let mut map = SearchParameterMap::new();
        if let Some(encounter) = &self.encounter {
            map.add_parameter(ENCOUNTER_REFERENCE_SEARCH_HANDLER, encounter.clone());
        }
        if let Some(patient) = self.patient.as_ref().or(self.subject.as_ref()) {
            map.add_parameter(PATIENT_REFERENCE_SEARCH_HANDLER, patient.clone());
        }
        if let Some(issued) = self.issued {
            map.add_parameter(DATE_RANGE_SEARCH_HANDLER, issued);
        }
        if let Some(code) = &self.code {
            map.add_parameter(CODED_SEARCH_HANDLER, code.clone());
        }
        if let Some(result) = &self.result {
            map.add_parameter(RESULT_SEARCH_HANDLER, result.clone());
        }
        add_common(&mut map, &self.id, &self.last_updated);
        add_includes(&mut map, INCLUDE_SEARCH_HANDLER, &self.includes);
        map.set_sort_spec(self.sort.clone());
        map
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonSearchParams {
    pub name: Option<StringAndListParam>,
    pub gender: Option<TokenAndListParam>,
    pub birthdate: Option<DateRangeParam>,
    pub city: Option<StringAndListParam>,
    pub state: Option<StringAndListParam>,
    pub postal_code: Option<StringAndListParam>,
    pub country: Option<StringAndListParam>,
    pub id: Option<TokenAndListParam>,
    pub last_updated: Option<DateRangeParam>,
    pub sort: Option<SortSpec>,
}

impl PersonSearchParams {
    pub fn to_search_parameter_map(&self) -> SearchParameterMap {
        let mut map = SearchParameterMap::new();
        if let Some(name) = &self.name {
            map.add_property_parameter(NAME_SEARCH_HANDLER, NAME_PROPERTY, name.clone());
        }
        if let Some(gender) = &self.gender {
            map.add_parameter(GENDER_SEARCH_HANDLER, gender.clone());
        }
        if let Some(birthdate) = self.birthdate {
            map.add_parameter(DATE_RANGE_SEARCH_HANDLER, birthdate);
        }
        let address = [
            (CITY_PROPERTY, &self.city),
            (STATE_PROPERTY, &self.state),
            (POSTAL_CODE_PROPERTY, &self.postal_code),
            (COUNTRY_PROPERTY, &self.country),
        ];
        for (property, value) in address {
            if let Some(value) = value {
                map.add_property_parameter(ADDRESS_SEARCH_HANDLER, property, value.clone());
            }
        }
        add_common(&mut map, &self.id, &self.last_updated);
        map.set_sort_spec(self.sort.clone());
        map
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MedicationRequestSearchParams {
    pub patient: Option<ReferenceAndListParam>,
    pub encounter: Option<ReferenceAndListParam>,
    pub code: Option<TokenAndListParam>,
    pub id: Option<TokenAndListParam>,
    pub last_updated: Option<DateRangeParam>,
    pub sort: Option<SortSpec>,
    pub rev_includes: Vec<Include>,
}

impl MedicationRequestSearchParams {
    pub fn to_search_parameter_map(&self) -> SearchParameterMap {
        let mut map = SearchParameterMap::new();
        if let Some(patient) = &self.patient {
            map.add_parameter(PATIENT_REFERENCE_SEARCH_HANDLER, patient.clone());
        }
        if let Some(encounter) = &self.encounter {
            map.add_parameter(ENCOUNTER_REFERENCE_SEARCH_HANDLER, encounter.clone());
        }
        if let Some(code) = &self.code {
            map.add_parameter(CODED_SEARCH_HANDLER, code.clone());
        }
        add_common(&mut map, &self.id, &self.last_updated);
        add_includes(&mut map, REVERSE_INCLUDE_SEARCH_HANDLER, &self.rev_includes);
        map.set_sort_spec(self.sort.clone());
        map
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MedicationDispenseSearchParams {
    pub patient: Option<ReferenceAndListParam>,
    pub encounter: Option<ReferenceAndListParam>,
    pub prescription: Option<ReferenceAndListParam>,
    pub id: Option<TokenAndListParam>,
    pub last_updated: Option<DateRangeParam>,
    pub sort: Option<SortSpec>,
}

impl MedicationDispenseSearchParams {
    pub fn to_search_parameter_map(&self) -> SearchParameterMap {
        let mut map = SearchParameterMap::new();
        if let Some(patient) = &self.patient {
            map.add_parameter(PATIENT_REFERENCE_SEARCH_HANDLER, patient.clone());
        }
        if let Some(encounter) = &self.encounter {
            map.add_parameter(ENCOUNTER_REFERENCE_SEARCH_HANDLER, encounter.clone());
        }
        if let Some(prescription) = &self.prescription {
            map.add_parameter(MEDICATION_REQUEST_REFERENCE_SEARCH_HANDLER, prescription.clone());
        }
        add_common(&mut map, &self.id, &self.last_updated);
        map.set_sort_spec(self.sort.clone());
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::params::{DateParam, ReferenceParam, StringParam, TokenParam};

    #[test]
    fn diagnostic_report_subject_stands_in_for_patient() {
        let params = DiagnosticReportSearchParams {
            subject: Some(ReferenceAndListParam::single(ReferenceParam::id("p-1"))),
            includes: vec![Include::parse("DiagnosticReport:result", false).expect("include")],
            ..DiagnosticReportSearchParams::default()
        };
        let map = params.to_search_parameter_map();

        let handlers: Vec<_> = map.parameters().map(|(h, _)| h).collect();
        assert_eq!(
            handlers,
            vec![PATIENT_REFERENCE_SEARCH_HANDLER, INCLUDE_SEARCH_HANDLER]
        );
    }

    #[test]
    fn person_address_parts_carry_their_property() {
        let params = PersonSearchParams {
            city: Some(StringAndListParam::single(StringParam::new("Kampala"))),
            country: Some(StringAndListParam::single(StringParam::new("Uganda"))),
            id: Some(TokenAndListParam::single(TokenParam::code("abc"))),
            ..PersonSearchParams::default()
        };
        let map = params.to_search_parameter_map();

        let properties: Vec<_> = map
            .get(ADDRESS_SEARCH_HANDLER)
            .iter()
            .map(|p| p.property_name.as_deref())
            .collect();
        assert_eq!(properties, vec![Some(CITY_PROPERTY), Some(COUNTRY_PROPERTY)]);
        assert_eq!(
            map.get(COMMON_SEARCH_HANDLER)[0].property_name.as_deref(),
            Some(ID_PROPERTY)
        );
    }

    #[test]
    fn empty_request_yields_empty_map() {
        assert!(MedicationRequestSearchParams::default()
            .to_search_parameter_map()
            .is_empty());
        assert!(MedicationDispenseSearchParams::default()
            .to_search_parameter_map()
            .is_empty());
    }

    #[test]
    fn dispense_last_updated_goes_to_common_handler() {
        let params = MedicationDispenseSearchParams {
            last_updated: Some(DateRangeParam::single(
                DateParam::parse("ge2022").expect("valid"),
            )),
            ..MedicationDispenseSearchParams::default()
        };
        let map = params.to_search_parameter_map();
        let common = map.get(COMMON_SEARCH_HANDLER);
        assert_eq!(common.len(), 1);
        assert_eq!(common[0].property_name.as_deref(), Some(LAST_UPDATED_PROPERTY));
    }
}
