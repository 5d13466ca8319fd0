use super::{ignore_handler, FhirDao};
use crate::constants::{
    ADDRESS_SEARCH_HANDLER, CITY_PROPERTY, COMMON_SEARCH_HANDLER, COUNTRY_PROPERTY,
    DATE_RANGE_SEARCH_HANDLER, FAMILY_PROPERTY, GENDER_SEARCH_HANDLER, GIVEN_PROPERTY,
    NAME_PROPERTY, NAME_SEARCH_HANDLER, POSTAL_CODE_PROPERTY, SP_ID, SP_LAST_UPDATED,
    STATE_PROPERTY,
};
use crate::search::handlers::{handle_date_range, handle_gender, handle_string, handle_string_any_of};
use crate::search::{CriteriaQuery, PropParam, SearchParameterMap};
use fhir_r4::ResourceType;

#[derive(Clone, Copy, Debug, Default)]
pub struct PersonDao;

impl PersonDao {
    fn handle_names(&self, query: &mut CriteriaQuery, params: &[PropParam]) {
        for p in params {
            let strings = p.param.as_strings();
            let fields: &[&str] = match p.property_name.as_deref() {
                Some(GIVEN_PROPERTY) => &["givenName"],
                Some(FAMILY_PROPERTY) => &["familyName"],
                Some(NAME_PROPERTY) | None => &["givenName", "middleName", "familyName"],
                Some(other) => {
                    tracing::debug!(property = other, "name property not supported; ignored");
                    continue;
                }
            };
            let names = query.join_path("names");
            let paths: Vec<String> = fields.iter().map(|f| format!("{names}.{f}")).collect();
            let criterion = match paths.as_slice() {
                [single] => handle_string(single, strings),
                any => handle_string_any_of(any, strings),
            };
            if let Some(criterion) = criterion {
                query.add(criterion);
            }
        }
    }

    fn handle_addresses(&self, query: &mut CriteriaQuery, params: &[PropParam]) {
        for p in params {
            let strings = p.param.as_strings();
            let field = match p.property_name.as_deref() {
                Some(CITY_PROPERTY) => "cityVillage",
                Some(STATE_PROPERTY) => "stateProvince",
                Some(POSTAL_CODE_PROPERTY) => "postalCode",
                Some(COUNTRY_PROPERTY) => "country",
                other => {
                    tracing::debug!(property = ?other, "address property not supported; ignored");
                    continue;
                }
            };
            let addresses = query.join_path("addresses");
            if let Some(criterion) = handle_string(&format!("{addresses}.{field}"), strings) {
                query.add(criterion);
            }
        }
    }
}

impl FhirDao for PersonDao {
    const ROOT_ENTITY: &'static str = "Person";
    const RESOURCE_TYPE: ResourceType = ResourceType::Person;
    const VOIDED_PROPERTY: Option<&'static str> = Some("personVoided");

    fn setup_search_params(&self, query: &mut CriteriaQuery, params: &SearchParameterMap) {
        for (handler, values) in params.parameters() {
            match handler {
                NAME_SEARCH_HANDLER => self.handle_names(query, values),
                GENDER_SEARCH_HANDLER => {
                    for p in values {
                        if let Some(criterion) = handle_gender("gender", p.param.as_tokens()) {
                            query.add(criterion);
                        }
                    }
                }
                DATE_RANGE_SEARCH_HANDLER => {
                    for p in values {
                        if let Some(criterion) = handle_date_range("birthdate", p.param.as_date_range()) {
                            query.add(criterion);
                        }
                    }
                }
                ADDRESS_SEARCH_HANDLER => self.handle_addresses(query, values),
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
        let property = match param {
            SP_ID => "uuid",
            SP_LAST_UPDATED => "dateChanged",
            "name" | "family" => "names.familyName",
            "given" => "names.givenName",
            "birthdate" => "birthdate",
            "gender" => "gender",
            "address-city" => "addresses.cityVillage",
            "address-state" => "addresses.stateProvince",
            "address-postalcode" => "addresses.postalCode",
            "address-country" => "addresses.country",
            _ => return None,
        };
        Some(property.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{
        Criterion, MatchMode, StringAndListParam, StringParam, TokenAndListParam, TokenParam,
    };

    #[test]
    fn given_and_family_share_names_join() {
        let mut params = SearchParameterMap::new();
        params
            .add_property_parameter(
                NAME_SEARCH_HANDLER,
                GIVEN_PROPERTY,
                StringAndListParam::single(StringParam::new("Ak")),
            )
            .add_property_parameter(
                NAME_SEARCH_HANDLER,
                FAMILY_PROPERTY,
                StringAndListParam::single(StringParam::exact("Mensah")),
            );

        let query = PersonDao.build_query(&params);
        assert_eq!(query.joins().count(), 1);
        assert_eq!(
            query.predicates(),
            &[
                Criterion::eq("personVoided", false),
                Criterion::like("names.givenName", "Ak", MatchMode::Start),
                Criterion::eq("names.familyName", "Mensah"),
            ]
        );
    }

    #[test]
    fn address_and_gender_parameters() {
        let mut params = SearchParameterMap::new();
        params
            .add_property_parameter(
                ADDRESS_SEARCH_HANDLER,
                POSTAL_CODE_PROPERTY,
                StringAndListParam::single(StringParam::new("00256")),
            )
            .add_parameter(
                GENDER_SEARCH_HANDLER,
                TokenAndListParam::single(TokenParam::code("male")),
            );

        let query = PersonDao.build_query(&params);
        assert_eq!(
            query.to_string(),
            "FROM Person JOIN addresses AS addresses \
             WHERE (personVoided = false AND addresses.postalCode ILIKE '00256%' AND gender = 'M')"
        );
    }

    #[test]
    fn unknown_address_property_adds_no_join() {
        let mut params = SearchParameterMap::new();
        params.add_property_parameter(
            ADDRESS_SEARCH_HANDLER,
            "district.property",
            StringAndListParam::single(StringParam::new("x")),
        );
        let query = PersonDao.build_query(&params);
        assert_eq!(query.joins().count(), 0);
        assert_eq!(query.predicates().len(), 1);
    }

    #[test]
    fn unknown_name_property_adds_no_join() {
        let mut params = SearchParameterMap::new();
        params.add_property_parameter(
            NAME_SEARCH_HANDLER,
            "suffix",
            StringAndListParam::single(StringParam::new("Jr")),
        );
        let query = PersonDao.build_query(&params);
        assert_eq!(query.joins().count(), 0);
        assert_eq!(query.predicates(), &[Criterion::eq("personVoided", false)]);
    }
}
