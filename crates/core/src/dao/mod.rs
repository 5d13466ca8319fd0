//! Resource DAOs: compose a [`CriteriaQuery`] from a [`SearchParameterMap`].
//!
//! Each DAO names its root entity and dispatches the handlers it understands. Handlers it does
//! not know are ignored, so a provider may pass parameters a given backend cannot serve. The
//! persistence collaborator executes the composed query.

mod diagnostic_report;
mod medication_dispense;
mod medication_request;
mod person;
mod visit;

pub use diagnostic_report::DiagnosticReportDao;
pub use medication_dispense::MedicationDispenseDao;
pub use medication_request::MedicationRequestDao;
pub use person::PersonDao;
pub use visit::VisitDao;

use crate::constants::{ID_PROPERTY, LAST_UPDATED_PROPERTY, SP_ID, SP_LAST_UPDATED};
use crate::search::handlers::{handle_last_updated_mutable, handle_token};
use crate::search::{CriteriaQuery, Criterion, DateRangeParam, PropParam, SearchParameterMap, SortSpec};
use fhir_r4::ResourceType;

pub trait FhirDao {
    /// Entity the query selects from.
    const ROOT_ENTITY: &'static str;

    const RESOURCE_TYPE: ResourceType;

    /// Soft-delete flag on the root entity, excluded from every search. `None` when the entity
    /// cannot be voided.
    const VOIDED_PROPERTY: Option<&'static str> = Some("voided");

    /// Adds predicates and joins for the handlers this DAO supports.
    fn setup_search_params(&self, query: &mut CriteriaQuery, params: &SearchParameterMap);

    /// Entity property behind a FHIR search or sort parameter.
    ///
    /// Dotted values (`names.familyName`) go through a join on the prefix.
    fn param_to_prop(&self, param: &str) -> Option<String> {
        match param {
            SP_ID => Some("uuid".to_owned()),
            SP_LAST_UPDATED => Some("dateChanged".to_owned()),
            _ => None,
        }
    }

    fn handle_last_updated(&self, param: &DateRangeParam) -> Option<Criterion> {
        handle_last_updated_mutable(param)
    }

    /// `_id` and `_lastUpdated`, filed under the common handler by property name.
    ///
    /// # Panics
    ///
    /// Panics if a parameter does not have the shape its property requires.
    fn handle_common_search_parameters(&self, params: &[PropParam]) -> Option<Criterion> {
        Criterion::all(
            params
                .iter()
                .filter_map(|p| match p.property_name.as_deref() {
                    Some(ID_PROPERTY) => handle_token("uuid", p.param.as_tokens()),
                    Some(LAST_UPDATED_PROPERTY) => self.handle_last_updated(p.param.as_date_range()),
                    other => {
                        tracing::debug!(property = ?other, "common search property not supported; ignored");
                        None
                    }
                })
                .collect(),
        )
    }

    fn handle_sort(&self, query: &mut CriteriaQuery, sort: &SortSpec) {
        for spec in sort.iter() {
            let Some(property) = self.param_to_prop(&spec.param_name) else {
                tracing::debug!(param = %spec.param_name, "sort parameter not supported; ignored");
                continue;
            };
            match property.rsplit_once('.') {
                Some((path, field)) => {
                    let alias = query.join_path(path);
                    query.add_order(format!("{alias}.{field}"), spec.order);
                }
                None => query.add_order(property, spec.order),
            }
        }
    }

    /// Records `_include` / `_revinclude` directives for the include resolver.
    ///
    /// # Panics
    ///
    /// Panics if a parameter is not a set of include directives.
    fn handle_includes(&self, query: &mut CriteriaQuery, params: &[PropParam]) {
        for include in params.iter().flat_map(|p| p.param.as_includes()) {
            tracing::debug!(root = Self::ROOT_ENTITY, include = %include, reverse = include.reverse, "include recorded");
            query.add_include(include.clone());
        }
    }

    /// Composes the query for `params`.
    fn build_query(&self, params: &SearchParameterMap) -> CriteriaQuery {
        let mut query = CriteriaQuery::new(Self::ROOT_ENTITY);
        if let Some(voided) = Self::VOIDED_PROPERTY {
            query.add(Criterion::eq(voided, false));
        }
        self.setup_search_params(&mut query, params);
        if let Some(sort) = params.sort_spec() {
            self.handle_sort(&mut query, sort);
        }
        tracing::debug!(resource = %Self::RESOURCE_TYPE, query = %query, "search query composed");
        query
    }
}

/// Logs a handler the DAO does not serve.
fn ignore_handler(root: &str, handler: &str) {
    tracing::debug!(root, handler, "search handler not supported; ignored");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{COMMON_SEARCH_HANDLER, PATIENT_REFERENCE_SEARCH_HANDLER};
    use crate::search::{DateParam, ReferenceAndListParam, ReferenceParam, SortOrder, TokenAndListParam, TokenParam};

    #[test]
    fn common_id_parameter_matches_uuid() {
        let mut params = SearchParameterMap::new();
        params.add_property_parameter(
            COMMON_SEARCH_HANDLER,
            ID_PROPERTY,
            TokenAndListParam::new().and(vec![TokenParam::code("a"), TokenParam::code("b")]),
        );
        let query = VisitDao.build_query(&params);
        assert_eq!(
            query.to_string(),
            "FROM Visit WHERE (voided = false AND uuid IN ('a', 'b'))"
        );
    }

    #[test]
    fn unknown_handler_leaves_query_unchanged() {
        let mut params = SearchParameterMap::new();
        params.add_parameter(
            "no.such.search.handler",
            ReferenceAndListParam::single(ReferenceParam::id("x")),
        );
        let query = MedicationDispenseDao.build_query(&params);
        assert_eq!(query.predicates(), &[Criterion::eq("voided", false)]);
        assert_eq!(query.joins().count(), 0);
    }

    #[test]
    fn repeated_patient_parameters_reuse_one_join() {
        let mut params = SearchParameterMap::new();
        params
            .add_parameter(
                PATIENT_REFERENCE_SEARCH_HANDLER,
                ReferenceAndListParam::single(ReferenceParam::id("p-1")),
            )
            .add_parameter(
                PATIENT_REFERENCE_SEARCH_HANDLER,
                ReferenceAndListParam::single(ReferenceParam::chained("identifier", "1000X")),
            );
        let query = VisitDao.build_query(&params);
        let aliases: Vec<_> = query.joins().map(|j| j.alias.as_str()).collect();
        assert_eq!(aliases, vec!["patient", "patient_identifiers"]);
        assert_eq!(query.predicates().len(), 3);
    }

    #[test]
    fn sort_on_joined_property_adds_alias() {
        let mut params = SearchParameterMap::new();
        params.set_sort_spec(SortSpec::parse("family,-birthdate,unknown"));
        let query = PersonDao.build_query(&params);

        assert!(query.has_alias("names"));
        let orders: Vec<_> = query
            .orders()
            .iter()
            .map(|o| (o.property.as_str(), o.order))
            .collect();
        assert_eq!(
            orders,
            vec![
                ("names.familyName", SortOrder::Ascending),
                ("birthdate", SortOrder::Descending)
            ]
        );
    }

    #[test]
    #[should_panic(expected = "expected a date range parameter")]
    fn wrong_shape_for_common_property_panics() {
        let mut params = SearchParameterMap::new();
        params.add_property_parameter(
            COMMON_SEARCH_HANDLER,
            LAST_UPDATED_PROPERTY,
            TokenAndListParam::single(TokenParam::code("2020")),
        );
        let _ = VisitDao.build_query(&params);
    }

    #[test]
    fn mutable_last_updated_is_the_default() {
        let mut params = SearchParameterMap::new();
        params.add_property_parameter(
            COMMON_SEARCH_HANDLER,
            LAST_UPDATED_PROPERTY,
            DateRangeParam::single(DateParam::parse("ge2021").expect("valid")),
        );
        let query = VisitDao.build_query(&params);
        assert!(query.to_string().contains("dateChanged IS NULL"));
    }
}
