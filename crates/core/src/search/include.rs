//! `_include` and `_revinclude` expansion.
//!
//! A search records its include directives on the [`CriteriaQuery`](super::CriteriaQuery); once
//! the primary results are known the caller asks [`IncludeResolver`] what else to fetch.
//! Reverse includes become follow-up [`SearchParameterMap`]s for the DAO of the source type,
//! forward includes become uuids to look up per target type.

use crate::constants::{
    ENCOUNTER_REFERENCE_SEARCH_HANDLER, MEDICATION_REQUEST_REFERENCE_SEARCH_HANDLER,
    PATIENT_REFERENCE_SEARCH_HANDLER, RESULT_SEARCH_HANDLER,
};
use crate::search::params::{Include, ReferenceAndListParam, ReferenceParam, SearchParameterMap};
use fhir2_uuid::EntityUuid;
use fhir_r4::json::FhirResource;
use fhir_r4::{Encounter, Reference, ResourceType};
use indexmap::IndexMap;

/// A resource whose references can be followed by `_include`.
pub trait ReferenceSource: FhirResource {
    /// References held under the search parameter `param_name`.
    fn references(&self, param_name: &str) -> Vec<&Reference>;
}

impl ReferenceSource for Encounter {
    fn references(&self, param_name: &str) -> Vec<&Reference> {
        match param_name {
            "subject" | "patient" => self.subject.iter().collect(),
            "location" => self.location.iter().map(|l| &l.location).collect(),
            _ => Vec::new(),
        }
    }
}

/// Handler that filters a source resource by the given reference parameter.
fn reverse_handler(param_name: &str) -> Option<&'static str> {
    match param_name {
        "prescription" => Some(MEDICATION_REQUEST_REFERENCE_SEARCH_HANDLER),
        "patient" | "subject" => Some(PATIENT_REFERENCE_SEARCH_HANDLER),
        "encounter" | "context" => Some(ENCOUNTER_REFERENCE_SEARCH_HANDLER),
        "result" => Some(RESULT_SEARCH_HANDLER),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct IncludeResolver;

impl IncludeResolver {
    /// Follow-up searches for `_revinclude` directives over the primary result `ids`.
    ///
    /// `MedicationDispense:prescription` on a page of MedicationRequests yields a dispense
    /// search whose medication-request reference matches any of the page's ids. Directives
    /// with an unknown source type or parameter are skipped.
    pub fn revinclude_params(
        &self,
        rev_includes: &[Include],
        ids: &[EntityUuid],
    ) -> Vec<(ResourceType, SearchParameterMap)> {
        if ids.is_empty() {
            return Vec::new();
        }

        let mut searches: Vec<(ResourceType, SearchParameterMap)> = Vec::new();
        for include in rev_includes {
            let Ok(source) = include.source_type.parse::<ResourceType>() else {
                tracing::debug!(include = %include, "revinclude source type not supported; skipped");
                continue;
            };
            let Some(handler) = reverse_handler(&include.param_name) else {
                tracing::debug!(include = %include, "revinclude parameter not supported; skipped");
                continue;
            };

            let references = ReferenceAndListParam::new().and(
                ids.iter()
                    .map(|id| ReferenceParam::id(id.as_str()))
                    .collect(),
            );
            match searches.iter_mut().find(|(resource, _)| *resource == source) {
                Some((_, params)) => {
                    params.add_parameter(handler, references);
                }
                None => {
                    let mut params = SearchParameterMap::new();
                    params.add_parameter(handler, references);
                    searches.push((source, params));
                }
            }
        }
        searches
    }

    /// Uuids referenced by `resources` under their `_include` directives, grouped by target type.
    ///
    /// Only directives whose source type matches `R` apply. A directive naming a target type
    /// keeps only references to that type. Ids are de-duplicated in first-seen order.
    pub fn included_ids<R: ReferenceSource>(
        &self,
        includes: &[Include],
        resources: &[R],
    ) -> IndexMap<ResourceType, Vec<EntityUuid>> {
        let mut found: IndexMap<ResourceType, Vec<EntityUuid>> = IndexMap::new();
        let source = R::RESOURCE_TYPE.as_str();

        for include in includes.iter().filter(|i| i.source_type == source) {
            for reference in resources.iter().flat_map(|r| r.references(&include.param_name)) {
                let Some(target) = reference
                    .reference_type()
                    .and_then(|t| t.parse::<ResourceType>().ok())
                else {
                    continue;
                };
                if include
                    .target_type
                    .as_deref()
                    .is_some_and(|wanted| wanted != target.as_str())
                {
                    continue;
                }
                let Some(id) = reference.reference_id() else {
                    continue;
                };
                match EntityUuid::parse(id) {
                    Ok(id) => {
                        let ids = found.entry(target).or_default();
                        if !ids.contains(&id) {
                            ids.push(id);
                        }
                    }
                    Err(err) => {
                        tracing::debug!(include = %include, error = %err, "unusable include reference skipped");
                    }
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir_r4::EncounterLocation;

    fn uuid(value: &str) -> EntityUuid {
        EntityUuid::parse(value).expect("valid uuid")
    }

    #[test]
    fn prescription_revinclude_becomes_dispense_search() {
        let include = Include::parse("MedicationDispense:prescription", true).expect("include");
        let searches =
            IncludeResolver.revinclude_params(&[include], &[uuid("mr-1"), uuid("mr-2")]);

        assert_eq!(searches.len(), 1);
        let (resource, params) = &searches[0];
        assert_eq!(*resource, ResourceType::MedicationDispense);

        let entries = params.get(MEDICATION_REQUEST_REFERENCE_SEARCH_HANDLER);
        assert_eq!(entries.len(), 1);
        let groups = entries[0].param.as_references().groups();
        assert_eq!(groups.len(), 1);
        let ids: Vec<_> = groups[0].iter().map(|r| r.value.as_str()).collect();
        assert_eq!(ids, vec!["mr-1", "mr-2"]);
    }

    #[test]
    fn unsupported_revincludes_and_empty_pages_yield_nothing() {
        let unknown = Include::parse("Basic:author", true).expect("include");
        let bad_param = Include::parse("MedicationDispense:performer", true).expect("include");
        assert!(IncludeResolver
            .revinclude_params(&[unknown, bad_param], &[uuid("mr-1")])
            .is_empty());

        let include = Include::parse("MedicationDispense:prescription", true).expect("include");
        assert!(IncludeResolver.revinclude_params(&[include], &[]).is_empty());
    }

    #[test]
    fn forward_include_collects_distinct_ids_per_target() {
        let encounter = |patient: &str, location: &str| Encounter {
            subject: Some(Reference::to(ResourceType::Patient, patient)),
            location: vec![EncounterLocation {
                location: Reference::to(ResourceType::Location, location),
                period: None,
            }],
            ..Encounter::default()
        };
        let resources = vec![
            encounter("p-1", "l-1"),
            encounter("p-1", "l-2"),
            encounter("p-2", "l-1"),
        ];
        let includes = vec![
            Include::parse("Encounter:subject", false).expect("include"),
            Include::parse("Encounter:location:Location", false).expect("include"),
            Include::parse("Observation:subject", false).expect("include"),
        ];

        let found = IncludeResolver.included_ids(&includes, &resources);
        assert_eq!(
            found.get(&ResourceType::Patient),
            Some(&vec![uuid("p-1"), uuid("p-2")])
        );
        assert_eq!(
            found.get(&ResourceType::Location),
            Some(&vec![uuid("l-1"), uuid("l-2")])
        );
    }

    #[test]
    fn forward_include_honours_target_type() {
        let resources = vec![Encounter {
            subject: Some(Reference::to(ResourceType::Patient, "p-1")),
            ..Encounter::default()
        }];
        let includes = vec![Include::parse("Encounter:subject:Group", false).expect("include")];
        assert!(IncludeResolver.included_ids(&includes, &resources).is_empty());
    }
}
