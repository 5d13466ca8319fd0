//! Reusable search handlers shared by the DAOs.
//!
//! Each handler turns one parameter into predicates on a [`CriteriaQuery`], joining related
//! entities through path-derived aliases so that independent handlers never collide and
//! repeated references to the same relation reuse one join.

use crate::search::criteria::{Comparison, CriteriaQuery, Criterion, MatchMode, Value};
use crate::search::params::{
    DateParam, DateRangeParam, ParamPrefix, ReferenceAndListParam, ReferenceParam,
    StringAndListParam, StringParam, TokenAndListParam,
};
use crate::translators::GenderTranslator;
use fhir_r4::AdministrativeGender;

/// Combines AND-of-OR groups into a single criterion.
fn and_of_ors<T>(
    groups: &[Vec<T>],
    mut to_criterion: impl FnMut(&T) -> Option<Criterion>,
) -> Option<Criterion> {
    Criterion::all(
        groups
            .iter()
            .filter_map(|group| Criterion::any(group.iter().filter_map(&mut to_criterion).collect()))
            .collect(),
    )
}

fn property(alias: &str, name: &str) -> String {
    format!("{alias}.{name}")
}

// ============================================================================
// References
// ============================================================================

/// Patient reference search through the relationship at `path` (e.g. `patient`, `subject`).
///
/// Supported chains: none or `_id` (uuid), `identifier`, `given`, `family`, `name`.
/// Unsupported chains are ignored.
pub fn handle_patient_reference(query: &mut CriteriaQuery, path: &str, param: &ReferenceAndListParam) {
    let criterion = and_of_ors(param.groups(), |reference| {
        patient_reference_criterion(query, path, reference)
    });
    if let Some(criterion) = criterion {
        query.add(criterion);
    }
}

fn patient_reference_criterion(
    query: &mut CriteriaQuery,
    path: &str,
    reference: &ReferenceParam,
) -> Option<Criterion> {
    let patient = query.join_path(path);
    match reference.effective_chain() {
        None => Some(Criterion::eq(property(&patient, "uuid"), reference.value.as_str())),
        Some("identifier") => {
            let identifiers = query.join_path(&format!("{patient}.identifiers"));
            Some(Criterion::eq(
                property(&identifiers, "identifier"),
                reference.value.as_str(),
            ))
        }
        Some("given") => {
            let names = query.join_path(&format!("{patient}.names"));
            Some(Criterion::like(
                property(&names, "givenName"),
                reference.value.as_str(),
                MatchMode::Start,
            ))
        }
        Some("family") => {
            let names = query.join_path(&format!("{patient}.names"));
            Some(Criterion::like(
                property(&names, "familyName"),
                reference.value.as_str(),
                MatchMode::Start,
            ))
        }
        Some("name") => {
            let names = query.join_path(&format!("{patient}.names"));
            Criterion::any(
                ["givenName", "middleName", "familyName"]
                    .iter()
                    .map(|part| {
                        Criterion::like(
                            property(&names, part),
                            reference.value.as_str(),
                            MatchMode::Start,
                        )
                    })
                    .collect(),
            )
        }
        Some(other) => {
            tracing::debug!(chain = other, "unsupported patient reference chain ignored");
            None
        }
    }
}

/// Encounter reference search by uuid through `path`.
pub fn handle_encounter_reference(query: &mut CriteriaQuery, path: &str, param: &ReferenceAndListParam) {
    handle_id_reference(query, path, param, "encounter");
}

/// Observation reference search by uuid through `path` (e.g. a report's `results`).
pub fn handle_observation_reference(query: &mut CriteriaQuery, path: &str, param: &ReferenceAndListParam) {
    handle_id_reference(query, path, param, "observation");
}

/// Location reference search through `path`. Chains: none (uuid) and `name`.
pub fn handle_location_reference(query: &mut CriteriaQuery, path: &str, param: &ReferenceAndListParam) {
    let criterion = and_of_ors(param.groups(), |reference| {
        let location = query.join_path(path);
        match reference.effective_chain() {
            None => Some(Criterion::eq(property(&location, "uuid"), reference.value.as_str())),
            Some("name") => Some(Criterion::like(
                property(&location, "name"),
                reference.value.as_str(),
                MatchMode::Start,
            )),
            Some(other) => {
                tracing::debug!(chain = other, "unsupported location reference chain ignored");
                None
            }
        }
    });
    if let Some(criterion) = criterion {
        query.add(criterion);
    }
}

fn handle_id_reference(
    query: &mut CriteriaQuery,
    path: &str,
    param: &ReferenceAndListParam,
    kind: &str,
) {
    let criterion = and_of_ors(param.groups(), |reference| match reference.effective_chain() {
        None => {
            let alias = query.join_path(path);
            Some(Criterion::eq(property(&alias, "uuid"), reference.value.as_str()))
        }
        Some(other) => {
            tracing::debug!(kind, chain = other, "unsupported reference chain ignored");
            None
        }
    });
    if let Some(criterion) = criterion {
        query.add(criterion);
    }
}

/// Medication request reference search through `path` (usually `drugOrder`).
///
/// Without a chain the request uuid is matched. A `patient` chain filters by the request's own
/// patient: `patient` alone matches the patient uuid and `patient.<chain>` delegates to the
/// patient handler (so `patient.identifier`, `patient.name`, ... work too), scoped to the
/// `{path}.patient` join.
pub fn handle_medication_request_reference(
    query: &mut CriteriaQuery,
    path: &str,
    param: &ReferenceAndListParam,
) {
    let criterion = and_of_ors(param.groups(), |reference| {
        match reference.effective_chain() {
            None => {
                let request = query.join_path(path);
                Some(Criterion::eq(property(&request, "uuid"), reference.value.as_str()))
            }
            Some(chain) if chain == "patient" || chain.starts_with("patient.") => {
                let request = query.join_path(path);
                let patient_path = format!("{request}.patient");
                let nested = ReferenceParam {
                    resource_type: None,
                    chain: chain.strip_prefix("patient.").map(str::to_owned),
                    value: reference.value.clone(),
                };
                patient_reference_criterion(query, &patient_path, &nested)
            }
            Some(other) => {
                tracing::debug!(chain = other, "unsupported medication request chain ignored");
                None
            }
        }
    });
    if let Some(criterion) = criterion {
        query.add(criterion);
    }
}

// ============================================================================
// Tokens and strings
// ============================================================================

/// Coded concept search through `path` (e.g. `code`, `concept`).
///
/// A token without a system matches the concept uuid; with a system it matches the concept's
/// reference-term mappings.
pub fn handle_coded_concept(query: &mut CriteriaQuery, path: &str, param: &TokenAndListParam) {
    let criterion = and_of_ors(param.groups(), |token| {
        let concept = query.join_path(path);
        match token.system.as_deref() {
            None => Some(Criterion::eq(property(&concept, "uuid"), token.value.as_str())),
            Some(system) => {
                let mappings = query.join_path(&format!("{concept}.conceptMappings"));
                Criterion::all(vec![
                    Criterion::eq(property(&mappings, "system"), system),
                    Criterion::eq(property(&mappings, "code"), token.value.as_str()),
                ])
            }
        }
    });
    if let Some(criterion) = criterion {
        query.add(criterion);
    }
}

/// Token values matched against a single property.
pub fn handle_token(property_name: &str, param: &TokenAndListParam) -> Option<Criterion> {
    Criterion::all(
        param
            .groups()
            .iter()
            .filter(|group| !group.is_empty())
            .map(|group| {
                Criterion::is_in(
                    property_name,
                    group.iter().map(|t| Value::from(t.value.as_str())).collect(),
                )
            })
            .collect(),
    )
}

/// Gender tokens (`male`, `female`, ...) against an OpenMRS gender code property.
pub fn handle_gender(property_name: &str, param: &TokenAndListParam) -> Option<Criterion> {
    let genders = GenderTranslator;
    and_of_ors(param.groups(), |token| {
        let gender = match token.value.trim().to_ascii_lowercase().as_str() {
            "male" => AdministrativeGender::Male,
            "female" => AdministrativeGender::Female,
            "other" => AdministrativeGender::Other,
            "unknown" => AdministrativeGender::Unknown,
            "null" => return Some(Criterion::IsNull(property_name.to_owned())),
            other => {
                tracing::debug!(gender = other, "unrecognised gender token ignored");
                return None;
            }
        };
        genders
            .to_domain(Some(gender))
            .map(|code| Criterion::eq(property_name, code))
    })
}

/// String search on one property: prefix match by default, `:exact` and `:contains` honoured.
pub fn handle_string(property_name: &str, param: &StringAndListParam) -> Option<Criterion> {
    and_of_ors(param.groups(), |value| Some(string_criterion(property_name, value)))
}

/// String search where each value may match any of `properties` (every part of a name).
pub fn handle_string_any_of(properties: &[String], param: &StringAndListParam) -> Option<Criterion> {
    and_of_ors(param.groups(), |value| {
        Criterion::any(
            properties
                .iter()
                .map(|property| string_criterion(property, value))
                .collect(),
        )
    })
}

fn string_criterion(property_name: &str, value: &StringParam) -> Criterion {
    if value.exact {
        Criterion::eq(property_name, value.value.as_str())
    } else if value.contains {
        Criterion::like(property_name, value.value.as_str(), MatchMode::Anywhere)
    } else {
        Criterion::like(property_name, value.value.as_str(), MatchMode::Start)
    }
}

// ============================================================================
// Dates
// ============================================================================

/// A single date parameter against `property_name`, honouring its prefix and precision.
///
/// With window `[lower, upper)` implied by the precision:
/// `eq`/`ap` match inside the window, `ne` outside it, `gt`/`sa` at or after `upper`,
/// `ge` at or after `lower`, `lt`/`eb` before `lower`, `le` before `upper`.
pub fn handle_date(property_name: &str, param: &DateParam) -> Option<Criterion> {
    let (lower, upper) = param.bounds();
    let exact = lower == upper;
    let at_or_after = |bound| Criterion::compare(property_name, Comparison::Ge, Value::DateTime(bound));
    let before = |bound| Criterion::compare(property_name, Comparison::Lt, Value::DateTime(bound));

    let criterion = match param.prefix {
        ParamPrefix::Eq | ParamPrefix::Approximate if exact => {
            Criterion::eq(property_name, Value::DateTime(lower))
        }
        ParamPrefix::Eq | ParamPrefix::Approximate => Criterion::And(vec![at_or_after(lower), before(upper)]),
        ParamPrefix::Ne if exact => {
            Criterion::compare(property_name, Comparison::Ne, Value::DateTime(lower))
        }
        ParamPrefix::Ne => Criterion::Or(vec![before(lower), at_or_after(upper)]),
        ParamPrefix::Gt | ParamPrefix::StartsAfter if exact => {
            Criterion::compare(property_name, Comparison::Gt, Value::DateTime(upper))
        }
        ParamPrefix::Gt | ParamPrefix::StartsAfter => at_or_after(upper),
        ParamPrefix::Ge => at_or_after(lower),
        ParamPrefix::Lt | ParamPrefix::EndsBefore => before(lower),
        ParamPrefix::Le if exact => {
            Criterion::compare(property_name, Comparison::Le, Value::DateTime(upper))
        }
        ParamPrefix::Le => before(upper),
    };
    Some(criterion)
}

/// Both bounds of a date range against `property_name`.
pub fn handle_date_range(property_name: &str, param: &DateRangeParam) -> Option<Criterion> {
    Criterion::all(
        [param.lower.as_ref(), param.upper.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(|date| handle_date(property_name, date))
            .collect(),
    )
}

/// `_lastUpdated` for entities that are edited in place: `dateChanged` when set, else
/// `dateCreated`.
pub fn handle_last_updated_mutable(param: &DateRangeParam) -> Option<Criterion> {
    let changed = handle_date_range("dateChanged", param)?;
    let created = handle_date_range("dateCreated", param)?;
    Some(Criterion::Or(vec![
        changed,
        Criterion::And(vec![Criterion::IsNull("dateChanged".to_owned()), created]),
    ]))
}

/// `_lastUpdated` for entities that are never edited: `dateCreated` only.
pub fn handle_last_updated_immutable(param: &DateRangeParam) -> Option<Criterion> {
    handle_date_range("dateCreated", param)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::params::{StringParam, TokenParam};
    use chrono::{DateTime, TimeZone, Utc};

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn patient_id_reference_joins_patient_once() {
        let mut query = CriteriaQuery::new("MedicationDispense");
        let param = ReferenceAndListParam::new()
            .and(vec![ReferenceParam::id("p1"), ReferenceParam::id("p2")])
            .and(vec![ReferenceParam::chained("identifier", "1000X")]);
        handle_patient_reference(&mut query, "patient", &param);

        let aliases: Vec<_> = query.joins().map(|j| j.alias.as_str()).collect();
        assert_eq!(aliases, vec!["patient", "patient_identifiers"]);
        assert_eq!(
            query.predicates(),
            &[Criterion::And(vec![
                Criterion::Or(vec![
                    Criterion::eq("patient.uuid", "p1"),
                    Criterion::eq("patient.uuid", "p2"),
                ]),
                Criterion::eq("patient_identifiers.identifier", "1000X"),
            ])]
        );
    }

    #[test]
    fn patient_name_chain_matches_any_name_part() {
        let mut query = CriteriaQuery::new("Visit");
        handle_patient_reference(
            &mut query,
            "patient",
            &ReferenceAndListParam::single(ReferenceParam::chained("name", "Sm")),
        );
        match &query.predicates()[0] {
            Criterion::Or(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected OR of name parts, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_chain_adds_nothing() {
        let mut query = CriteriaQuery::new("Visit");
        handle_patient_reference(
            &mut query,
            "patient",
            &ReferenceAndListParam::single(ReferenceParam::chained("birthdate", "2000")),
        );
        assert!(query.predicates().is_empty());
    }

    #[test]
    fn chained_medication_request_patient_uses_scoped_alias() {
        let mut query = CriteriaQuery::new("MedicationDispense");
        handle_patient_reference(
            &mut query,
            "patient",
            &ReferenceAndListParam::single(ReferenceParam::id("direct")),
        );
        handle_medication_request_reference(
            &mut query,
            "drugOrder",
            &ReferenceAndListParam::single(ReferenceParam::chained("patient", "via-order")),
        );

        let aliases: Vec<_> = query.joins().map(|j| j.alias.as_str()).collect();
        assert_eq!(aliases, vec!["patient", "drugOrder", "drugOrder_patient"]);
        assert_eq!(
            query.predicates()[1],
            Criterion::eq("drugOrder_patient.uuid", "via-order")
        );
    }

    #[test]
    fn nested_medication_request_patient_chain_delegates() {
        let mut query = CriteriaQuery::new("MedicationDispense");
        handle_medication_request_reference(
            &mut query,
            "drugOrder",
            &ReferenceAndListParam::single(ReferenceParam::chained("patient.identifier", "1000X")),
        );
        assert_eq!(
            query.predicates(),
            &[Criterion::eq("drugOrder_patient_identifiers.identifier", "1000X")]
        );
    }

    #[test]
    fn coded_concept_with_system_joins_mappings() {
        let mut query = CriteriaQuery::new("FhirDiagnosticReport");
        handle_coded_concept(
            &mut query,
            "code",
            &TokenAndListParam::single(TokenParam::system_code("http://loinc.org", "1234-5")),
        );
        assert!(query.has_alias("code_conceptMappings"));
        assert_eq!(
            query.predicates(),
            &[Criterion::And(vec![
                Criterion::eq("code_conceptMappings.system", "http://loinc.org"),
                Criterion::eq("code_conceptMappings.code", "1234-5"),
            ])]
        );
    }

    #[test]
    fn string_modifiers_select_match_mode() {
        let param = StringAndListParam::new().and(vec![
            StringParam::new("Jo"),
            StringParam::exact("John"),
            StringParam::contains("oh"),
        ]);
        let criterion = handle_string("givenName", &param).expect("criterion");
        assert_eq!(
            criterion,
            Criterion::Or(vec![
                Criterion::like("givenName", "Jo", MatchMode::Start),
                Criterion::eq("givenName", "John"),
                Criterion::like("givenName", "oh", MatchMode::Anywhere),
            ])
        );
    }

    #[test]
    fn any_of_matches_value_against_every_property() {
        let properties = vec!["n.givenName".to_owned(), "n.familyName".to_owned()];
        let criterion =
            handle_string_any_of(&properties, &StringAndListParam::single(StringParam::new("Sm")))
                .expect("criterion");
        assert_eq!(
            criterion,
            Criterion::Or(vec![
                Criterion::like("n.givenName", "Sm", MatchMode::Start),
                Criterion::like("n.familyName", "Sm", MatchMode::Start),
            ])
        );
    }

    #[test]
    fn gender_tokens_map_to_openmrs_codes() {
        let param = TokenAndListParam::new().and(vec![
            TokenParam::code("female"),
            TokenParam::code("bogus"),
        ]);
        assert_eq!(
            handle_gender("gender", &param),
            Some(Criterion::eq("gender", "F"))
        );
    }

    #[test]
    fn date_prefixes_select_window_edges() {
        let month = DateParam::parse("2020-03").expect("valid");
        assert_eq!(
            handle_date("issued", &month),
            Some(Criterion::And(vec![
                Criterion::compare("issued", Comparison::Ge, utc(2020, 3, 1)),
                Criterion::compare("issued", Comparison::Lt, utc(2020, 4, 1)),
            ]))
        );

        let ge = DateParam::parse("ge2020-03").expect("valid");
        assert_eq!(
            handle_date("issued", &ge),
            Some(Criterion::compare("issued", Comparison::Ge, utc(2020, 3, 1)))
        );

        let gt = DateParam::parse("gt2020-03").expect("valid");
        assert_eq!(
            handle_date("issued", &gt),
            Some(Criterion::compare("issued", Comparison::Ge, utc(2020, 4, 1)))
        );

        let lt = DateParam::parse("lt2020-03").expect("valid");
        assert_eq!(
            handle_date("issued", &lt),
            Some(Criterion::compare("issued", Comparison::Lt, utc(2020, 3, 1)))
        );
    }

    #[test]
    fn mutable_last_updated_falls_back_to_creation_date() {
        let range = DateRangeParam::single(DateParam::parse("ge2021-01-01").expect("valid"));
        let criterion = handle_last_updated_mutable(&range).expect("criterion");
        assert_eq!(
            criterion,
            Criterion::Or(vec![
                Criterion::compare("dateChanged", Comparison::Ge, utc(2021, 1, 1)),
                Criterion::And(vec![
                    Criterion::IsNull("dateChanged".into()),
                    Criterion::compare("dateCreated", Comparison::Ge, utc(2021, 1, 1)),
                ]),
            ])
        );
        assert_eq!(
            handle_last_updated_immutable(&range),
            Some(Criterion::compare("dateCreated", Comparison::Ge, utc(2021, 1, 1)))
        );
    }

    #[test]
    fn empty_date_range_adds_nothing() {
        assert_eq!(handle_date_range("issued", &DateRangeParam::default()), None);
        assert_eq!(handle_last_updated_mutable(&DateRangeParam::default()), None);
    }
}
