//! `Meta.security` confidentiality labels derived from free-text attributes.
//!
//! Forward: every active attribute whose type name matches the configured keyword
//! (`"security"` by default, case-insensitive) and whose value is not null yields one coding in
//! the HL7 v3 Confidentiality system. A value of the form `prefix:display` contributes only the
//! part after the first colon; the display is trimmed and mapped to a code:
//!
//! | display           | code |
//! |-------------------|------|
//! | `low`             | `L`  |
//! | `moderate`        | `M`  |
//! | `normal`          | `N`  |
//! | `restricted`      | `R`  |
//! | `unrestricted`    | `U`  |
//! | `very restricted` | `V`  |
//!
//! Anything else, including a missing display, maps to `R`.
//!
//! Reverse: codings are turned into a [`SecurityChangeSet`] without touching the entity.
//! Applying the change-set and persisting the entity are separate steps owned by the caller.

use crate::config::CoreConfig;
use crate::constants::{CONFIDENTIALITY_SYSTEM_URI, SECURITY_ATTRIBUTE_VOID_REASON};
use crate::domain::{Attributable, Attribute};
use crate::lookup::{AttributeTypeRegistry, EntitySaver};
use crate::TranslatorResult;
use fhir2_uuid::EntityUuid;
use fhir_r4::Coding;
use std::sync::Arc;

/// Code used for null or unrecognised displays.
pub const DEFAULT_SECURITY_CODE: &str = "R";

const SECURITY_CODES: [(&str, &str); 6] = [
    ("low", "L"),
    ("moderate", "M"),
    ("normal", "N"),
    ("restricted", "R"),
    ("unrestricted", "U"),
    ("very restricted", "V"),
];

/// Display text of a raw attribute value: the part after the first colon, trimmed.
pub fn security_display(raw: &str) -> &str {
    match raw.split_once(':') {
        Some((_, display)) => display.trim(),
        None => raw.trim(),
    }
}

/// Confidentiality code for a display, by exact case-insensitive match.
pub fn derive_security_code(display: Option<&str>) -> &'static str {
    let Some(display) = display else {
        return DEFAULT_SECURITY_CODE;
    };
    let display = display.trim();
    SECURITY_CODES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(display))
        .map_or(DEFAULT_SECURITY_CODE, |(_, code)| code)
}

/// Attribute changes computed from incoming security codings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SecurityChangeSet {
    /// Active attributes to void.
    pub void: Vec<EntityUuid>,
    /// Attributes to add.
    pub add: Vec<Attribute>,
}

impl SecurityChangeSet {
    pub fn is_empty(&self) -> bool {
        self.void.is_empty() && self.add.is_empty()
    }
}

pub struct MetaSecurityTranslator {
    registry: Arc<dyn AttributeTypeRegistry>,
    keyword: String,
}

impl MetaSecurityTranslator {
    pub fn new(config: &CoreConfig, registry: Arc<dyn AttributeTypeRegistry>) -> Self {
        Self {
            registry,
            keyword: config.security_attribute_type_name().to_owned(),
        }
    }

    /// Security codings for the entity's active security attributes, in attribute order.
    pub fn to_fhir<E: Attributable>(&self, entity: &E) -> Vec<Coding> {
        entity
            .active_attributes_of_type(&self.keyword)
            .into_iter()
            .filter_map(|attribute| attribute.value.as_deref())
            .map(|raw| {
                let display = security_display(raw);
                Coding::of(
                    CONFIDENTIALITY_SYSTEM_URI,
                    derive_security_code(Some(display)),
                    display,
                )
            })
            .collect()
    }

    /// Compute the attribute changes needed to reflect `codings` on `entity`.
    ///
    /// Only codings whose display contains the keyword are considered; the last one wins. The
    /// entity ends up with exactly one active security attribute: an existing attribute with
    /// the same display (ignoring case) is kept, every other active one is voided, and a new
    /// attribute holding the trimmed coding display is added when nothing matched.
    pub fn plan_changes<E: Attributable>(&self, entity: &E, codings: &[Coding]) -> SecurityChangeSet {
        let keyword = self.keyword.to_lowercase();
        let Some(incoming) = codings
            .iter()
            .filter_map(|c| c.display.as_deref())
            .map(str::trim)
            .filter(|display| display.to_lowercase().contains(&keyword))
            .last()
        else {
            return SecurityChangeSet::default();
        };

        let Some(attribute_type) = self.registry.find_by_name(E::KIND, &self.keyword) else {
            tracing::warn!(
                kind = %E::KIND,
                attribute_type = %self.keyword,
                "security attribute type not registered; security labels not stored"
            );
            return SecurityChangeSet::default();
        };

        let existing = entity.active_attributes_of_type(&self.keyword);
        let keep = existing.iter().find(|attribute| {
            attribute.value.as_deref().is_some_and(|value| {
                security_display(value).eq_ignore_ascii_case(security_display(incoming))
            })
        });

        let mut changes = SecurityChangeSet {
            void: existing
                .iter()
                .filter(|attribute| keep.map_or(true, |k| k.uuid != attribute.uuid))
                .map(|attribute| attribute.uuid.clone())
                .collect(),
            add: Vec::new(),
        };
        if keep.is_none() {
            changes
                .add
                .push(Attribute::new(attribute_type, Some(incoming.to_owned())));
        }
        changes
    }

    /// Apply a change-set in memory.
    pub fn apply<E: Attributable>(&self, entity: &mut E, changes: SecurityChangeSet) {
        for attribute in entity.attributes_mut().iter_mut() {
            if changes.void.contains(&attribute.uuid) {
                attribute.void(SECURITY_ATTRIBUTE_VOID_REASON);
                tracing::debug!(attribute = %attribute.uuid, "voided security attribute");
            }
        }
        for attribute in changes.add {
            tracing::debug!(
                attribute = %attribute.uuid,
                value = attribute.value.as_deref().unwrap_or_default(),
                "added security attribute"
            );
            entity.add_attribute(attribute);
        }
    }

    /// Apply a change-set and persist the entity. Empty change-sets are not saved.
    pub fn apply_and_persist<E: Attributable>(
        &self,
        entity: &mut E,
        changes: SecurityChangeSet,
        saver: &dyn EntitySaver<E>,
    ) -> TranslatorResult<()> {
        if changes.is_empty() {
            return Ok(());
        }
        self.apply(entity, changes);
        saver.save(entity).map_err(|err| {
            tracing::error!(kind = %E::KIND, error = %err, "failed to save security attributes");
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AttributeType, EntityKind, Visit};
    use crate::test_support::{security_attribute, security_type, RecordingSaver, StaticRegistry};
    use crate::TranslatorError;
    use fhir2_types::NonEmptyText;

    fn translator() -> MetaSecurityTranslator {
        let registry = StaticRegistry::new(EntityKind::Visit, vec![security_type()]);
        MetaSecurityTranslator::new(&CoreConfig::default(), Arc::new(registry))
    }

    fn visit_with(values: &[Option<&str>]) -> Visit {
        Visit {
            attributes: values
                .iter()
                .map(|v| security_attribute(v.map(str::to_owned)))
                .collect(),
            ..Visit::default()
        }
    }

    fn coding(display: &str) -> Coding {
        Coding {
            system: Some(CONFIDENTIALITY_SYSTEM_URI.to_owned()),
            code: Some("R".to_owned()),
            display: Some(display.to_owned()),
        }
    }

    #[test]
    fn derives_codes_from_table_case_insensitively() {
        let cases = [
            ("low", "L"),
            ("Moderate", "M"),
            ("NORMAL", "N"),
            ("restricted", "R"),
            ("Unrestricted", "U"),
            ("very restricted", "V"),
            ("Very Restricted", "V"),
        ];
        for (display, code) in cases {
            assert_eq!(derive_security_code(Some(display)), code, "{display}");
        }
    }

    #[test]
    fn unrecognised_or_missing_display_defaults_to_restricted() {
        assert_eq!(derive_security_code(Some("top secret")), "R");
        assert_eq!(derive_security_code(Some("")), "R");
        assert_eq!(derive_security_code(None), "R");
    }

    #[test]
    fn colon_prefixed_values_use_the_suffix() {
        assert_eq!(security_display("confidentiality:moderate"), "moderate");
        assert_eq!(
            security_display("confidentiality:  very restricted  "),
            "very restricted"
        );
        assert_eq!(security_display("a:b:c"), "b:c");
        assert_eq!(security_display("  low "), "low");
    }

    #[test]
    fn no_attributes_yield_no_security() {
        assert!(translator().to_fhir(&Visit::default()).is_empty());
    }

    #[test]
    fn single_low_attribute_yields_single_coding() {
        let codings = translator().to_fhir(&visit_with(&[Some("low")]));
        assert_eq!(
            codings,
            vec![Coding::of(CONFIDENTIALITY_SYSTEM_URI, "L", "low")]
        );
    }

    #[test]
    fn colon_prefixed_attributes_are_trimmed() {
        let codings = translator().to_fhir(&visit_with(&[
            Some("confidentiality:moderate"),
            Some("confidentiality:  very restricted  "),
        ]));
        assert_eq!(codings.len(), 2);
        assert_eq!(codings[0].code.as_deref(), Some("M"));
        assert_eq!(codings[0].display.as_deref(), Some("moderate"));
        assert_eq!(codings[1].code.as_deref(), Some("V"));
        assert_eq!(codings[1].display.as_deref(), Some("very restricted"));
    }

    #[test]
    fn null_values_are_skipped() {
        let codings = translator().to_fhir(&visit_with(&[None, Some("normal")]));
        assert_eq!(codings.len(), 1);
        assert_eq!(codings[0].code.as_deref(), Some("N"));
    }

    #[test]
    fn voided_attributes_are_excluded() {
        let mut visit = visit_with(&[Some("low")]);
        visit.attributes[0].void("test");
        assert!(translator().to_fhir(&visit).is_empty());
    }

    #[test]
    fn other_attribute_types_are_ignored() {
        let other = AttributeType::new(NonEmptyText::new("insurance").expect("name"));
        let visit = Visit {
            attributes: vec![Attribute::new(other, Some("low".into()))],
            ..Visit::default()
        };
        assert!(translator().to_fhir(&visit).is_empty());
    }

    #[test]
    fn type_name_matches_case_insensitively() {
        let upper = AttributeType::new(NonEmptyText::new("SECURITY").expect("name"));
        let visit = Visit {
            attributes: vec![Attribute::new(upper, Some("low".into()))],
            ..Visit::default()
        };
        assert_eq!(translator().to_fhir(&visit).len(), 1);
    }

    #[test]
    fn plan_ignores_codings_without_keyword() {
        let visit = Visit::default();
        let changes = translator().plan_changes(&visit, &[coding("restricted")]);
        assert!(changes.is_empty());
        let changes = translator().plan_changes(&visit, &[]);
        assert!(changes.is_empty());
    }

    #[test]
    fn plan_adds_attribute_when_none_exists() {
        let visit = Visit::default();
        let changes = translator().plan_changes(&visit, &[coding("  security:low ")]);
        assert!(changes.void.is_empty());
        assert_eq!(changes.add.len(), 1);
        assert_eq!(changes.add[0].value.as_deref(), Some("security:low"));
        assert_eq!(changes.add[0].attribute_type.name.as_str(), "security");
    }

    #[test]
    fn plan_is_noop_when_display_unchanged() {
        let visit = visit_with(&[Some("confidentiality:Low")]);
        let changes = translator().plan_changes(&visit, &[coding("security:low")]);
        assert!(changes.is_empty());
    }

    #[test]
    fn plan_voids_and_replaces_when_display_differs() {
        let visit = visit_with(&[Some("security:low")]);
        let existing = visit.attributes[0].uuid.clone();

        let changes = translator().plan_changes(&visit, &[coding("security:very restricted")]);
        assert_eq!(changes.void, vec![existing]);
        assert_eq!(changes.add.len(), 1);
        assert_eq!(changes.add[0].value.as_deref(), Some("security:very restricted"));
    }

    #[test]
    fn plan_uses_last_qualifying_coding() {
        let visit = Visit::default();
        let changes = translator().plan_changes(
            &visit,
            &[coding("security:low"), coding("other"), coding("security:normal")],
        );
        assert_eq!(changes.add.len(), 1);
        assert_eq!(changes.add[0].value.as_deref(), Some("security:normal"));
    }

    #[test]
    fn plan_collapses_duplicate_active_attributes() {
        let visit = visit_with(&[Some("security:low"), Some("security:normal")]);
        let changes = translator().plan_changes(&visit, &[coding("security:normal")]);
        assert_eq!(changes.void, vec![visit.attributes[0].uuid.clone()]);
        assert!(changes.add.is_empty());
    }

    #[test]
    fn plan_skips_when_attribute_type_is_unregistered() {
        let registry = StaticRegistry::new(EntityKind::Visit, Vec::new());
        let t = MetaSecurityTranslator::new(&CoreConfig::default(), Arc::new(registry));
        let changes = t.plan_changes(&Visit::default(), &[coding("security:low")]);
        assert!(changes.is_empty());
    }

    #[test]
    fn apply_leaves_one_active_attribute() {
        let t = translator();
        let mut visit = visit_with(&[Some("security:low")]);
        let changes = t.plan_changes(&visit, &[coding("security:moderate")]);
        t.apply(&mut visit, changes);

        assert_eq!(visit.attributes.len(), 2);
        assert!(visit.attributes[0].voided);
        assert_eq!(
            visit.attributes[0].void_reason.as_deref(),
            Some(SECURITY_ATTRIBUTE_VOID_REASON)
        );

        let codings = t.to_fhir(&visit);
        assert_eq!(codings, vec![Coding::of(CONFIDENTIALITY_SYSTEM_URI, "M", "moderate")]);
    }

    #[test]
    fn apply_and_persist_saves_once() {
        let t = translator();
        let saver = RecordingSaver::<Visit>::default();
        let mut visit = Visit::default();

        let changes = t.plan_changes(&visit, &[coding("security:low")]);
        t.apply_and_persist(&mut visit, changes, &saver)
            .expect("saved");
        assert_eq!(saver.saved().len(), 1);

        t.apply_and_persist(&mut visit, SecurityChangeSet::default(), &saver)
            .expect("nothing to save");
        assert_eq!(saver.saved().len(), 1);
    }

    #[test]
    fn apply_and_persist_propagates_save_failure() {
        let t = translator();
        let saver = RecordingSaver::<Visit>::failing("database unavailable");
        let mut visit = Visit::default();

        let changes = t.plan_changes(&visit, &[coding("security:low")]);
        let err = t
            .apply_and_persist(&mut visit, changes, &saver)
            .expect_err("save fails");
        match err {
            TranslatorError::Persistence { reason, .. } => {
                assert!(reason.contains("database unavailable"))
            }
            other => panic!("expected Persistence error, got {other:?}"),
        }
    }
}
