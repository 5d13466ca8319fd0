//! Core runtime configuration.
//!
//! Configuration is resolved once at startup (from defaults, explicit values or a
//! global-properties YAML document) and then passed into translators and DAOs. Nothing in the
//! core reads environment variables or global properties while translating.

use crate::constants::{
    DEFAULT_BIRTHDATE_ESTIMATION_THRESHOLD_YEARS, DEFAULT_ENCOUNTER_CLASS,
    DEFAULT_SECURITY_ATTRIBUTE_TYPE_NAME, OPENMRS_FHIR_EXT_PERSON_ATTRIBUTE,
};
use crate::{ConfigError, ConfigResult};
use fhir2_types::NonEmptyText;
use serde::Deserialize;

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    security_attribute_type_name: String,
    birthdate_estimation_threshold_years: u32,
    person_attribute_extension_url: String,
    default_encounter_class: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            security_attribute_type_name: DEFAULT_SECURITY_ATTRIBUTE_TYPE_NAME.to_owned(),
            birthdate_estimation_threshold_years: DEFAULT_BIRTHDATE_ESTIMATION_THRESHOLD_YEARS,
            person_attribute_extension_url: OPENMRS_FHIR_EXT_PERSON_ATTRIBUTE.to_owned(),
            default_encounter_class: DEFAULT_ENCOUNTER_CLASS.to_owned(),
        }
    }
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInput`] if a name or URL is blank or the threshold is zero.
    pub fn new(
        security_attribute_type_name: &str,
        birthdate_estimation_threshold_years: u32,
        person_attribute_extension_url: String,
        default_encounter_class: String,
    ) -> ConfigResult<Self> {
        let security_attribute_type_name =
            NonEmptyText::new(security_attribute_type_name).map_err(|_| {
                ConfigError::InvalidInput("security_attribute_type_name cannot be empty".into())
            })?;

        if birthdate_estimation_threshold_years == 0 {
            return Err(ConfigError::InvalidInput(
                "birthdate_estimation_threshold_years must be at least 1".into(),
            ));
        }
        if person_attribute_extension_url.trim().is_empty() {
            return Err(ConfigError::InvalidInput(
                "person_attribute_extension_url cannot be empty".into(),
            ));
        }
        if default_encounter_class.trim().is_empty() {
            return Err(ConfigError::InvalidInput(
                "default_encounter_class cannot be empty".into(),
            ));
        }

        Ok(Self {
            security_attribute_type_name: security_attribute_type_name.into_inner(),
            birthdate_estimation_threshold_years,
            person_attribute_extension_url: person_attribute_extension_url.trim().to_owned(),
            default_encounter_class: default_encounter_class.trim().to_owned(),
        })
    }

    /// Build configuration from a global-properties YAML document.
    ///
    /// Every key is optional; absent keys keep their defaults. Unknown keys are rejected so a
    /// misspelt property does not silently fall back to a default.
    ///
    /// ```yaml
    /// fhir2.security.attributeTypeName: security
    /// fhir2.birthdate.estimationThresholdYears: 5
    /// fhir2.personAttribute.extensionUrl: http://fhir.openmrs.org/ext/person-attribute
    /// fhir2.encounter.defaultClass: AMB
    /// ```
    pub fn from_yaml(yaml_text: &str) -> ConfigResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let wire: GlobalPropertiesWire = serde_path_to_error::deserialize(deserializer)
            .map_err(|err| {
                let path = err.path().to_string();
                let path = if path.is_empty() || path == "." {
                    "<root>".to_owned()
                } else {
                    path
                };
                ConfigError::Schema {
                    path,
                    source: err.into_inner(),
                }
            })?;

        let defaults = Self::default();
        Self::new(
            wire.security_attribute_type_name
                .as_deref()
                .unwrap_or(&defaults.security_attribute_type_name),
            wire.birthdate_estimation_threshold_years
                .unwrap_or(defaults.birthdate_estimation_threshold_years),
            wire.person_attribute_extension_url
                .unwrap_or(defaults.person_attribute_extension_url),
            wire.default_encounter_class
                .unwrap_or(defaults.default_encounter_class),
        )
    }

    /// Attribute type name (compared case-insensitively) that carries security labels.
    pub fn security_attribute_type_name(&self) -> &str {
        &self.security_attribute_type_name
    }

    pub fn birthdate_estimation_threshold_years(&self) -> u32 {
        self.birthdate_estimation_threshold_years
    }

    pub fn person_attribute_extension_url(&self) -> &str {
        &self.person_attribute_extension_url
    }

    pub fn default_encounter_class(&self) -> &str {
        &self.default_encounter_class
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GlobalPropertiesWire {
    #[serde(rename = "fhir2.security.attributeTypeName")]
    security_attribute_type_name: Option<String>,

    #[serde(rename = "fhir2.birthdate.estimationThresholdYears")]
    birthdate_estimation_threshold_years: Option<u32>,

    #[serde(rename = "fhir2.personAttribute.extensionUrl")]
    person_attribute_extension_url: Option<String>,

    #[serde(rename = "fhir2.encounter.defaultClass")]
    default_encounter_class: Option<String>,
}

/// Parse the birth-date estimation threshold from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default threshold.
pub fn threshold_from_env_value(value: Option<String>) -> ConfigResult<u32> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(DEFAULT_BIRTHDATE_ESTIMATION_THRESHOLD_YEARS);
    };

    match value.parse::<u32>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidInput(format!(
            "birthdate estimation threshold must be a positive whole number of years, got '{value}'"
        ))),
        Ok(years) => Ok(years),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_values() {
        let cfg = CoreConfig::default();
        assert_eq!(cfg.security_attribute_type_name(), "security");
        assert_eq!(cfg.birthdate_estimation_threshold_years(), 5);
        assert_eq!(cfg.default_encounter_class(), "AMB");
        assert_eq!(
            cfg.person_attribute_extension_url(),
            OPENMRS_FHIR_EXT_PERSON_ATTRIBUTE
        );
    }

    #[test]
    fn new_rejects_blank_attribute_type_name() {
        let err = CoreConfig::new("   ", 5, "http://x".into(), "AMB".into())
            .expect_err("blank name should be rejected");
        match err {
            ConfigError::InvalidInput(msg) => assert!(msg.contains("security_attribute_type_name")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn new_rejects_zero_threshold() {
        let err = CoreConfig::new("security", 0, "http://x".into(), "AMB".into())
            .expect_err("zero threshold should be rejected");
        assert!(matches!(err, ConfigError::InvalidInput(_)));
    }

    #[test]
    fn from_yaml_overrides_only_present_keys() {
        let yaml = "fhir2.security.attributeTypeName: Confidentiality\n\
                    fhir2.birthdate.estimationThresholdYears: 10\n";
        let cfg = CoreConfig::from_yaml(yaml).expect("valid yaml");
        assert_eq!(cfg.security_attribute_type_name(), "Confidentiality");
        assert_eq!(cfg.birthdate_estimation_threshold_years(), 10);
        assert_eq!(cfg.default_encounter_class(), "AMB");
    }

    #[test]
    fn from_yaml_reports_path_of_bad_value() {
        let yaml = "fhir2.birthdate.estimationThresholdYears: lots\n";
        let err = CoreConfig::from_yaml(yaml).expect_err("non-numeric threshold");
        match err {
            ConfigError::Schema { path, .. } => {
                assert!(path.contains("fhir2.birthdate.estimationThresholdYears"), "{path}")
            }
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn from_yaml_rejects_unknown_keys() {
        let yaml = "fhir2.security.attributeTypeNme: security\n";
        let err = CoreConfig::from_yaml(yaml).expect_err("misspelt key");
        assert!(matches!(err, ConfigError::Schema { .. }));
    }

    #[test]
    fn threshold_from_env_value_defaults_when_missing_or_blank() {
        assert_eq!(threshold_from_env_value(None).expect("default"), 5);
        assert_eq!(threshold_from_env_value(Some("  ".into())).expect("default"), 5);
        assert_eq!(threshold_from_env_value(Some(" 3 ".into())).expect("parsed"), 3);
    }

    #[test]
    fn threshold_from_env_value_rejects_garbage() {
        assert!(threshold_from_env_value(Some("zero".into())).is_err());
        assert!(threshold_from_env_value(Some("0".into())).is_err());
    }
}
