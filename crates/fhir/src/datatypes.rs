//! FHIR R4 general-purpose data types.

use crate::FhirError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Coding / CodeableConcept
// ============================================================================

/// A (system, code, display) triple.
///
/// Every member is optional: a locally scoped coding has no system and uses an entity uuid as
/// its code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Coding {
    /// Builds a fully populated coding.
    pub fn of(system: &str, code: &str, display: &str) -> Self {
        Self {
            system: Some(system.to_owned()),
            code: Some(code.to_owned()),
            display: Some(display.to_owned()),
        }
    }

    /// True when the coding's system equals `system`.
    pub fn is_system(&self, system: &str) -> bool {
        self.system.as_deref() == Some(system)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    pub fn from_coding(coding: Coding) -> Self {
        Self {
            text: coding.display.clone(),
            coding: vec![coding],
        }
    }

    /// First coding in the given system, if any.
    pub fn coding_for_system(&self, system: &str) -> Option<&Coding> {
        self.coding.iter().find(|c| c.is_system(system))
    }
}

// ============================================================================
// Meta
// ============================================================================

/// Resource metadata: version, last update, tags and security labels.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<Coding>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<Coding>,
}

impl Meta {
    pub fn add_tag(&mut self, system: &str, code: &str, display: &str) {
        self.tag.push(Coding::of(system, code, display));
    }

    pub fn is_empty(&self) -> bool {
        self.version_id.is_none()
            && self.last_updated.is_none()
            && self.security.is_empty()
            && self.tag.is_empty()
    }
}

// ============================================================================
// Period
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl Period {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

// ============================================================================
// FhirDate
// ============================================================================

/// Precision of a partial date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemporalPrecision {
    Year,
    Month,
    Day,
}

/// A FHIR `date`: a calendar date carrying an explicit precision.
///
/// The stored `value` is always a full date; with `Year` or `Month` precision only the leading
/// components are significant and rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FhirDate {
    value: NaiveDate,
    precision: TemporalPrecision,
}

impl FhirDate {
    pub fn new(value: NaiveDate, precision: TemporalPrecision) -> Self {
        Self { value, precision }
    }

    pub fn day(value: NaiveDate) -> Self {
        Self::new(value, TemporalPrecision::Day)
    }

    pub fn value(&self) -> NaiveDate {
        self.value
    }

    pub fn precision(&self) -> TemporalPrecision {
        self.precision
    }

    pub fn year(&self) -> i32 {
        self.value.year()
    }

    /// Month (1-12) when the precision includes it.
    pub fn month(&self) -> Option<u32> {
        (self.precision >= TemporalPrecision::Month).then(|| self.value.month())
    }
}

impl fmt::Display for FhirDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            TemporalPrecision::Year => write!(f, "{:04}", self.value.year()),
            TemporalPrecision::Month => {
                write!(f, "{:04}-{:02}", self.value.year(), self.value.month())
            }
            TemporalPrecision::Day => write!(f, "{}", self.value.format("%Y-%m-%d")),
        }
    }
}

impl FromStr for FhirDate {
    type Err = FhirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FhirError::InvalidInput(format!("invalid FHIR date: '{s}'"));
        let parts: Vec<&str> = s.split('-').collect();
        let number = |p: &str| p.parse::<u32>().map_err(|_| invalid());

        let (year, month, day, precision) = match parts.as_slice() {
            [y] if y.len() == 4 => (number(y)?, 1, 1, TemporalPrecision::Year),
            [y, m] if y.len() == 4 && m.len() == 2 => {
                (number(y)?, number(m)?, 1, TemporalPrecision::Month)
            }
            [y, m, d] if y.len() == 4 && m.len() == 2 && d.len() == 2 => {
                (number(y)?, number(m)?, number(d)?, TemporalPrecision::Day)
            }
            _ => return Err(invalid()),
        };

        let value = NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(invalid)?;
        Ok(Self { value, precision })
    }
}

impl Serialize for FhirDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FhirDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Identifier / HumanName / Address
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierUse {
    Usual,
    Official,
    Temp,
    Secondary,
    Old,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    /// Element id; mirrors the uuid of the domain identifier row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<IdentifierUse>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameUse {
    Usual,
    Official,
    Temp,
    Nickname,
    Anonymous,
    Old,
    Maiden,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<NameUse>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl HumanName {
    /// "Given Middle Family", skipping absent parts.
    pub fn name_as_single_string(&self) -> String {
        self.given
            .iter()
            .map(String::as_str)
            .chain(self.family.as_deref())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

// ============================================================================
// Extension
// ============================================================================

/// The value[x] choice of an extension, restricted to the types this layer emits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtensionValue {
    #[serde(rename = "valueString")]
    String(String),
    #[serde(rename = "valueBoolean")]
    Boolean(bool),
    #[serde(rename = "valueCode")]
    Code(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    pub url: String,

    #[serde(flatten)]
    pub value: Option<ExtensionValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<Extension>,
}

impl Extension {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            value: None,
            extension: Vec::new(),
        }
    }

    pub fn with_value(url: impl Into<String>, value: ExtensionValue) -> Self {
        Self {
            url: url.into(),
            value: Some(value),
            extension: Vec::new(),
        }
    }

    /// First nested extension with the given url.
    pub fn child(&self, url: &str) -> Option<&Extension> {
        self.extension.iter().find(|e| e.url == url)
    }

    pub fn string_value(&self) -> Option<&str> {
        match &self.value {
            Some(ExtensionValue::String(s)) | Some(ExtensionValue::Code(s)) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fhir_date_renders_only_significant_components() {
        let date = NaiveDate::from_ymd_opt(2000, 8, 12).expect("valid date");
        assert_eq!(FhirDate::new(date, TemporalPrecision::Year).to_string(), "2000");
        assert_eq!(FhirDate::new(date, TemporalPrecision::Month).to_string(), "2000-08");
        assert_eq!(FhirDate::day(date).to_string(), "2000-08-12");
    }

    #[test]
    fn fhir_date_parses_partial_dates() {
        let year: FhirDate = "1992".parse().expect("year");
        assert_eq!(year.precision(), TemporalPrecision::Year);
        assert_eq!(year.month(), None);

        let month: FhirDate = "1992-03".parse().expect("month");
        assert_eq!(month.precision(), TemporalPrecision::Month);
        assert_eq!(month.month(), Some(3));

        let day: FhirDate = "1992-03-20".parse().expect("day");
        assert_eq!(day.value(), NaiveDate::from_ymd_opt(1992, 3, 20).expect("valid"));
    }

    #[test]
    fn fhir_date_rejects_malformed_input() {
        for bad in ["92", "1992-3", "1992-02-30", "1992-03-20T00:00", ""] {
            assert!(bad.parse::<FhirDate>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn meta_serialises_security_and_skips_empty_parts() {
        let meta = Meta {
            security: vec![Coding::of(
                "http://terminology.hl7.org/CodeSystem/v3-Confidentiality",
                "L",
                "low",
            )],
            ..Meta::default()
        };
        let json = serde_json::to_value(&meta).expect("serialise meta");
        assert_eq!(json["security"][0]["code"], "L");
        assert!(json.get("tag").is_none());
        assert!(json.get("versionId").is_none());
    }

    #[test]
    fn extension_value_is_flattened() {
        let ext = Extension::with_value("http://example.org/ext", ExtensionValue::String("x".into()));
        let json = serde_json::to_value(&ext).expect("serialise extension");
        assert_eq!(json["valueString"], "x");
        assert_eq!(ext.string_value(), Some("x"));
    }

    #[test]
    fn human_name_joins_given_and_family() {
        let name = HumanName {
            family: Some("van Damme".into()),
            given: vec!["Jean".into(), "Claude".into()],
            ..HumanName::default()
        };
        assert_eq!(name.name_as_single_string(), "Jean Claude van Damme");
    }
}
