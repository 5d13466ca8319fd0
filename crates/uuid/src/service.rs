//! Internal implementation of [`EntityUuid`].

use crate::{UuidError, UuidResult};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Maximum stored length of an entity identifier.
pub const MAX_UUID_LENGTH: usize = 38;

/// Stable opaque identifier of a domain entity.
///
/// Once constructed the value is known to be safe to embed in a FHIR reference string.
/// The identifier never changes for the lifetime of the entity and is the join key between
/// a domain entity and the FHIR resource produced from it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityUuid(String);

impl Default for EntityUuid {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityUuid {
    /// Generates a new random identifier (hyphenated lowercase v4 UUID).
    pub fn new() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Validates an externally supplied identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is blank, padded with whitespace, longer
    /// than [`MAX_UUID_LENGTH`] or contains a reference delimiter.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if input.is_empty() {
            return Err(UuidError::InvalidInput("identifier cannot be empty".into()));
        }
        if input.trim() != input {
            return Err(UuidError::InvalidInput(format!(
                "identifier must not have surrounding whitespace: '{input}'"
            )));
        }
        if input.chars().count() > MAX_UUID_LENGTH {
            return Err(UuidError::InvalidInput(format!(
                "identifier longer than {MAX_UUID_LENGTH} characters: '{input}'"
            )));
        }
        if input.contains(['/', '?', '#']) || input.chars().any(char::is_whitespace) {
            return Err(UuidError::InvalidInput(format!(
                "identifier contains a reserved character: '{input}'"
            )));
        }
        Ok(Self(input.to_owned()))
    }

    /// Returns the identifier as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the value as an RFC 4122 UUID when it is one.
    pub fn as_rfc4122(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.0).ok()
    }
}

impl fmt::Display for EntityUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityUuid {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityUuid::parse(s)
    }
}

impl AsRef<str> for EntityUuid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Uuid> for EntityUuid {
    fn from(value: Uuid) -> Self {
        Self(value.hyphenated().to_string())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for EntityUuid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for EntityUuid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EntityUuid::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_hyphenated_v4() {
        let id = EntityUuid::new();
        assert_eq!(id.as_str().len(), 36);
        let parsed = id.as_rfc4122().expect("generated id is a uuid");
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn parse_accepts_legacy_tokens() {
        let id = EntityUuid::parse("123456-abcdef-123456").expect("legacy token");
        assert_eq!(id.to_string(), "123456-abcdef-123456");
        assert!(id.as_rfc4122().is_none());
    }

    #[test]
    fn parse_rejects_reference_delimiters() {
        match EntityUuid::parse("Patient/123") {
            Err(UuidError::InvalidInput(msg)) => assert!(msg.contains("reserved")),
            other => panic!("expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_blank_padded_and_long_values() {
        assert!(EntityUuid::parse("").is_err());
        assert!(EntityUuid::parse(" abc").is_err());
        assert!(EntityUuid::parse(&"a".repeat(MAX_UUID_LENGTH + 1)).is_err());
        assert!(EntityUuid::parse(&"a".repeat(MAX_UUID_LENGTH)).is_ok());
    }

    #[test]
    fn serde_round_trips_as_plain_string() {
        let id = EntityUuid::parse("da7f524f-27ce-4bb2-86d6-6d1d05312bd5").expect("valid");
        let json = serde_json::to_string(&id).expect("serialise");
        assert_eq!(json, "\"da7f524f-27ce-4bb2-86d6-6d1d05312bd5\"");
        let back: EntityUuid = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, id);
    }
}
