//! FHIR `Reference` and reference-string parsing.
//!
//! A literal reference has the shape `[base/]Type/id[/_history/version]`. The resource type is
//! taken from the explicit `type` element when present, otherwise from the segment before the
//! id. A reference with a type but an empty id segment (`"Patient/"`) has no id part.

use crate::{Identifier, ResourceType};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Reference {
    /// Canonical relative reference `Type/id` with the type element populated.
    pub fn to(resource_type: ResourceType, id: &str) -> Self {
        Self {
            reference: Some(format!("{}/{}", resource_type.as_str(), id)),
            type_: Some(resource_type.as_str().to_owned()),
            identifier: None,
            display: None,
        }
    }

    pub fn with_display(mut self, display: Option<String>) -> Self {
        self.display = display;
        self
    }

    /// True when a literal reference string is present and non-blank.
    pub fn has_reference(&self) -> bool {
        self.reference
            .as_deref()
            .is_some_and(|r| !r.trim().is_empty())
    }

    /// Resource type named by this reference, if one can be determined.
    pub fn reference_type(&self) -> Option<&str> {
        if let Some(t) = self.type_.as_deref().filter(|t| !t.is_empty()) {
            return Some(t);
        }
        let segments = self.segments();
        match segments.len() {
            0 | 1 => None,
            n => Some(segments[n - 2]).filter(|s| !s.is_empty()),
        }
    }

    /// Logical id part of the literal reference, if any.
    pub fn reference_id(&self) -> Option<&str> {
        self.segments()
            .last()
            .copied()
            .filter(|s| !s.is_empty())
    }

    /// Path segments with any query, fragment and `_history` suffix removed.
    fn segments(&self) -> Vec<&str> {
        let Some(raw) = self.reference.as_deref() else {
            return Vec::new();
        };
        let raw = raw.trim();
        let path = raw.split(['?', '#']).next().unwrap_or_default();
        let mut segments: Vec<&str> = path.split('/').collect();
        if let Some(pos) = segments.iter().position(|s| *s == "_history") {
            segments.truncate(pos);
        }
        segments
    }
}
