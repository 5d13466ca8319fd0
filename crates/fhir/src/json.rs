//! Strict JSON parse/render helpers for resources.
//!
//! Parsing uses `serde_path_to_error` so a schema mismatch names the failing field
//! (e.g. `meta.security.0.code`) instead of only a line/column.

use crate::{FhirError, ResourceType};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Implemented by every top-level resource model.
pub trait FhirResource: Serialize + DeserializeOwned {
    const RESOURCE_TYPE: ResourceType;

    /// The `resourceType` value carried by this instance.
    fn resource_type_name(&self) -> &str;
}

/// Parse a resource from JSON text.
///
/// # Errors
///
/// Returns [`FhirError::InvalidJson`] when the text is not well-formed JSON,
/// [`FhirError::Translation`] when the JSON does not match the model (with the path of the
/// offending field) and [`FhirError::InvalidInput`] when `resourceType` names a different
/// resource.
pub fn parse_resource<R: FhirResource>(json_text: &str) -> Result<R, FhirError> {
    let mut deserializer = serde_json::Deserializer::from_str(json_text);

    let resource = match serde_path_to_error::deserialize::<_, R>(&mut deserializer) {
        Ok(parsed) => parsed,
        Err(err) if err.inner().is_syntax() || err.inner().is_eof() => {
            return Err(FhirError::InvalidJson(err.into_inner()));
        }
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            return Err(FhirError::Translation(format!(
                "{} schema mismatch at {path}: {source}",
                R::RESOURCE_TYPE
            )));
        }
    };

    if resource.resource_type_name() != R::RESOURCE_TYPE.as_str() {
        return Err(FhirError::InvalidInput(format!(
            "Expected resourceType '{}', got '{}'",
            R::RESOURCE_TYPE,
            resource.resource_type_name()
        )));
    }

    Ok(resource)
}

/// Render a resource as JSON text.
pub fn render_resource<R: FhirResource>(resource: &R) -> Result<String, FhirError> {
    Ok(serde_json::to_string(resource)?)
}
