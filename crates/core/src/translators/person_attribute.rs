//! Person attributes as nested extensions.
//!
//! ```json
//! {"url": "http://fhir.openmrs.org/ext/person-attribute",
//!  "extension": [
//!    {"url": "http://fhir.openmrs.org/ext/person-attribute-type", "valueString": "Telephone"},
//!    {"url": "http://fhir.openmrs.org/ext/person-attribute-value", "valueString": "555-0100"}]}
//! ```
//!
//! Only free-text and boolean attribute types are carried; attributes of other datatypes and
//! attributes without a value produce no extension.

use crate::config::CoreConfig;
use crate::constants::{
    OPENMRS_FHIR_EXT_PERSON_ATTRIBUTE_TYPE, OPENMRS_FHIR_EXT_PERSON_ATTRIBUTE_VALUE,
};
use crate::domain::attribute::{BOOLEAN_DATATYPE, FREE_TEXT_DATATYPE};
use crate::domain::{Attribute, EntityKind};
use crate::lookup::AttributeTypeRegistry;
use fhir_r4::{Extension, ExtensionValue};
use std::sync::Arc;

pub struct PersonAttributeTranslator {
    registry: Arc<dyn AttributeTypeRegistry>,
    extension_url: String,
}

impl PersonAttributeTranslator {
    pub fn new(config: &CoreConfig, registry: Arc<dyn AttributeTypeRegistry>) -> Self {
        Self {
            registry,
            extension_url: config.person_attribute_extension_url().to_owned(),
        }
    }

    pub fn extension_url(&self) -> &str {
        &self.extension_url
    }

    pub fn to_fhir(&self, attribute: Option<&Attribute>) -> Option<Extension> {
        let attribute = attribute.filter(|a| a.is_active())?;
        let raw = attribute.value.as_deref()?;

        let value = match attribute.attribute_type.datatype.as_deref() {
            None | Some(FREE_TEXT_DATATYPE) => ExtensionValue::String(raw.to_owned()),
            Some(BOOLEAN_DATATYPE) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => ExtensionValue::Boolean(true),
                "false" => ExtensionValue::Boolean(false),
                _ => {
                    tracing::debug!(attribute = %attribute.uuid, "boolean attribute with non-boolean value");
                    return None;
                }
            },
            Some(other) => {
                tracing::debug!(
                    attribute = %attribute.uuid,
                    datatype = other,
                    "attribute datatype not representable as an extension"
                );
                return None;
            }
        };

        let mut extension = Extension::new(self.extension_url.clone());
        extension.extension.push(Extension::with_value(
            OPENMRS_FHIR_EXT_PERSON_ATTRIBUTE_TYPE,
            ExtensionValue::String(attribute.attribute_type.name.to_string()),
        ));
        extension
            .extension
            .push(Extension::with_value(OPENMRS_FHIR_EXT_PERSON_ATTRIBUTE_VALUE, value));
        Some(extension)
    }

    /// Builds a new attribute from an extension whose type name is registered for persons.
    pub fn to_domain(&self, extension: Option<&Extension>) -> Option<Attribute> {
        let extension = extension.filter(|e| e.url == self.extension_url)?;
        let type_name = extension
            .child(OPENMRS_FHIR_EXT_PERSON_ATTRIBUTE_TYPE)
            .and_then(Extension::string_value)?;
        let value = match extension
            .child(OPENMRS_FHIR_EXT_PERSON_ATTRIBUTE_VALUE)?
            .value
            .as_ref()?
        {
            ExtensionValue::String(s) | ExtensionValue::Code(s) => s.clone(),
            ExtensionValue::Boolean(b) => b.to_string(),
        };

        let Some(attribute_type) = self.registry.find_by_name(EntityKind::Person, type_name) else {
            tracing::warn!(attribute_type = type_name, "person attribute type not registered");
            return None;
        };
        Some(Attribute::new(attribute_type, Some(value)))
    }
}
