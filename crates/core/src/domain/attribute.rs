//! Extensible (type, value) attributes attached to visits and persons.

use fhir2_types::NonEmptyText;
use fhir2_uuid::EntityUuid;

/// Java class names OpenMRS records as attribute datatypes for free text.
pub const FREE_TEXT_DATATYPE: &str = "java.lang.String";

pub const BOOLEAN_DATATYPE: &str = "java.lang.Boolean";

/// A named attribute type. Types are lookup-able entities, not a fixed enum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeType {
    pub uuid: EntityUuid,
    pub name: NonEmptyText,
    /// Declared datatype; `None` means free text.
    pub datatype: Option<String>,
    pub retired: bool,
}

impl AttributeType {
    pub fn new(name: NonEmptyText) -> Self {
        Self {
            uuid: EntityUuid::new(),
            name,
            datatype: None,
            retired: false,
        }
    }

    pub fn with_datatype(mut self, datatype: &str) -> Self {
        self.datatype = Some(datatype.to_owned());
        self
    }
}

/// A single attribute value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub uuid: EntityUuid,
    pub attribute_type: AttributeType,
    pub value: Option<String>,
    pub voided: bool,
    pub void_reason: Option<String>,
}

impl Attribute {
    pub fn new(attribute_type: AttributeType, value: Option<String>) -> Self {
        Self {
            uuid: EntityUuid::new(),
            attribute_type,
            value,
            voided: false,
            void_reason: None,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.voided
    }

    /// Soft-delete the attribute. Voiding twice keeps the first reason.
    pub fn void(&mut self, reason: &str) {
        if self.voided {
            return;
        }
        self.voided = true;
        self.void_reason = Some(reason.to_owned());
    }
}
