//! In-memory collaborators and fixtures for unit tests.

use crate::domain::{Attribute, AttributeType, EntityKind, Location, VisitType};
use crate::lookup::{AttributeTypeRegistry, Clock, EncounterClassMap, EntityLookup, EntitySaver, UcumService};
use crate::{TranslatorError, TranslatorResult};
use chrono::NaiveDate;
use fhir2_types::NonEmptyText;
use fhir2_uuid::EntityUuid;
use std::collections::HashMap;
use std::sync::Mutex;

pub(crate) struct InMemoryLookup<T> {
    entities: HashMap<EntityUuid, T>,
}

impl<T> Default for InMemoryLookup<T> {
    fn default() -> Self {
        Self {
            entities: HashMap::new(),
        }
    }
}

impl<T> InMemoryLookup<T> {
    pub(crate) fn with(entities: Vec<(EntityUuid, T)>) -> Self {
        Self {
            entities: entities.into_iter().collect(),
        }
    }
}

impl<T: Clone + Send + Sync> EntityLookup<T> for InMemoryLookup<T> {
    fn get(&self, uuid: &EntityUuid) -> Option<T> {
        self.entities.get(uuid).cloned()
    }
}

pub(crate) struct StaticRegistry {
    kind: EntityKind,
    types: Vec<AttributeType>,
}

impl StaticRegistry {
    pub(crate) fn new(kind: EntityKind, types: Vec<AttributeType>) -> Self {
        Self { kind, types }
    }
}

impl AttributeTypeRegistry for StaticRegistry {
    fn attribute_types(&self, kind: EntityKind) -> Vec<AttributeType> {
        if kind == self.kind {
            self.types.clone()
        } else {
            Vec::new()
        }
    }
}

pub(crate) struct FixedClock(pub(crate) NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Accepts only the listed codes; displays are `display of {code}`.
pub(crate) struct FakeUcum {
    accepted: Vec<String>,
}

impl FakeUcum {
    pub(crate) fn accepting(codes: &[&str]) -> Self {
        Self {
            accepted: codes.iter().map(|c| (*c).to_owned()).collect(),
        }
    }
}

impl UcumService for FakeUcum {
    fn validate(&self, code: &str) -> Option<String> {
        if self.accepted.iter().any(|c| c == code) {
            None
        } else {
            Some(format!("unknown unit '{code}'"))
        }
    }

    fn common_display(&self, code: &str) -> Option<String> {
        Some(format!("display of {code}"))
    }
}

/// Records every saved entity, or fails every save.
pub(crate) struct RecordingSaver<T> {
    saved: Mutex<Vec<T>>,
    failure: Option<String>,
}

impl<T> Default for RecordingSaver<T> {
    fn default() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            failure: None,
        }
    }
}

impl<T: Clone> RecordingSaver<T> {
    pub(crate) fn failing(reason: &str) -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            failure: Some(reason.to_owned()),
        }
    }

    pub(crate) fn saved(&self) -> Vec<T> {
        self.saved.lock().expect("saver lock").clone()
    }
}

impl<T: Clone + Send + Sync> EntitySaver<T> for RecordingSaver<T> {
    fn save(&self, entity: &T) -> TranslatorResult<()> {
        if let Some(reason) = &self.failure {
            return Err(TranslatorError::Persistence {
                entity: "test entity".to_owned(),
                reason: reason.clone(),
            });
        }
        self.saved.lock().expect("saver lock").push(entity.clone());
        Ok(())
    }
}

pub(crate) struct StaticClassMap {
    classes: HashMap<EntityUuid, String>,
}

impl StaticClassMap {
    pub(crate) fn with(classes: Vec<(EntityUuid, String)>) -> Self {
        Self {
            classes: classes.into_iter().collect(),
        }
    }
}

impl EncounterClassMap for StaticClassMap {
    fn fhir_class(&self, location_uuid: &EntityUuid) -> Option<String> {
        self.classes.get(location_uuid).cloned()
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn text(value: &str) -> NonEmptyText {
    NonEmptyText::new(value).expect("fixture text")
}

/// The `security` attribute type, with the same uuid on every call.
pub(crate) fn security_type() -> AttributeType {
    AttributeType {
        uuid: EntityUuid::parse("5f2a5c3e-0b6e-4d8e-9f4b-6a1d2c3e4f50").expect("fixture uuid"),
        ..AttributeType::new(text("security"))
    }
}

pub(crate) fn security_attribute(value: Option<String>) -> Attribute {
    Attribute::new(security_type(), value)
}

pub(crate) fn visit_type(name: &str) -> VisitType {
    VisitType {
        uuid: EntityUuid::new(),
        name: text(name),
    }
}

pub(crate) fn location(name: &str) -> Location {
    Location {
        uuid: EntityUuid::new(),
        name: text(name),
        retired: false,
    }
}
