//! Collaborator capabilities consumed by the translators.
//!
//! Persistence, vocabulary validation and the clock live outside this crate. Translators take
//! them as constructor parameters (`Arc<dyn Trait>`) and never reach for ambient state.

use crate::domain::{AttributeType, EntityKind};
use crate::TranslatorResult;
use chrono::{NaiveDate, Utc};
use fhir2_uuid::EntityUuid;

/// Lookup of a domain entity by uuid. Not found is `None`, never an error.
pub trait EntityLookup<T>: Send + Sync {
    fn get(&self, uuid: &EntityUuid) -> Option<T>;
}

/// Registry of every attribute type defined for an entity kind.
pub trait AttributeTypeRegistry: Send + Sync {
    fn attribute_types(&self, kind: EntityKind) -> Vec<AttributeType>;

    /// First non-retired type whose name matches `name` case-insensitively.
    fn find_by_name(&self, kind: EntityKind, name: &str) -> Option<AttributeType> {
        self.attribute_types(kind)
            .into_iter()
            .find(|t| !t.retired && t.name.eq_ignore_case(name))
    }
}

/// Persists an entity inside the caller's transaction.
pub trait EntitySaver<T>: Send + Sync {
    fn save(&self, entity: &T) -> TranslatorResult<()>;
}

/// An external vocabulary (for example UCUM) that can validate codes.
pub trait UcumService: Send + Sync {
    /// `None` when `code` is valid, otherwise a description of the problem.
    fn validate(&self, code: &str) -> Option<String>;

    /// Human-readable display for a valid code.
    fn common_display(&self, code: &str) -> Option<String>;
}

/// Maps a location to a FHIR encounter class code.
pub trait EncounterClassMap: Send + Sync {
    fn fhir_class(&self, location_uuid: &EntityUuid) -> Option<String>;
}

/// Source of "today" for precision decisions.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in UTC.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}
