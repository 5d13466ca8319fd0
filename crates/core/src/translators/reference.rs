//! References between resources.
//!
//! A domain entity is referenced as `"{ResourceType}/{uuid}"`. Resolving a reference checks
//! the resource type first (a mismatch is rejected client input), then looks the uuid up.
//! Nothing referenced, no id part and an unknown uuid all resolve to `None`.

use crate::domain::{EncounterRecord, Location, Obs, Patient};
use crate::lookup::EntityLookup;
use crate::{TranslatorError, TranslatorResult};
use fhir2_uuid::EntityUuid;
use fhir_r4::{Reference, ResourceType};
use std::sync::Arc;

/// A domain entity that can be the target of a FHIR reference.
pub trait Referable {
    const RESOURCE_TYPE: ResourceType;

    fn uuid(&self) -> &EntityUuid;

    fn reference_display(&self) -> Option<String> {
        None
    }

    /// Voided entities are never referenced.
    fn is_voided(&self) -> bool {
        false
    }
}

impl Referable for Patient {
    const RESOURCE_TYPE: ResourceType = ResourceType::Patient;

    fn uuid(&self) -> &EntityUuid {
        &self.uuid
    }

    /// `"Given Family (Identifier: 1000X)"`, omitting absent parts.
    fn reference_display(&self) -> Option<String> {
        let name = self
            .preferred_name()
            .map(|n| n.full_name())
            .filter(|n| !n.is_empty());
        let identifier = self
            .preferred_identifier()
            .map(|i| format!("(Identifier: {})", i.identifier));

        match (name, identifier) {
            (Some(name), Some(identifier)) => Some(format!("{name} {identifier}")),
            (Some(name), None) => Some(name),
            (None, Some(identifier)) => Some(identifier),
            (None, None) => None,
        }
    }

    fn is_voided(&self) -> bool {
        self.voided
    }
}

impl Referable for Location {
    const RESOURCE_TYPE: ResourceType = ResourceType::Location;

    fn uuid(&self) -> &EntityUuid {
        &self.uuid
    }

    fn reference_display(&self) -> Option<String> {
        Some(self.name.to_string())
    }
}

impl Referable for Obs {
    const RESOURCE_TYPE: ResourceType = ResourceType::Observation;

    fn uuid(&self) -> &EntityUuid {
        &self.uuid
    }

    fn is_voided(&self) -> bool {
        self.voided
    }
}

impl Referable for EncounterRecord {
    const RESOURCE_TYPE: ResourceType = ResourceType::Encounter;

    fn uuid(&self) -> &EntityUuid {
        &self.uuid
    }

    fn is_voided(&self) -> bool {
        self.voided
    }
}

/// Builds and resolves references to entities of type `T`.
pub struct ReferenceTranslator<T> {
    lookup: Arc<dyn EntityLookup<T>>,
}

pub type PatientReferenceTranslator = ReferenceTranslator<Patient>;
pub type LocationReferenceTranslator = ReferenceTranslator<Location>;
pub type ObservationReferenceTranslator = ReferenceTranslator<Obs>;
pub type EncounterReferenceTranslator = ReferenceTranslator<EncounterRecord>;

impl<T: Referable> ReferenceTranslator<T> {
    pub fn new(lookup: Arc<dyn EntityLookup<T>>) -> Self {
        Self { lookup }
    }

    /// Canonical reference to `entity`; `None` for a missing or voided entity.
    pub fn to_fhir(&self, entity: Option<&T>) -> Option<Reference> {
        let entity = entity.filter(|e| !e.is_voided())?;
        Some(
            Reference::to(T::RESOURCE_TYPE, entity.uuid().as_str())
                .with_display(entity.reference_display()),
        )
    }

    /// Resolve a reference to the entity it names.
    ///
    /// # Errors
    ///
    /// Returns [`TranslatorError::InvalidReference`] when the reference names another resource
    /// type or no type at all. An id that cannot name any entity resolves to `None`.
    pub fn to_domain(&self, reference: Option<&Reference>) -> TranslatorResult<Option<T>> {
        let Some(reference) = reference.filter(|r| r.has_reference()) else {
            return Ok(None);
        };

        match reference.reference_type() {
            Some(found) if found == T::RESOURCE_TYPE.as_str() => {}
            found => {
                return Err(TranslatorError::InvalidReference(format!(
                    "Reference must be to a {} not a {}",
                    T::RESOURCE_TYPE,
                    found.unwrap_or_default()
                )));
            }
        }

        let Some(id) = reference.reference_id() else {
            return Ok(None);
        };

        let uuid = match EntityUuid::parse(id) {
            Ok(uuid) => uuid,
            Err(err) => {
                tracing::debug!(
                    resource_type = %T::RESOURCE_TYPE,
                    id,
                    error = %err,
                    "reference id is not a valid identifier; treated as not found"
                );
                return Ok(None);
            }
        };
        let found = self.lookup.get(&uuid);
        if found.is_none() {
            tracing::debug!(resource_type = %T::RESOURCE_TYPE, %uuid, "referenced entity not found");
        }
        Ok(found)
    }
}
