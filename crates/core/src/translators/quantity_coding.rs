//! Units of numeric concepts as codings.
//!
//! Each registered vocabulary is tried in registration order; the first that accepts the units
//! produces a UCUM coding. When none does, the concept is identified locally by a coding with no
//! system whose code is the concept uuid.

use crate::constants::UCUM_SYSTEM_URI;
use crate::domain::Concept;
use crate::lookup::UcumService;
use fhir_r4::Coding;
use std::sync::Arc;

pub struct ObservationQuantityCodingTranslator {
    vocabularies: Vec<Arc<dyn UcumService>>,
}

impl ObservationQuantityCodingTranslator {
    pub fn new(vocabularies: Vec<Arc<dyn UcumService>>) -> Self {
        Self { vocabularies }
    }

    /// `None` for a missing or non-numeric concept.
    pub fn to_fhir(&self, concept: Option<&Concept>) -> Option<Coding> {
        let concept = concept?;
        concept.numeric.as_ref()?;

        if let Some(units) = concept.units() {
            for vocabulary in &self.vocabularies {
                match vocabulary.validate(units) {
                    None => {
                        return Some(Coding {
                            system: Some(UCUM_SYSTEM_URI.to_owned()),
                            code: Some(units.to_owned()),
                            display: vocabulary.common_display(units),
                        });
                    }
                    Some(problem) => {
                        tracing::debug!(units, %problem, "units rejected by vocabulary");
                    }
                }
            }
        }

        tracing::debug!(concept = %concept.uuid, "falling back to local concept coding");
        Some(Coding {
            system: None,
            code: Some(concept.uuid.to_string()),
            display: None,
        })
    }
}
