//! # FHIR2 Core
//!
//! Translation core between OpenMRS domain entities and FHIR R4 resources.
//!
//! This crate contains:
//! - bidirectional translators (field, attribute, reference and composite resource translators)
//! - the search composer: typed search parameters, a backend-neutral [`CriteriaQuery`] and the
//!   per-resource DAOs that build one from a [`SearchParameterMap`]
//! - startup configuration resolved from OpenMRS global properties
//!
//! **No transport or storage concerns**: HTTP, FHIR bundles, database access and the
//! vocabulary services are collaborators injected through the traits in [`lookup`].
//!
//! [`CriteriaQuery`]: search::CriteriaQuery
//! [`SearchParameterMap`]: search::SearchParameterMap

pub mod config;
pub mod constants;
pub mod dao;
pub mod domain;
mod error;
pub mod lookup;
pub mod search;
pub mod translators;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::CoreConfig;
pub use error::{ConfigError, ConfigResult, TranslatorError, TranslatorResult};
