//! Constants used throughout the translation core.
//!
//! Coding-system URIs, OpenMRS extension URLs, search-handler names and the property names
//! used inside a [`SearchParameterMap`](crate::search::SearchParameterMap).

// ============================================================================
// Coding systems
// ============================================================================

/// HL7 v3 Confidentiality code system used for `Meta.security` labels.
pub const CONFIDENTIALITY_SYSTEM_URI: &str =
    "http://terminology.hl7.org/CodeSystem/v3-Confidentiality";

/// Unified Code for Units of Measure.
pub const UCUM_SYSTEM_URI: &str = "http://unitsofmeasure.org";

/// HL7 v3 ActCode system used for `Encounter.class`.
pub const ENCOUNTER_CLASS_SYSTEM_URI: &str = "http://terminology.hl7.org/CodeSystem/v3-ActCode";

/// OpenMRS visit-type code system; codes are visit-type uuids.
pub const VISIT_TYPE_SYSTEM_URI: &str = "http://fhir.openmrs.org/code-system/visit-type";

// ============================================================================
// OpenMRS extensions and tags
// ============================================================================

pub const OPENMRS_FHIR_EXT_ENCOUNTER_TAG: &str = "http://fhir.openmrs.org/ext/encounter-tag";

pub const OPENMRS_FHIR_EXT_PERSON_ATTRIBUTE: &str = "http://fhir.openmrs.org/ext/person-attribute";

pub const OPENMRS_FHIR_EXT_PERSON_ATTRIBUTE_TYPE: &str =
    "http://fhir.openmrs.org/ext/person-attribute-type";

pub const OPENMRS_FHIR_EXT_PERSON_ATTRIBUTE_VALUE: &str =
    "http://fhir.openmrs.org/ext/person-attribute-value";

// ============================================================================
// Defaults
// ============================================================================

/// Attribute type name that carries confidentiality labels.
pub const DEFAULT_SECURITY_ATTRIBUTE_TYPE_NAME: &str = "security";

/// Estimated birth dates further back than this many years render with year precision.
pub const DEFAULT_BIRTHDATE_ESTIMATION_THRESHOLD_YEARS: u32 = 5;

/// Encounter class used when no location-specific class is mapped (ambulatory).
pub const DEFAULT_ENCOUNTER_CLASS: &str = "AMB";

/// Void reason recorded when a security attribute is replaced from a FHIR update.
pub const SECURITY_ATTRIBUTE_VOID_REASON: &str = "replaced by FHIR security label";

// ============================================================================
// Search handlers
// ============================================================================

pub const PATIENT_REFERENCE_SEARCH_HANDLER: &str = "patient.reference.search.handler";

pub const ENCOUNTER_REFERENCE_SEARCH_HANDLER: &str = "encounter.reference.search.handler";

pub const LOCATION_REFERENCE_SEARCH_HANDLER: &str = "location.reference.search.handler";

pub const MEDICATION_REQUEST_REFERENCE_SEARCH_HANDLER: &str =
    "medicationrequest.reference.search.handler";

pub const RESULT_SEARCH_HANDLER: &str = "result.search.handler";

pub const CODED_SEARCH_HANDLER: &str = "coded.search.handler";

pub const DATE_RANGE_SEARCH_HANDLER: &str = "date.range.search.handler";

pub const NAME_SEARCH_HANDLER: &str = "name.search.handler";

pub const GENDER_SEARCH_HANDLER: &str = "gender.search.handler";

pub const ADDRESS_SEARCH_HANDLER: &str = "address.search.handler";

pub const COMMON_SEARCH_HANDLER: &str = "common.search.handler";

pub const INCLUDE_SEARCH_HANDLER: &str = "_include.search.handler";

pub const REVERSE_INCLUDE_SEARCH_HANDLER: &str = "_revinclude.search.handler";

// ============================================================================
// Search property names
// ============================================================================

pub const ID_PROPERTY: &str = "_id.property";

pub const LAST_UPDATED_PROPERTY: &str = "_lastUpdated.property";

pub const NAME_PROPERTY: &str = "name.property";

pub const GIVEN_PROPERTY: &str = "given.property";

pub const FAMILY_PROPERTY: &str = "family.property";

pub const CITY_PROPERTY: &str = "city.property";

pub const STATE_PROPERTY: &str = "state.property";

pub const POSTAL_CODE_PROPERTY: &str = "postalCode.property";

pub const COUNTRY_PROPERTY: &str = "country.property";

// ============================================================================
// Search parameter names (FHIR side)
// ============================================================================

pub const SP_ID: &str = "_id";

pub const SP_LAST_UPDATED: &str = "_lastUpdated";
