//! OpenMRS gender codes to FHIR administrative gender.

use fhir_r4::AdministrativeGender;

#[derive(Clone, Copy, Debug, Default)]
pub struct GenderTranslator;

impl GenderTranslator {
    /// Unrecognised non-null codes map to `unknown`.
    pub fn to_fhir(&self, gender: Option<&str>) -> Option<AdministrativeGender> {
        let gender = gender?.trim();
        let mapped = match gender.to_ascii_uppercase().as_str() {
            "M" => AdministrativeGender::Male,
            "F" => AdministrativeGender::Female,
            "O" => AdministrativeGender::Other,
            _ => AdministrativeGender::Unknown,
        };
        Some(mapped)
    }

    pub fn to_domain(&self, gender: Option<AdministrativeGender>) -> Option<&'static str> {
        gender.map(|g| match g {
            AdministrativeGender::Male => "M",
            AdministrativeGender::Female => "F",
            AdministrativeGender::Other => "O",
            AdministrativeGender::Unknown => "U",
        })
    }
}
