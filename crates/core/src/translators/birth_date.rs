//! Birth date precision.
//!
//! OpenMRS stores a full date plus an "estimated" flag; FHIR carries a partial date. Exact
//! dates render with day precision. Estimated dates render with month precision while they are
//! recent and with year precision once the birth year is more than the configured number of
//! years in the past.

use crate::config::CoreConfig;
use crate::lookup::Clock;
use chrono::{Datelike, NaiveDate};
use fhir_r4::{FhirDate, TemporalPrecision};
use std::sync::Arc;

/// Domain side of a birth date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomainBirthDate {
    pub birthdate: NaiveDate,
    pub estimated: bool,
}

pub struct BirthDateTranslator {
    clock: Arc<dyn Clock>,
    threshold_years: u32,
}

impl BirthDateTranslator {
    pub fn new(config: &CoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            threshold_years: config.birthdate_estimation_threshold_years(),
        }
    }

    pub fn to_fhir(&self, birth_date: Option<DomainBirthDate>) -> Option<FhirDate> {
        let birth_date = birth_date?;
        if !birth_date.estimated {
            return Some(FhirDate::day(birth_date.birthdate));
        }

        let years_ago = self.clock.today().year() - birth_date.birthdate.year();
        let precision = if years_ago > self.threshold_years as i32 {
            TemporalPrecision::Year
        } else {
            TemporalPrecision::Month
        };
        Some(FhirDate::new(birth_date.birthdate, precision))
    }

    pub fn to_domain(&self, date: Option<&FhirDate>) -> Option<DomainBirthDate> {
        let date = date?;
        Some(DomainBirthDate {
            birthdate: date.value(),
            estimated: date.precision() != TemporalPrecision::Day,
        })
    }
}
