//! OpenMRS patients as FHIR `Patient` resources.

use crate::domain::{Attributable, Patient, PatientIdentifier, PersonAddress, PersonName};
use crate::translators::birth_date::{BirthDateTranslator, DomainBirthDate};
use crate::translators::gender::GenderTranslator;
use crate::translators::person_attribute::PersonAttributeTranslator;
use crate::TranslatorResult;
use fhir2_uuid::EntityUuid;
use fhir_r4::{
    Address, CodeableConcept, Deceased, HumanName, Identifier, IdentifierUse, Meta, NameUse,
};

pub struct PatientTranslator {
    birth_dates: BirthDateTranslator,
    genders: GenderTranslator,
    person_attributes: PersonAttributeTranslator,
}

impl PatientTranslator {
    pub fn new(
        birth_dates: BirthDateTranslator,
        person_attributes: PersonAttributeTranslator,
    ) -> Self {
        Self {
            birth_dates,
            genders: GenderTranslator,
            person_attributes,
        }
    }

    pub fn to_fhir(&self, patient: &Patient) -> fhir_r4::Patient {
        let deceased = match (patient.dead, patient.death_date) {
            (true, Some(death_date)) => Deceased::DateTime(death_date),
            (dead, _) => Deceased::Boolean(dead),
        };

        fhir_r4::Patient {
            id: Some(patient.uuid.to_string()),
            meta: Meta {
                version_id: patient.audit.version_id(),
                last_updated: patient.audit.last_updated(),
                ..Meta::default()
            },
            extension: patient
                .active_attributes()
                .into_iter()
                .filter_map(|attribute| self.person_attributes.to_fhir(Some(attribute)))
                .collect(),
            identifier: patient
                .identifiers
                .iter()
                .filter(|i| !i.voided)
                .map(identifier_to_fhir)
                .collect(),
            active: Some(!patient.voided),
            name: patient
                .names
                .iter()
                .filter(|n| !n.voided)
                .map(name_to_fhir)
                .collect(),
            gender: self.genders.to_fhir(patient.gender.as_deref()),
            birth_date: self.birth_dates.to_fhir(patient.birthdate.map(|birthdate| {
                DomainBirthDate {
                    birthdate,
                    estimated: patient.birthdate_estimated,
                }
            })),
            deceased: Some(deceased),
            address: patient
                .addresses
                .iter()
                .filter(|a| !a.voided)
                .map(address_to_fhir)
                .collect(),
            ..fhir_r4::Patient::default()
        }
    }

    /// Merge a FHIR patient onto `existing`, or onto a fresh patient.
    ///
    /// Names, identifiers and addresses are matched to existing rows by element id and updated
    /// in place; unmatched elements become new rows. Elements the resource does not carry are
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`TranslatorError::Uuid`](crate::TranslatorError::Uuid) when the resource id or an
    /// element id is not a valid identifier.
    pub fn to_domain(
        &self,
        existing: Option<Patient>,
        resource: &fhir_r4::Patient,
    ) -> TranslatorResult<Patient> {
        let mut patient = existing.unwrap_or_default();

        if let Some(id) = non_blank(resource.id.as_deref()) {
            patient.uuid = EntityUuid::parse(id)?;
        }

        for identifier in &resource.identifier {
            merge_identifier(&mut patient.identifiers, identifier)?;
        }
        for name in &resource.name {
            merge_name(&mut patient.names, name)?;
        }
        for address in &resource.address {
            merge_address(&mut patient.addresses, address)?;
        }

        if let Some(gender) = self.genders.to_domain(resource.gender) {
            patient.gender = Some(gender.to_owned());
        }

        if let Some(birth_date) = self.birth_dates.to_domain(resource.birth_date.as_ref()) {
            patient.birthdate = Some(birth_date.birthdate);
            patient.birthdate_estimated = birth_date.estimated;
        }

        match &resource.deceased {
            Some(Deceased::Boolean(dead)) => patient.dead = *dead,
            Some(Deceased::DateTime(death_date)) => {
                patient.dead = true;
                patient.death_date = Some(*death_date);
            }
            None => {}
        }

        for extension in &resource.extension {
            if extension.url != self.person_attributes.extension_url() {
                continue;
            }
            let Some(attribute) = self.person_attributes.to_domain(Some(extension)) else {
                continue;
            };
            let duplicate = patient.active_attributes().iter().any(|a| {
                a.attribute_type.uuid == attribute.attribute_type.uuid && a.value == attribute.value
            });
            if !duplicate {
                patient.add_attribute(attribute);
            }
        }

        Ok(patient)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn element_uuid(id: Option<&str>) -> TranslatorResult<Option<EntityUuid>> {
    Ok(non_blank(id).map(EntityUuid::parse).transpose()?)
}

fn identifier_to_fhir(identifier: &PatientIdentifier) -> Identifier {
    Identifier {
        id: Some(identifier.uuid.to_string()),
        use_: identifier.preferred.then_some(IdentifierUse::Official),
        type_: identifier.identifier_type.as_ref().map(|t| CodeableConcept {
            coding: Vec::new(),
            text: Some(t.name.to_string()),
        }),
        system: None,
        value: Some(identifier.identifier.clone()),
    }
}

fn merge_identifier(
    identifiers: &mut Vec<PatientIdentifier>,
    incoming: &Identifier,
) -> TranslatorResult<()> {
    let Some(value) = non_blank(incoming.value.as_deref()) else {
        return Ok(());
    };
    let uuid = element_uuid(incoming.id.as_deref())?;
    let preferred = incoming.use_ == Some(IdentifierUse::Official);

    match identifiers
        .iter_mut()
        .find(|i| uuid.as_ref() == Some(&i.uuid))
    {
        Some(existing) => {
            existing.identifier = value.to_owned();
            existing.preferred = preferred;
        }
        None => identifiers.push(PatientIdentifier {
            uuid: uuid.unwrap_or_default(),
            identifier: value.to_owned(),
            identifier_type: None,
            preferred,
            voided: false,
        }),
    }
    Ok(())
}

/// `given` carries the given name then the middle name. FHIR strings cannot be blank, so a
/// name with only a middle name reads back with that part as its given name.
fn name_to_fhir(name: &PersonName) -> HumanName {
    HumanName {
        id: Some(name.uuid.to_string()),
        use_: name.preferred.then_some(NameUse::Official),
        family: name.family_name.clone(),
        given: [&name.given_name, &name.middle_name]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .cloned()
            .collect(),
        text: None,
    }
}

fn merge_name(names: &mut Vec<PersonName>, incoming: &HumanName) -> TranslatorResult<()> {
    let uuid = element_uuid(incoming.id.as_deref())?;
    let index = match names.iter().position(|n| uuid.as_ref() == Some(&n.uuid)) {
        Some(index) => index,
        None => {
            names.push(PersonName {
                uuid: uuid.unwrap_or_default(),
                ..PersonName::default()
            });
            names.len() - 1
        }
    };

    let name = &mut names[index];
    let mut given = incoming.given.iter().map(|g| g.trim()).filter(|g| !g.is_empty());
    name.given_name = given.next().map(str::to_owned);
    let middle = given.collect::<Vec<_>>().join(" ");
    name.middle_name = (!middle.is_empty()).then_some(middle);
    name.family_name = non_blank(incoming.family.as_deref()).map(str::to_owned);
    name.preferred = incoming.use_ == Some(NameUse::Official);
    Ok(())
}

/// `line` carries `address1` then `address2`; an address with only `address2` reads back with
/// it as `address1`.
fn address_to_fhir(address: &PersonAddress) -> Address {
    Address {
        id: Some(address.uuid.to_string()),
        line: [&address.address1, &address.address2]
            .into_iter()
            .flatten()
            .cloned()
            .collect(),
        city: address.city_village.clone(),
        state: address.state_province.clone(),
        postal_code: address.postal_code.clone(),
        country: address.country.clone(),
    }
}

fn merge_address(addresses: &mut Vec<PersonAddress>, incoming: &Address) -> TranslatorResult<()> {
    let uuid = element_uuid(incoming.id.as_deref())?;
    let index = match addresses.iter().position(|a| uuid.as_ref() == Some(&a.uuid)) {
        Some(index) => index,
        None => {
            addresses.push(PersonAddress {
                uuid: uuid.unwrap_or_default(),
                ..PersonAddress::default()
            });
            addresses.len() - 1
        }
    };

    let address = &mut addresses[index];
    address.address1 = incoming.line.first().cloned();
    address.address2 = incoming.line.get(1).cloned();
    address.city_village = incoming.city.clone();
    address.state_province = incoming.state.clone();
    address.postal_code = incoming.postal_code.clone();
    address.country = incoming.country.clone();
    Ok(())
}
