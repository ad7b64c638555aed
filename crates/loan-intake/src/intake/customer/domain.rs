use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::identity::NationalNumber;
use crate::calendar::{persian_date, DateError};
use crate::intake::form::{ensure_non_negative, FieldError, FormData, FromForm};
use crate::intake::lookup::{references_for, LookupId, LookupKind, LookupRef};

/// Legal form of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    /// Individual (natural person).
    Haghighi,
    /// Corporate (legal person).
    Hoghooghi,
}

impl CustomerType {
    pub const fn label(self) -> &'static str {
        match self {
            CustomerType::Haghighi => "haghighi",
            CustomerType::Hoghooghi => "hoghooghi",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "haghighi" => Some(Self::Haghighi),
            "hoghooghi" => Some(Self::Hoghooghi),
            _ => None,
        }
    }

    pub(crate) fn from_form(form: &FormData, field: &'static str) -> Result<Self, FieldError> {
        let value = form.required_text(field, 30)?;
        Self::parse(&value).ok_or_else(|| {
            FieldError::invalid(field, format!("`{value}` is not one of haghighi, hoghooghi"))
        })
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Root identity record of the customer domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInformation {
    pub customer_type: CustomerType,
    pub national_number: NationalNumber,
    pub cif: String,
    pub name: String,
    pub last_name: String,
    pub father_name: String,
    pub bc_number: String,
    pub bc_serial_number: String,
    /// Gregorian, midnight of the birth day.
    pub birth_date: NaiveDateTime,
    pub bc_place: String,
    pub birth_place: String,
    pub gender: String,
}

impl CustomerInformation {
    pub fn persian_birth_date(&self) -> Result<String, DateError> {
        persian_date(&self.birth_date)
    }
}

impl FromForm for CustomerInformation {
    fn from_form(form: &FormData) -> Result<Self, FieldError> {
        let customer_type = CustomerType::from_form(form, "type")?;
        let national_number = NationalNumber::from_form(form, "national_number")?;
        let name = form.required_text("name", 50)?;
        let last_name = form.required_text("last_name", 50)?;
        let father_name = form.required_text("father_name", 50)?;
        let bc_number = form.required_text("bc_number", 20)?;
        let bc_serial_number = form.required_text("bc_serial_number", 20)?;
        let birth_date = form
            .required_date("birth_date")?
            .to_gregorian()
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| FieldError::invalid("birth_date", "has no midnight"))?;
        let bc_place = form.required_text("bc_place", 100)?;
        let birth_place = form.required_text("birth_place", 100)?;
        let gender = form.required_text("gender", 10)?;

        Ok(Self {
            customer_type,
            cif: national_number.cif(),
            national_number,
            name,
            last_name,
            father_name,
            bc_number,
            bc_serial_number,
            birth_date,
            bc_place,
            birth_place,
            gender,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInformation {
    pub customer: NationalNumber,
    pub phone_number: String,
    pub cell_number: String,
    pub email: String,
    pub address: String,
    pub town: LookupId,
    pub province: LookupId,
    pub postal_code: String,
}

impl ContactInformation {
    pub fn references(&self) -> Vec<LookupRef> {
        vec![
            LookupRef::new(LookupKind::Town, self.town),
            LookupRef::new(LookupKind::Province, self.province),
        ]
    }
}

impl FromForm for ContactInformation {
    fn from_form(form: &FormData) -> Result<Self, FieldError> {
        Ok(Self {
            customer: NationalNumber::from_form(form, "customer_id")?,
            phone_number: form.required_text("phone_number", 16)?,
            cell_number: form.required_text("cell_number", 16)?,
            email: form.required_email("email", 254)?,
            address: form.required_text("address", 300)?,
            town: form.required_lookup("town_id")?,
            province: form.required_lookup("province_id")?,
            postal_code: form.required_text("postal_code", 20)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInformation {
    pub customer: NationalNumber,
    pub job: LookupId,
    pub job_activity: String,
    pub job_certificate: LookupId,
    pub job_certificate_number: String,
    pub job_province: LookupId,
    pub job_town: LookupId,
    pub job_contact_number: String,
    pub job_postal_code: String,
    pub job_address: String,
}

impl JobInformation {
    pub fn references(&self) -> Vec<LookupRef> {
        vec![
            LookupRef::new(LookupKind::JobType, self.job),
            LookupRef::new(LookupKind::JobCertificateType, self.job_certificate),
            LookupRef::new(LookupKind::Province, self.job_province),
            LookupRef::new(LookupKind::Town, self.job_town),
        ]
    }
}

impl FromForm for JobInformation {
    fn from_form(form: &FormData) -> Result<Self, FieldError> {
        Ok(Self {
            customer: NationalNumber::from_form(form, "customer_id")?,
            job: form.required_lookup("job_id")?,
            job_activity: form.required_text("job_activity", 100)?,
            job_certificate: form.required_lookup(job_certificate_key(form))?,
            job_certificate_number: form.required_text("job_certificate_number", 25)?,
            job_province: form.required_lookup("job_province_id")?,
            job_town: form.required_lookup("job_town_id")?,
            job_contact_number: form.required_text("job_contact_number", 30)?,
            job_postal_code: form.required_text("job_postal_code", 30)?,
            job_address: form.required_text("job_address", 700)?,
        })
    }
}

const JOB_CERTIFICATE_KEY: &str = "job_certificate_id";
/// Capitalized spelling still sent by older form layers.
const LEGACY_JOB_CERTIFICATE_KEY: &str = "Job_certificate_id";

fn job_certificate_key(form: &FormData) -> &'static str {
    if form.get(JOB_CERTIFICATE_KEY).is_none() && form.contains_key(LEGACY_JOB_CERTIFICATE_KEY) {
        LEGACY_JOB_CERTIFICATE_KEY
    } else {
        JOB_CERTIFICATE_KEY
    }
}

/// Declared assets and liabilities. Amounts left off the form count as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInformation {
    pub customer: NationalNumber,
    pub cash: i64,
    pub account: i64,
    pub business_place: LookupId,
    pub business_place_value: i64,
    pub individual_credit_amount: i64,
    pub company_credit_amount: i64,
    /// Movable property.
    pub manghool_value: i64,
    /// Immovable property.
    pub no_manghool_value: i64,
    pub vehicles_value: i64,
    pub individual_debit_amount: i64,
    pub company_debit_amount: i64,
    pub bank_debit_amount: i64,
}

impl AssetInformation {
    pub fn references(&self) -> Vec<LookupRef> {
        vec![LookupRef::new(LookupKind::BusinessPlace, self.business_place)]
    }
}

impl FromForm for AssetInformation {
    fn from_form(form: &FormData) -> Result<Self, FieldError> {
        let amount =
            |field: &'static str| form.integer_or(field, 0).and_then(|v| ensure_non_negative(field, v));

        Ok(Self {
            customer: NationalNumber::from_form(form, "customer_id")?,
            cash: amount("cash")?,
            account: amount("account")?,
            business_place: form.required_lookup("business_place_id")?,
            business_place_value: amount("business_place_value")?,
            individual_credit_amount: amount("individual_credit_amount")?,
            company_credit_amount: amount("company_credit_amount")?,
            manghool_value: amount("manghool_value")?,
            no_manghool_value: amount("no_manghool_value")?,
            vehicles_value: amount("vehicles_value")?,
            individual_debit_amount: amount("individual_debit_amount")?,
            company_debit_amount: amount("company_debit_amount")?,
            bank_debit_amount: amount("bank_debit_amount")?,
        })
    }
}

/// Identifier assigned to a deed once it is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SanadId(pub u64);

impl fmt::Display for SanadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Property ownership deed offered as collateral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanadMelkiInformation {
    /// `None` until the repository stores the deed.
    pub id: Option<SanadId>,
    pub sanad_no: String,
    pub owner_name: String,
    pub current_value: i64,
    pub address: String,
}

impl FromForm for SanadMelkiInformation {
    fn from_form(form: &FormData) -> Result<Self, FieldError> {
        let current_value = form
            .required_integer("current_value")
            .and_then(|value| ensure_non_negative("current_value", value))?;

        Ok(Self {
            id: None,
            sanad_no: form.required_text("sanad_no", 30)?,
            owner_name: form.required_text("owner_name", 60)?,
            current_value,
            address: form.required_text("address", 500)?,
        })
    }
}

/// Income, banking relationships and offered collateral of a customer.
///
/// `banks` and `vasighe_types` are complete sets: saving the record replaces whatever
/// associations were stored before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankIncomeInformation {
    pub customer: NationalNumber,
    pub income: i32,
    pub banks: BTreeSet<LookupId>,
    pub vasighe_types: BTreeSet<LookupId>,
    pub sanad_melki_info: Option<SanadId>,
}

impl BankIncomeInformation {
    pub fn from_form(
        form: &FormData,
        sanad: Option<&SanadMelkiInformation>,
    ) -> Result<Self, FieldError> {
        let customer = NationalNumber::from_form(form, "customer_id")?;
        let income = form
            .required_integer("income")
            .and_then(|value| ensure_non_negative("income", value))?;
        let income = i32::try_from(income)
            .map_err(|_| FieldError::invalid("income", "is too large"))?;

        let sanad_melki_info = match sanad {
            None => None,
            Some(deed) => Some(deed.id.ok_or_else(|| {
                FieldError::invalid("sanad_melki_info", "deed must be saved before linking")
            })?),
        };

        Ok(Self {
            customer,
            income,
            banks: form.lookup_set("banks")?,
            vasighe_types: form.lookup_set("vasighe_types")?,
            sanad_melki_info,
        })
    }

    pub fn references(&self) -> Vec<LookupRef> {
        let mut references = references_for(LookupKind::Bank, &self.banks);
        references.extend(references_for(LookupKind::VasigheType, &self.vasighe_types));
        references
    }
}
