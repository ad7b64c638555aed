use std::fmt;

use serde::{Deserialize, Serialize};

use crate::intake::form::{FieldError, FormData};

const NATIONAL_NUMBER_WIDTH: usize = 10;

/// National identification number, stored as fixed-width 10-digit text.
///
/// Input may be any digit string; leading zeros carry no value, so `12345678` and
/// `000012345678` name the same person.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NationalNumber(String);

impl NationalNumber {
    pub fn parse(value: &str) -> Result<Self, NationalNumberError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(NationalNumberError::Empty);
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(NationalNumberError::NotNumeric);
        }

        let significant = trimmed.trim_start_matches('0');
        if significant.len() > NATIONAL_NUMBER_WIDTH {
            return Err(NationalNumberError::TooManyDigits {
                digits: significant.len(),
            });
        }

        Ok(Self(format!(
            "{significant:0>width$}",
            width = NATIONAL_NUMBER_WIDTH
        )))
    }

    pub(crate) fn from_form(form: &FormData, field: &'static str) -> Result<Self, FieldError> {
        let raw = form.get(field).ok_or(FieldError::Missing { field })?;
        Self::parse(raw).map_err(|err| match err {
            NationalNumberError::Empty => FieldError::Missing { field },
            other => FieldError::invalid(field, other.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric rendering without padding, used as the customer's CIF.
    pub fn cif(&self) -> String {
        let significant = self.0.trim_start_matches('0');
        if significant.is_empty() {
            "0".to_string()
        } else {
            significant.to_string()
        }
    }
}

impl fmt::Display for NationalNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NationalNumber {
    type Error = NationalNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NationalNumber> for String {
    fn from(value: NationalNumber) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NationalNumberError {
    #[error("national number is empty")]
    Empty,
    #[error("national number must contain only digits")]
    NotNumeric,
    #[error("national number has {digits} significant digits, at most 10 are allowed")]
    TooManyDigits { digits: usize },
}
