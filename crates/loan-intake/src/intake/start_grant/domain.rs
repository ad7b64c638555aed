use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::intake::customer::CustomerType;
use crate::intake::form::{
    ensure_non_negative, ensure_positive_i32, FieldError, FormData, FromForm,
};
use crate::intake::lookup::{LookupId, LookupKind, LookupRef};

const STATUS_MAX_LEN: usize = 50;

/// Identifier assigned to a request once it is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authenticated bank employee submitting requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub username: String,
    pub branch_code: i32,
}

/// Informal workflow marker of a request. Only the initial `intro` value is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequestStatus(String);

impl RequestStatus {
    pub const INTRO: &'static str = "intro";

    pub fn intro() -> Self {
        Self(Self::INTRO.to_string())
    }

    pub fn new(value: impl Into<String>) -> Result<Self, FieldError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(FieldError::Missing { field: "status" });
        }
        if trimmed.chars().count() > STATUS_MAX_LEN {
            return Err(FieldError::TooLong {
                field: "status",
                max: STATUS_MAX_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl TryFrom<String> for RequestStatus {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        status.0
    }
}

impl Default for RequestStatus {
    fn default() -> Self {
        Self::intro()
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Loan "start grant" request, the root of the request domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// `None` until the repository stores the request.
    pub id: Option<RequestId>,
    pub request_type: CustomerType,
    pub cif: String,
    pub deposit_number: String,
    pub register_date: NaiveDateTime,
    pub last_update: NaiveDateTime,
    pub user: UserId,
    pub branch_code: i32,
    pub business_part: LookupId,
    pub request_description: LookupId,
    pub has_loan_from_current_bank: bool,
    pub request_amount: i64,
    pub status: RequestStatus,
}

impl Request {
    /// Build a request owned by `user`, stamped with `now`.
    pub fn from_form(
        form: &FormData,
        user: &UserProfile,
        now: NaiveDateTime,
    ) -> Result<Self, FieldError> {
        let request_type = CustomerType::from_form(form, "type")?;
        let cif = form.required_text("cif", 20)?;
        let deposit_number = form.required_text("deposit_number", 20)?;
        let business_part = form.required_lookup("business_part")?;
        let request_description = form.required_lookup("request_description")?;
        let has_loan_from_current_bank = form
            .get("has_loan_from_current_bank")
            .ok_or(FieldError::Missing {
                field: "has_loan_from_current_bank",
            })?
            == "True";
        let request_amount = form
            .required_integer("request_amount")
            .and_then(|value| ensure_non_negative("request_amount", value))?;

        Ok(Self {
            id: None,
            request_type,
            cif,
            deposit_number,
            register_date: now,
            last_update: now,
            user: user.user_id,
            branch_code: user.branch_code,
            business_part,
            request_description,
            has_loan_from_current_bank,
            request_amount,
            status: RequestStatus::intro(),
        })
    }

    pub fn references(&self) -> Vec<LookupRef> {
        vec![
            LookupRef::new(LookupKind::BusinessPart, self.business_part),
            LookupRef::new(LookupKind::RequestDescription, self.request_description),
        ]
    }
}

/// Repayment terms completing a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCompleteInformation {
    pub request: RequestId,
    pub prepayed_amount: i64,
    pub loan_type: LookupId,
    /// Months.
    pub refund_duration: i32,
    pub refund_type: LookupId,
    pub number_of_installments: i32,
}

impl RequestCompleteInformation {
    pub const DEFAULT_REFUND_DURATION: i32 = 12;
    pub const DEFAULT_INSTALLMENTS: i32 = 12;

    pub fn references(&self) -> Vec<LookupRef> {
        vec![
            LookupRef::new(LookupKind::LoanType, self.loan_type),
            LookupRef::new(LookupKind::RefundType, self.refund_type),
        ]
    }
}

impl FromForm for RequestCompleteInformation {
    fn from_form(form: &FormData) -> Result<Self, FieldError> {
        let request = form.required_integer("request_id").and_then(|value| {
            u64::try_from(value)
                .map(RequestId)
                .map_err(|_| FieldError::invalid("request_id", "must not be negative"))
        })?;
        let prepayed_amount = form
            .integer_or("prepayed_amount", 0)
            .and_then(|value| ensure_non_negative("prepayed_amount", value))?;
        let refund_duration = form
            .integer_or("refund_duration", Self::DEFAULT_REFUND_DURATION as i64)
            .and_then(|value| ensure_positive_i32("refund_duration", value))?;
        let number_of_installments = form
            .integer_or("number_of_installments", Self::DEFAULT_INSTALLMENTS as i64)
            .and_then(|value| ensure_positive_i32("number_of_installments", value))?;

        Ok(Self {
            request,
            prepayed_amount,
            loan_type: form.required_lookup("loan_type_id")?,
            refund_duration,
            refund_type: form.required_lookup("refund_type_id")?,
            number_of_installments,
        })
    }
}
