use serde::{Deserialize, Serialize};

use super::domain::{
    AssetInformation, BankIncomeInformation, ContactInformation, CustomerInformation,
    JobInformation, SanadId, SanadMelkiInformation,
};
use super::identity::NationalNumber;
use crate::intake::error::RepositoryError;

/// A customer together with the dependent records saved so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer: CustomerInformation,
    pub contact: Option<ContactInformation>,
    pub job: Option<JobInformation>,
    pub assets: Option<AssetInformation>,
    pub bank_income: Option<BankIncomeInformation>,
}

impl CustomerProfile {
    pub fn new(customer: CustomerInformation) -> Self {
        Self {
            customer,
            contact: None,
            job: None,
            assets: None,
            bank_income: None,
        }
    }

    pub fn view(&self) -> CustomerProfileView {
        CustomerProfileView {
            persian_birth_date: self.customer.persian_birth_date().ok(),
            profile: self.clone(),
        }
    }
}

/// Profile as exposed to the form layer, with the birth date rendered in Jalali.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerProfileView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persian_birth_date: Option<String>,
    #[serde(flatten)]
    pub profile: CustomerProfile,
}

/// Storage abstraction for the customer domain.
///
/// Implementations resolve lookup references when saving and report unknown ids as
/// [`RepositoryError::UnresolvedReference`]. Dependent records are keyed by customer and
/// require the customer to exist.
pub trait CustomerRepository: Send + Sync {
    fn insert_customer(
        &self,
        customer: CustomerInformation,
    ) -> Result<CustomerInformation, RepositoryError>;
    fn save_contact(&self, contact: ContactInformation)
        -> Result<ContactInformation, RepositoryError>;
    fn save_job(&self, job: JobInformation) -> Result<JobInformation, RepositoryError>;
    fn save_assets(&self, assets: AssetInformation) -> Result<AssetInformation, RepositoryError>;
    /// Store a deed and return it with its assigned id.
    fn insert_sanad(
        &self,
        sanad: SanadMelkiInformation,
    ) -> Result<SanadMelkiInformation, RepositoryError>;
    fn fetch_sanad(&self, id: SanadId) -> Result<Option<SanadMelkiInformation>, RepositoryError>;
    /// Store bank income, replacing both association sets in a single step.
    fn save_bank_income(
        &self,
        record: BankIncomeInformation,
    ) -> Result<BankIncomeInformation, RepositoryError>;
    fn fetch_profile(
        &self,
        national_number: &NationalNumber,
    ) -> Result<Option<CustomerProfile>, RepositoryError>;
}
