use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{
    AssetInformation, BankIncomeInformation, ContactInformation, CustomerInformation,
    JobInformation, SanadId, SanadMelkiInformation,
};
use super::identity::NationalNumber;
use super::repository::{CustomerProfile, CustomerRepository};
use crate::intake::error::{IntakeError, RepositoryError};
use crate::intake::form::{FormData, FromForm};

/// Builds customer-domain records from form submissions and hands them to storage.
///
/// Every operation constructs the complete record first; nothing reaches the repository
/// when construction fails.
pub struct CustomerIntakeService<R> {
    repository: Arc<R>,
}

impl<R> CustomerIntakeService<R>
where
    R: CustomerRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn register_customer(&self, form: &FormData) -> Result<CustomerInformation, IntakeError> {
        let customer = CustomerInformation::from_form(form)?;
        let stored = self.repository.insert_customer(customer)?;
        info!(national_number = %stored.national_number, "customer registered");
        Ok(stored)
    }

    pub fn record_contact(&self, form: &FormData) -> Result<ContactInformation, IntakeError> {
        let contact = ContactInformation::from_form(form)?;
        let stored = self.repository.save_contact(contact)?;
        debug!(national_number = %stored.customer, "contact information saved");
        Ok(stored)
    }

    pub fn record_job(&self, form: &FormData) -> Result<JobInformation, IntakeError> {
        let job = JobInformation::from_form(form)?;
        let stored = self.repository.save_job(job)?;
        debug!(national_number = %stored.customer, "job information saved");
        Ok(stored)
    }

    pub fn record_assets(&self, form: &FormData) -> Result<AssetInformation, IntakeError> {
        let assets = AssetInformation::from_form(form)?;
        let stored = self.repository.save_assets(assets)?;
        debug!(national_number = %stored.customer, "asset information saved");
        Ok(stored)
    }

    pub fn record_sanad(&self, form: &FormData) -> Result<SanadMelkiInformation, IntakeError> {
        let sanad = SanadMelkiInformation::from_form(form)?;
        let stored = self.repository.insert_sanad(sanad)?;
        debug!(sanad_id = ?stored.id, sanad_no = %stored.sanad_no, "deed saved");
        Ok(stored)
    }

    /// Save bank income, optionally linked to an already stored deed.
    pub fn record_bank_income(
        &self,
        form: &FormData,
        sanad: Option<&SanadMelkiInformation>,
    ) -> Result<BankIncomeInformation, IntakeError> {
        let record = BankIncomeInformation::from_form(form, sanad)?;
        let stored = self.repository.save_bank_income(record)?;
        info!(
            national_number = %stored.customer,
            banks = stored.banks.len(),
            vasighe_types = stored.vasighe_types.len(),
            sanad_id = ?stored.sanad_melki_info,
            "bank income saved"
        );
        Ok(stored)
    }

    /// Variant of [`Self::record_bank_income`] that resolves the deed by id first.
    pub fn record_bank_income_for_sanad_id(
        &self,
        form: &FormData,
        sanad_id: Option<SanadId>,
    ) -> Result<BankIncomeInformation, IntakeError> {
        let sanad = match sanad_id {
            Some(id) => Some(
                self.repository
                    .fetch_sanad(id)?
                    .ok_or(RepositoryError::NotFound)?,
            ),
            None => None,
        };
        self.record_bank_income(form, sanad.as_ref())
    }

    pub fn profile(&self, national_number: &NationalNumber) -> Result<CustomerProfile, IntakeError> {
        let profile = self
            .repository
            .fetch_profile(national_number)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(profile)
    }
}
