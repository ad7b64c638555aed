use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use axum::Router;
use serde_json::Value;

use crate::intake::customer::{
    customer_router, AssetInformation, BankIncomeInformation, ContactInformation,
    CustomerInformation, CustomerIntakeService, CustomerProfile, CustomerRepository,
    JobInformation, NationalNumber, SanadId, SanadMelkiInformation,
};
use crate::intake::error::RepositoryError;
use crate::intake::form::FormData;
use crate::intake::lookup::{LookupId, LookupKind, LookupRef, LookupTable};

pub(super) const NATIONAL_NUMBER: &str = "0012345678";

pub(super) fn lookups() -> LookupTable {
    let mut table = LookupTable::default();
    table.insert(LookupKind::Town, LookupId(1), "Tehran");
    table.insert(LookupKind::Town, LookupId(2), "Karaj");
    table.insert(LookupKind::Province, LookupId(1), "Tehran");
    table.insert(LookupKind::Province, LookupId(2), "Alborz");
    table.insert(LookupKind::JobType, LookupId(1), "Retail");
    table.insert(LookupKind::JobCertificateType, LookupId(1), "Business license");
    table.insert(LookupKind::Bank, LookupId(1), "Melli");
    table.insert(LookupKind::Bank, LookupId(2), "Mellat");
    table.insert(LookupKind::Bank, LookupId(3), "Saderat");
    table.insert(LookupKind::VasigheType, LookupId(1), "Property deed");
    table.insert(LookupKind::VasigheType, LookupId(2), "Promissory note");
    table.insert(LookupKind::BusinessPlace, LookupId(1), "Owned");
    table
}

pub(super) fn customer_form() -> FormData {
    FormData::new()
        .with("type", "haghighi")
        .with("national_number", NATIONAL_NUMBER)
        .with("name", "Ali")
        .with("last_name", "Rezaei")
        .with("father_name", "Hasan")
        .with("bc_number", "1234")
        .with("bc_serial_number", "22/B-119")
        .with("birth_date", "1370/05/02")
        .with("bc_place", "Tehran")
        .with("birth_place", "Tehran")
        .with("gender", "male")
}

pub(super) const CUSTOMER_KEYS: [&str; 11] = [
    "type",
    "national_number",
    "name",
    "last_name",
    "father_name",
    "bc_number",
    "bc_serial_number",
    "birth_date",
    "bc_place",
    "birth_place",
    "gender",
];

pub(super) fn contact_form() -> FormData {
    FormData::new()
        .with("customer_id", NATIONAL_NUMBER)
        .with("phone_number", "02188776655")
        .with("cell_number", "09121234567")
        .with("email", "ali.rezaei@example.com")
        .with("address", "No. 12, Azadi St.")
        .with("town_id", "1")
        .with("province_id", "1")
        .with("postal_code", "1417935840")
}

pub(super) fn job_form() -> FormData {
    FormData::new()
        .with("customer_id", NATIONAL_NUMBER)
        .with("job_id", "1")
        .with("job_activity", "Grocery")
        .with("job_certificate_id", "1")
        .with("job_certificate_number", "CERT-8812")
        .with("job_province_id", "2")
        .with("job_town_id", "2")
        .with("job_contact_number", "02634556677")
        .with("job_postal_code", "3134567890")
        .with("job_address", "Shop 4, Bazaar")
}

pub(super) fn assets_form() -> FormData {
    FormData::new()
        .with("customer_id", NATIONAL_NUMBER)
        .with("cash", "150000000")
        .with("account", "320000000")
        .with("business_place_id", "1")
        .with("business_place_value", "9000000000")
}

pub(super) fn sanad_form() -> FormData {
    FormData::new()
        .with("sanad_no", "139-44-1102")
        .with("owner_name", "Ali Rezaei")
        .with("current_value", "12000000000")
        .with("address", "Unit 3, Golestan Tower")
}

pub(super) fn bank_income_form(banks: &[&str]) -> FormData {
    FormData::new()
        .with("customer_id", NATIONAL_NUMBER)
        .with("income", "85000000")
        .with_list("banks", banks.iter().copied())
        .with_list("vasighe_types", ["1"])
}

pub(super) fn national_number() -> NationalNumber {
    NationalNumber::parse(NATIONAL_NUMBER).expect("valid national number")
}

pub(super) fn build_service() -> (
    CustomerIntakeService<MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::new(lookups()));
    let service = CustomerIntakeService::new(repository.clone());
    (service, repository)
}

pub(super) fn customer_router_with_service(
    service: CustomerIntakeService<MemoryRepository>,
) -> Router {
    customer_router(Arc::new(service))
}

#[derive(Default)]
struct MemoryState {
    profiles: BTreeMap<NationalNumber, CustomerProfile>,
    sanads: BTreeMap<SanadId, SanadMelkiInformation>,
    next_sanad: u64,
}

#[derive(Clone)]
pub(super) struct MemoryRepository {
    lookups: Arc<LookupTable>,
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRepository {
    pub(super) fn new(lookups: LookupTable) -> Self {
        Self {
            lookups: Arc::new(lookups),
            state: Arc::new(Mutex::new(MemoryState::default())),
        }
    }

    pub(super) fn customer_count(&self) -> usize {
        self.state
            .lock()
            .expect("repository mutex poisoned")
            .profiles
            .len()
    }

    pub(super) fn stored_bank_income(&self) -> Option<BankIncomeInformation> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        guard
            .profiles
            .get(&national_number())
            .and_then(|profile| profile.bank_income.clone())
    }

    fn resolve(&self, references: &[LookupRef]) -> Result<(), RepositoryError> {
        match self.lookups.first_unresolved(references) {
            Some(reference) => Err(RepositoryError::UnresolvedReference(reference)),
            None => Ok(()),
        }
    }

    fn update_profile<F>(&self, customer: &NationalNumber, apply: F) -> Result<(), RepositoryError>
    where
        F: FnOnce(&mut CustomerProfile),
    {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        let profile = guard
            .profiles
            .get_mut(customer)
            .ok_or(RepositoryError::NotFound)?;
        apply(profile);
        Ok(())
    }
}

impl CustomerRepository for MemoryRepository {
    fn insert_customer(
        &self,
        customer: CustomerInformation,
    ) -> Result<CustomerInformation, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        if guard.profiles.contains_key(&customer.national_number) {
            return Err(RepositoryError::Conflict);
        }
        guard.profiles.insert(
            customer.national_number.clone(),
            CustomerProfile::new(customer.clone()),
        );
        Ok(customer)
    }

    fn save_contact(
        &self,
        contact: ContactInformation,
    ) -> Result<ContactInformation, RepositoryError> {
        self.resolve(&contact.references())?;
        self.update_profile(&contact.customer, |profile| {
            profile.contact = Some(contact.clone())
        })?;
        Ok(contact)
    }

    fn save_job(&self, job: JobInformation) -> Result<JobInformation, RepositoryError> {
        self.resolve(&job.references())?;
        self.update_profile(&job.customer, |profile| profile.job = Some(job.clone()))?;
        Ok(job)
    }

    fn save_assets(&self, assets: AssetInformation) -> Result<AssetInformation, RepositoryError> {
        self.resolve(&assets.references())?;
        self.update_profile(&assets.customer, |profile| {
            profile.assets = Some(assets.clone())
        })?;
        Ok(assets)
    }

    fn insert_sanad(
        &self,
        mut sanad: SanadMelkiInformation,
    ) -> Result<SanadMelkiInformation, RepositoryError> {
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        guard.next_sanad += 1;
        let id = SanadId(guard.next_sanad);
        sanad.id = Some(id);
        guard.sanads.insert(id, sanad.clone());
        Ok(sanad)
    }

    fn fetch_sanad(&self, id: SanadId) -> Result<Option<SanadMelkiInformation>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.sanads.get(&id).cloned())
    }

    fn save_bank_income(
        &self,
        record: BankIncomeInformation,
    ) -> Result<BankIncomeInformation, RepositoryError> {
        self.resolve(&record.references())?;
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        if let Some(id) = record.sanad_melki_info {
            if !guard.sanads.contains_key(&id) {
                return Err(RepositoryError::NotFound);
            }
        }
        let profile = guard
            .profiles
            .get_mut(&record.customer)
            .ok_or(RepositoryError::NotFound)?;
        profile.bank_income = Some(record.clone());
        Ok(record)
    }

    fn fetch_profile(
        &self,
        national_number: &NationalNumber,
    ) -> Result<Option<CustomerProfile>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.profiles.get(national_number).cloned())
    }
}

pub(super) struct UnavailableRepository;

impl CustomerRepository for UnavailableRepository {
    fn insert_customer(
        &self,
        _customer: CustomerInformation,
    ) -> Result<CustomerInformation, RepositoryError> {
        Err(offline())
    }

    fn save_contact(
        &self,
        _contact: ContactInformation,
    ) -> Result<ContactInformation, RepositoryError> {
        Err(offline())
    }

    fn save_job(&self, _job: JobInformation) -> Result<JobInformation, RepositoryError> {
        Err(offline())
    }

    fn save_assets(&self, _assets: AssetInformation) -> Result<AssetInformation, RepositoryError> {
        Err(offline())
    }

    fn insert_sanad(
        &self,
        _sanad: SanadMelkiInformation,
    ) -> Result<SanadMelkiInformation, RepositoryError> {
        Err(offline())
    }

    fn fetch_sanad(&self, _id: SanadId) -> Result<Option<SanadMelkiInformation>, RepositoryError> {
        Err(offline())
    }

    fn save_bank_income(
        &self,
        _record: BankIncomeInformation,
    ) -> Result<BankIncomeInformation, RepositoryError> {
        Err(offline())
    }

    fn fetch_profile(
        &self,
        _national_number: &NationalNumber,
    ) -> Result<Option<CustomerProfile>, RepositoryError> {
        Err(offline())
    }
}

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
