use loan_intake::config::IntakeConfig;
use loan_intake::error::AppError;
use loan_intake::intake::customer::{
    AssetInformation, BankIncomeInformation, ContactInformation, CustomerInformation,
    CustomerProfile, CustomerRepository, JobInformation, NationalNumber, SanadId,
    SanadMelkiInformation,
};
use loan_intake::intake::start_grant::{
    load_user_profiles, Request, RequestCompleteInformation, RequestId, RequestRecord,
    RequestRepository, UserDirectory, UserId, UserProfile,
};
use loan_intake::intake::{LookupRef, LookupTable, RepositoryError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

const DEFAULT_LOOKUPS: &str = include_str!("../data/lookups.csv");
const DEFAULT_USERS: &str = include_str!("../data/users.csv");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct StoreState {
    profiles: BTreeMap<NationalNumber, CustomerProfile>,
    sanads: BTreeMap<SanadId, SanadMelkiInformation>,
    requests: BTreeMap<RequestId, RequestRecord>,
    next_sanad: u64,
    next_request: u64,
}

/// Process-local storage for both intake domains, checking references against the
/// seeded lookup table.
#[derive(Clone)]
pub(crate) struct InMemoryIntakeStore {
    lookups: Arc<LookupTable>,
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryIntakeStore {
    pub(crate) fn new(lookups: LookupTable) -> Self {
        Self {
            lookups: Arc::new(lookups),
            state: Arc::new(Mutex::new(StoreState::default())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }

    fn resolve(&self, references: &[LookupRef]) -> Result<(), RepositoryError> {
        match self.lookups.first_unresolved(references) {
            Some(reference) => Err(RepositoryError::UnresolvedReference(reference)),
            None => Ok(()),
        }
    }

    fn with_profile<F>(&self, customer: &NationalNumber, apply: F) -> Result<(), RepositoryError>
    where
        F: FnOnce(&mut CustomerProfile),
    {
        let mut guard = self.lock()?;
        let profile = guard
            .profiles
            .get_mut(customer)
            .ok_or(RepositoryError::NotFound)?;
        apply(profile);
        Ok(())
    }
}

impl CustomerRepository for InMemoryIntakeStore {
    fn insert_customer(
        &self,
        customer: CustomerInformation,
    ) -> Result<CustomerInformation, RepositoryError> {
        let mut guard = self.lock()?;
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
        self.with_profile(&contact.customer, |profile| {
            profile.contact = Some(contact.clone())
        })?;
        Ok(contact)
    }

    fn save_job(&self, job: JobInformation) -> Result<JobInformation, RepositoryError> {
        self.resolve(&job.references())?;
        self.with_profile(&job.customer, |profile| profile.job = Some(job.clone()))?;
        Ok(job)
    }

    fn save_assets(&self, assets: AssetInformation) -> Result<AssetInformation, RepositoryError> {
        self.resolve(&assets.references())?;
        self.with_profile(&assets.customer, |profile| {
            profile.assets = Some(assets.clone())
        })?;
        Ok(assets)
    }

    fn insert_sanad(
        &self,
        mut sanad: SanadMelkiInformation,
    ) -> Result<SanadMelkiInformation, RepositoryError> {
        let mut guard = self.lock()?;
        guard.next_sanad += 1;
        let id = SanadId(guard.next_sanad);
        sanad.id = Some(id);
        guard.sanads.insert(id, sanad.clone());
        Ok(sanad)
    }

    fn fetch_sanad(&self, id: SanadId) -> Result<Option<SanadMelkiInformation>, RepositoryError> {
        Ok(self.lock()?.sanads.get(&id).cloned())
    }

    fn save_bank_income(
        &self,
        record: BankIncomeInformation,
    ) -> Result<BankIncomeInformation, RepositoryError> {
        self.resolve(&record.references())?;
        let mut guard = self.lock()?;
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
        Ok(self.lock()?.profiles.get(national_number).cloned())
    }
}

impl RequestRepository for InMemoryIntakeStore {
    fn insert_request(&self, mut request: Request) -> Result<Request, RepositoryError> {
        self.resolve(&request.references())?;
        let mut guard = self.lock()?;
        guard.next_request += 1;
        let id = RequestId(guard.next_request);
        request.id = Some(id);
        guard.requests.insert(id, RequestRecord::new(request.clone()));
        Ok(request)
    }

    fn save_complete_information(
        &self,
        information: RequestCompleteInformation,
    ) -> Result<RequestCompleteInformation, RepositoryError> {
        self.resolve(&information.references())?;
        let mut guard = self.lock()?;
        let record = guard
            .requests
            .get_mut(&information.request)
            .ok_or(RepositoryError::NotFound)?;
        record.complete_information = Some(information.clone());
        Ok(information)
    }

    fn fetch_request(&self, id: RequestId) -> Result<Option<RequestRecord>, RepositoryError> {
        Ok(self.lock()?.requests.get(&id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<Request>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .requests
            .values()
            .rev()
            .take(limit)
            .map(|record| record.request.clone())
            .collect())
    }

    fn registered_by(&self, user: UserId) -> Result<Vec<Request>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .requests
            .values()
            .filter(|record| record.request.user == user)
            .map(|record| record.request.clone())
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryUserDirectory {
    profiles: Arc<HashMap<UserId, UserProfile>>,
}

impl InMemoryUserDirectory {
    pub(crate) fn new(profiles: Vec<UserProfile>) -> Self {
        let profiles = profiles
            .into_iter()
            .map(|profile| (profile.user_id, profile))
            .collect();
        Self {
            profiles: Arc::new(profiles),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.profiles.len()
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn profile(&self, user: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.profiles.get(&user).cloned())
    }
}

pub(crate) fn read_lookup_table(path: &Path) -> Result<LookupTable, AppError> {
    let file = File::open(path)?;
    Ok(LookupTable::from_reader(file)?)
}

/// Lookup table from the configured CSV, or the bundled reference data.
pub(crate) fn load_lookups(config: &IntakeConfig) -> Result<LookupTable, AppError> {
    match &config.lookup_seed {
        Some(path) => {
            info!(path = %path.display(), "loading lookup tables");
            read_lookup_table(path)
        }
        None => Ok(LookupTable::from_reader(DEFAULT_LOOKUPS.as_bytes())?),
    }
}

pub(crate) fn load_users(config: &IntakeConfig) -> Result<InMemoryUserDirectory, AppError> {
    let profiles = match &config.user_seed {
        Some(path) => {
            info!(path = %path.display(), "loading user profiles");
            load_user_profiles(File::open(path)?)?
        }
        None => load_user_profiles(DEFAULT_USERS.as_bytes())?,
    };
    Ok(InMemoryUserDirectory::new(profiles))
}
