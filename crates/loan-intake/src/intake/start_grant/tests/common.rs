use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::intake::error::RepositoryError;
use crate::intake::form::FormData;
use crate::intake::lookup::{LookupId, LookupKind, LookupRef, LookupTable};
use crate::intake::start_grant::{
    Request, RequestCompleteInformation, RequestId, RequestIntakeService, RequestRecord,
    RequestRepository, UserDirectory, UserId, UserProfile,
};

pub(super) const OPERATOR: UserId = UserId(7);
pub(super) const REVIEWER: UserId = UserId(8);

pub(super) fn operator() -> UserProfile {
    UserProfile {
        user_id: OPERATOR,
        username: "operator".to_string(),
        branch_code: 1204,
    }
}

pub(super) fn reviewer() -> UserProfile {
    UserProfile {
        user_id: REVIEWER,
        username: "reviewer".to_string(),
        branch_code: 1300,
    }
}

pub(super) fn submitted_at(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 20)
        .and_then(|date| date.and_hms_opt(hour, 15, 0))
        .expect("valid timestamp")
}

pub(super) fn lookups() -> LookupTable {
    let mut table = LookupTable::default();
    table.insert(LookupKind::BusinessPart, LookupId(1), "Retail banking");
    table.insert(LookupKind::BusinessPart, LookupId(2), "Corporate banking");
    table.insert(LookupKind::RequestDescription, LookupId(1), "Working capital");
    table.insert(LookupKind::LoanType, LookupId(1), "Mosharakat");
    table.insert(LookupKind::LoanType, LookupId(2), "Forward");
    table.insert(LookupKind::RefundType, LookupId(1), "Monthly");
    table
}

pub(super) fn request_form() -> FormData {
    FormData::new()
        .with("type", "hoghooghi")
        .with("cif", "12345678")
        .with("deposit_number", "0201-810-4471")
        .with("business_part", "1")
        .with("request_description", "1")
        .with("has_loan_from_current_bank", "True")
        .with("request_amount", "2500000000")
}

pub(super) fn complete_form(request: RequestId) -> FormData {
    FormData::new()
        .with("request_id", request.0.to_string())
        .with("loan_type_id", "1")
        .with("refund_type_id", "1")
}

pub(super) fn build_service() -> (
    RequestIntakeService<MemoryRequests, MemoryUsers>,
    Arc<MemoryRequests>,
) {
    let repository = Arc::new(MemoryRequests::new(lookups()));
    let users = Arc::new(MemoryUsers::with([operator(), reviewer()]));
    let service = RequestIntakeService::new(repository.clone(), users);
    (service, repository)
}

#[derive(Default)]
struct RequestState {
    records: BTreeMap<RequestId, RequestRecord>,
    next_id: u64,
}

#[derive(Clone)]
pub(super) struct MemoryRequests {
    lookups: Arc<LookupTable>,
    state: Arc<Mutex<RequestState>>,
}

impl MemoryRequests {
    pub(super) fn new(lookups: LookupTable) -> Self {
        Self {
            lookups: Arc::new(lookups),
            state: Arc::new(Mutex::new(RequestState::default())),
        }
    }

    pub(super) fn len(&self) -> usize {
        self.state
            .lock()
            .expect("repository mutex poisoned")
            .records
            .len()
    }

    fn resolve(&self, references: &[LookupRef]) -> Result<(), RepositoryError> {
        match self.lookups.first_unresolved(references) {
            Some(reference) => Err(RepositoryError::UnresolvedReference(reference)),
            None => Ok(()),
        }
    }
}

impl RequestRepository for MemoryRequests {
    fn insert_request(&self, mut request: Request) -> Result<Request, RepositoryError> {
        self.resolve(&request.references())?;
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        guard.next_id += 1;
        let id = RequestId(guard.next_id);
        request.id = Some(id);
        guard.records.insert(id, RequestRecord::new(request.clone()));
        Ok(request)
    }

    fn save_complete_information(
        &self,
        information: RequestCompleteInformation,
    ) -> Result<RequestCompleteInformation, RepositoryError> {
        self.resolve(&information.references())?;
        let mut guard = self.state.lock().expect("repository mutex poisoned");
        let record = guard
            .records
            .get_mut(&information.request)
            .ok_or(RepositoryError::NotFound)?;
        record.complete_information = Some(information.clone());
        Ok(information)
    }

    fn fetch_request(&self, id: RequestId) -> Result<Option<RequestRecord>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard.records.get(&id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<Request>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard
            .records
            .values()
            .rev()
            .take(limit)
            .map(|record| record.request.clone())
            .collect())
    }

    fn registered_by(&self, user: UserId) -> Result<Vec<Request>, RepositoryError> {
        let guard = self.state.lock().expect("repository mutex poisoned");
        Ok(guard
            .records
            .values()
            .filter(|record| record.request.user == user)
            .map(|record| record.request.clone())
            .collect())
    }
}

#[derive(Default)]
pub(super) struct MemoryUsers {
    profiles: BTreeMap<UserId, UserProfile>,
}

impl MemoryUsers {
    pub(super) fn with<I>(profiles: I) -> Self
    where
        I: IntoIterator<Item = UserProfile>,
    {
        Self {
            profiles: profiles
                .into_iter()
                .map(|profile| (profile.user_id, profile))
                .collect(),
        }
    }
}

impl UserDirectory for MemoryUsers {
    fn profile(&self, user: UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.profiles.get(&user).cloned())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
