use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info};

use super::domain::{Request, RequestCompleteInformation, RequestId, UserId, UserProfile};
use super::repository::{RequestRecord, RequestRepository, UserDirectory};
use crate::intake::error::{IntakeError, RepositoryError};
use crate::intake::form::{FormData, FromForm};

/// Service composing request construction, the user directory, and the repository.
pub struct RequestIntakeService<R, U> {
    repository: Arc<R>,
    users: Arc<U>,
}

impl<R, U> RequestIntakeService<R, U>
where
    R: RequestRepository + 'static,
    U: UserDirectory + 'static,
{
    pub fn new(repository: Arc<R>, users: Arc<U>) -> Self {
        Self { repository, users }
    }

    /// Resolve the submitting user and open a request stamped with the local time.
    pub fn open_request(&self, form: &FormData, user_id: UserId) -> Result<Request, IntakeError> {
        let user = self
            .users
            .profile(user_id)?
            .ok_or(IntakeError::UnknownUser { user_id: user_id.0 })?;
        self.open_request_at(form, &user, Local::now().naive_local())
    }

    pub fn open_request_at(
        &self,
        form: &FormData,
        user: &UserProfile,
        now: NaiveDateTime,
    ) -> Result<Request, IntakeError> {
        let request = Request::from_form(form, user, now)?;
        let stored = self.repository.insert_request(request)?;
        info!(
            request_id = ?stored.id,
            user = %stored.user,
            branch_code = stored.branch_code,
            amount = stored.request_amount,
            "loan request opened"
        );
        Ok(stored)
    }

    pub fn complete_request(
        &self,
        form: &FormData,
    ) -> Result<RequestCompleteInformation, IntakeError> {
        let information = RequestCompleteInformation::from_form(form)?;
        let stored = self.repository.save_complete_information(information)?;
        info!(
            request_id = %stored.request,
            installments = stored.number_of_installments,
            "loan request completed"
        );
        Ok(stored)
    }

    pub fn get(&self, id: RequestId) -> Result<RequestRecord, IntakeError> {
        let record = self
            .repository
            .fetch_request(id)?
            .ok_or(RepositoryError::NotFound)?;
        debug!(request_id = %id, complete = record.is_complete(), "request fetched");
        Ok(record)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<Request>, IntakeError> {
        Ok(self.repository.recent(limit)?)
    }

    pub fn registered_by(&self, user_id: UserId) -> Result<Vec<Request>, IntakeError> {
        Ok(self.repository.registered_by(user_id)?)
    }
}
