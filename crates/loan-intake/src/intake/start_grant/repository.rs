use std::io::Read;

use serde::{Deserialize, Serialize};

use super::domain::{Request, RequestCompleteInformation, RequestId, UserId, UserProfile};
use crate::intake::error::RepositoryError;

/// Stored request with its completion details, when those were submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub request: Request,
    pub complete_information: Option<RequestCompleteInformation>,
}

impl RequestRecord {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            complete_information: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete_information.is_some()
    }
}

/// Storage abstraction for loan requests.
///
/// Lookup references are resolved when saving; completion details require the request
/// to exist and replace earlier details for the same request.
pub trait RequestRepository: Send + Sync {
    /// Store a request and return it with its assigned id.
    fn insert_request(&self, request: Request) -> Result<Request, RepositoryError>;
    fn save_complete_information(
        &self,
        information: RequestCompleteInformation,
    ) -> Result<RequestCompleteInformation, RepositoryError>;
    fn fetch_request(&self, id: RequestId) -> Result<Option<RequestRecord>, RepositoryError>;
    /// Most recently registered requests first.
    fn recent(&self, limit: usize) -> Result<Vec<Request>, RepositoryError>;
    fn registered_by(&self, user: UserId) -> Result<Vec<Request>, RepositoryError>;
}

/// Source of authenticated user profiles (branch assignment).
pub trait UserDirectory: Send + Sync {
    fn profile(&self, user: UserId) -> Result<Option<UserProfile>, RepositoryError>;
}

/// Read `user_id,username,branch_code` rows.
pub fn load_user_profiles<R: Read>(reader: R) -> Result<Vec<UserProfile>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader.deserialize::<UserProfile>().collect()
}
