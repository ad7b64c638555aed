//! Loan "start grant" requests and their completion details.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Request, RequestCompleteInformation, RequestId, RequestStatus, UserId, UserProfile,
};
pub use repository::{load_user_profiles, RequestRecord, RequestRepository, UserDirectory};
pub use router::{request_router, USER_HEADER};
pub use service::RequestIntakeService;
