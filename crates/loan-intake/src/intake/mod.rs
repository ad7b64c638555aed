//! Form intake for the customer and loan-request domains.
//!
//! Each record type is built from an untrusted [`FormData`] mapping and handed to a
//! repository trait; lookup references are resolved by the repository at save time.

pub mod customer;
pub mod error;
pub mod form;
pub mod lookup;
pub mod start_grant;

pub use error::{IntakeError, RepositoryError};
pub use form::{FieldError, FormData, FromForm};
pub use lookup::{LookupId, LookupImportError, LookupKind, LookupRef, LookupTable};
