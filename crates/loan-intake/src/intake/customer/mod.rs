//! Customer identity, contact, job, asset, deed and bank-income records.

pub mod domain;
pub mod identity;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AssetInformation, BankIncomeInformation, ContactInformation, CustomerInformation,
    CustomerType, JobInformation, SanadId, SanadMelkiInformation,
};
pub use identity::{NationalNumber, NationalNumberError};
pub use repository::{CustomerProfile, CustomerProfileView, CustomerRepository};
pub use router::customer_router;
pub use service::CustomerIntakeService;
