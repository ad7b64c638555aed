use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::domain::SanadId;
use super::identity::NationalNumber;
use super::repository::{CustomerProfile, CustomerRepository};
use super::service::CustomerIntakeService;
use crate::intake::error::{created_response, IntakeError};
use crate::intake::form::{FieldError, FormData};

/// Router builder exposing the customer intake forms.
pub fn customer_router<R>(service: Arc<CustomerIntakeService<R>>) -> Router
where
    R: CustomerRepository + 'static,
{
    Router::new()
        .route("/api/v1/customers", post(register_handler::<R>))
        .route(
            "/api/v1/customers/:national_number",
            get(profile_handler::<R>),
        )
        .route(
            "/api/v1/customers/:national_number/contact",
            post(contact_handler::<R>),
        )
        .route(
            "/api/v1/customers/:national_number/job",
            post(job_handler::<R>),
        )
        .route(
            "/api/v1/customers/:national_number/assets",
            post(assets_handler::<R>),
        )
        .route(
            "/api/v1/customers/:national_number/bank-income",
            post(bank_income_handler::<R>),
        )
        .route("/api/v1/sanads", post(sanad_handler::<R>))
        .with_state(service)
}

pub(crate) async fn register_handler<R>(
    State(service): State<Arc<CustomerIntakeService<R>>>,
    Json(form): Json<FormData>,
) -> Response
where
    R: CustomerRepository + 'static,
{
    match service.register_customer(&form) {
        Ok(customer) => {
            let view = CustomerProfile::new(customer).view();
            (StatusCode::CREATED, Json(view)).into_response()
        }
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn profile_handler<R>(
    State(service): State<Arc<CustomerIntakeService<R>>>,
    Path(national_number): Path<String>,
) -> Response
where
    R: CustomerRepository + 'static,
{
    let result = path_national_number(&national_number)
        .and_then(|national_number| service.profile(&national_number));
    match result {
        Ok(profile) => (StatusCode::OK, Json(profile.view())).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn contact_handler<R>(
    State(service): State<Arc<CustomerIntakeService<R>>>,
    Path(national_number): Path<String>,
    Json(form): Json<FormData>,
) -> Response
where
    R: CustomerRepository + 'static,
{
    let form = for_customer(form, national_number);
    created_response(service.record_contact(&form))
}

pub(crate) async fn job_handler<R>(
    State(service): State<Arc<CustomerIntakeService<R>>>,
    Path(national_number): Path<String>,
    Json(form): Json<FormData>,
) -> Response
where
    R: CustomerRepository + 'static,
{
    let form = for_customer(form, national_number);
    created_response(service.record_job(&form))
}

pub(crate) async fn assets_handler<R>(
    State(service): State<Arc<CustomerIntakeService<R>>>,
    Path(national_number): Path<String>,
    Json(form): Json<FormData>,
) -> Response
where
    R: CustomerRepository + 'static,
{
    let form = for_customer(form, national_number);
    created_response(service.record_assets(&form))
}

pub(crate) async fn bank_income_handler<R>(
    State(service): State<Arc<CustomerIntakeService<R>>>,
    Path(national_number): Path<String>,
    Json(form): Json<FormData>,
) -> Response
where
    R: CustomerRepository + 'static,
{
    let form = for_customer(form, national_number);
    let result = sanad_id(&form)
        .map_err(IntakeError::from)
        .and_then(|sanad_id| service.record_bank_income_for_sanad_id(&form, sanad_id));
    created_response(result)
}

pub(crate) async fn sanad_handler<R>(
    State(service): State<Arc<CustomerIntakeService<R>>>,
    Json(form): Json<FormData>,
) -> Response
where
    R: CustomerRepository + 'static,
{
    created_response(service.record_sanad(&form))
}

/// The path segment names the customer; it wins over any `customer_id` in the body.
fn for_customer(mut form: FormData, national_number: String) -> FormData {
    form.insert("customer_id", national_number);
    form
}

fn path_national_number(raw: &str) -> Result<NationalNumber, IntakeError> {
    NationalNumber::parse(raw)
        .map_err(|err| IntakeError::Field(FieldError::invalid("national_number", err.to_string())))
}

fn sanad_id(form: &FormData) -> Result<Option<SanadId>, FieldError> {
    match form.get("sanad_id").map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<u64>()
            .map(|id| Some(SanadId(id)))
            .map_err(|_| FieldError::invalid("sanad_id", format!("`{raw}` is not a deed id"))),
    }
}
