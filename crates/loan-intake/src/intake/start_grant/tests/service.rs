use std::sync::Arc;

use super::common::*;
use crate::intake::error::{IntakeError, RepositoryError};
use crate::intake::start_grant::{RequestId, RequestIntakeService, UserId};

#[test]
fn unknown_users_cannot_open_requests() {
    let (service, repository) = build_service();

    let error = service
        .open_request(&request_form(), UserId(99))
        .expect_err("user 99 has no profile");

    assert_eq!(error, IntakeError::UnknownUser { user_id: 99 });
    assert_eq!(repository.len(), 0);
}

#[test]
fn opened_request_receives_an_id_and_intro_status() {
    let (service, _) = build_service();

    let request = service
        .open_request(&request_form(), OPERATOR)
        .expect("request opens");
    let id = request.id.expect("id assigned");

    let record = service.get(id).expect("request stored");
    assert_eq!(record.request.status.as_str(), "intro");
    assert_eq!(record.request.branch_code, 1204);
    assert!(!record.is_complete());

    service
        .complete_request(&complete_form(id))
        .expect("request completes");
    assert!(service.get(id).expect("request stored").is_complete());
}

#[test]
fn unknown_lookups_block_the_request() {
    let (service, repository) = build_service();

    let error = service
        .open_request_at(
            &request_form().with("business_part", "9"),
            &operator(),
            submitted_at(10),
        )
        .expect_err("business part 9 missing");

    assert!(matches!(
        error,
        IntakeError::Repository(RepositoryError::UnresolvedReference(_))
    ));
    assert_eq!(repository.len(), 0);
}

#[test]
fn completing_an_unknown_request_is_not_found() {
    let (service, _) = build_service();

    let error = service
        .complete_request(&complete_form(RequestId(41)))
        .expect_err("no such request");
    assert_eq!(error, IntakeError::Repository(RepositoryError::NotFound));
}

#[test]
fn later_completion_replaces_earlier_terms() {
    let (service, _) = build_service();
    let request = service
        .open_request(&request_form(), OPERATOR)
        .expect("request opens");
    let id = request.id.expect("id assigned");

    service
        .complete_request(&complete_form(id))
        .expect("first completion");
    service
        .complete_request(
            &complete_form(id)
                .with("loan_type_id", "2")
                .with("number_of_installments", "24"),
        )
        .expect("second completion");

    let record = service.get(id).expect("request stored");
    let information = record.complete_information.expect("completed");
    assert_eq!(information.number_of_installments, 24);
    assert_eq!(information.loan_type.0, 2);
}

#[test]
fn recent_lists_newest_requests_first() {
    let (service, _) = build_service();
    for hour in [8, 9, 10] {
        service
            .open_request_at(&request_form(), &operator(), submitted_at(hour))
            .expect("request opens");
    }

    let recent = service.recent(2).expect("recent requests");
    let dates: Vec<_> = recent.iter().map(|request| request.register_date).collect();
    assert_eq!(dates, vec![submitted_at(10), submitted_at(9)]);
}

#[test]
fn registered_by_filters_on_the_submitting_user() {
    let (service, _) = build_service();
    service
        .open_request_at(&request_form(), &operator(), submitted_at(8))
        .expect("operator request");
    service
        .open_request_at(&request_form(), &reviewer(), submitted_at(9))
        .expect("reviewer request");

    let mine = service.registered_by(REVIEWER).expect("requests listed");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].branch_code, 1300);
}

#[test]
fn missing_request_is_not_found() {
    let service = RequestIntakeService::new(
        Arc::new(MemoryRequests::new(lookups())),
        Arc::new(MemoryUsers::default()),
    );
    let error = service.get(RequestId(1)).expect_err("empty repository");
    assert_eq!(error, IntakeError::Repository(RepositoryError::NotFound));
}
