// leadline-client/tests/assignment_flow.rs
// Assignment dialog flows, including the admin reassignment-request branch

mod common;

use std::time::Duration;

use serde_json::{Value, json};

use common::{MockHttp, api_as, lead_json, summary, user};
use http::StatusCode;
use leadline_client::leads::PatchOutcome;
use leadline_client::models::Role;
use leadline_client::{
    AssignError, AssignState, AssignmentCoordinator, ClientError, ErrorCode, ErrorKind,
    LeadService, LeadStore,
};

async fn coordinator(role: Role) -> (AssignmentCoordinator<MockHttp>, LeadStore, MockHttp) {
    let (api, http) = api_as(user(1, "Meera", role));
    let store = LeadStore::new();
    http.reply(json!([lead_json(1, vec![]), lead_json(2, vec![]), lead_json(3, vec![])]));
    LeadService::new(api.clone(), store.clone())
        .load_for_session()
        .await
        .unwrap();
    let coordinator = AssignmentCoordinator::new(api, store.clone()).unwrap();
    (coordinator, store, http)
}

fn super_admin_conflict() -> ClientError {
    ClientError::from_response(
        StatusCode::FORBIDDEN,
        r#"{"code":2004,"message":"Lead is already assigned by a super admin"}"#,
    )
}

#[tokio::test]
async fn test_super_admin_assign_succeeds() {
    let (mut flow, store, http) = coordinator(Role::SuperAdmin).await;
    http.reply(json!({ "message": "assigned" }));

    let team = vec![summary(7, "Ravi"), summary(8, "Anu")];
    let state = flow.assign(1, team.clone()).await.unwrap();
    assert_eq!(state, AssignState::Succeeded);

    let call = http.calls().pop().unwrap();
    assert_eq!(call.path, "/assigns/1/assign");
    assert_eq!(call.body, Some(json!({ "assigneeIds": [7, 8] })));

    let lead = store.get(1).unwrap();
    assert_eq!(lead.assignees, team);
    assert_eq!(lead.assigned_by_names(), vec!["Meera"]);
    assert_eq!(lead.assigned_by.len(), 2);
    assert!(lead.assigned_at.is_some());

    assert_eq!(flow.dismiss().unwrap(), AssignState::Idle);
}

#[tokio::test]
async fn test_admin_conflict_offers_reassignment_request() {
    let (mut flow, store, http) = coordinator(Role::Admin).await;
    let before = store.snapshot();
    http.fail(super_admin_conflict());

    let state = flow.assign(2, vec![summary(7, "Ravi")]).await.unwrap();
    assert_eq!(state, AssignState::PermissionDenied);
    assert!(flow.last_error().unwrap().is_assigned_by_super_admin());
    assert_eq!(flow.target_lead(), Some(2));
    assert_eq!(store.snapshot(), before);

    http.reply(Value::Null);
    let state = flow.request_reassignment().await.unwrap();
    assert_eq!(state, AssignState::RequestSent);
    assert!(flow.last_error().is_none());

    let call = http.calls().pop().unwrap();
    assert_eq!(call.path, "/assigns/2/reassign-request");
    assert_eq!(call.body, Some(json!({ "assigneeIds": [7] })));

    // A request does not change local assignment state
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn test_admin_can_cancel_denied_attempt() {
    let (mut flow, _, http) = coordinator(Role::Admin).await;
    http.fail(super_admin_conflict());

    flow.assign(2, vec![summary(7, "Ravi")]).await.unwrap();
    assert_eq!(flow.cancel().unwrap(), AssignState::Idle);
    assert!(flow.target_lead().is_none());

    let err = flow.request_reassignment().await.unwrap_err();
    assert!(matches!(err, AssignError::Transition(_)));
}

#[tokio::test]
async fn test_bare_forbidden_fails_without_request_option() {
    let (mut flow, _, http) = coordinator(Role::Admin).await;
    http.fail(ClientError::from_response(
        StatusCode::FORBIDDEN,
        r#"{"message":"not allowed"}"#,
    ));

    let state = flow.assign(1, vec![summary(7, "Ravi")]).await.unwrap();
    assert_eq!(state, AssignState::Failed);
    assert_eq!(flow.last_error().unwrap().kind(), ErrorKind::Network);

    let err = flow.request_reassignment().await.unwrap_err();
    assert!(matches!(err, AssignError::Transition(_)));
}

#[tokio::test]
async fn test_super_admin_conflict_code_is_plain_failure() {
    let (mut flow, _, http) = coordinator(Role::SuperAdmin).await;
    http.fail(super_admin_conflict());

    let state = flow.assign(1, vec![summary(7, "Ravi")]).await.unwrap();
    assert_eq!(state, AssignState::Failed);
    assert!(matches!(
        flow.last_error(),
        Some(ClientError::Api {
            code: ErrorCode::AssignedBySuperAdmin,
            ..
        })
    ));
}

#[tokio::test]
async fn test_empty_selection_fails_locally() {
    let (mut flow, _, http) = coordinator(Role::Admin).await;
    let calls = http.calls().len();

    let err = flow.assign(1, vec![]).await.unwrap_err();
    assert!(matches!(err, AssignError::Client(ClientError::Validation(_))));
    assert_eq!(flow.state(), AssignState::Idle);

    let err = flow.bulk_assign(&[], vec![summary(7, "Ravi")]).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(ref m) if m.contains("lead")));

    let err = flow.bulk_assign(&[1, 2], vec![]).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(ref m) if m.contains("user")));

    assert_eq!(http.calls().len(), calls);
}

#[tokio::test]
async fn test_bulk_assign_patches_every_lead() {
    let (flow, store, http) = coordinator(Role::SuperAdmin).await;
    http.reply(json!({ "message": "ok" }));

    let outcome = flow
        .bulk_assign(&[1, 3, 42], vec![summary(8, "Anu")])
        .await
        .unwrap();
    assert_eq!(outcome, PatchOutcome::Applied);

    let call = http.calls().pop().unwrap();
    assert_eq!(call.path, "/assigns/bulk-assign");
    assert_eq!(
        call.body,
        Some(json!({ "leadIds": [1, 3, 42], "assigneeIds": [8] }))
    );

    assert_eq!(store.get(1).unwrap().assignee_ids(), vec![8]);
    assert_eq!(store.get(3).unwrap().assignee_ids(), vec![8]);
    assert!(store.get(2).unwrap().assignees.is_empty());
}

#[tokio::test]
async fn test_bulk_failure_changes_nothing() {
    let (flow, store, http) = coordinator(Role::SuperAdmin).await;
    let before = store.snapshot();
    http.fail(ClientError::Timeout);

    let err = flow
        .bulk_assign(&[1, 2], vec![summary(8, "Anu")])
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn test_employee_cannot_open_coordinator() {
    let (api, http) = api_as(user(4, "Ravi", Role::Employee));
    let Err(err) = AssignmentCoordinator::new(api, LeadStore::new()) else {
        panic!("employee session was given an assignment coordinator");
    };
    assert!(matches!(err, ClientError::Forbidden(_)));
    assert!(http.calls().is_empty());
}

#[tokio::test]
async fn test_timeout_is_retryable_failure() {
    let (mut flow, store, http) = coordinator(Role::Admin).await;
    let before = store.snapshot();
    http.fail(ClientError::Timeout);

    let state = flow.assign(1, vec![summary(7, "Ravi")]).await.unwrap();
    assert_eq!(state, AssignState::Failed);
    let err = flow.last_error().unwrap();
    assert!(matches!(err, ClientError::Timeout));
    assert!(err.is_retryable());
    assert_eq!(store.snapshot(), before);

    assert_eq!(flow.dismiss().unwrap(), AssignState::Idle);
    http.reply(json!({ "message": "assigned" }));
    let state = flow.assign(1, vec![summary(7, "Ravi")]).await.unwrap();
    assert_eq!(state, AssignState::Succeeded);
    assert_eq!(store.get(1).unwrap().assignee_ids(), vec![7]);
}

#[tokio::test]
async fn test_failed_reassignment_request() {
    let (mut flow, store, http) = coordinator(Role::Admin).await;
    let before = store.snapshot();
    http.fail(super_admin_conflict());
    flow.assign(2, vec![summary(7, "Ravi")]).await.unwrap();

    http.fail(ClientError::Timeout);
    let state = flow.request_reassignment().await.unwrap();
    assert_eq!(state, AssignState::Failed);
    assert!(flow.last_error().unwrap().is_retryable());
    assert_eq!(store.snapshot(), before);

    assert_eq!(flow.dismiss().unwrap(), AssignState::Idle);
}

#[tokio::test]
async fn test_cancelled_assign_can_be_retried() {
    let (mut flow, store, http) = coordinator(Role::SuperAdmin).await;
    http.reply_after(Duration::from_secs(5), json!({ "message": "assigned" }));

    let attempt = tokio::time::timeout(
        Duration::from_millis(50),
        flow.assign(1, vec![summary(7, "Ravi")]),
    )
    .await;
    assert!(attempt.is_err());
    assert_eq!(flow.state(), AssignState::Idle);
    assert_eq!(store.pending(1), 0);

    http.reply(json!({ "message": "assigned" }));
    let state = flow.assign(1, vec![summary(8, "Anu")]).await.unwrap();
    assert_eq!(state, AssignState::Succeeded);
    assert_eq!(store.get(1).unwrap().assignee_ids(), vec![8]);
}

#[tokio::test]
async fn test_cancelled_reassignment_request_returns_to_denied() {
    let (mut flow, _, http) = coordinator(Role::Admin).await;
    http.fail(super_admin_conflict());
    flow.assign(2, vec![summary(7, "Ravi")]).await.unwrap();

    http.reply_after(Duration::from_secs(5), Value::Null);
    let attempt =
        tokio::time::timeout(Duration::from_millis(50), flow.request_reassignment()).await;
    assert!(attempt.is_err());
    assert_eq!(flow.state(), AssignState::PermissionDenied);
    assert_eq!(flow.target_lead(), Some(2));
    assert_eq!(flow.cancel().unwrap(), AssignState::Idle);
}

#[tokio::test]
async fn test_bulk_assign_after_slower_single_assign_wins() {
    let (api, http) = api_as(user(1, "Meera", Role::SuperAdmin));
    let store = LeadStore::new();
    http.reply(json!([lead_json(1, vec![]), lead_json(2, vec![])]));
    LeadService::new(api.clone(), store.clone())
        .load_for_session()
        .await
        .unwrap();
    let mut single = AssignmentCoordinator::new(api.clone(), store.clone()).unwrap();
    let bulk = AssignmentCoordinator::new(api, store.clone()).unwrap();

    // The single assignment is issued first but answered last
    http.reply_after(Duration::from_millis(100), json!({ "message": "assigned" }));
    http.reply(json!({ "message": "ok" }));

    let (single_state, bulk_outcome) = tokio::join!(
        single.assign(1, vec![summary(7, "Ravi")]),
        bulk.bulk_assign(&[1, 2], vec![summary(8, "Anu")]),
    );
    assert_eq!(single_state.unwrap(), AssignState::Succeeded);
    assert_eq!(bulk_outcome.unwrap(), PatchOutcome::Applied);

    assert_eq!(store.get(1).unwrap().assignee_ids(), vec![8]);
    assert_eq!(store.get(2).unwrap().assignee_ids(), vec![8]);
    assert_eq!(store.pending(1), 0);
}
