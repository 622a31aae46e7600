//! Integration tests for `SnapLabel`
//!
//! Drives the account flows and the label workflow end to end over the HTTP
//! gateway against a mocked labeling service.

use serde_json::json;
use snaplabel::{
    SnapLabelError,
    api::HttpGateway,
    auth::{AccountFlow, AuthOutcome},
    config::ApiSettings,
    error::ErrorKind,
    navigation::{Notice, View},
    session::{FileSessionStore, MemorySessionStore, SessionStore},
    workflow::{
        ImageFile, LabelId, LabelOrigin, LabelWorkflow, Phase, WorkflowAction, WorkflowEvent,
    },
};
use std::sync::Arc;
use tokio::sync::mpsc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(server: &MockServer) -> Arc<HttpGateway> {
    let settings = ApiSettings {
        base_url: server.uri(),
        timeout_secs: 5,
    };
    Arc::new(HttpGateway::new(&settings).unwrap())
}

fn jpeg_file() -> ImageFile {
    ImageFile::new("beach.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00])
}

fn drain(events: &mut mpsc::UnboundedReceiver<WorkflowEvent>) -> Vec<WorkflowEvent> {
    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    received
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "AuthenticationResult": { "IdToken": token } }
        })))
        .mount(server)
        .await;
}

/// Test login, label generation, editing and submission in one session
#[tokio::test]
async fn test_full_labeling_session() {
    let server = MockServer::start().await;
    mount_login(&server, "token-1").await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header("auth-token", "token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "image_id": "img-9",
            "labels": ["beach", "sand", "person"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload2"))
        .and(header("auth-token", "token-1"))
        .and(body_json(json!({
            "image_id": "img-9",
            "final_labels": ["beach", "sand", "holiday"]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = gateway(&server);
    let session = Arc::new(MemorySessionStore::new());

    let outcome = AccountFlow::new(api.clone(), session.clone())
        .login("a@b.co", "Secret1!")
        .await
        .unwrap();
    assert_eq!(outcome, AuthOutcome::LoggedIn);
    assert_eq!(session.get_token().as_deref(), Some("token-1"));

    let (tx, mut events) = mpsc::unbounded_channel();
    let workflow = LabelWorkflow::new(api, session, tx);

    workflow.request_labels(jpeg_file()).await.unwrap();
    assert_eq!(workflow.phase(), Phase::LabelsReady);
    assert_eq!(workflow.image_id().as_deref(), Some("img-9"));

    assert!(
        workflow
            .remove_label(LabelId(2), LabelOrigin::Ai)
            .is_some()
    );
    workflow.add_custom_label("holiday").unwrap();
    assert_eq!(
        workflow.labels().final_labels(),
        vec!["beach", "sand", "holiday"]
    );

    drain(&mut events);
    workflow.submit().await.unwrap();

    let received = drain(&mut events);
    assert!(received.contains(&WorkflowEvent::Notice(Notice::success(
        "Data submitted successfully"
    ))));
    assert!(received.contains(&WorkflowEvent::Navigate(View::Search)));
    assert_eq!(workflow.phase(), Phase::Idle);
    assert!(workflow.labels().is_empty());
    assert!(workflow.image_id().is_none());
}

/// Test that an expired session fails the workflow and signals re-login
#[tokio::test]
async fn test_expired_session_fails_generation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthorized" })),
        )
        .mount(&server)
        .await;

    let session = Arc::new(MemorySessionStore::with_token("expired"));
    let (tx, mut events) = mpsc::unbounded_channel();
    let workflow = LabelWorkflow::new(gateway(&server), session, tx);

    let err = workflow.request_labels(jpeg_file()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);

    match workflow.phase() {
        Phase::Failed { action, cause } => {
            assert_eq!(action, WorkflowAction::GenerateLabels);
            assert_eq!(cause.kind, ErrorKind::Auth);
        }
        other => panic!("expected Failed, got {other}"),
    }
    assert!(drain(&mut events).contains(&WorkflowEvent::SessionRejected));
}

/// Test that a failed submission keeps labels and succeeds on retry
#[tokio::test]
async fn test_submit_retry_after_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "image_id": "img-3",
            "labels": ["tree"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload2"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(MemorySessionStore::with_token("token"));
    let (tx, _events) = mpsc::unbounded_channel();
    let workflow = LabelWorkflow::new(gateway(&server), session, tx);

    workflow.request_labels(jpeg_file()).await.unwrap();

    let err = workflow.submit().await.unwrap_err();
    assert!(matches!(
        err,
        SnapLabelError::UnexpectedStatus { status: 503, .. }
    ));
    assert!(matches!(
        workflow.phase(),
        Phase::Failed {
            action: WorkflowAction::Submit,
            ..
        }
    ));
    assert_eq!(workflow.labels().final_labels(), vec!["tree"]);

    workflow.retry().await.unwrap();
    assert_eq!(workflow.phase(), Phase::Idle);
}

/// Test that an invalid file never reaches the service
#[tokio::test]
async fn test_invalid_file_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = Arc::new(MemorySessionStore::with_token("token"));
    let (tx, _events) = mpsc::unbounded_channel();
    let workflow = LabelWorkflow::new(gateway(&server), session, tx);

    let gif = ImageFile::new("anim.gif", "image/gif", vec![b'G', b'I', b'F']);
    let err = workflow.request_labels(gif).await.unwrap_err();
    assert!(matches!(err, SnapLabelError::UnsupportedFileType(_)));

    let empty = ImageFile::new("empty.png", "image/png", Vec::new());
    let err = workflow.request_labels(empty).await.unwrap_err();
    assert!(matches!(err, SnapLabelError::EmptyFile(_)));

    assert_eq!(workflow.phase(), Phase::Idle);
}

/// Test that a login token persists across session store instances
#[tokio::test]
async fn test_login_persists_session_file() {
    let server = MockServer::start().await;
    mount_login(&server, "persisted-token").await;

    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileSessionStore::in_dir(dir.path()).unwrap());

    let flow = AccountFlow::new(gateway(&server), store.clone());
    flow.login("a@b.co", "Secret1!").await.unwrap();

    let reopened = FileSessionStore::in_dir(dir.path()).unwrap();
    assert_eq!(reopened.get_token().as_deref(), Some("persisted-token"));

    flow.logout().unwrap();
    let reopened = FileSessionStore::in_dir(dir.path()).unwrap();
    assert!(reopened.get_token().is_none());
}

/// Test that an unconfirmed login requests a fresh confirmation code
#[tokio::test]
async fn test_unconfirmed_login_requests_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "message": "User account not confirmed" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/request_confirm_code"))
        .and(body_json(json!({ "email": "new@b.co" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let session = Arc::new(MemorySessionStore::new());
    let outcome = AccountFlow::new(gateway(&server), session.clone())
        .login("new@b.co", "Secret1!")
        .await
        .unwrap();

    assert_eq!(
        outcome.next_view(),
        View::EnterConfirmationCode {
            email: "new@b.co".to_string()
        }
    );
    assert!(session.get_token().is_none());
}
