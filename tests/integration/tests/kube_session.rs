//! Edit sessions against a mocked Kubernetes API server.
#![cfg(unix)]

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};
use kse_core::{Error, StoreError};
use kse_integration_tests::{self_editing_value, ScriptedPrompter};
use kse_session::{ExternalEditor, SessionOutcome, SessionRunner};
use kse_store::KubeSecretStore;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET_PATH: &str = "/api/v1/namespaces/prod/secrets/api-keys";

fn write_kubeconfig(dir: &TempDir, server: &MockServer) -> std::path::PathBuf {
    let kubeconfig = dir.path().join("config");
    std::fs::write(
        &kubeconfig,
        format!(
            r#"apiVersion: v1
kind: Config
current-context: test
clusters:
- name: test
  cluster:
    server: {}
contexts:
- name: test
  context:
    cluster: test
    user: tester
users:
- name: tester
  user:
    token: integration-token
"#,
            server.uri()
        ),
    )
    .unwrap();
    kubeconfig
}

async fn mount_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces"))
        .and(header("authorization", "Bearer integration-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"metadata": {"name": "prod"}}, {"metadata": {"name": "default"}}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/namespaces/prod/secrets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"metadata": {"name": "api-keys"}}]
        })))
        .mount(server)
        .await;
}

fn secret_body(stripe: &str) -> serde_json::Value {
    json!({
        "apiVersion": "v1",
        "kind": "Secret",
        "metadata": {"name": "api-keys", "namespace": "prod", "resourceVersion": "7"},
        "type": "Opaque",
        "data": {
            "stripe": STANDARD.encode(stripe),
            "github": STANDARD.encode("ghp_unchanged")
        }
    })
}

#[tokio::test]
async fn test_edit_is_written_back_with_resource_version() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let record = dir.path().join("buffer-path");
    mount_listing(&server).await;

    Mock::given(method("GET"))
        .and(path(SECRET_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(secret_body(&self_editing_value(&record, "sk_live_new"))),
        )
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(SECRET_PATH))
        .and(body_partial_json(json!({
            "metadata": {"resourceVersion": "7"},
            "data": {
                "stripe": STANDARD.encode("sk_live_new"),
                "github": STANDARD.encode("ghp_unchanged")
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let store = KubeSecretStore::from_kubeconfig(&write_kubeconfig(&dir, &server)).unwrap();
    let editor = ExternalEditor::new("/bin/sh").unwrap();
    let prompter = ScriptedPrompter::new(&["prod", "api-keys", "stripe"], true);

    let outcome = SessionRunner::new(&store, &editor, &prompter, Duration::from_secs(5))
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, SessionOutcome::Applied);
}

#[tokio::test]
async fn test_concurrent_change_is_reported_as_conflict() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let record = dir.path().join("buffer-path");
    mount_listing(&server).await;

    Mock::given(method("GET"))
        .and(path(SECRET_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(secret_body(&self_editing_value(&record, "sk_live_new"))),
        )
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(SECRET_PATH))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "kind": "Status",
            "message": "the object has been modified",
            "code": 409
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = KubeSecretStore::from_kubeconfig(&write_kubeconfig(&dir, &server)).unwrap();
    let editor = ExternalEditor::new("/bin/sh").unwrap();
    let prompter = ScriptedPrompter::new(&["prod", "api-keys", "stripe"], true);

    let result = SessionRunner::new(&store, &editor, &prompter, Duration::from_secs(5))
        .run()
        .await;

    assert!(matches!(result, Err(Error::Store(StoreError::Conflict(_)))));
}

#[tokio::test]
async fn test_declined_save_sends_no_update() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let record = dir.path().join("buffer-path");
    mount_listing(&server).await;

    Mock::given(method("GET"))
        .and(path(SECRET_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(secret_body(&self_editing_value(&record, "changed"))),
        )
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = KubeSecretStore::from_kubeconfig(&write_kubeconfig(&dir, &server)).unwrap();
    let editor = ExternalEditor::new("/bin/sh").unwrap();
    let prompter = ScriptedPrompter::new(&["prod", "api-keys", "stripe"], false);

    let outcome = SessionRunner::new(&store, &editor, &prompter, Duration::from_secs(5))
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, SessionOutcome::Cancelled);
}
