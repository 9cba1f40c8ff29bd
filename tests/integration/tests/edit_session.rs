//! End-to-end edit sessions against the in-memory store.
//!
//! `/bin/sh` plays the editor: each secret value is itself a small script
//! that rewrites (or leaves alone) the scratch file it is stored in.
#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use kse_core::{Error, SecretRef, StoreError};
use kse_integration_tests::{recording_value, self_editing_value, ScriptedPrompter};
use kse_session::{ExternalEditor, SessionOutcome, SessionRunner};
use kse_store::{MemorySecretStore, SecretStore};
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_secs(30);

fn editor() -> ExternalEditor {
    ExternalEditor::new("/bin/sh").unwrap()
}

fn recorded_buffer(record: &Path) -> PathBuf {
    PathBuf::from(std::fs::read_to_string(record).unwrap())
}

#[tokio::test]
async fn test_confirmed_edit_updates_only_that_key() {
    let dir = TempDir::new().unwrap();
    let record = dir.path().join("buffer-path");

    let store = MemorySecretStore::new();
    let secret = SecretRef::new("payments", "db-credentials");
    store.insert(
        secret.clone(),
        [
            ("password", self_editing_value(&record, "rotated")),
            ("username", "admin".to_string()),
        ],
    );

    let prompter = ScriptedPrompter::new(&["payments", "db-credentials", "password"], true);
    let editor = editor();
    let outcome = SessionRunner::new(&store, &editor, &prompter, TIMEOUT)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, SessionOutcome::Applied);
    assert_eq!(store.patch_calls(), 1);

    let data = store.fetch(&secret).await.unwrap();
    assert_eq!(data["password"].expose_secret(), b"rotated");
    assert_eq!(data["username"].expose_secret(), b"admin");

    let diffs = prompter.diffs.borrow();
    assert_eq!(diffs.len(), 1);
    assert!(diffs[0].contains("[-"));

    let buffer = recorded_buffer(&record);
    assert!(buffer
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("k8s-secret-editor-"));
    assert!(!buffer.exists());
}

#[tokio::test]
async fn test_untouched_value_is_not_written() {
    let dir = TempDir::new().unwrap();
    let record = dir.path().join("buffer-path");

    let store = MemorySecretStore::new();
    store.insert(
        SecretRef::new("default", "app"),
        [("token", recording_value(&record))],
    );

    let prompter = ScriptedPrompter::new(&["default", "app", "token"], true);
    let editor = editor();
    let outcome = SessionRunner::new(&store, &editor, &prompter, TIMEOUT)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, SessionOutcome::Unchanged);
    assert_eq!(store.patch_calls(), 0);
    assert!(prompter.diffs.borrow().is_empty());
    assert!(!recorded_buffer(&record).exists());
}

#[tokio::test]
async fn test_declined_save_keeps_stored_value() {
    let dir = TempDir::new().unwrap();
    let record = dir.path().join("buffer-path");
    let original = self_editing_value(&record, "oops");

    let store = MemorySecretStore::new();
    let secret = SecretRef::new("default", "app");
    store.insert(secret.clone(), [("token", original.clone())]);

    let prompter = ScriptedPrompter::new(&["default", "app", "token"], false);
    let editor = editor();
    let outcome = SessionRunner::new(&store, &editor, &prompter, TIMEOUT)
        .run()
        .await
        .unwrap();

    assert_eq!(outcome, SessionOutcome::Cancelled);
    assert_eq!(store.patch_calls(), 0);
    let data = store.fetch(&secret).await.unwrap();
    assert_eq!(data["token"].expose_secret(), original.as_bytes());
    assert!(!recorded_buffer(&record).exists());
}

#[tokio::test]
async fn test_failing_editor_aborts_session() {
    let dir = TempDir::new().unwrap();
    let record = dir.path().join("buffer-path");

    let store = MemorySecretStore::new();
    store.insert(
        SecretRef::new("default", "app"),
        [("token", format!("{}; exit 3", recording_value(&record)))],
    );

    let prompter = ScriptedPrompter::new(&["default", "app", "token"], true);
    let editor = editor();
    let result = SessionRunner::new(&store, &editor, &prompter, TIMEOUT)
        .run()
        .await;

    assert!(matches!(result, Err(Error::Editor(_))));
    assert_eq!(store.patch_calls(), 0);
    assert!(!recorded_buffer(&record).exists());
}

#[tokio::test]
async fn test_progress_is_reported() {
    let store = MemorySecretStore::new();
    store.insert(SecretRef::new("default", "app"), [("k", "true")]);

    let prompter = ScriptedPrompter::new(&["default", "app", "k"], true);
    let editor = editor();
    SessionRunner::new(&store, &editor, &prompter, TIMEOUT)
        .run()
        .await
        .unwrap();

    let notices = prompter.notices.borrow();
    assert_eq!(
        *notices,
        vec![
            "Loading namespaces...".to_string(),
            "Loading secrets in namespace 'default'...".to_string(),
            "Loading secret 'app' in namespace 'default'...".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_namespace_without_secrets() {
    let store = MemorySecretStore::new();
    store.add_namespace("empty");

    let prompter = ScriptedPrompter::new(&["empty"], true);
    let editor = editor();
    let result = SessionRunner::new(&store, &editor, &prompter, TIMEOUT)
        .run()
        .await;

    match result {
        Err(Error::Store(StoreError::Empty(what))) => assert!(what.contains("empty")),
        other => panic!("expected empty-list error, got {other:?}"),
    }
}
