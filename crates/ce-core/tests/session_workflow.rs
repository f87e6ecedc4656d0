// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Open / save / delete workflow against an in-memory host

mod common;

use ce_core::{ControllerOptions, EditorController, Error, HistoryStore, PendingAction};
use ce_domain_types::{LoadState, VersionToken};
use common::{ctx, signed_in, FakeHost};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn save_carries_the_token_returned_by_open() {
    let host = FakeHost::with_files(&[("a.md", "hello")]);
    let t1 = host.version_of("a.md").unwrap();
    let controller = signed_in(&host, ControllerOptions::default());

    controller.open("a.md").await.unwrap();
    let session = controller.session();
    assert_eq!(session.content, "hello");
    assert_eq!(session.version_token, Some(t1.clone()));
    assert_eq!(session.load_state, LoadState::Loaded);

    controller.set_content("hello world");
    let outcome = controller.save(None).await.unwrap();

    let put = host.last_put().unwrap();
    assert_eq!(put.version, Some(t1));
    assert_eq!(put.message, "Update a.md");
    assert_eq!(put.text, "hello world");

    let session = controller.session();
    assert_eq!(session.version_token, Some(outcome.version.clone()));
    assert_eq!(host.version_of("a.md"), Some(outcome.version));
    assert_eq!(session.save_state, LoadState::Loaded);
}

#[tokio::test]
async fn conflict_keeps_the_stale_token() {
    let host = FakeHost::with_files(&[("a.md", "hello")]);
    let t1 = host.version_of("a.md").unwrap();
    let controller = signed_in(&host, ControllerOptions::default());
    controller.open("a.md").await.unwrap();

    let t2 = host.external_write("a.md", "changed elsewhere");
    assert_ne!(t1, t2);

    controller.set_content("my edit");
    let err = controller.save(Some("mine")).await.unwrap_err();
    assert!(err.is_conflict());

    let session = controller.session();
    assert_eq!(session.version_token, Some(t1));
    assert_eq!(session.content, "my edit");
    assert_eq!(session.save_state, LoadState::Error);
    assert_eq!(
        session.last_error.as_deref(),
        Some("conflict: changed upstream, re-open before saving")
    );
    assert_eq!(host.text_of("a.md").as_deref(), Some("changed elsewhere"));

    // A blind retry hits the same conflict
    assert!(controller.save(Some("mine")).await.unwrap_err().is_conflict());
}

#[tokio::test]
async fn new_file_takes_the_create_path() {
    let host = FakeHost::new();
    let controller = signed_in(&host, ControllerOptions::default());

    let err = controller.open("notes/new.md").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        controller.session().last_error.as_deref(),
        Some("not found or insufficient permission: notes/new.md")
    );

    controller.new_file("notes/new.md").unwrap();
    controller.set_content("# New");
    let outcome = controller.save(Some("  ")).await.unwrap();

    let put = host.last_put().unwrap();
    assert_eq!(put.version, None);
    assert_eq!(put.message, "Update notes/new.md");
    assert_eq!(controller.session().version_token, Some(outcome.version));

    // Saved once, the next save is an update
    controller.set_content("# New\n\nmore");
    controller.save(None).await.unwrap();
    assert!(host.last_put().unwrap().version.is_some());
}

#[tokio::test]
async fn failed_open_keeps_the_loaded_file() {
    let host = FakeHost::with_files(&[("a.md", "hello")]);
    let controller = signed_in(&host, ControllerOptions::default());
    controller.open("a.md").await.unwrap();
    controller.set_content("unsaved");

    assert!(controller.open("missing.md").await.is_err());

    let session = controller.session();
    assert_eq!(session.path, "a.md");
    assert_eq!(session.content, "unsaved");
    assert_eq!(session.load_state, LoadState::Error);
    assert!(session.version_token.is_some());
}

#[tokio::test]
async fn file_kept_after_failed_open_can_still_be_deleted() {
    let host = FakeHost::with_files(&[("a.md", "hello")]);
    let controller = signed_in(&host, ControllerOptions::default());
    controller.open("a.md").await.unwrap();
    let token = controller.session().version_token.unwrap();

    assert!(controller.open("missing.md").await.is_err());

    controller.request_delete("a.md").unwrap();
    controller.confirm_pending(None).await.unwrap();

    let deletes = host.deletes.lock().unwrap().clone();
    assert_eq!(deletes, vec![("a.md".to_string(), "Delete a.md".to_string(), token)]);
    assert_eq!(host.text_of("a.md"), None);
}

#[tokio::test]
async fn delete_requires_the_open_file_and_clears_the_session() {
    let host = FakeHost::with_files(&[("a.md", "hello"), ("b.md", "other")]);
    let controller = signed_in(&host, ControllerOptions::default());

    assert!(matches!(
        controller.delete("a.md", None).await,
        Err(Error::NotOpen(_))
    ));

    controller.open("a.md").await.unwrap();
    assert!(matches!(
        controller.delete("b.md", None).await,
        Err(Error::NotOpen(_))
    ));

    let token = controller.session().version_token.unwrap();
    controller.delete("a.md", None).await.unwrap();

    let deletes = host.deletes.lock().unwrap().clone();
    assert_eq!(deletes, vec![("a.md".to_string(), "Delete a.md".to_string(), token)]);
    assert_eq!(host.text_of("a.md"), None);

    let session = controller.session();
    assert_eq!(session.content, "");
    assert_eq!(session.version_token, None);
    assert_eq!(session.load_state, LoadState::Idle);
}

#[tokio::test]
async fn delete_conflict_is_reported() {
    let host = FakeHost::with_files(&[("a.md", "hello")]);
    let controller = signed_in(&host, ControllerOptions::default());
    controller.open("a.md").await.unwrap();
    host.external_write("a.md", "moved on");

    let err = controller.delete("a.md", Some("bye")).await.unwrap_err();
    assert!(err.is_conflict());
    let session = controller.session();
    assert_eq!(session.path, "a.md");
    assert_eq!(
        session.last_error.as_deref(),
        Some("conflict: changed upstream, re-open before deleting")
    );
}

#[tokio::test]
async fn pending_delete_is_confirmed_or_cancelled() {
    let host = FakeHost::with_files(&[("a.md", "hello")]);
    let controller = signed_in(&host, ControllerOptions::default());
    controller.open("a.md").await.unwrap();

    controller.request_delete("a.md").unwrap();
    assert_eq!(
        controller.pending(),
        Some(PendingAction::Delete {
            path: "a.md".to_string()
        })
    );
    assert!(controller.cancel_pending());
    assert!(!controller.cancel_pending());
    assert!(host.text_of("a.md").is_some());

    controller.request_delete("a.md").unwrap();
    controller.confirm_pending(None).await.unwrap();
    assert_eq!(controller.pending(), None);
    assert_eq!(host.text_of("a.md"), None);
}

#[tokio::test]
async fn logout_clears_credential_session_and_pending() {
    let host = FakeHost::with_files(&[("a.md", "hello")]);
    let controller = signed_in(&host, ControllerOptions::default());
    controller.open("a.md").await.unwrap();
    controller.request_delete("a.md").unwrap();

    controller.logout();

    assert!(!controller.is_signed_in());
    assert_eq!(controller.pending(), None);
    assert_eq!(controller.session().version_token, None);
    assert!(matches!(controller.open("a.md").await, Err(Error::NotSignedIn)));
}

#[tokio::test]
async fn rejected_identity_check_signs_out() {
    let host = FakeHost::new();
    let controller = signed_in(&host, ControllerOptions::default());
    assert_eq!(controller.verify().await.unwrap().login, "octocat");

    host.reject_identity();
    assert!(controller.verify().await.is_err());
    assert!(!controller.is_signed_in());
}

#[tokio::test(start_paused = true)]
async fn late_save_does_not_overwrite_the_next_file() {
    let host = FakeHost::with_files(&[("a.md", "a"), ("b.md", "b")]);
    let controller = signed_in(&host, ControllerOptions::default());
    controller.open("a.md").await.unwrap();
    controller.set_content("a2");
    host.delay_write("a.md", Duration::from_millis(50));

    // Keep the write in flight while b.md gets opened
    let save = async {
        let outcome = controller.save(None).await.unwrap();
        outcome.version
    };
    let open_b = async {
        controller.open("b.md").await.unwrap();
    };
    let (saved_version, ()) = tokio::join!(save, open_b);

    let session = controller.session();
    assert_eq!(session.path, "b.md");
    assert_eq!(session.version_token, host.version_of("b.md"));
    assert_ne!(session.version_token, Some(saved_version));
    assert_eq!(host.text_of("a.md").as_deref(), Some("a2"));
}

#[tokio::test]
async fn opens_are_recorded_in_history() {
    let dir = TempDir::new().unwrap();
    let host = FakeHost::with_files(&[("a.md", "a"), ("b.md", "b")]);
    let controller = EditorController::new(ControllerOptions::default())
        .with_history(HistoryStore::new(dir.path(), 20, 20));
    controller.sign_in(Arc::clone(&host));
    controller.set_context(ctx());

    controller.open("a.md").await.unwrap();
    controller.open("b.md").await.unwrap();
    controller.open("a.md").await.unwrap();
    assert!(controller.open("missing.md").await.is_err());

    let recents: Vec<_> = controller.recents().await.into_iter().map(|e| e.path).collect();
    assert_eq!(recents, vec!["a.md", "b.md"]);

    // Logout leaves history alone
    controller.logout();
    let reopened = HistoryStore::new(dir.path(), 20, 20);
    assert_eq!(reopened.recents_for(&ctx()).await.len(), 2);
}

#[tokio::test]
async fn token_is_only_ever_what_the_host_returned() {
    let host = FakeHost::with_files(&[("a.md", "x")]);
    let controller = signed_in(&host, ControllerOptions::default());
    controller.open("a.md").await.unwrap();

    for round in 0..3 {
        controller.set_content(format!("round {round}"));
        let expected: Option<VersionToken> = host.version_of("a.md");
        controller.save(None).await.unwrap();
        assert_eq!(host.last_put().unwrap().version, expected);
        assert_eq!(controller.session().version_token, host.version_of("a.md"));
    }
}
