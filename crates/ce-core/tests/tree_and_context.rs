// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Lazy directory loading, context switches and the file index

mod common;

use ce_config::SearchConfig;
use ce_core::{ControllerOptions, TreeNode};
use ce_domain_types::{LoadState, RepositoryContext};
use common::{signed_in, FakeHost};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn project() -> Arc<FakeHost> {
    FakeHost::with_files(&[
        ("README.md", "readme"),
        ("docs/guide.md", "guide"),
        ("docs/api/index.md", "api"),
        ("src/main.rs", "fn main() {}"),
    ])
}

#[tokio::test]
async fn expanding_lists_each_directory_once() {
    let host = project();
    let controller = signed_in(&host, ControllerOptions::default());

    controller.load_root().await.unwrap();
    assert_eq!(host.list_count(""), 1);
    let root = controller.tree();
    assert!(root.loaded && root.expanded);
    let names: Vec<_> = root.children().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["docs", "src", "README.md"]);

    controller.expand("docs").await.unwrap();
    assert_eq!(host.list_count("docs"), 1);

    // Still expanded, then collapsed and re-expanded: no further listing
    controller.expand("docs").await.unwrap();
    controller.collapse("docs");
    assert!(!controller.tree().children()[0].expanded);
    controller.expand("docs").await.unwrap();
    assert_eq!(host.list_count("docs"), 1);
    assert!(controller.tree().children()[0].expanded);

    assert_eq!(controller.flatten(), vec!["docs/guide.md", "README.md"]);
}

#[tokio::test]
async fn patching_shares_untouched_subtrees() {
    let host = project();
    let controller = signed_in(&host, ControllerOptions::default());
    controller.load_root().await.unwrap();
    controller.expand("src").await.unwrap();

    let before = controller.tree();
    controller.expand("docs").await.unwrap();
    let after = controller.tree();

    assert!(!Arc::ptr_eq(&before, &after));
    assert!(!Arc::ptr_eq(&before.children()[0], &after.children()[0]));
    assert!(Arc::ptr_eq(&before.children()[1], &after.children()[1]));
    // The old root is left as it was
    assert!(!before.children()[0].loaded);
}

#[tokio::test(start_paused = true)]
async fn concurrent_expansions_share_one_listing() {
    let host = project();
    host.delay_list("", Duration::from_millis(30));
    let controller = signed_in(&host, ControllerOptions::default());

    let (a, b) = tokio::join!(controller.load_root(), controller.load_root());
    a.unwrap();
    b.unwrap();
    assert_eq!(host.list_count(""), 1);
}

#[tokio::test]
async fn failed_listing_can_be_retried() {
    let host = project();
    let controller = signed_in(&host, ControllerOptions::default());
    controller.load_root().await.unwrap();

    host.remove("src/main.rs");
    let err = controller.expand("src").await.unwrap_err();
    assert!(err.is_not_found());
    let src = controller.tree().children()[1].clone();
    assert!(!src.loaded && !src.loading && !src.expanded);

    host.external_write("src/lib.rs", "");
    controller.expand("src").await.unwrap();
    assert_eq!(host.list_count("src"), 2);
    assert_eq!(controller.tree().children()[1].children()[0].path, "src/lib.rs");
}

#[tokio::test(start_paused = true)]
async fn switching_context_discards_inflight_listing() {
    let host = project();
    host.delay_list("", Duration::from_millis(50));
    let controller = signed_in(&host, ControllerOptions::default());
    controller.new_file("draft.md").unwrap();

    let other = RepositoryContext::new("octo", "notes", "dev");
    let switch = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(controller.set_context(other.clone()));
    };
    let (loaded, ()) = tokio::join!(controller.load_root(), switch);
    loaded.unwrap();

    assert_eq!(controller.context(), other);
    assert_eq!(*controller.tree(), TreeNode::root());
    let session = controller.session();
    assert_eq!(session.path, "");
    assert_eq!(session.version_token, None);
    assert_eq!(session.load_state, LoadState::Idle);

    // The new context loads on its own
    controller.load_root().await.unwrap();
    assert_eq!(host.list_count(""), 2);
    assert!(controller.tree().loaded);
}

#[tokio::test]
async fn filtered_view_is_stable_and_leaves_tree_alone() {
    let host = project();
    let controller = signed_in(&host, ControllerOptions::default());
    controller.load_root().await.unwrap();
    controller.expand("docs").await.unwrap();
    controller.expand("docs/api").await.unwrap();
    controller.collapse("docs");

    let first = controller.filtered_tree("INDEX");
    let second = controller.filtered_tree("INDEX");
    assert_eq!(first, second);

    let docs = &first.children()[0];
    assert!(docs.expanded);
    assert_eq!(docs.children().len(), 1);
    assert_eq!(docs.children()[0].children()[0].path, "docs/api/index.md");

    assert_eq!(controller.filtered_tree(""), *controller.tree());
    assert!(!controller.tree().children()[0].expanded);
}

#[tokio::test]
async fn index_is_bounded_by_configuration() {
    let host = project();
    let options = ControllerOptions {
        search: SearchConfig {
            max_depth: 1,
            max_files: 500,
        },
        ..ControllerOptions::default()
    };
    let controller = signed_in(&host, options);

    let index = controller.index().await.unwrap();
    assert_eq!(index.files, vec!["README.md", "docs/guide.md", "src/main.rs"]);
    assert!(index.truncated);

    let options = ControllerOptions {
        search: SearchConfig {
            max_depth: 4,
            max_files: 2,
        },
        ..ControllerOptions::default()
    };
    let controller = signed_in(&host, options);
    let index = controller.index().await.unwrap();
    assert_eq!(index.files.len(), 2);
    assert!(index.truncated);
}
