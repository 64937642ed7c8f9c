// tests/remove_workflow.rs

//! Removal scenarios.

mod common;

use std::collections::HashMap;
use std::fs;

use common::{manifest_for, TestEnv};
use extup::client::{RemoveOptions, UpdateOptions};
use extup::Error;

fn env_with_installed(component: &str) -> TestEnv {
    let artifact = format!("{component}_1.0.0.raw");
    let content = b"image".to_vec();
    let mut files = HashMap::new();
    files.insert(
        "SHA256SUMS".to_string(),
        manifest_for(&[(&artifact, &content)]).into_bytes(),
    );
    files.insert(artifact, content);

    let env = TestEnv::new(files);
    env.add_component(component);
    env.client
        .update(&UpdateOptions {
            no_refresh: true,
            ..UpdateOptions::default()
        })
        .unwrap();
    env
}

#[test]
fn update_then_remove_cleans_everything() {
    let env = env_with_installed("myext");
    assert!(env.staged("myext_1.0.0.raw").exists());
    assert!(env.sysext_dir.path().join("myext.raw").exists());

    let result = env
        .client
        .remove("myext", &RemoveOptions::default())
        .unwrap();
    assert!(result.success);
    assert!(result.removed_symlink);
    assert!(!result.unmerged);
    assert_eq!(result.removed_files.len(), 2); // staging symlink + artifact

    assert!(!env.staged("myext_1.0.0.raw").exists());
    assert!(fs::symlink_metadata(env.staged("myext.raw")).is_err());
    assert!(fs::symlink_metadata(env.sysext_dir.path().join("myext.raw")).is_err());
}

#[test]
fn remove_now_unmerges_and_refreshes() {
    let env = env_with_installed("myext");

    let result = env
        .client
        .remove(
            "myext",
            &RemoveOptions {
                now: true,
                no_refresh: false,
            },
        )
        .unwrap();
    assert!(result.unmerged);
    assert!(env.runner.called("unmerge"));
    assert!(env.runner.called("refresh"));
}

#[test]
fn remove_unknown_component_fails() {
    let env = TestEnv::new(HashMap::new());
    let err = env
        .client
        .remove("ghost", &RemoveOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn remove_with_nothing_staged_reports_no_files() {
    let content = b"image".to_vec();
    let mut files = HashMap::new();
    files.insert(
        "SHA256SUMS".to_string(),
        manifest_for(&[("myext_1.0.0.raw", &content)]).into_bytes(),
    );
    let env = TestEnv::new(files);
    env.add_component("myext");

    let result = env
        .client
        .remove("myext", &RemoveOptions::default())
        .unwrap();
    assert!(result.success);
    assert!(result.removed_files.is_empty());
}

#[test]
fn vacuum_via_client_respects_protection() {
    let env = TestEnv::new(HashMap::new());
    env.add_component_with("myext", "InstancesMax=1\nProtectVersion=1.0.0\n");
    env.stage_file("myext_1.0.0.raw", b"one");
    env.stage_file("myext_2.0.0.raw", b"two");
    env.stage_file("myext_3.0.0.raw", b"three");

    let results = env
        .client
        .vacuum(&extup::client::VacuumOptions::default())
        .unwrap();
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.removed, vec!["2.0.0"]);
    assert_eq!(result.kept, vec!["3.0.0", "1.0.0"]);
    assert!(env.staged("myext_1.0.0.raw").exists());
    assert!(!env.staged("myext_2.0.0.raw").exists());
    assert!(env.staged("myext_3.0.0.raw").exists());
}

#[test]
fn pending_reports_staged_not_active() {
    let env = TestEnv::new(HashMap::new());
    env.add_component("myext");
    env.stage_file("myext_2.0.0.raw", b"two");

    // Nothing active yet: pending
    let results = env
        .client
        .pending(&extup::client::PendingOptions::default())
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].pending);
    assert_eq!(results[0].installed_version, "2.0.0");

    // Activator has merged 2.0.0: no longer pending
    fs::write(env.run_dir.path().join("myext_2.0.0.raw"), b"merged").unwrap();
    let results = env
        .client
        .pending(&extup::client::PendingOptions::default())
        .unwrap();
    assert!(!results[0].pending);
    assert_eq!(results[0].active_version, "2.0.0");
}
