// tests/features_workflow.rs

//! Feature enable/disable scenarios, including the merge-state guard.

mod common;

use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;

use common::{manifest_for, TestEnv};
use extup::client::{DisableFeatureOptions, EnableFeatureOptions};
use extup::Error;

fn env_with_feature_component(feature: &str, component: &str, content: &[u8]) -> TestEnv {
    let artifact = format!("{component}_1.0.0.raw");
    let mut files = HashMap::new();
    files.insert(
        "SHA256SUMS".to_string(),
        manifest_for(&[(&artifact, content)]).into_bytes(),
    );
    files.insert(artifact, content.to_vec());

    let env = TestEnv::new(files);
    env.add_component_with(component, &format!("Features={feature}\n"));
    env
}

#[test]
fn enable_writes_dropin() {
    let env = env_with_feature_component("docker", "dockerext", b"image");
    env.add_feature("docker", false);

    let result = env
        .client
        .enable_feature("docker", &EnableFeatureOptions::default())
        .unwrap();
    assert!(result.success);

    let dropin = env.feature_dropin("docker");
    assert_eq!(
        fs::read_to_string(&dropin).unwrap(),
        "[Feature]\nEnabled=true\n"
    );

    // Drop-in directory and file carry fixed modes, independent of umask
    let dir_mode = fs::metadata(dropin.parent().unwrap())
        .unwrap()
        .permissions()
        .mode()
        & 0o777;
    assert_eq!(dir_mode, 0o755);
    let file_mode = fs::metadata(&dropin).unwrap().permissions().mode() & 0o777;
    assert_eq!(file_mode, 0o644);

    // The feature now reports enabled
    let features = env.client.features().unwrap();
    assert!(features.iter().any(|f| f.name == "docker" && f.enabled));
}

#[test]
fn enable_now_downloads_feature_transfers() {
    let env = env_with_feature_component("docker", "dockerext", b"image");
    env.add_feature("docker", false);

    let result = env
        .client
        .enable_feature(
            "docker",
            &EnableFeatureOptions {
                now: true,
                no_refresh: true,
                ..EnableFeatureOptions::default()
            },
        )
        .unwrap();
    assert!(result.success);
    assert_eq!(result.downloaded_files, vec!["dockerext"]);
    assert!(env.staged("dockerext_1.0.0.raw").exists());
}

#[test]
fn dry_run_enable_with_now_changes_nothing() {
    let env = env_with_feature_component("docker", "dockerext", b"image");
    env.add_feature("docker", false);

    let result = env
        .client
        .enable_feature(
            "docker",
            &EnableFeatureOptions {
                now: true,
                dry_run: true,
                ..EnableFeatureOptions::default()
            },
        )
        .unwrap();

    assert!(result.success);
    assert!(result.dry_run);
    // Intended actions are recorded
    assert_eq!(result.downloaded_files, vec!["dockerext (would update)"]);
    // Nothing on disk changed: no drop-in, no artifact
    assert!(!env.feature_dropin("docker").exists());
    assert!(!env.staged("dockerext_1.0.0.raw").exists());
    assert!(!env.runner.called("refresh"));
}

#[test]
fn enable_missing_feature_fails() {
    let env = TestEnv::new(HashMap::new());
    let err = env
        .client
        .enable_feature("ghost", &EnableFeatureOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn enable_masked_feature_fails() {
    let env = TestEnv::new(HashMap::new());
    std::os::unix::fs::symlink("/dev/null", env.config_dir.path().join("hidden.feature")).unwrap();

    let err = env
        .client
        .enable_feature("hidden", &EnableFeatureOptions::default())
        .unwrap_err();
    assert!(err.to_string().contains("masked"));
    assert!(!env.feature_dropin("hidden").exists());
}

#[test]
fn disable_active_feature_without_force_fails() {
    let env = env_with_feature_component("docker", "dockerext", b"image");
    env.add_feature("docker", true);

    // The extension is staged and its current symlink resolves
    env.stage_file("dockerext_1.0.0.raw", b"image");
    env.stage_symlink("dockerext.raw", "dockerext_1.0.0.raw");

    let err = env
        .client
        .disable_feature(
            "docker",
            &DisableFeatureOptions {
                now: true,
                ..DisableFeatureOptions::default()
            },
        )
        .unwrap_err();

    assert!(matches!(err, Error::Active(_)));
    // Guard ran before anything destructive: no drop-in, files untouched
    assert!(!env.feature_dropin("docker").exists());
    assert!(env.staged("dockerext_1.0.0.raw").exists());
    assert!(!env.runner.called("unmerge"));
}

#[test]
fn disable_active_feature_with_force_removes_files() {
    let env = env_with_feature_component("docker", "dockerext", b"image");
    env.add_feature("docker", true);
    env.stage_file("dockerext_1.0.0.raw", b"image");
    env.stage_symlink("dockerext.raw", "dockerext_1.0.0.raw");

    let result = env
        .client
        .disable_feature(
            "docker",
            &DisableFeatureOptions {
                now: true,
                force: true,
                no_refresh: true,
                ..DisableFeatureOptions::default()
            },
        )
        .unwrap();

    assert!(result.success);
    assert!(result.unmerged);
    assert!(env.runner.called("unmerge"));
    assert!(!env.staged("dockerext_1.0.0.raw").exists());
    assert!(fs::symlink_metadata(env.staged("dockerext.raw")).is_err());
    assert_eq!(
        fs::read_to_string(env.feature_dropin("docker")).unwrap(),
        "[Feature]\nEnabled=false\n"
    );
}

#[test]
fn disable_without_now_keeps_artifacts() {
    let env = env_with_feature_component("docker", "dockerext", b"image");
    env.add_feature("docker", true);
    env.stage_file("dockerext_1.0.0.raw", b"image");

    let result = env
        .client
        .disable_feature("docker", &DisableFeatureOptions::default())
        .unwrap();

    assert!(result.success);
    assert!(!result.unmerged);
    assert!(env.staged("dockerext_1.0.0.raw").exists());
    assert_eq!(
        fs::read_to_string(env.feature_dropin("docker")).unwrap(),
        "[Feature]\nEnabled=false\n"
    );
}

#[test]
fn enable_then_disable_then_enable_roundtrip() {
    let env = env_with_feature_component("docker", "dockerext", b"image");
    env.add_feature("docker", false);

    env.client
        .enable_feature("docker", &EnableFeatureOptions::default())
        .unwrap();
    env.client
        .disable_feature("docker", &DisableFeatureOptions::default())
        .unwrap();

    let features = env.client.features().unwrap();
    let docker = features.iter().find(|f| f.name == "docker").unwrap();
    assert!(!docker.enabled);

    // Enable again overwrites the drop-in and must succeed
    env.client
        .enable_feature("docker", &EnableFeatureOptions::default())
        .unwrap();
    let features = env.client.features().unwrap();
    assert!(features.iter().any(|f| f.name == "docker" && f.enabled));
}

#[test]
fn feature_gating_hides_transfers_from_update() {
    let env = env_with_feature_component("docker", "dockerext", b"image");
    env.add_feature("docker", false);

    // Feature disabled: the gated transfer is not updated
    let results = env
        .client
        .update(&extup::client::UpdateOptions {
            no_refresh: true,
            ..Default::default()
        })
        .unwrap();
    assert!(results.is_empty());
    assert!(!env.staged("dockerext_1.0.0.raw").exists());
}

#[test]
fn features_list_reports_transfer_membership() {
    let env = env_with_feature_component("docker", "dockerext", b"image");
    env.add_feature("docker", true);

    let features = env.client.features().unwrap();
    let docker = features.iter().find(|f| f.name == "docker").unwrap();
    assert_eq!(docker.transfers, vec!["dockerext"]);
}
