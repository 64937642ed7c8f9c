// tests/download_test.rs

//! Direct tests of the download pipeline.

mod common;

use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;

use common::{sha256_hex, TestServer};
use extup::download::download;
use extup::{Error, SilentProgress};

#[test]
fn download_plain_artifact() {
    let content = b"raw image bytes".to_vec();
    let mut files = HashMap::new();
    files.insert("myext_1.0.0.raw".to_string(), content.clone());
    let server = TestServer::serve(files);

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("myext_1.0.0.raw");
    let progress = SilentProgress::new();

    download(
        &format!("{}/myext_1.0.0.raw", server.url()),
        &target,
        &sha256_hex(&content),
        0o640,
        &progress,
    )
    .unwrap();

    assert_eq!(fs::read(&target).unwrap(), content);
    let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o640);
    assert_eq!(progress.position(), content.len() as u64);
}

#[test]
fn download_creates_parent_directories() {
    let content = b"payload".to_vec();
    let mut files = HashMap::new();
    files.insert("a.raw".to_string(), content.clone());
    let server = TestServer::serve(files);

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested/staging/a.raw");

    download(
        &format!("{}/a.raw", server.url()),
        &target,
        &sha256_hex(&content),
        0,
        &SilentProgress::new(),
    )
    .unwrap();

    assert!(target.exists());
    // Mode 0 falls back to 0644
    let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);

    // Created parent directories get a fixed 0755, independent of umask
    let dir_mode = fs::metadata(target.parent().unwrap())
        .unwrap()
        .permissions()
        .mode()
        & 0o777;
    assert_eq!(dir_mode, 0o755);
}

#[test]
fn download_decompresses_by_url_suffix() {
    let payload = b"the actual image".to_vec();
    let compressed = common::gzip(&payload);
    let mut files = HashMap::new();
    files.insert("img_1.0.0.raw.gz".to_string(), compressed.clone());
    let server = TestServer::serve(files);

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("img_1.0.0.raw");

    // The digest covers the compressed bytes as delivered
    download(
        &format!("{}/img_1.0.0.raw.gz", server.url()),
        &target,
        &sha256_hex(&compressed),
        0,
        &SilentProgress::new(),
    )
    .unwrap();

    assert_eq!(fs::read(&target).unwrap(), payload);
}

#[test]
fn download_hash_mismatch_removes_temp_and_target_untouched() {
    let content = b"delivered".to_vec();
    let mut files = HashMap::new();
    files.insert("x.raw".to_string(), content);
    let server = TestServer::serve(files);

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("x.raw");

    let err = download(
        &format!("{}/x.raw", server.url()),
        &target,
        &sha256_hex(b"expected something else"),
        0,
        &SilentProgress::new(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::Integrity { .. }));
    assert!(!target.exists());
    assert_eq!(common::dir_entries(dir.path()), Vec::<String>::new());
}

#[test]
fn download_http_error_is_network_error() {
    let server = TestServer::serve(HashMap::new());
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("missing.raw");

    let err = download(
        &format!("{}/missing.raw", server.url()),
        &target,
        &sha256_hex(b""),
        0,
        &SilentProgress::new(),
    )
    .unwrap_err();

    assert!(matches!(err, Error::Network(_)));
    assert!(!target.exists());
    assert_eq!(common::dir_entries(dir.path()), Vec::<String>::new());
}

#[test]
fn download_overwrites_existing_target_atomically() {
    let content = b"new version".to_vec();
    let mut files = HashMap::new();
    files.insert("y.raw".to_string(), content.clone());
    let server = TestServer::serve(files);

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("y.raw");
    fs::write(&target, b"old version").unwrap();

    download(
        &format!("{}/y.raw", server.url()),
        &target,
        &sha256_hex(&content),
        0,
        &SilentProgress::new(),
    )
    .unwrap();

    assert_eq!(fs::read(&target).unwrap(), content);
}
