// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use sha2::{Digest, Sha256};
use tempfile::TempDir;

use extup::client::{Client, ClientConfig};
use extup::config::StaticIdentity;
use extup::sysext::RecordingRunner;
use extup::SilentProgress;

/// SHA-256 digest of a byte slice as lowercase hex
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Build SHA256SUMS content for (filename, content) pairs
pub fn manifest_for(files: &[(&str, &[u8])]) -> String {
    let mut out = String::new();
    for (name, content) in files {
        out.push_str(&format!("{}  {}\n", sha256_hex(content), name));
    }
    out
}

/// Gzip-compress a byte slice
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Minimal HTTP server serving a fixed path -> body map.
///
/// Paths are stored without the leading slash. Unknown paths get a 404.
pub struct TestServer {
    addr: String,
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub fn serve(files: HashMap<String, Vec<u8>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = format!("127.0.0.1:{}", listener.local_addr().unwrap().port());
        let files = Arc::new(Mutex::new(files));
        let shutdown = Arc::new(AtomicBool::new(false));

        let thread_files = files.clone();
        let thread_shutdown = shutdown.clone();
        let handle = std::thread::spawn(move || {
            for stream in listener.incoming() {
                if thread_shutdown.load(Ordering::SeqCst) {
                    break;
                }
                let Ok(stream) = stream else { continue };
                let _ = handle_connection(stream, &thread_files);
            }
        });

        Self {
            addr,
            files,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Base URL of the server, no trailing slash
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Add or replace a served path
    pub fn put(&self, path: &str, body: Vec<u8>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.trim_start_matches('/').to_string(), body);
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Unblock the accept loop
        let _ = TcpStream::connect(&self.addr);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn handle_connection(
    stream: TcpStream,
    files: &Arc<Mutex<HashMap<String, Vec<u8>>>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    // Drain headers
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 || line == "\r\n" || line == "\n" {
            break;
        }
    }

    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .trim_start_matches('/')
        .to_string();

    let mut stream = stream;
    match files.lock().unwrap().get(&path) {
        Some(body) => {
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )?;
            stream.write_all(body)?;
        }
        None => {
            write!(
                stream,
                "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            )?;
        }
    }
    stream.flush()
}

/// A complete test environment: temp directories for definitions, staging,
/// activation and runtime state, a test server, a recording activation
/// runner, and a client wired to all of them.
pub struct TestEnv {
    pub config_dir: TempDir,
    pub target_dir: TempDir,
    pub sysext_dir: TempDir,
    pub run_dir: TempDir,
    pub server: TestServer,
    pub runner: Arc<RecordingRunner>,
    pub client: Client,
}

impl TestEnv {
    pub fn new(files: HashMap<String, Vec<u8>>) -> Self {
        let config_dir = TempDir::new().unwrap();
        let target_dir = TempDir::new().unwrap();
        let sysext_dir = TempDir::new().unwrap();
        let run_dir = TempDir::new().unwrap();
        let server = TestServer::serve(files);
        let runner = Arc::new(RecordingRunner::new());

        let client = Client::new(ClientConfig {
            definitions: Some(config_dir.path().to_path_buf()),
            verify: false,
            sysext_dir: sysext_dir.path().to_path_buf(),
            run_extensions_dir: run_dir.path().to_path_buf(),
            progress: Arc::new(SilentProgress::new()),
            sysext_runner: runner.clone(),
            host: Arc::new(StaticIdentity(HashMap::new())),
            ..ClientConfig::default()
        });

        Self {
            config_dir,
            target_dir,
            sysext_dir,
            run_dir,
            server,
            runner,
            client,
        }
    }

    /// Write a transfer file for `component` pointing at the test server and
    /// the staging directory.
    pub fn add_component(&self, component: &str) {
        self.add_component_with(component, "");
    }

    /// Same, with extra lines appended to the `[Transfer]` section
    pub fn add_component_with(&self, component: &str, transfer_extra: &str) {
        let content = format!(
            "[Transfer]\n{extra}\n[Source]\nType=url-file\nPath={url}\nMatchPattern={c}_@v.raw.gz {c}_@v.raw\n\n[Target]\nPath={target}\nMatchPattern={c}_@v.raw\nCurrentSymlink={c}.raw\n",
            extra = transfer_extra,
            url = self.server.url(),
            c = component,
            target = self.target_dir.path().display(),
        );
        fs::write(
            self.config_dir.path().join(format!("{component}.transfer")),
            content,
        )
        .unwrap();
    }

    /// Write a feature file
    pub fn add_feature(&self, name: &str, enabled: bool) {
        let content = format!("[Feature]\nDescription=Test feature\nEnabled={enabled}\n");
        fs::write(
            self.config_dir.path().join(format!("{name}.feature")),
            content,
        )
        .unwrap();
    }

    /// Path of a staged artifact
    pub fn staged(&self, name: &str) -> PathBuf {
        self.target_dir.path().join(name)
    }

    /// Simulate a prior install by writing an artifact into staging
    pub fn stage_file(&self, name: &str, content: &[u8]) {
        fs::write(self.staged(name), content).unwrap();
    }

    /// Simulate a selected version by pointing the staging symlink at a file
    pub fn stage_symlink(&self, link: &str, target: &str) {
        std::os::unix::fs::symlink(target, self.target_dir.path().join(link)).unwrap();
    }

    /// The drop-in path a feature enable/disable writes
    pub fn feature_dropin(&self, name: &str) -> PathBuf {
        self.config_dir
            .path()
            .join(format!("{name}.feature.d"))
            .join("00-extup.conf")
    }
}

/// List the file names in a directory, sorted
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
