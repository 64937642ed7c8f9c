// src/progress.rs

//! Shared progress tracking trait and implementations
//!
//! The download pipeline reports through an injected [`ProgressTracker`].
//! Implementations cover the three output modes: `CliProgress` draws an
//! indicatif byte bar, `LogProgress` writes to tracing, and `SilentProgress`
//! is the no-op default for programmatic use.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Core trait for progress tracking.
///
/// Implementations must be thread-safe so a tracker can be shared across
/// client handles.
pub trait ProgressTracker: Send + Sync {
    /// Set the current status message
    fn set_message(&self, message: &str);

    /// Set the total (length) of the progress
    fn set_length(&self, length: u64);

    /// Set progress to a specific position
    fn set_position(&self, position: u64);

    /// Increment progress by the given amount
    fn increment(&self, amount: u64);

    /// Finish successfully with a message
    fn finish_with_message(&self, message: &str);

    /// Finish with an error/abandonment message
    fn finish_with_error(&self, message: &str);
}

/// Silent progress tracker (no-op)
#[derive(Debug, Default)]
pub struct SilentProgress {
    position: AtomicU64,
    length: AtomicU64,
    finished: AtomicBool,
}

impl SilentProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position, for assertions in tests
    pub fn position(&self) -> u64 {
        self.position.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }
}

impl ProgressTracker for SilentProgress {
    fn set_message(&self, _message: &str) {}

    fn set_length(&self, length: u64) {
        self.length.store(length, Ordering::Relaxed);
    }

    fn set_position(&self, position: u64) {
        self.position.store(position, Ordering::Relaxed);
    }

    fn increment(&self, amount: u64) {
        self.position.fetch_add(amount, Ordering::Relaxed);
    }

    fn finish_with_message(&self, _message: &str) {
        self.finished.store(true, Ordering::Relaxed);
    }

    fn finish_with_error(&self, _message: &str) {
        self.finished.store(true, Ordering::Relaxed);
    }
}

/// Logging progress tracker
///
/// Logs progress to tracing at info level, at ~10% intervals to avoid spam.
#[derive(Debug)]
pub struct LogProgress {
    name: String,
    position: AtomicU64,
    length: AtomicU64,
}

impl LogProgress {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: AtomicU64::new(0),
            length: AtomicU64::new(0),
        }
    }
}

impl ProgressTracker for LogProgress {
    fn set_message(&self, message: &str) {
        info!("{}: {}", self.name, message);
    }

    fn set_length(&self, length: u64) {
        self.length.store(length, Ordering::Relaxed);
    }

    fn set_position(&self, position: u64) {
        let old = self.position.swap(position, Ordering::Relaxed);
        let length = self.length.load(Ordering::Relaxed);
        if length > 0 {
            let step = std::cmp::max(1, length / 10);
            if position / step > old / step {
                info!(
                    "{}: {}% ({}/{} bytes)",
                    self.name,
                    position * 100 / length,
                    position,
                    length
                );
            }
        }
    }

    fn increment(&self, amount: u64) {
        let position = self.position.load(Ordering::Relaxed) + amount;
        self.set_position(position);
    }

    fn finish_with_message(&self, message: &str) {
        info!("{}: {}", self.name, message);
    }

    fn finish_with_error(&self, message: &str) {
        info!("{}: {}", self.name, message);
    }
}

/// Visual progress bar for interactive terminals
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    /// Create a byte-style progress bar with unknown length
    pub fn new() -> Self {
        let bar = ProgressBar::no_length();
        bar.set_style(
            ProgressStyle::with_template(
                "{msg} [{bar:40}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
        );
        Self { bar }
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker for CliProgress {
    fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn set_length(&self, length: u64) {
        self.bar.set_length(length);
    }

    fn set_position(&self, position: u64) {
        self.bar.set_position(position);
    }

    fn increment(&self, amount: u64) {
        self.bar.inc(amount);
    }

    fn finish_with_message(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    fn finish_with_error(&self, message: &str) {
        self.bar.abandon_with_message(message.to_string());
    }
}
