// src/systemd/unit.rs

//! Unit file generation for the update timer and service

/// Configuration for a timer unit
#[derive(Debug, Clone)]
pub struct TimerConfig {
    /// Unit name without extension (e.g. "extup-update")
    pub name: String,
    /// Description for the `[Unit]` section
    pub description: String,
    /// Timer schedule (e.g. "daily" or "*-*-* 04:00:00")
    pub on_calendar: String,
    /// Run the timer if it missed the last start time
    pub persistent: bool,
    /// Randomize the start within this window, in seconds
    pub randomized_delay_seconds: u64,
}

/// Configuration for a service unit
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Unit name without extension (e.g. "extup-update")
    pub name: String,
    /// Description for the `[Unit]` section
    pub description: String,
    /// Full command line to execute
    pub exec_start: String,
    /// Service type (e.g. "oneshot")
    pub service_type: String,
}

/// Render timer unit file text with `[Unit]`, `[Timer]` and `[Install]`
/// sections. The timer is always wanted by `timers.target`.
pub fn generate_timer(cfg: &TimerConfig) -> String {
    let mut out = String::new();

    out.push_str("[Unit]\n");
    out.push_str(&format!("Description={}\n", cfg.description));
    out.push('\n');

    out.push_str("[Timer]\n");
    out.push_str(&format!("OnCalendar={}\n", cfg.on_calendar));
    if cfg.persistent {
        out.push_str("Persistent=true\n");
    }
    if cfg.randomized_delay_seconds > 0 {
        out.push_str(&format!(
            "RandomizedDelaySec={}s\n",
            cfg.randomized_delay_seconds
        ));
    }
    out.push('\n');

    out.push_str("[Install]\n");
    out.push_str("WantedBy=timers.target\n");

    out
}

/// Render service unit file text. No `[Install]` section; activation is the
/// timer's job.
pub fn generate_service(cfg: &ServiceConfig) -> String {
    let mut out = String::new();

    out.push_str("[Unit]\n");
    out.push_str(&format!("Description={}\n", cfg.description));
    out.push('\n');

    out.push_str("[Service]\n");
    out.push_str(&format!("Type={}\n", cfg.service_type));
    out.push_str(&format!("ExecStart={}\n", cfg.exec_start));

    out
}
