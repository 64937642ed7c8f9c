// src/main.rs
//! extup - CLI entry point

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

mod commands;

// =============================================================================
// CLI Definitions
// =============================================================================

#[derive(Parser)]
#[command(name = "extup")]
#[command(version)]
#[command(about = "Manage systemd system-extension images", long_about = None)]
struct Cli {
    /// Override the definition search path
    #[arg(long, global = true, value_name = "DIR")]
    definitions: Option<PathBuf>,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Force signature verification of manifests
    #[arg(long, global = true)]
    verify: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show available and installed versions
    List {
        /// Restrict output to one version
        version: Option<String>,

        /// Restrict output to one component
        #[arg(long)]
        component: Option<String>,
    },

    /// Report update availability (exit 0 = updates available, 2 = all current)
    CheckNew {
        #[arg(long)]
        component: Option<String>,
    },

    /// Download and stage new extension versions
    Update {
        /// Install this exact version instead of the newest
        version: Option<String>,

        #[arg(long)]
        component: Option<String>,

        /// Skip retention after download
        #[arg(long)]
        no_vacuum: bool,

        /// Skip the activation refresh
        #[arg(long)]
        no_refresh: bool,
    },

    /// Remove old versions beyond each component's retention limit
    Vacuum {
        #[arg(long)]
        component: Option<String>,
    },

    /// Report staged-but-not-active versions (exit 0 = pending, 2 = none)
    Pending {
        #[arg(long)]
        component: Option<String>,
    },

    /// Remove a component's staged files and symlinks
    Remove {
        #[arg(long)]
        component: String,

        /// Unmerge immediately before removing
        #[arg(long)]
        now: bool,

        #[arg(long)]
        no_refresh: bool,
    },

    /// List configured transfers
    Components,

    /// List extensions available in a remote repository
    Discover {
        /// Repository base URL
        url: String,
    },

    /// Fetch an extension's transfer file from a repository and install it
    Install {
        /// Repository base URL
        url: String,

        #[arg(long)]
        component: String,

        #[arg(long)]
        no_refresh: bool,
    },

    /// Manage feature groups
    Features {
        #[command(subcommand)]
        command: FeatureCommands,
    },

    /// Manage the periodic update timer
    Daemon {
        #[command(subcommand)]
        command: DaemonCommands,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum FeatureCommands {
    /// List configured features
    List,

    /// Enable a feature
    Enable {
        name: String,

        /// Download the feature's extensions immediately
        #[arg(long)]
        now: bool,

        /// Show what would happen without changing anything
        #[arg(long)]
        dry_run: bool,

        /// Retry network operations on failure
        #[arg(long)]
        retry: bool,

        #[arg(long)]
        no_refresh: bool,
    },

    /// Disable a feature
    Disable {
        name: String,

        /// Remove files and unmerge immediately
        #[arg(long)]
        now: bool,

        /// Proceed even when an extension is currently active
        #[arg(long)]
        force: bool,

        /// Show what would happen without changing anything
        #[arg(long)]
        dry_run: bool,

        #[arg(long)]
        no_refresh: bool,
    },
}

#[derive(Subcommand)]
enum DaemonCommands {
    /// Install and start the update timer
    Enable,

    /// Stop and remove the update timer
    Disable,

    /// Show timer state
    Status,
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context {
        definitions: cli.definitions,
        json: cli.json,
        verify: cli.verify,
    };

    let outcome = match cli.command {
        Commands::List { version, component } => commands::cmd_list(&ctx, component, version),

        Commands::CheckNew { component } => commands::cmd_check_new(&ctx, component),

        Commands::Update {
            version,
            component,
            no_vacuum,
            no_refresh,
        } => commands::cmd_update(&ctx, component, version, no_vacuum, no_refresh),

        Commands::Vacuum { component } => commands::cmd_vacuum(&ctx, component),

        Commands::Pending { component } => commands::cmd_pending(&ctx, component),

        Commands::Remove {
            component,
            now,
            no_refresh,
        } => commands::cmd_remove(&ctx, &component, now, no_refresh),

        Commands::Components => commands::cmd_components(&ctx),

        Commands::Discover { url } => commands::cmd_discover(&ctx, &url),

        Commands::Install {
            url,
            component,
            no_refresh,
        } => commands::cmd_install(&ctx, &url, &component, no_refresh),

        Commands::Features { command } => match command {
            FeatureCommands::List => commands::cmd_features_list(&ctx),
            FeatureCommands::Enable {
                name,
                now,
                dry_run,
                retry,
                no_refresh,
            } => commands::cmd_feature_enable(&ctx, &name, now, dry_run, retry, no_refresh),
            FeatureCommands::Disable {
                name,
                now,
                force,
                dry_run,
                no_refresh,
            } => commands::cmd_feature_disable(&ctx, &name, now, force, dry_run, no_refresh),
        },

        Commands::Daemon { command } => match command {
            DaemonCommands::Enable => commands::cmd_daemon_enable(&ctx),
            DaemonCommands::Disable => commands::cmd_daemon_disable(&ctx),
            DaemonCommands::Status => commands::cmd_daemon_status(&ctx),
        },

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "extup", &mut std::io::stdout());
            Ok(0)
        }
    };

    match outcome {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
