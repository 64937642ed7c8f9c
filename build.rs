// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: restrict an operation to one component
fn component_arg() -> Arg {
    Arg::new("component")
        .long("component")
        .value_name("NAME")
        .help("Restrict to one component")
}

fn build_cli() -> Command {
    Command::new("extup")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage systemd system-extension images")
        .arg(
            Arg::new("definitions")
                .long("definitions")
                .value_name("DIR")
                .global(true)
                .help("Override the definition search path"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(clap::ArgAction::SetTrue)
                .global(true)
                .help("Machine-readable JSON output"),
        )
        .arg(
            Arg::new("verify")
                .long("verify")
                .action(clap::ArgAction::SetTrue)
                .global(true)
                .help("Force signature verification of manifests"),
        )
        .subcommand(
            Command::new("list")
                .about("Show available and installed versions")
                .arg(Arg::new("version").help("Restrict output to one version"))
                .arg(component_arg()),
        )
        .subcommand(
            Command::new("check-new")
                .about("Report update availability")
                .arg(component_arg()),
        )
        .subcommand(
            Command::new("update")
                .about("Download and stage new extension versions")
                .arg(Arg::new("version").help("Install this exact version"))
                .arg(component_arg())
                .arg(
                    Arg::new("no-vacuum")
                        .long("no-vacuum")
                        .action(clap::ArgAction::SetTrue)
                        .help("Skip retention after download"),
                )
                .arg(
                    Arg::new("no-refresh")
                        .long("no-refresh")
                        .action(clap::ArgAction::SetTrue)
                        .help("Skip the activation refresh"),
                ),
        )
        .subcommand(
            Command::new("vacuum")
                .about("Remove old versions beyond retention limits")
                .arg(component_arg()),
        )
        .subcommand(
            Command::new("pending")
                .about("Report staged-but-not-active versions")
                .arg(component_arg()),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove a component's staged files and symlinks")
                .arg(component_arg().required(true))
                .arg(
                    Arg::new("now")
                        .long("now")
                        .action(clap::ArgAction::SetTrue)
                        .help("Unmerge immediately before removing"),
                ),
        )
        .subcommand(Command::new("components").about("List configured transfers"))
        .subcommand(
            Command::new("discover")
                .about("List extensions available in a remote repository")
                .arg(Arg::new("url").required(true).help("Repository base URL")),
        )
        .subcommand(
            Command::new("install")
                .about("Fetch a transfer file from a repository and install it")
                .arg(Arg::new("url").required(true).help("Repository base URL"))
                .arg(component_arg().required(true)),
        )
        .subcommand(
            Command::new("features")
                .about("Manage feature groups")
                .subcommand(Command::new("list").about("List configured features"))
                .subcommand(
                    Command::new("enable")
                        .about("Enable a feature")
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(
                    Command::new("disable")
                        .about("Disable a feature")
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("daemon")
                .about("Manage the periodic update timer")
                .subcommand(Command::new("enable").about("Install and start the update timer"))
                .subcommand(Command::new("disable").about("Stop and remove the update timer"))
                .subcommand(Command::new("status").about("Show timer state")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("extup.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
