//! `whitelist` CLI: add, remove, and inspect exclusive-join whitelist entries.
//!
//! The backend (file, gist, or git repository) comes from `whitelist.toml`;
//! credentials come from the environment. Every add/remove prints exactly one
//! acknowledgment line on stdout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use whitelist::core::command::{Action, RawCommand, WhitelistCommand, parse_target};
use whitelist::core::types::Disposition;
use whitelist::exit_codes;
use whitelist::io::backend::backend_from_config;
use whitelist::io::config::{DEFAULT_CONFIG_PATH, WhitelistConfig, load_config};
use whitelist::reply::Acknowledgment;
use whitelist::service::WhitelistService;

#[derive(Parser)]
#[command(
    name = "whitelist",
    version,
    about = "Manage the exclusive-join player whitelist"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct TargetArgs {
    /// Whitelist folder (requires --file).
    #[arg(long)]
    folder: Option<String>,
    /// Whitelist file inside the folder (requires --folder).
    #[arg(long)]
    file: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Add a player id to the whitelist.
    Add {
        eos_id: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Remove a player id from the whitelist.
    Remove {
        eos_id: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Print the ids currently on the whitelist, one per line.
    Show {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// List known folder/file locations.
    Locations,
}

fn main() {
    whitelist::logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::FAILED
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Add { eos_id, target } => Ok(cmd_mutate(&cli.config, Action::Add, eos_id, target)),
        Command::Remove { eos_id, target } => {
            Ok(cmd_mutate(&cli.config, Action::Remove, eos_id, target))
        }
        Command::Show { target } => cmd_show(&cli.config, target),
        Command::Locations => cmd_locations(&cli.config),
    }
}

/// Add/remove never fails with an error value: every problem becomes the
/// printed acknowledgment plus an exit code.
fn cmd_mutate(config_path: &Path, action: Action, eos_id: String, target: TargetArgs) -> i32 {
    let raw = RawCommand {
        action: Some(action.to_string()),
        eos_id: Some(eos_id),
        folder: target.folder,
        file: target.file,
    };
    let command = match WhitelistCommand::parse(&raw) {
        Ok(command) => command,
        Err(err) => {
            println!("{}", Acknowledgment::invalid(&err).message);
            return exit_codes::FAILED;
        }
    };

    let disposition = match build_service(config_path) {
        Ok(service) => service.execute(&command),
        Err(err) => Disposition::Error(format!("{err:#}")),
    };
    let code = exit_codes::for_disposition(&disposition);
    println!("{}", Acknowledgment::for_outcome(&command, disposition).message);
    code
}

fn cmd_show(config_path: &Path, target: TargetArgs) -> Result<i32> {
    let target = parse_target(target.folder.as_deref(), target.file.as_deref())?;
    let service = build_service(config_path)?;
    let doc = service
        .read(&target)
        .with_context(|| format!("read {target} whitelist"))?;
    for id in &doc.exclusive_join {
        println!("{id}");
    }
    Ok(exit_codes::OK)
}

fn cmd_locations(config_path: &Path) -> Result<i32> {
    let service = build_service(config_path)?;
    let locations = service.locations().context("list locations")?;
    for location in locations {
        println!("{location}");
    }
    Ok(exit_codes::OK)
}

fn build_service(
    config_path: &Path,
) -> Result<WhitelistService<Box<dyn whitelist::io::backend::Backend>>> {
    let cfg: WhitelistConfig = load_config(config_path)?;
    let backend = backend_from_config(&cfg)?;
    let service = WhitelistService::new(backend);
    Ok(if cfg.server.serialize_writes {
        service.with_serialized_writes()
    } else {
        service
    })
}
