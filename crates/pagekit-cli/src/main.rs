//! pagekit - host driver for the offline asset worker and the weekly
//! checkin reset.
//!
//! Each invocation plays the part of the browser: it either runs the asset
//! worker lifecycle, answers one resource request, or performs the page-load
//! reset check against the persisted page state.

mod commands;

use std::io;
use std::path::Path;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pagekit_core::Config;

/// Log file name prefix inside the configured log directory
const LOG_FILE_PREFIX: &str = "pagekit.log";

/// Environment variable overriding the configured base URL
const ENV_BASE_URL: &str = "PAGEKIT_BASE_URL";

/// Environment variable overriding the configured cache version tag
const ENV_VERSION_TAG: &str = "PAGEKIT_VERSION_TAG";

const USAGE: &str = "\
usage: pagekit <command>

commands:
  update                       install the asset manifest and evict old caches
  serve <resource>             answer a request cache-first, write the body to stdout
  status                       show caches and the last checkin reset
  check-reset                  run the weekly reset if it is due
  reset                        reset all checkins now
  checkin <table> <item> <on|off>
                               save one checkbox state
  board <count>...             restore checkbox states for tables of the given sizes
  init-config                  write the current configuration to disk";

/// A parsed command line.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Update,
    Serve { resource: String },
    Status,
    CheckReset,
    Reset,
    Checkin { table: String, item: String, state: String },
    Board { counts: Vec<String> },
    InitConfig,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Update => "update",
            Command::Serve { .. } => "serve",
            Command::Status => "status",
            Command::CheckReset => "check-reset",
            Command::Reset => "reset",
            Command::Checkin { .. } => "checkin",
            Command::Board { .. } => "board",
            Command::InitConfig => "init-config",
        }
    }
}

/// Parse arguments (without the program name). `None` means usage error.
fn parse_command(args: &[String]) -> Option<Command> {
    let (command, rest) = args.split_first()?;
    let command = match (command.as_str(), rest) {
        ("update", []) => Command::Update,
        ("serve", [resource]) => Command::Serve {
            resource: resource.clone(),
        },
        ("status", []) => Command::Status,
        ("check-reset", []) => Command::CheckReset,
        ("reset", []) => Command::Reset,
        ("checkin", [table, item, state]) => Command::Checkin {
            table: table.clone(),
            item: item.clone(),
            state: state.clone(),
        },
        ("board", counts) if !counts.is_empty() => Command::Board {
            counts: counts.to_vec(),
        },
        ("init-config", []) => Command::InitConfig,
        _ => return None,
    };
    Some(command)
}

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the file writer on drop.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

/// Load config from disk and apply environment overrides.
fn load_config() -> Result<Config> {
    let mut config = Config::load()?;
    if let Ok(url) = std::env::var(ENV_BASE_URL) {
        config.base_url = url;
    }
    if let Ok(tag) = std::env::var(ENV_VERSION_TAG) {
        config.version_tag = tag;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Usage errors exit before the log writer exists, so no buffered
    // records are lost to process::exit
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = parse_command(&args) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    let config = load_config()?;
    let _guard = init_tracing(config.log_dir.as_deref());
    info!(command = command.name(), version = %config.version_tag, "pagekit starting");

    match command {
        Command::Update => commands::update(&config).await,
        Command::Serve { resource } => commands::serve(&config, &resource).await,
        Command::Status => commands::status(&config).await,
        Command::CheckReset => commands::check_reset(&config),
        Command::Reset => commands::reset(&config),
        Command::Checkin { table, item, state } => {
            commands::checkin(&config, &table, &item, &state)
        }
        Command::Board { counts } => commands::board(&config, &counts),
        Command::InitConfig => {
            config.save()?;
            eprintln!("Configuration written");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_command_accepts_known_commands() {
        assert_eq!(parse_command(&args(&["update"])), Some(Command::Update));
        assert_eq!(
            parse_command(&args(&["serve", "./index.html"])),
            Some(Command::Serve {
                resource: "./index.html".to_string()
            })
        );
        assert_eq!(
            parse_command(&args(&["checkin", "0", "2", "on"])),
            Some(Command::Checkin {
                table: "0".to_string(),
                item: "2".to_string(),
                state: "on".to_string(),
            })
        );
        assert_eq!(
            parse_command(&args(&["board", "3", "4"])),
            Some(Command::Board {
                counts: args(&["3", "4"])
            })
        );
        assert_eq!(parse_command(&args(&["check-reset"])).map(|c| c.name()), Some("check-reset"));
    }

    #[test]
    fn test_parse_command_rejects_usage_errors() {
        assert_eq!(parse_command(&[]), None);
        assert_eq!(parse_command(&args(&["bogus"])), None);
        assert_eq!(parse_command(&args(&["serve"])), None);
        assert_eq!(parse_command(&args(&["status", "extra"])), None);
        assert_eq!(parse_command(&args(&["board"])), None);
        assert_eq!(parse_command(&args(&["checkin", "0", "1"])), None);
    }
}
