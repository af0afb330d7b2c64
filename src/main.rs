//! vck - relationship validation for planning vaults.

use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vaultcheck::cli::{Cli, Commands, ConfigCommands};
use vaultcheck::commands::{self, CanvasMode, Output};
use vaultcheck::config::{ConfigOverrides, OutputFormat, ResolvedSettings, resolve_settings};

/// Environment variable holding the log filter (e.g. `debug`, `vaultcheck=trace`).
const LOG_ENV: &str = "VCK_LOG";

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let flag_format = if cli.human_readable {
        Some(OutputFormat::Human)
    } else if cli.json {
        Some(OutputFormat::Json)
    } else {
        None
    };

    let mut overrides = ConfigOverrides {
        vault: cli.vault_path,
        config_path: cli.config_path,
        output_format: flag_format,
        canvas: None,
    };
    if let Some(Commands::Check {
        canvas: Some(ref canvas),
        ..
    }) = cli.command
    {
        overrides = overrides.with_canvas(canvas.clone());
    }

    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let result = resolve_settings(&overrides, &cwd)
        .and_then(|settings| run_command(cli.command, &settings).map(|ok| (ok, settings)));

    // Settings may have failed to resolve; fall back to the flag for error output
    let human = match &result {
        Ok((_, settings)) => settings.is_human(),
        Err(_) => flag_format == Some(OutputFormat::Human),
    };

    match result {
        Ok((true, _)) => {}
        Ok((false, _)) => process::exit(1),
        Err(e) => {
            if human {
                eprintln!("Error: {}", e);
            } else {
                eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
            }
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run a command and print its result.
///
/// Returns `Ok(false)` when the command completed but the vault failed
/// validation, which maps to exit code 1.
fn run_command(
    command: Option<Commands>,
    settings: &ResolvedSettings,
) -> Result<bool, vaultcheck::Error> {
    let human = settings.is_human();

    match command.unwrap_or(Commands::Check {
        canvas: None,
        no_canvas: false,
    }) {
        Commands::Check { no_canvas, .. } => {
            let mode = if no_canvas {
                CanvasMode::Disabled
            } else {
                CanvasMode::Auto
            };
            let report = commands::check(settings, mode)?;
            output(&report, human);
            Ok(report.outcome.is_success())
        }
        Commands::Entities { entity_type } => {
            let result = commands::entities(settings, entity_type.as_deref())?;
            output(&result, human);
            Ok(true)
        }
        Commands::Show { id } => {
            let result = commands::show(settings, &id)?;
            output(&result, human);
            Ok(true)
        }
        Commands::Canvas { path } => {
            let report = commands::canvas(settings, path.as_deref())?;
            output(&report, human);
            Ok(report.outcome.is_success())
        }
        Commands::Rules => {
            output(&commands::rules(), human);
            Ok(true)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                output(&commands::config_show(settings), human);
                Ok(true)
            }
            ConfigCommands::Init { force } => {
                let result = commands::config_init(settings, force)?;
                output(&result, human);
                Ok(true)
            }
        },
        Commands::Version => {
            output(&commands::version(), human);
            Ok(true)
        }
    }
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
