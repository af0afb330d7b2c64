//! CLI argument definitions for vaultcheck.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Vaultcheck - relationship validation for planning vaults.
///
/// Run `vck` inside a vault (or pass `-C <vault>`) to check every milestone,
/// story, task, decision and document record.
#[derive(Parser, Debug)]
#[command(name = "vck")]
#[command(author, version, about = "Validate entity relationships in a planning vault", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true, conflicts_with = "json")]
    pub human_readable: bool,

    /// Output JSON even if the config asks for human output
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Vault root. Defaults to the system config `vault` entry, then the
    /// current directory. Can also be set via VCK_VAULT environment variable.
    #[arg(short = 'C', long = "vault", global = true, env = "VCK_VAULT")]
    pub vault_path: Option<PathBuf>,

    /// Config file to use instead of `<vault>/.vaultcheck.kdl`.
    /// Can also be set via VCK_CONFIG environment variable.
    #[arg(long = "config", global = true, env = "VCK_CONFIG")]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate all records and the canvas (default when no command is given)
    Check {
        /// Canvas file to cross-check, relative to the vault
        #[arg(long, conflicts_with = "no_canvas")]
        canvas: Option<String>,

        /// Skip the canvas cross-check
        #[arg(long)]
        no_canvas: bool,
    },

    /// List loaded records
    Entities {
        /// Only list records of this type (milestone, story, task, decision, document)
        #[arg(short = 't', long = "type")]
        entity_type: Option<String>,
    },

    /// Show one record with its references and findings
    Show {
        /// Entity ID (e.g., M-001, DEC-004)
        id: String,
    },

    /// Cross-check a canvas file only
    Canvas {
        /// Canvas file, relative to the vault (defaults to the configured canvas)
        path: Option<PathBuf>,
    },

    /// Print the relationship rule table
    Rules,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show version and build information
    Version,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved settings and where each value came from
    Show,

    /// Write the current settings to <vault>/.vaultcheck.kdl
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
