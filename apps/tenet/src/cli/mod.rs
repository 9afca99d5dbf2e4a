//! # Tenet CLI Module
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP host
//! - `stdio` - Answer JSON-lines requests on stdin/stdout
//! - `run` - Load programs, run queries, print results
//! - `status` - Show what the loaded programs define (default)

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tenet_core::{OutputMode, TenetError};

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Tenet - a Datalog engine behind a two-call string bridge.
///
/// Load facts and rules with `define`, ask questions with `query`.
#[derive(Parser, Debug)]
#[command(name = "tenet")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Result encoding: "structured" (JSON bindings) or "flat" (one atom per line)
    #[arg(short, long, global = true)]
    pub mode: Option<OutputMode>,

    /// Program file to load before serving (repeatable)
    #[arg(short, long = "load", global = true)]
    pub load: Vec<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long = "json", global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP host
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Answer JSON-lines requests on stdin
    Stdio,

    /// Run queries against the loaded programs
    Run {
        /// Query to evaluate (repeatable)
        #[arg(short = 'e', long = "query")]
        queries: Vec<String>,
    },

    /// Show predicates and counts of the loaded programs
    Status,
}

impl Cli {
    /// Whether this invocation owns stdout for its own protocol or results.
    pub fn stdout_is_data(&self) -> bool {
        matches!(
            self.command,
            Some(Commands::Stdio | Commands::Run { .. })
        ) || self.json_mode
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), TenetError> {
    let config = resolve_config(&cli)?;

    match cli.command {
        Some(Commands::Serve { host, port }) => cmd_serve(config, host, port).await,
        Some(Commands::Stdio) => cmd_stdio(&config).await,
        Some(Commands::Run { queries }) => cmd_run(&config, &queries, cli.verbose),
        Some(Commands::Status) | None => cmd_status(&config, cli.json_mode),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tenet", "run", "-e", "f(X)", "--mode", "flat", "-l", "a.dl", "-l", "b.dl",
        ])
        .expect("parse");
        assert_eq!(cli.mode, Some(OutputMode::Flat));
        assert_eq!(cli.load.len(), 2);
        assert!(cli.stdout_is_data());
        match cli.command {
            Some(Commands::Run { queries }) => assert_eq!(queries, vec!["f(X)"]),
            other => unreachable!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn serve_overrides_are_optional() {
        let cli = Cli::try_parse_from(["tenet", "serve", "-p", "9000"]).expect("parse");
        assert!(!cli.stdout_is_data());
        assert!(matches!(
            cli.command,
            Some(Commands::Serve {
                host: None,
                port: Some(9000)
            })
        ));
    }

    #[test]
    fn json_flag_selects_json_status() {
        let cli = Cli::try_parse_from(["tenet", "status", "--json"]).expect("parse");
        assert!(cli.json_mode);
        assert!(cli.stdout_is_data());
        assert!(Cli::try_parse_from(["tenet", "status", "--json-mode"]).is_err());
    }

    #[test]
    fn invalid_mode_is_rejected() {
        assert!(Cli::try_parse_from(["tenet", "--mode", "xml", "status"]).is_err());
    }
}
