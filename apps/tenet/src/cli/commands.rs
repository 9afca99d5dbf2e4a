//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::Cli;
use crate::config::Config;
use crate::{api, stdio, trace_output};
use tenet_core::{Bridge, TenetError, flatten_error};
use tokio::io::BufReader;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Merge the configuration file (if any) with command-line flags.
pub fn resolve_config(cli: &Cli) -> Result<Config, TenetError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_overrides(cli.mode, &cli.load);
    Ok(config)
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP host.
pub async fn cmd_serve(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), TenetError> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    let bridge = config.build_bridge()?;

    println!("Tenet HTTP host starting...");
    println!();
    println!("Configuration:");
    println!("  Address:  {}", config.server.addr());
    println!("  Mode:     {}", config.mode);
    println!("  Preload:  {} file(s)", config.preload.len());
    println!();
    println!("Endpoints:");
    println!("  POST /define - Load facts and rules");
    println!("  POST /query  - Evaluate a query");
    println!("  GET  /status - Session statistics");
    println!("  GET  /health - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(&config.server.addr(), bridge).await
}

// =============================================================================
// STDIO COMMAND
// =============================================================================

/// Answer JSON-lines requests until stdin closes.
pub async fn cmd_stdio(config: &Config) -> Result<(), TenetError> {
    let mut bridge = config.build_bridge()?;
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();
    stdio::serve(&mut bridge, reader, writer).await.map(|_| ())
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// Evaluate each query and print its result.
///
/// Every query runs even if an earlier one fails; the command fails if any
/// did.
pub fn cmd_run(config: &Config, queries: &[String], verbose: bool) -> Result<(), TenetError> {
    let bridge = config.build_bridge()?;
    let mut failed = 0;

    for query in queries {
        if verbose {
            eprintln!("?- {}", query);
        }
        match bridge.try_query(&[query]) {
            Ok(result) => println!("{}", result),
            Err(e) => {
                failed += 1;
                println!("{}", flatten_error(&e));
            }
        }
        trace_output(&bridge);
    }

    if failed > 0 {
        return Err(TenetError::Evaluation(format!(
            "{} of {} queries failed",
            failed,
            queries.len()
        )));
    }
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show what the loaded programs define.
pub fn cmd_status(config: &Config, json_mode: bool) -> Result<(), TenetError> {
    let bridge = config.build_bridge()?;
    print_status(&bridge, config, json_mode);
    Ok(())
}

fn print_status(bridge: &Bridge, config: &Config, json_mode: bool) {
    let session = bridge.session();
    let stats = session.stats();
    let relations: Vec<String> = session.predicates().iter().map(ToString::to_string).collect();

    if json_mode {
        let output = serde_json::json!({
            "mode": config.mode,
            "preload": config.preload,
            "predicates": stats.predicates,
            "facts": stats.facts,
            "rules": stats.rules,
            "derived": stats.derived,
            "relations": relations,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return;
    }

    println!("Tenet Session Status");
    println!("====================");
    println!("Mode:       {}", config.mode);
    for path in &config.preload {
        println!("Loaded:     {}", path.display());
    }
    println!();
    println!("Predicates: {}", stats.predicates);
    println!("Facts:      {}", stats.facts);
    println!("Rules:      {}", stats.rules);
    println!("Derived:    {}", stats.derived);
    if !relations.is_empty() {
        println!();
        println!("Relations:  {}", relations.join(", "));
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tenet_core::OutputMode;

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config_path = dir.path().join("tenet.toml");
        std::fs::write(&config_path, "mode = \"structured\"\n").expect("write");

        let cli = Cli::try_parse_from([
            "tenet",
            "--config",
            config_path.to_str().unwrap_or_default(),
            "--mode",
            "flat",
            "status",
        ])
        .expect("parse");
        let config = resolve_config(&cli).expect("config");
        assert_eq!(config.mode, OutputMode::Flat);
    }

    #[test]
    fn run_reports_failed_queries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let program = dir.path().join("facts.dl");
        std::fs::write(&program, "f(1).").expect("write");

        let config = Config {
            preload: vec![program],
            ..Config::default()
        };
        assert!(cmd_run(&config, &["f(X)".to_string()], false).is_ok());
        let err = cmd_run(&config, &["f(X)".to_string(), "g(X)".to_string()], false)
            .expect_err("g is unknown");
        assert_eq!(err.to_string(), "evaluation failed: 1 of 2 queries failed");
    }
}
