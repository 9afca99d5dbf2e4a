//! # Tenet
//!
//! The main binary for the Tenet logic engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  apps/tenet (THE BINARY)                 │
//! │                                                          │
//! │  ┌───────────┐    ┌────────────┐    ┌────────────────┐   │
//! │  │   CLI     │    │  HTTP host │    │   Stdio host   │   │
//! │  │  (clap)   │    │   (axum)   │    │  (JSON lines)  │   │
//! │  └─────┬─────┘    └─────┬──────┘    └───────┬────────┘   │
//! │        └────────────────┼───────────────────┘            │
//! │                         ▼                                │
//! │                 ┌───────────────┐                        │
//! │                 │  tenet-core   │                        │
//! │                 │   (Bridge)    │                        │
//! │                 └───────────────┘                        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! tenet serve --host 0.0.0.0 --port 8080 --load rules.dl
//! tenet stdio --mode flat
//! tenet run -l facts.dl -e 'path(1, X)'
//! ```

use clap::Parser;
use tenet::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // TENET_LOG_FORMAT=json enables machine-parseable output.
    // Logs go to stderr; stdout belongs to results and the stdio protocol.
    let log_format = std::env::var("TENET_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tenet=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.stdout_is_data() {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  ████████╗███████╗███╗   ██╗███████╗████████╗
  ╚══██╔══╝██╔════╝████╗  ██║██╔════╝╚══██╔══╝
     ██║   █████╗  ██╔██╗ ██║█████╗     ██║
     ██║   ██╔══╝  ██║╚██╗██║██╔══╝     ██║
     ██║   ███████╗██║ ╚████║███████╗   ██║
     ╚═╝   ╚══════╝╚═╝  ╚═══╝╚══════╝   ╚═╝

  Datalog bridge v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
