//! Ship tool binary entry point.
//!
//! Thin wrapper around the fsship-tool library that:
//! 1. Initializes logging
//! 2. Parses and validates the configuration
//! 3. Runs the subcommand and prints its report

use anyhow::Result;
use fsship_tool::{ToolConfig, commands};

fn main() -> Result<()> {
    // Logs go to stderr so reports can be piped
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ToolConfig::from_args();
    tracing::debug!("Configuration loaded: {:?}", config);

    config.validate()?;

    let report = commands::run(&config)?;
    print!("{report}");

    Ok(())
}
