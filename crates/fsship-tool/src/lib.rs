//! Command-line tooling for `.shp2` ship files.
//!
//! The binary is a thin wrapper around this library:
//! - `config`: CLI arguments, environment variables and validation
//! - `commands`: one function per subcommand, each returning a text report
//! - `error`: configuration errors
//!
//! # Example
//!
//! ```no_run
//! use fsship_tool::{ToolConfig, commands};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ToolConfig::from_args();
//!     config.validate()?;
//!
//!     println!("{}", commands::run(&config)?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod commands;
pub mod config;
pub mod error;

pub use config::{Command, ToolConfig};
pub use error::ConfigError;
