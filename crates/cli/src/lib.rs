//! `rentdesk-cli`: line-oriented shell over the rental ledger.
//!
//! Collects operator input, applies the policies the ledger leaves to its
//! caller (due date not in the past, confirmation before delete), and renders
//! results as text or JSON.

pub mod config;
pub mod render;
pub mod session;
pub mod shell;

pub use config::{CliConfig, ConfigError, IdStrategy, OutputFormat};
pub use session::{Outcome, Session};
pub use shell::{ShellCommand, ShellError};
