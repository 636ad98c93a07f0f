//! Plotcheck CLI Library
//!
//! Command-line interface over the plotcheck summary comparison library.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{
    CheckImagesArgs, Cli, ColorArg, Commands, DiffArgs, DiffFormat, PatchArgs, SubtestArgs,
    VersionIdArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::{init_logging, LogFormat};
pub use output::ProgressReporter;
