//! # CLI Module
//!
//! Command-line entry points for the survey intake binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Run the HTTP server until SIGINT or SIGTERM. On shutdown the listener is
//! stopped first, then appends already queued on the store writer are drained:
//!
//! ```bash
//! survey-intake serve --addr 0.0.0.0:8080 --data-dir data
//! ```
//!
//! Options:
//! - `--config <FILE>` - YAML config file
//! - `--addr <ADDR>` - listen address
//! - `--data-dir <DIR>` - directory holding the store file
//! - `--store-file <NAME>` - store file name
//! - `--on-corrupt-store <reject|overwrite>` - corrupt store handling
//!
//! Flags win over `SURVEY_*` variables, which win over the config file.
//!
//! ### `check`
//!
//! Run submission validation on a body without touching the store:
//!
//! ```bash
//! survey-intake check --body submission.json
//! ```
//!
//! Prints `ok` and exits 0, or prints the client-facing error and exits 1.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{
    check_body, resolve_config, run_cli, start, Cli, Commands, RunningService, ServeArgs,
};
