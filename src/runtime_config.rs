//! # Runtime Configuration Module
//!
//! Environment variables that tune the `may` coroutine runtime.
//!
//! ## Environment Variables
//!
//! ### `SURVEY_STACK_SIZE`
//!
//! Stack size for connection and store-writer coroutines. Accepts decimal
//! (`65536`) or hexadecimal (`0x10000`). Default: `0x10000` (64 KB).
//!
//! JSON parsing and the untagged answer model recurse once per nesting level.
//! Bodies are capped at [`crate::survey::validation::MAX_JSON_DEPTH`] levels,
//! and the default leaves headroom for that cap plus the store rewrite.
//!
//! ### `SURVEY_WORKERS`
//!
//! Number of `may` worker threads. Default: the runtime's own default (number
//! of CPUs).
//!
//! ## Usage
//!
//! ```rust
//! use survey_intake::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Stack size: {} bytes", config.stack_size);
//! ```

use std::env;

/// Default coroutine stack size (64 KB)
pub const DEFAULT_STACK_SIZE: usize = 0x10000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
    /// Worker thread count; `None` keeps the runtime default
    pub workers: Option<usize>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            workers: None,
        }
    }
}

/// Parse a size given in decimal or `0x`-prefixed hexadecimal.
#[must_use]
pub fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let stack_size = env::var("SURVEY_STACK_SIZE")
            .ok()
            .and_then(|v| parse_size(&v))
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_STACK_SIZE);
        let workers = env::var("SURVEY_WORKERS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .filter(|w: &usize| *w > 0);
        RuntimeConfig {
            stack_size,
            workers,
        }
    }

    /// Push the settings into the global `may` configuration.
    ///
    /// Must run before the first coroutine is spawned.
    pub fn apply(&self) {
        let cfg = may::config();
        cfg.set_stack_size(self.stack_size);
        if let Some(workers) = self.workers {
            cfg.set_workers(workers);
        }
    }
}
