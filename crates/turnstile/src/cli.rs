//! Command-line interface for Turnstile.
//!
//! The CLI inspects configuration without touching any remote endpoint:
//!
//! - `policies` prints the effective policy of every configured operation
//! - `key` prints the cache key a call would be stored under

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use turnstile_cache::{CacheConfig, CacheKey, CallOptions};
use turnstile_error::{JsonError, TurnstileResult};

/// Turnstile command-line interface.
#[derive(Debug, Parser)]
#[command(name = "turnstile")]
#[command(about = "Inspect read-call cache policies and keys", long_about = None)]
pub struct Cli {
    /// Load configuration from this file instead of the layered defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the effective policy of each configured operation
    Policies,

    /// Print the cache key for an operation and its arguments
    Key {
        /// Operation name (e.g., "getEvent")
        operation: String,

        /// Arguments as JSON (e.g., '["42"]')
        args: String,
    },
}

/// Render the global defaults and every configured operation, one per line.
///
/// Operations are listed in name order.
pub fn policy_lines(config: &CacheConfig) -> Vec<String> {
    let defaults = config.resolve("", CallOptions::new());
    let mut lines = vec![format!(
        "(default) cache={}ms throttle={}ms force_fresh={}",
        defaults.cache_time().as_millis(),
        defaults.throttle_time().as_millis(),
        defaults.force_fresh()
    )];

    let mut operations: Vec<&String> = config.operations().keys().collect();
    operations.sort();

    for operation in operations {
        let policy = config.resolve(operation, CallOptions::new());
        lines.push(format!(
            "{} cache={}ms throttle={}ms force_fresh={}",
            operation,
            policy.cache_time().as_millis(),
            policy.throttle_time().as_millis(),
            policy.force_fresh()
        ));
    }

    lines
}

/// Cache key for `operation` called with the JSON-encoded `args`.
///
/// # Errors
///
/// Returns an error if `args` is not valid JSON.
pub fn cache_key(operation: &str, args: &str) -> TurnstileResult<String> {
    let parsed: serde_json::Value =
        serde_json::from_str(args).map_err(|e| JsonError::new(args, e.to_string()))?;
    Ok(CacheKey::new(operation, &parsed)?.to_string())
}
