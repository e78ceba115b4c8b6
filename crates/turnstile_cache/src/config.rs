//! Cache policy configuration.
//!
//! Timing defaults and per-operation policies are loaded from TOML with a
//! precedence system:
//! - Bundled defaults (include_str! from turnstile.toml)
//! - User overrides (~/.config/turnstile/turnstile.toml, then ./turnstile.toml)
//!
//! Later sources override earlier ones field by field.

use crate::{CallOptions, Policy};
use config::{Config, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};
use turnstile_error::{ConfigError, TurnstileResult};

/// Per-operation overrides of the global cache defaults.
///
/// All fields are optional; only specified fields override the defaults.
///
/// ```toml
/// [cache.operations.getTicketCategory]
/// cache_time_ms = 300_000
/// throttle_time_ms = 10_000
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct OperationPolicy {
    /// Freshness window in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_time_ms: Option<u64>,

    /// Minimum spacing between real fetches in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle_time_ms: Option<u64>,

    /// Always fetch, ignoring freshness and throttling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_fresh: Option<bool>,
}

impl From<OperationPolicy> for CallOptions {
    fn from(policy: OperationPolicy) -> Self {
        let mut options = CallOptions::new();
        if let Some(ms) = policy.cache_time_ms {
            options = options.with_cache_time(Duration::from_millis(ms));
        }
        if let Some(ms) = policy.throttle_time_ms {
            options = options.with_throttle_time(Duration::from_millis(ms));
        }
        if let Some(force_fresh) = policy.force_fresh {
            options = options.with_force_fresh(force_fresh);
        }
        options
    }
}

/// Configuration for a [`ReadCache`](crate::ReadCache).
///
/// # Example
///
/// ```
/// use turnstile_cache::{CacheConfig, CacheConfigBuilder};
///
/// let config = CacheConfigBuilder::default()
///     .throttle_time_ms(0u64)
///     .coalesce_in_flight(true)
///     .build()
///     .unwrap();
/// assert_eq!(*config.cache_time_ms(), 30_000);
/// assert!(*config.coalesce_in_flight());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct CacheConfig {
    /// Default freshness window (milliseconds)
    #[serde(default = "default_cache_time_ms")]
    cache_time_ms: u64,

    /// Default minimum spacing between real fetches of one operation (milliseconds)
    #[serde(default = "default_throttle_time_ms")]
    throttle_time_ms: u64,

    /// Total fetch attempts per call, including the first
    #[serde(default = "default_max_attempts")]
    max_attempts: u32,

    /// Base of the jittered exponential backoff (milliseconds)
    #[serde(default = "default_backoff_base_ms")]
    backoff_base_ms: u64,

    /// Upper bound on a single backoff sleep (milliseconds)
    #[serde(default = "default_max_backoff_ms")]
    max_backoff_ms: u64,

    /// Let concurrent misses on one key share a single fetch
    #[serde(default)]
    coalesce_in_flight: bool,

    /// Reads issued concurrently by batched fan-out
    #[serde(default = "default_batch_size")]
    batch_size: usize,

    /// Pause between batches (milliseconds)
    #[serde(default = "default_batch_pause_ms")]
    batch_pause_ms: u64,

    /// Per-operation overrides keyed by operation name
    #[serde(default)]
    operations: HashMap<String, OperationPolicy>,
}

fn default_cache_time_ms() -> u64 {
    30_000
}

fn default_throttle_time_ms() -> u64 {
    8_000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_batch_size() -> usize {
    3
}

fn default_batch_pause_ms() -> u64 {
    500
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_time_ms: default_cache_time_ms(),
            throttle_time_ms: default_throttle_time_ms(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            coalesce_in_flight: false,
            batch_size: default_batch_size(),
            batch_pause_ms: default_batch_pause_ms(),
            operations: HashMap::new(),
        }
    }
}

impl CacheConfig {
    /// Check the values that would make the cache misbehave.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_attempts` or `batch_size` is zero, or if the
    /// backoff base exceeds the backoff cap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid("max_attempts", "must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::invalid("batch_size", "must be at least 1"));
        }
        if self.backoff_base_ms > self.max_backoff_ms {
            return Err(ConfigError::invalid(
                "backoff_base_ms",
                format!(
                    "{} must not exceed max_backoff_ms ({})",
                    self.backoff_base_ms, self.max_backoff_ms
                ),
            ));
        }
        Ok(())
    }

    /// Configured options for `operation`, without global defaults applied.
    pub fn policy_for(&self, operation: &str) -> CallOptions {
        // Table keys from TOML sources may arrive lower-cased.
        self.operations
            .get(operation)
            .or_else(|| {
                self.operations
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(operation))
                    .map(|(_, policy)| policy)
            })
            .copied()
            .map(CallOptions::from)
            .unwrap_or_default()
    }

    /// Resolve the effective policy of a call.
    ///
    /// Explicit `options` fields win, then the operation's configured
    /// policy, then the global defaults.
    pub fn resolve(&self, operation: &str, options: CallOptions) -> Policy {
        let options = options.or(self.policy_for(operation));
        Policy::new(
            options
                .cache_time()
                .unwrap_or(Duration::from_millis(self.cache_time_ms)),
            options
                .throttle_time()
                .unwrap_or(Duration::from_millis(self.throttle_time_ms)),
            options.force_fresh(),
        )
    }

    /// Pause between batches as a duration.
    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }
}

/// Top-level Turnstile configuration.
///
/// # Example
///
/// ```no_run
/// use turnstile_cache::TurnstileConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TurnstileConfig::load()?;
/// let policy = config.cache.resolve("getEvent", Default::default());
/// println!("getEvent cache time: {:?}", policy.cache_time());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct TurnstileConfig {
    /// Read-call cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

impl TurnstileConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> TurnstileResult<Self> {
        debug!("Loading configuration from file");

        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::load(format!(
                    "cannot read {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?;

        Self::finish(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> TurnstileResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../turnstile.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/turnstile/turnstile.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("turnstile").required(false));

        let config = builder
            .build()
            .map_err(|e| ConfigError::load(e.to_string()))?;

        Self::finish(config)
    }

    fn finish(config: Config) -> TurnstileResult<Self> {
        let parsed: Self = config
            .try_deserialize()
            .map_err(|e| ConfigError::load(e.to_string()))?;

        parsed.cache.validate()?;
        debug!(
            operations = parsed.cache.operations.len(),
            "Configuration loaded"
        );
        Ok(parsed)
    }
}
