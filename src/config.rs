//! Configuration management
//!
//! Handles loading and validating service configuration from TOML files.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub mutation: MutationConfig,
    #[serde(default)]
    pub chaos: ChaosConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP facade configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener
    #[serde(default = "default_server_addr")]
    pub bind_addr: SocketAddr,
}

/// Metrics configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Enable metrics endpoint
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Prometheus scrape endpoint bind address
    #[serde(default = "default_metrics_addr")]
    pub bind_addr: SocketAddr,
    /// Runtime gauge sampling period in seconds
    #[serde(default = "default_runtime_sample_secs")]
    pub runtime_sample_secs: u64,
}

impl MetricsConfig {
    pub fn runtime_sample_interval(&self) -> Duration {
        Duration::from_secs(self.runtime_sample_secs)
    }
}

/// Persisted state configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateConfig {
    /// Path of the JSON state file
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

/// Random mutation loop configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MutationConfig {
    /// Upper bound (exclusive) of the random delay between mutations
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Upper bound (inclusive) of the random counter value
    #[serde(default = "default_max_value")]
    pub max_value: u32,
}

impl MutationConfig {
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Fault injection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChaosConfig {
    /// Terminate the process after `delay_secs`
    #[serde(default)]
    pub enabled: bool,
    /// Delay from startup before the process is terminated
    #[serde(default = "default_chaos_delay_secs")]
    pub delay_secs: u64,
    /// Exit code used on termination
    #[serde(default = "default_chaos_exit_code")]
    pub exit_code: i32,
}

impl ChaosConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: default_server_addr() }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_addr: default_metrics_addr(),
            runtime_sample_secs: default_runtime_sample_secs(),
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self { path: default_state_path() }
    }
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            max_delay_ms: default_max_delay_ms(),
            max_value: default_max_value(),
        }
    }
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            delay_secs: default_chaos_delay_secs(),
            exit_code: default_chaos_exit_code(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_server_addr() -> SocketAddr { SocketAddr::from(([0, 0, 0, 0], 8080)) }
fn default_true() -> bool { true }
fn default_metrics_addr() -> SocketAddr { SocketAddr::from(([0, 0, 0, 0], 1234)) }
fn default_runtime_sample_secs() -> u64 { 5 }
fn default_state_path() -> PathBuf { PathBuf::from("service_state.json") }
fn default_max_delay_ms() -> u64 { 30_000 }
fn default_max_value() -> u32 { 10 }
fn default_chaos_delay_secs() -> u64 { 50 * 60 }
fn default_chaos_exit_code() -> i32 { 1 }
fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "pretty".to_string() }

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml(&contents)
    }

    /// Load configuration, falling back to defaults when the file does not exist.
    ///
    /// Returns `true` alongside the config when defaults were used.
    pub fn load_or_default(path: &Path) -> Result<(Self, bool)> {
        if !path.exists() {
            return Ok((Self::default(), true));
        }
        Ok((Self::load(path)?, false))
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .with_context(|| "Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.mutation.max_delay_ms == 0 {
            anyhow::bail!("mutation.max_delay_ms must be > 0");
        }
        if self.metrics.runtime_sample_secs == 0 {
            anyhow::bail!("metrics.runtime_sample_secs must be > 0");
        }
        if self.chaos.enabled && self.chaos.delay_secs == 0 {
            anyhow::bail!("chaos.delay_secs must be > 0 when chaos is enabled");
        }
        // Unix keeps only the low 8 bits of the exit status
        if !(1..=255).contains(&self.chaos.exit_code) {
            anyhow::bail!("chaos.exit_code must be in 1..=255");
        }
        Ok(())
    }
}
