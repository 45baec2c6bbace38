//! CLI configuration management
//!
//! Handles loading configuration from TOML files, environment variables, and
//! CLI arguments.

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

use rng_core::{Residency, RngError, RngType};
use rng_facade::MAX_DIMENSIONS;

const ENV_LOG_LEVEL: &str = "NEUTRYX_RNG_LOG_LEVEL";
const ENV_TYPE: &str = "NEUTRYX_RNG_TYPE";
const ENV_RESIDENCY: &str = "NEUTRYX_RNG_RESIDENCY";
const ENV_SEED: &str = "NEUTRYX_RNG_SEED";
const ENV_OFFSET: &str = "NEUTRYX_RNG_OFFSET";
const ENV_DIMENSIONS: &str = "NEUTRYX_RNG_DIMENSIONS";
const ENV_THREADS: &str = "NEUTRYX_RNG_THREADS";
const ENV_FORMAT: &str = "NEUTRYX_RNG_FORMAT";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid generator type: {0}")]
    InvalidType(String),

    #[error("Invalid residency: {0}. Must be one of: device, host")]
    InvalidResidency(String),

    #[error("Invalid output format: {0}. Must be one of: json, csv, table")]
    InvalidFormat(String),

    #[error("Invalid dimensions: {0}. Must be between 1 and 21")]
    InvalidDimensions(u32),

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

/// Output formats for generated samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    Csv,
    #[default]
    Table,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "table" => Ok(OutputFormat::Table),
            _ => Err(ConfigError::InvalidFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

/// CLI configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Log level
    #[serde(deserialize_with = "deserialize_from_str")]
    pub log_level: LogLevel,
    /// Generator type
    #[serde(rename = "type")]
    pub rng_type: RngType,
    /// Generator residency
    pub residency: Residency,
    /// Pseudo-random seed
    pub seed: u64,
    /// Absolute offset of the first sample
    pub offset: u64,
    /// Quasi-random dimension count
    pub dimensions: u32,
    /// Worker threads of a dedicated stream; `None` uses the global pool
    pub threads: Option<usize>,
    /// Output format
    #[serde(deserialize_with = "deserialize_from_str")]
    pub format: OutputFormat,
}

fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: FromStr<Err = ConfigError>,
{
    let s = String::deserialize(deserializer)?;
    T::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Warn,
            rng_type: RngType::PseudoDefault,
            residency: Residency::Device,
            seed: 0,
            offset: 0,
            dimensions: 1,
            threads: None,
            format: OutputFormat::Table,
        }
    }
}

type EnvLookup<'a> = &'a dyn Fn(&str) -> Result<String, std::env::VarError>;

fn parse_env<T: FromStr>(lookup: EnvLookup<'_>, name: &str) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvError(format!("{}={}", name, value))),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::EnvError(format!("{}: {}", name, e))),
    }
}

fn parse_type(s: &str) -> Result<RngType, ConfigError> {
    s.parse()
        .map_err(|e: RngError| ConfigError::InvalidType(e.to_string()))
}

fn parse_residency(s: &str) -> Result<Residency, ConfigError> {
    s.parse()
        .map_err(|_: RngError| ConfigError::InvalidResidency(s.to_string()))
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: CliConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `NEUTRYX_RNG_*` environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(&|name| std::env::var(name))
    }

    fn apply_env_from(&mut self, lookup: EnvLookup<'_>) -> Result<(), ConfigError> {
        if let Ok(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Ok(rng_type) = lookup(ENV_TYPE) {
            self.rng_type = parse_type(&rng_type)?;
        }
        if let Ok(residency) = lookup(ENV_RESIDENCY) {
            self.residency = parse_residency(&residency)?;
        }
        if let Some(seed) = parse_env(lookup, ENV_SEED)? {
            self.seed = seed;
        }
        if let Some(offset) = parse_env(lookup, ENV_OFFSET)? {
            self.offset = offset;
        }
        if let Some(dimensions) = parse_env(lookup, ENV_DIMENSIONS)? {
            self.dimensions = dimensions;
        }
        if let Some(threads) = parse_env(lookup, ENV_THREADS)? {
            self.threads = Some(threads);
        }
        if let Ok(format) = lookup(ENV_FORMAT) {
            self.format = OutputFormat::from_str(&format)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimensions == 0 || self.dimensions > MAX_DIMENSIONS {
            return Err(ConfigError::InvalidDimensions(self.dimensions));
        }
        if matches!(self.rng_type, RngType::Test) {
            return Err(ConfigError::InvalidType(self.rng_type.to_string()));
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(level) = &cli.log_level {
            self.log_level = LogLevel::from_str(level)?;
        }
        if let Some(rng_type) = &cli.rng_type {
            self.rng_type = parse_type(rng_type)?;
        }
        if cli.host {
            self.residency = Residency::Host;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(offset) = cli.offset {
            self.offset = offset;
        }
        if let Some(dimensions) = cli.dimensions {
            self.dimensions = dimensions;
        }
        if let Some(threads) = cli.threads {
            self.threads = Some(threads);
        }
        if let Some(format) = &cli.format {
            self.format = OutputFormat::from_str(format)?;
        }
        Ok(())
    }
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<String>,
    /// Generator type override
    pub rng_type: Option<String>,
    /// Force host residency
    pub host: bool,
    /// Seed override
    pub seed: Option<u64>,
    /// Offset override
    pub offset: Option<u64>,
    /// Dimension override
    pub dimensions: Option<u32>,
    /// Stream thread count override
    pub threads: Option<usize>,
    /// Output format override
    pub format: Option<String>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<CliConfig, ConfigError> {
    let mut config = match &cli.config_file {
        Some(path) => CliConfig::from_file(path)?,
        None => CliConfig::default(),
    };

    config.apply_env()?;
    config.merge_with_cli(cli)?;
    config.validate()?;

    Ok(config)
}
