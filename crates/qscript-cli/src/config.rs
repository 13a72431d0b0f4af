//! Configuration management for the qscript CLI.
//!
//! Supports loading configuration from:
//! 1. A YAML file (`--config`, or `~/.config/qscript/config.yaml` when present)
//! 2. Environment variables with the `QSCRIPT_` prefix
//! 3. A `.env` file in the working directory
//!
//! Command-line flags are applied on top by the individual commands, so the
//! overall precedence is flags > environment > file > defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use qscript_tomography::TomographyMode;
use qscript_vqa::{
    DEFAULT_INITIAL_PARAMS, DEFAULT_ITERATIONS, DEFAULT_STEP_SIZE, GradientMethod,
};

/// Hardware target of the tomography command.
pub const DEFAULT_DEVICE_ARN: &str = "arn:aws:braket:::device/qpu/rigetti/Aspen-9";

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QscriptConfig {
    pub vqa: VqaSettings,
    pub sampling: SamplingSettings,
    pub tomography: TomographySettings,
    pub braket: BraketSettings,
    pub logging: LoggingSettings,
}

/// Variational optimizer loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VqaSettings {
    pub step_size: f64,
    pub iterations: usize,
    pub initial_params: Vec<f64>,
    /// Shots per expectation value; `None` asks the simulator for exact values.
    pub shots: Option<u32>,
    pub gradient: GradientMethod,
}

impl Default for VqaSettings {
    fn default() -> Self {
        Self {
            step_size: DEFAULT_STEP_SIZE,
            iterations: DEFAULT_ITERATIONS,
            initial_params: DEFAULT_INITIAL_PARAMS.to_vec(),
            shots: None,
            gradient: GradientMethod::default(),
        }
    }
}

/// Local sampling of the Hadamard circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingSettings {
    pub shots: u32,
    /// Fixed RNG seed for reproducible counts.
    pub seed: Option<u64>,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            shots: 1000,
            seed: None,
        }
    }
}

/// Bell-circuit tomography.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomographySettings {
    /// Braket device ARN or short name such as `aspen-9`.
    pub device_arn: String,
    /// Shots per measurement setting.
    pub shots: u32,
    pub mode: TomographyMode,
    pub poll_interval_ms: u64,
    pub wait_timeout_secs: u64,
}

impl Default for TomographySettings {
    fn default() -> Self {
        Self {
            device_arn: DEFAULT_DEVICE_ARN.to_string(),
            shots: 1000,
            mode: TomographyMode::default(),
            poll_interval_ms: 1000,
            wait_timeout_secs: 24 * 60 * 60,
        }
    }
}

/// Where Braket writes task results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BraketSettings {
    pub s3_bucket: Option<String>,
    pub s3_prefix: String,
    pub region: String,
}

impl Default for BraketSettings {
    fn default() -> Self {
        Self {
            s3_bucket: None,
            s3_prefix: "qscript-results".to_string(),
            region: "us-east-1".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log format: "console" or "json"
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "console".to_string(),
        }
    }
}

impl QscriptConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::Io(format!("{}: {e}", path.as_ref().display()))
        })?;
        serde_yaml_ng::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// `~/.config/qscript/config.yaml` (platform equivalent elsewhere).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("qscript").join("config.yaml"))
    }

    /// Load configuration with the following precedence:
    /// 1. `.env` file, if present, feeds the environment
    /// 2. File from `config_file`, else the default path if it exists, else defaults
    /// 3. Environment variable overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(path)?,
                None => Self::default(),
            },
        };

        let config = config.merge_env_from(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `QSCRIPT_*` overrides read through `lookup`.
    ///
    /// Only variables that are set override anything; a value that fails to
    /// parse is a validation error.
    pub fn merge_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        // VQA
        if let Some(v) = lookup("QSCRIPT_VQA_STEP_SIZE") {
            self.vqa.step_size = parse_env("QSCRIPT_VQA_STEP_SIZE", &v)?;
        }
        if let Some(v) = lookup("QSCRIPT_VQA_ITERATIONS") {
            self.vqa.iterations = parse_env("QSCRIPT_VQA_ITERATIONS", &v)?;
        }
        if let Some(v) = lookup("QSCRIPT_VQA_SHOTS") {
            self.vqa.shots = Some(parse_env("QSCRIPT_VQA_SHOTS", &v)?);
        }
        if let Some(v) = lookup("QSCRIPT_VQA_GRADIENT") {
            self.vqa.gradient = parse_env("QSCRIPT_VQA_GRADIENT", &v)?;
        }

        // Sampling
        if let Some(v) = lookup("QSCRIPT_SAMPLE_SHOTS") {
            self.sampling.shots = parse_env("QSCRIPT_SAMPLE_SHOTS", &v)?;
        }
        if let Some(v) = lookup("QSCRIPT_SAMPLE_SEED") {
            self.sampling.seed = Some(parse_env("QSCRIPT_SAMPLE_SEED", &v)?);
        }

        // Tomography
        if let Some(v) = lookup("QSCRIPT_TOMOGRAPHY_DEVICE") {
            self.tomography.device_arn = v;
        }
        if let Some(v) = lookup("QSCRIPT_TOMOGRAPHY_SHOTS") {
            self.tomography.shots = parse_env("QSCRIPT_TOMOGRAPHY_SHOTS", &v)?;
        }
        if let Some(v) = lookup("QSCRIPT_TOMOGRAPHY_MODE") {
            self.tomography.mode = parse_env("QSCRIPT_TOMOGRAPHY_MODE", &v)?;
        }

        // Braket
        if let Some(v) = lookup("QSCRIPT_BRAKET_S3_BUCKET") {
            self.braket.s3_bucket = Some(v);
        }
        if let Some(v) = lookup("QSCRIPT_BRAKET_S3_PREFIX") {
            self.braket.s3_prefix = v;
        }
        if let Some(v) = lookup("AWS_REGION") {
            self.braket.region = v;
        }

        // Logging
        if let Some(v) = lookup("QSCRIPT_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("QSCRIPT_LOG_FORMAT") {
            self.logging.format = v;
        }

        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let vqa = &self.vqa;
        if !(vqa.step_size.is_finite() && vqa.step_size > 0.0) {
            return Err(ConfigError::Validation(format!(
                "vqa.step_size must be positive, got {}",
                vqa.step_size
            )));
        }
        if vqa.iterations == 0 {
            return Err(ConfigError::Validation(
                "vqa.iterations must be greater than 0".to_string(),
            ));
        }
        if vqa.initial_params.len() != DEFAULT_INITIAL_PARAMS.len()
            || vqa.initial_params.iter().any(|p| !p.is_finite())
        {
            return Err(ConfigError::Validation(format!(
                "vqa.initial_params must be {} finite numbers, got {:?}",
                DEFAULT_INITIAL_PARAMS.len(),
                vqa.initial_params
            )));
        }
        if vqa.shots == Some(0) {
            return Err(ConfigError::Validation(
                "vqa.shots must be greater than 0; omit it for exact expectations".to_string(),
            ));
        }

        if self.sampling.shots == 0 {
            return Err(ConfigError::Validation(
                "sampling.shots must be greater than 0".to_string(),
            ));
        }

        let tomo = &self.tomography;
        if tomo.shots == 0 {
            return Err(ConfigError::Validation(
                "tomography.shots must be greater than 0".to_string(),
            ));
        }
        if tomo.poll_interval_ms == 0 || tomo.wait_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "tomography.poll_interval_ms and wait_timeout_secs must be greater than 0"
                    .to_string(),
            ));
        }
        if tomo.device_arn.trim().is_empty() {
            return Err(ConfigError::Validation(
                "tomography.device_arn must not be empty".to_string(),
            ));
        }

        if let Some(ref bucket) = self.braket.s3_bucket {
            if bucket.is_empty() {
                return Err(ConfigError::Validation(
                    "braket.s3_bucket must not be empty; omit the field instead".to_string(),
                ));
            }
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "Invalid log level: {other}"
                )));
            }
        }
        match self.logging.format.as_str() {
            "console" | "json" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "Invalid log format: {other}"
                )));
            }
        }

        Ok(())
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::Validation(format!("{key}={value}: {e}")))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
