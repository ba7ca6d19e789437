//! Configuration types for monitor access.
//!
//! Every field has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! [bus]
//! device_dir = "/dev"
//! device_prefix = "i2c-"
//!
//! [timing]
//! write_delay_ms = 50
//! response_delay_ms = 40
//!
//! [protocol]
//! ignore_checksum_errors = true
//! string_read_attempts = 3
//!
//! [[features.overrides]]
//! model = "LG FULLHD(HDMI)"
//! code = "input"
//! values = { "0x01" = "VGA-1", "0x04" = "HDMI-1" }
//! ```

use crate::errors::MonitorError;
use ddc_features::{FeatureTable, ModelOverride};
use ddc_protocol::io::{RESPONSE_DELAY, WRITE_DELAY};
use ddc_protocol::{ClientOptions, Timing};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Complete monitor access configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device node settings.
    pub bus: BusConfig,
    /// Bus pacing.
    pub timing: TimingConfig,
    /// DDC/CI protocol behaviour.
    pub protocol: ProtocolConfig,
    /// Feature registry additions.
    pub features: FeaturesConfig,
}

/// Device node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusConfig {
    /// Directory holding the I2C device nodes.
    #[serde(default = "default_device_dir")]
    pub device_dir: PathBuf,
    /// File name prefix of I2C device nodes.
    #[serde(default = "default_device_prefix")]
    pub device_prefix: String,
}

fn default_device_dir() -> PathBuf {
    PathBuf::from("/dev")
}

fn default_device_prefix() -> String {
    "i2c-".to_string()
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            device_dir: default_device_dir(),
            device_prefix: default_device_prefix(),
        }
    }
}

/// Bus pacing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Gap between consecutive writes in milliseconds.
    #[serde(default = "default_write_delay_ms")]
    pub write_delay_ms: u64,
    /// Wait between a request and reading its reply in milliseconds.
    #[serde(default = "default_response_delay_ms")]
    pub response_delay_ms: u64,
}

fn default_write_delay_ms() -> u64 {
    duration_ms(WRITE_DELAY)
}

fn default_response_delay_ms() -> u64 {
    duration_ms(RESPONSE_DELAY)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            write_delay_ms: default_write_delay_ms(),
            response_delay_ms: default_response_delay_ms(),
        }
    }
}

/// DDC/CI protocol configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Log checksum failures instead of failing the request.
    #[serde(default = "default_true")]
    pub ignore_checksum_errors: bool,
    /// Attempts per chunk when reading capabilities or identity strings.
    #[serde(default = "default_string_read_attempts")]
    pub string_read_attempts: u32,
}

fn default_true() -> bool {
    true
}

fn default_string_read_attempts() -> u32 {
    ddc_protocol::ddcci::DEFAULT_STRING_READ_ATTEMPTS
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            ignore_checksum_errors: default_true(),
            string_read_attempts: default_string_read_attempts(),
        }
    }
}

/// Feature registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Per-model value names merged into the builtin table.
    #[serde(default)]
    pub overrides: Vec<ModelOverride>,
}

impl Config {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Config`] for malformed TOML or invalid values.
    pub fn from_toml_str(text: &str) -> Result<Self, MonitorError> {
        let config: Self = toml::from_str(text).map_err(|e| MonitorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Config`] if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MonitorError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| MonitorError::Config(format!("Unable to read {}: {}", path.display(), e)))?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.bus.device_prefix.is_empty() {
            return Err(MonitorError::Config("Device prefix cannot be empty".to_string()));
        }

        if self.timing.write_delay_ms < default_write_delay_ms() {
            return Err(MonitorError::Config(format!(
                "Write delay must be at least {} ms",
                default_write_delay_ms()
            )));
        }

        if self.timing.response_delay_ms < default_response_delay_ms() {
            return Err(MonitorError::Config(format!(
                "Response delay must be at least {} ms",
                default_response_delay_ms()
            )));
        }

        if self.protocol.string_read_attempts == 0 {
            return Err(MonitorError::Config(
                "String read attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Bus pacing as protocol timing.
    #[must_use]
    pub fn timing(&self) -> Timing {
        Timing {
            write_delay: Duration::from_millis(self.timing.write_delay_ms),
            response_delay: Duration::from_millis(self.timing.response_delay_ms),
        }
    }

    /// Options for each DDC/CI client.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timing: self.timing(),
            ignore_checksum_errors: self.protocol.ignore_checksum_errors,
            string_read_attempts: self.protocol.string_read_attempts,
        }
    }

    /// The feature table to inject into monitors.
    ///
    /// Without overrides this is the shared builtin table.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Feature`] if an override names an unknown
    /// feature or a malformed value.
    pub fn feature_table(&self) -> Result<Arc<FeatureTable>, MonitorError> {
        if self.features.overrides.is_empty() {
            return Ok(FeatureTable::shared());
        }
        let mut table = FeatureTable::builtin();
        for model_override in &self.features.overrides {
            table.apply(model_override)?;
        }
        Ok(Arc::new(table))
    }
}

/// Builder for creating a `Config`.
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Sets the directory holding the I2C device nodes.
    #[must_use]
    pub fn device_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.bus.device_dir = dir.into();
        self
    }

    /// Sets the device node file name prefix.
    #[must_use]
    pub fn device_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.bus.device_prefix = prefix.into();
        self
    }

    /// Sets the write and response delays in milliseconds.
    #[must_use]
    pub fn delays_ms(mut self, write_delay_ms: u64, response_delay_ms: u64) -> Self {
        self.config.timing.write_delay_ms = write_delay_ms;
        self.config.timing.response_delay_ms = response_delay_ms;
        self
    }

    /// Sets whether checksum errors are logged instead of returned.
    #[must_use]
    pub fn ignore_checksum_errors(mut self, ignore: bool) -> Self {
        self.config.protocol.ignore_checksum_errors = ignore;
        self
    }

    /// Sets the per-chunk attempt budget for string reads.
    #[must_use]
    pub fn string_read_attempts(mut self, attempts: u32) -> Self {
        self.config.protocol.string_read_attempts = attempts;
        self
    }

    /// Adds a per-model override.
    #[must_use]
    pub fn model_override(mut self, model_override: ModelOverride) -> Self {
        self.config.features.overrides.push(model_override);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Config, MonitorError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
