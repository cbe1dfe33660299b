//! Frame source and file configuration.

use crate::analysis::AnalysisConfig;
use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the synthetic frame source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Number of frames the source yields.
    pub frame_count: u32,
    /// Frames per unit time.
    pub frame_rate: f64,
    /// Seed for the noise stream.
    pub seed: u64,
    /// Saturation intensity of the fluorescence signal.
    pub peak_intensity: f64,
    /// Rise time constant, in frames.
    pub rise_frames: f64,
    /// Front propagation speed, in pixels per frame.
    pub front_speed: f64,
    /// Peak-to-peak amplitude of additive uniform noise.
    pub noise_amplitude: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 48,
            frame_count: 60,
            frame_rate: 25.0,
            seed: 0x5eed,
            peak_intensity: 200.0,
            rise_frames: 6.0,
            front_speed: 1.5,
            noise_amplitude: 8.0,
        }
    }
}

impl SourceConfig {
    /// Creates a new configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(ConfigError::InvalidFrameRate);
        }
        if !(self.rise_frames > 0.0 && self.front_speed > 0.0) {
            return Err(ConfigError::InvalidSignal(
                "rise_frames and front_speed must be positive",
            ));
        }
        if !(self.peak_intensity >= 0.0 && self.noise_amplitude >= 0.0) {
            return Err(ConfigError::InvalidSignal(
                "peak_intensity and noise_amplitude must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    #[error("invalid frame rate (must be positive and finite)")]
    InvalidFrameRate,
    #[error("invalid signal model: {0}")]
    InvalidSignal(&'static str),
    #[error("invalid analysis settings: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.source.validate()?;
        config.analysis.validate()?;
        Ok(config)
    }
}
