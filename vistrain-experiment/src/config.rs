use crate::chart::{BinocularMode, ChartVocabulary};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use vistrain_core::{ConfigError, StaircaseConfig, TiltConfig, TrainingMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub total_trials: usize,
    pub feedback_ms: u64,
    pub tilt: TiltConfig,
    /// Fixed lean used while contrast is being adapted.
    pub contrast_tilt_deg: f64,
    pub staircase: StaircaseConfig,
    pub peripheral_delay_ms: (u64, u64),
    pub patch_size: u32,
    pub spatial_frequency: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            total_trials: 20,
            feedback_ms: 500,
            tilt: TiltConfig::default(),
            contrast_tilt_deg: 15.0,
            staircase: StaircaseConfig::default(),
            peripheral_delay_ms: (500, 1500),
            patch_size: 200,
            spatial_frequency: 4.0,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("training.total_trials", self.total_trials as f64)?;
        ConfigError::check_positive("training.patch_size", self.patch_size as f64)?;
        ConfigError::check_positive("training.spatial_frequency", self.spatial_frequency)?;
        ConfigError::check_within("training.contrast_tilt_deg", self.contrast_tilt_deg, 0.0, 90.0)?;
        ConfigError::check_range(
            "training.peripheral_delay_ms",
            self.peripheral_delay_ms.0 as f64,
            self.peripheral_delay_ms.1 as f64,
        )?;
        self.tilt.validate()?;
        self.staircase.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub vocabulary: ChartVocabulary,
    pub binocular_mode: BinocularMode,
    pub feedback_ms: u64,
    /// Lockout after a correct answer before the next optotype is armed.
    pub advance_delay_ms: u64,
    pub regenerate_delay_ms: u64,
    pub failure_limit: u8,
    pub ipd_gap_px: f32,
    pub ipd_gap_range: (f32, f32),
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            vocabulary: ChartVocabulary::Directional,
            binocular_mode: BinocularMode::RedGreen,
            feedback_ms: 400,
            advance_delay_ms: 300,
            regenerate_delay_ms: 1500,
            failure_limit: 3,
            ipd_gap_px: 16.0,
            ipd_gap_range: (0.0, 200.0),
        }
    }
}

impl ChartConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("chart.failure_limit", self.failure_limit as f64)?;
        let (min, max) = self.ipd_gap_range;
        ConfigError::check_range("chart.ipd_gap_range", min as f64, max as f64)?;
        ConfigError::check_within("chart.ipd_gap_px", self.ipd_gap_px as f64, min as f64, max as f64)
    }
}

/// Which training surface the application opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    #[default]
    Gabor,
    Chart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub log_level: String,
    pub surface: Surface,
    pub mode: TrainingMode,
    pub voice: bool,
    pub results_path: Option<PathBuf>,
    /// TrueType font for labels and letter optotypes.
    pub font_path: Option<PathBuf>,
    /// Drift the carrier phase of displayed patches.
    pub phase_drift: bool,
    pub training: TrainingConfig,
    pub chart: ChartConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            surface: Surface::Gabor,
            mode: TrainingMode::Orientation,
            voice: false,
            results_path: None,
            font_path: None,
            phase_drift: false,
            training: TrainingConfig::default(),
            chart: ChartConfig::default(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigLoadError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.training.validate()?;
        self.chart.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "mode": "contrast", "training": { "total_trials": 12 }, "chart": { "binocular_mode": "alternating" } }"#,
        )
        .unwrap();
        assert_eq!(config.mode, TrainingMode::Contrast);
        assert_eq!(config.training.total_trials, 12);
        assert_eq!(config.training.feedback_ms, 500);
        assert_eq!(config.chart.binocular_mode, BinocularMode::Alternating);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn impossible_values_are_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "training": { "total_trials": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Invalid(ConfigError::NotPositive { .. })));

        let err = EngineConfig::from_json_str(
            r#"{ "training": { "tilt": { "min": 10.0, "max": 5.0 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigLoadError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ nope"),
            Err(ConfigLoadError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/vistrain.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/vistrain.json"));
    }
}
