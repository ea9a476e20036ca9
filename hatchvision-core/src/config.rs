// Layered configuration for the alignment pipeline

use crate::types::HsvBounds;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which keys a publish writes to the shared table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishLayout {
    /// `Offset` (signed number) and `Direction` (string)
    Offset,
    /// `Direction` (string) and `Distance` (unsigned number)
    DirectionDistance,
}

impl std::str::FromStr for PublishLayout {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "offset" => Ok(PublishLayout::Offset),
            "direction_distance" => Ok(PublishLayout::DirectionDistance),
            other => Err(ConfigError::ParseError(format!("unknown publish layout '{}'", other))),
        }
    }
}

/// Segmentation and geometry parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub bounds: HsvBounds,
    /// Regions must be strictly larger than this many pixels
    pub min_area: f64,
    /// Physical distance between the two target strips
    pub target_separation: f64,
    /// Reference center line; `None` uses the middle of the frame
    pub center_x: Option<u32>,
    /// Frames are resized to this width (aspect preserved) before analysis
    pub resize_width: Option<u32>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            bounds: HsvBounds::default(),
            min_area: 100.0,
            target_separation: 11.5,
            center_x: None,
            resize_width: Some(600),
        }
    }
}

impl VisionConfig {
    /// Center line for a frame of the given width
    pub fn center_x_for(&self, frame_width: u32) -> u32 {
        self.center_x.unwrap_or(frame_width / 2)
    }
}

/// Shared state store parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Address of the store's server, reported in logs
    pub server: String,
    /// Table path inside the store
    pub table: String,
    pub layout: PublishLayout,
    pub connect_timeout_ms: u64,
    pub publish_timeout_ms: u64,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            server: "127.0.0.1".to_string(),
            table: "Shuffleboard/LiveWindow".to_string(),
            layout: PublishLayout::Offset,
            connect_timeout_ms: 5_000,
            publish_timeout_ms: 20,
        }
    }
}

impl SinkConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }
}

/// Loop parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Hard bound on one frame's pipeline work
    pub frame_deadline_ms: u64,
    /// Write annotated frames here when set
    pub annotate_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_deadline_ms: 100,
            annotate_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn frame_deadline(&self) -> Duration {
        Duration::from_millis(self.frame_deadline_ms)
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub vision: VisionConfig,
    pub sink: SinkConfig,
    pub runtime: RuntimeConfig,
}

impl AlignmentConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_str(&content)
    }

    /// Load configuration from string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        // Try JSON first
        if let Ok(config) = serde_json::from_str::<AlignmentConfig>(content) {
            return Ok(config);
        }

        // Try TOML
        if let Ok(config) = toml::from_str::<AlignmentConfig>(content) {
            return Ok(config);
        }

        // Try YAML
        if let Ok(config) = serde_yaml::from_str::<AlignmentConfig>(content) {
            return Ok(config);
        }

        Err(ConfigError::ParseError("Unknown format".to_string()))
    }

    /// Serialize as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Override fields from `HATCHVISION_*` environment variables
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Override fields from an arbitrary variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(area) = lookup("HATCHVISION_MIN_AREA").and_then(|v| v.parse::<f64>().ok()) {
            self.vision.min_area = area;
        }

        if let Some(sep) = lookup("HATCHVISION_SEPARATION").and_then(|v| v.parse::<f64>().ok()) {
            self.vision.target_separation = sep;
        }

        if let Some(center) = lookup("HATCHVISION_CENTER_X").and_then(|v| v.parse::<u32>().ok()) {
            self.vision.center_x = Some(center);
        }

        if let Some(server) = lookup("HATCHVISION_SERVER") {
            self.sink.server = server;
        }

        if let Some(table) = lookup("HATCHVISION_TABLE") {
            self.sink.table = table;
        }

        if let Some(level) = lookup("HATCHVISION_LOG_LEVEL") {
            self.runtime.log_level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.vision.bounds.is_ordered() {
            return Err(ConfigError::ValidationError(format!(
                "HSV lower bound {:?} exceeds upper bound {:?}",
                self.vision.bounds.lower, self.vision.bounds.upper
            )));
        }

        if !self.vision.min_area.is_finite() || self.vision.min_area <= 0.0 {
            return Err(ConfigError::ValidationError(
                "vision.min_area must be a positive number".to_string(),
            ));
        }

        if !self.vision.target_separation.is_finite() || self.vision.target_separation <= 0.0 {
            return Err(ConfigError::ValidationError(
                "vision.target_separation must be a positive number".to_string(),
            ));
        }

        if self.vision.resize_width == Some(0) {
            return Err(ConfigError::ValidationError(
                "vision.resize_width cannot be 0".to_string(),
            ));
        }

        if self.runtime.frame_deadline_ms == 0 {
            return Err(ConfigError::ValidationError(
                "runtime.frame_deadline_ms must be > 0".to_string(),
            ));
        }

        if self.sink.table.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "sink.table cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Check the center line against the working frame width
    pub fn validate_for_width(&self, frame_width: u32) -> Result<(), ConfigError> {
        let center = self.vision.center_x_for(frame_width);
        if center >= frame_width {
            return Err(ConfigError::ValidationError(format!(
                "center_x {} must be less than frame width {}",
                center, frame_width
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Configuration(err.to_string())
    }
}
