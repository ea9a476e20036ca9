//! hatchvision-core: shared types, configuration and the state sink seam
//! for the hatch alignment vision system.

pub mod types;
pub mod error;
pub mod config;
pub mod sink;

pub use error::{Error, Result};
pub use types::{Direction, Offset, RobotMode, HsvBounds};
pub use config::{AlignmentConfig, VisionConfig, SinkConfig, RuntimeConfig, PublishLayout, ConfigError};
pub use sink::StateSink;
