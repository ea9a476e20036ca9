//! hatchvision-eye: vision side of the hatch alignment system
//!
//! Finds the two retro-reflective strips that flank a hatch slot in each
//! camera frame, estimates how far the robot sits from the slot centerline
//! and hands the result to a [`hatchvision_core::StateSink`].
//!
//! The per-frame work is a pure function of the frame and the
//! configuration; [`AlignmentLoop`] adds the deadline, the stop signal and
//! the non-blocking publish around it.

pub mod alignment_loop;
pub mod annotate;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod processing;
pub mod utils;

pub use alignment_loop::{AlignmentLoop, LoopSummary, StopReason};
pub use annotate::{annotate, FrameAnnotator};
pub use error::VisionError;
pub use frame::{Frame, FrameSource, ImageDirSource, Mask, MemoryFrameSource};
pub use pipeline::{AlignmentPipeline, FrameAnalysis, FrameOutcome};
