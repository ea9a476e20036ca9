//! Frame sources
//!
//! A [`FrameSource`] hands the alignment loop one RGB frame at a time. The
//! camera driver itself lives outside this crate; the sources here replay
//! frames from memory or from a directory of still images.

use crate::error::VisionError;
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 8-bit, three channel RGB frame
pub type Frame = RgbImage;

/// Binary mask: 255 for target pixels, 0 elsewhere
pub type Mask = GrayImage;

const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Source of frames with fixed dimensions
pub trait FrameSource: Send {
    /// Width and height of every frame this source produces
    fn dimensions(&self) -> (u32, u32);

    /// Next frame, or `None` once the source is exhausted
    fn next_frame(&mut self) -> Result<Option<Frame>, VisionError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, VisionError> {
        (**self).next_frame()
    }
}

/// Frames held in memory, replayed once in order
pub struct MemoryFrameSource {
    frames: VecDeque<Frame>,
    dimensions: (u32, u32),
}

impl MemoryFrameSource {
    /// Replay `frames`; dimensions are taken from the first one
    pub fn new(frames: Vec<Frame>) -> Result<Self, VisionError> {
        let first = frames
            .first()
            .ok_or_else(|| VisionError::Capture("no frames to replay".to_string()))?;
        let dimensions = first.dimensions();
        Ok(Self::with_dimensions(dimensions, frames))
    }

    /// Replay `frames` under explicit dimensions, which may be empty
    pub fn with_dimensions(dimensions: (u32, u32), frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
            dimensions,
        }
    }

    /// The same frame `count` times
    pub fn repeat(frame: Frame, count: usize) -> Self {
        let dimensions = frame.dimensions();
        Self::with_dimensions(dimensions, vec![frame; count])
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for MemoryFrameSource {
    fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, VisionError> {
        Ok(self.frames.pop_front())
    }
}

/// Still images from a directory, in file name order
pub struct ImageDirSource {
    dir: PathBuf,
    files: VecDeque<PathBuf>,
    dimensions: (u32, u32),
}

impl ImageDirSource {
    /// Open `dir`; fails when it holds no supported images
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, VisionError> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)
            .map_err(|e| VisionError::Capture(format!("Failed to open {}: {}", dir.display(), e)))?
        {
            let path = entry?.path();
            if path.is_file() && is_supported_image(&path) {
                files.push(path);
            }
        }
        files.sort();

        let first = files
            .first()
            .ok_or_else(|| VisionError::Capture(format!("No images in {}", dir.display())))?;
        let dimensions = image::image_dimensions(first)?;

        info!(
            "Replaying {} images from {} at {}x{}",
            files.len(),
            dir.display(),
            dimensions.0,
            dimensions.1
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            files: files.into(),
            dimensions,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

impl FrameSource for ImageDirSource {
    fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, VisionError> {
        while let Some(path) = self.files.pop_front() {
            match image::open(&path) {
                Ok(img) => {
                    debug!("Read frame {}", path.display());
                    return Ok(Some(img.to_rgb8()));
                }
                Err(e) => warn!("Skipping unreadable image {}: {}", path.display(), e),
            }
        }
        Ok(None)
    }
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Dimensions after scaling to `width` with the aspect ratio kept
pub fn fit_width(dimensions: (u32, u32), width: Option<u32>) -> (u32, u32) {
    match width {
        Some(target) if dimensions.0 > 0 && target != dimensions.0 => {
            let height = (dimensions.1 as u64 * target as u64 / dimensions.0 as u64).max(1);
            (target, height as u32)
        }
        _ => dimensions,
    }
}

/// Resize `frame` to `dimensions` unless it already has them
pub fn resize_to(frame: Frame, dimensions: (u32, u32)) -> Frame {
    if frame.dimensions() == dimensions || dimensions.0 == 0 || dimensions.1 == 0 {
        return frame;
    }
    imageops::resize(&frame, dimensions.0, dimensions.1, FilterType::Triangle)
}
