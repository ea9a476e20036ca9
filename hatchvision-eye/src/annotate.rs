//! Debug overlays for analyzed frames

use crate::error::VisionError;
use crate::frame::Frame;
use crate::pipeline::FrameAnalysis;
use crate::processing::Candidate;
use image::Rgb;
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CANDIDATE_COLOR: Rgb<u8> = Rgb([0, 255, 255]);
pub const SELECTED_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
pub const CENTER_LINE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Copy of `frame` with every candidate circled, the chosen pair
/// highlighted and the center line drawn
pub fn annotate(frame: &Frame, analysis: &FrameAnalysis) -> Frame {
    let mut canvas = frame.clone();

    for candidate in &analysis.candidates {
        circle(&mut canvas, candidate, CANDIDATE_COLOR);
    }
    for candidate in analysis.pair.left.iter().chain(analysis.pair.right.iter()) {
        circle(&mut canvas, candidate, SELECTED_COLOR);
    }

    let x = analysis.center_x as f32;
    let height = canvas.height() as f32;
    draw_line_segment_mut(&mut canvas, (x, 0.0), (x, height), CENTER_LINE_COLOR);
    canvas
}

fn circle(canvas: &mut Frame, candidate: &Candidate, color: Rgb<u8>) {
    let circle = &candidate.enclosing_circle;
    let center = (circle.center.x.round() as i32, circle.center.y.round() as i32);
    draw_hollow_circle_mut(canvas, center, circle.radius.round().max(1.0) as i32, color);
}

/// Writes annotated frames as numbered PNGs into one directory
#[derive(Debug, Clone)]
pub struct FrameAnnotator {
    dir: PathBuf,
}

impl FrameAnnotator {
    /// Create `dir` if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, VisionError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", index))
    }

    /// Annotate and save frame number `index`
    pub fn save(&self, index: u64, frame: &Frame, analysis: &FrameAnalysis) -> Result<PathBuf, VisionError> {
        let path = self.path_for(index);
        annotate(frame, analysis).save(&path)?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}
