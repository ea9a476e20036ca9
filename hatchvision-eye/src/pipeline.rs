//! Single-frame alignment pipeline

use crate::error::VisionError;
use crate::frame::{fit_width, resize_to, Frame};
use crate::processing::{Candidate, CandidateExtractor, OffsetEstimator, PairSelector, Segmenter, TargetPair};
use hatchvision_core::{Offset, VisionConfig};
use tracing::{debug, trace};

/// What one frame produced
#[derive(Debug)]
pub enum FrameOutcome {
    /// Both strips found and the offset computed
    Aligned(Offset),
    /// At least one strip missing; nothing to publish
    NoTarget { left_found: bool, right_found: bool },
    /// Frame could not be turned into an offset
    Rejected(VisionError),
}

impl FrameOutcome {
    pub fn offset(&self) -> Option<Offset> {
        match self {
            FrameOutcome::Aligned(offset) => Some(*offset),
            _ => None,
        }
    }
}

/// Every intermediate result for one frame
#[derive(Debug)]
pub struct FrameAnalysis {
    pub candidates: Vec<Candidate>,
    pub pair: TargetPair,
    pub center_x: u32,
    pub outcome: FrameOutcome,
}

/// Segmenter, extractor, selector and estimator wired for one frame size
#[derive(Debug, Clone)]
pub struct AlignmentPipeline {
    segmenter: Segmenter,
    extractor: CandidateExtractor,
    selector: PairSelector,
    estimator: OffsetEstimator,
    center_x: u32,
    dimensions: (u32, u32),
    resize_width: Option<u32>,
}

impl AlignmentPipeline {
    /// Build a pipeline for frames of `source_dimensions`, after the
    /// configured resize
    pub fn new(config: &VisionConfig, source_dimensions: (u32, u32)) -> Result<Self, VisionError> {
        let dimensions = fit_width(source_dimensions, config.resize_width);
        if dimensions.0 == 0 || dimensions.1 == 0 {
            return Err(VisionError::Config(format!(
                "frame dimensions {:?} are empty",
                dimensions
            )));
        }

        let center_x = config.center_x_for(dimensions.0);
        if center_x >= dimensions.0 {
            return Err(VisionError::Config(format!(
                "center_x {} must be less than frame width {}",
                center_x, dimensions.0
            )));
        }

        debug!(
            "Pipeline for {}x{} frames, center line at x={}",
            dimensions.0, dimensions.1, center_x
        );

        Ok(Self {
            segmenter: Segmenter::new(config.bounds),
            extractor: CandidateExtractor::new(config.min_area),
            selector: PairSelector::new(center_x as f64),
            estimator: OffsetEstimator::new(center_x as f64, config.target_separation),
            center_x,
            dimensions,
            resize_width: config.resize_width,
        })
    }

    /// Working frame size
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    pub fn center_x(&self) -> u32 {
        self.center_x
    }

    /// Scale a source frame to the working width, keeping its aspect
    /// ratio; a frame of the wrong shape stays wrong and `process` rejects it
    pub fn prepare(&self, frame: Frame) -> Frame {
        let target = fit_width(frame.dimensions(), self.resize_width);
        resize_to(frame, target)
    }

    /// Run every stage on a working-size frame
    pub fn process(&self, frame: &Frame) -> FrameAnalysis {
        if frame.dimensions() != self.dimensions {
            return self.analysis(
                Vec::new(),
                TargetPair::default(),
                FrameOutcome::Rejected(VisionError::FrameSize {
                    expected: self.dimensions,
                    actual: frame.dimensions(),
                }),
            );
        }

        let mask = self.segmenter.segment(frame);
        let candidates = self.extractor.extract(&mask);
        let pair = self.selector.select(&candidates);

        let outcome = if pair.is_complete() {
            match self.estimator.estimate(&pair) {
                Ok(offset) => FrameOutcome::Aligned(offset),
                Err(e) => FrameOutcome::Rejected(e),
            }
        } else {
            FrameOutcome::NoTarget {
                left_found: pair.left.is_some(),
                right_found: pair.right.is_some(),
            }
        };

        trace!("{} candidates -> {:?}", candidates.len(), outcome);
        self.analysis(candidates, pair, outcome)
    }

    fn analysis(&self, candidates: Vec<Candidate>, pair: TargetPair, outcome: FrameOutcome) -> FrameAnalysis {
        FrameAnalysis {
            candidates,
            pair,
            center_x: self.center_x,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_defaults_to_half_width() {
        let pipeline = AlignmentPipeline::new(&VisionConfig::default(), (640, 480)).unwrap();
        assert_eq!(pipeline.dimensions(), (600, 450));
        assert_eq!(pipeline.center_x(), 300);
    }

    #[test]
    fn test_center_outside_frame_is_rejected() {
        let config = VisionConfig {
            center_x: Some(600),
            ..VisionConfig::default()
        };
        assert!(matches!(
            AlignmentPipeline::new(&config, (640, 480)),
            Err(VisionError::Config(_))
        ));
    }

    #[test]
    fn test_wrong_frame_size_is_rejected() {
        let config = VisionConfig {
            resize_width: None,
            ..VisionConfig::default()
        };
        let pipeline = AlignmentPipeline::new(&config, (320, 240)).unwrap();
        let analysis = pipeline.process(&Frame::new(640, 480));
        assert!(matches!(
            analysis.outcome,
            FrameOutcome::Rejected(VisionError::FrameSize { expected: (320, 240), actual: (640, 480) })
        ));
    }

    #[test]
    fn test_prepare_keeps_aspect_ratio() {
        let pipeline = AlignmentPipeline::new(&VisionConfig::default(), (640, 480)).unwrap();
        assert_eq!(pipeline.prepare(Frame::new(1280, 960)).dimensions(), (600, 450));

        let stretched = pipeline.prepare(Frame::new(1280, 480));
        assert_eq!(stretched.dimensions(), (600, 225));
        assert!(matches!(
            pipeline.process(&stretched).outcome,
            FrameOutcome::Rejected(VisionError::FrameSize { expected: (600, 450), actual: (600, 225) })
        ));
    }

    #[test]
    fn test_blank_frame_has_no_target() {
        let pipeline = AlignmentPipeline::new(&VisionConfig::default(), (600, 450)).unwrap();
        let analysis = pipeline.process(&Frame::new(600, 450));
        assert!(analysis.candidates.is_empty());
        assert!(matches!(
            analysis.outcome,
            FrameOutcome::NoTarget { left_found: false, right_found: false }
        ));
        assert_eq!(analysis.outcome.offset(), None);
    }
}
