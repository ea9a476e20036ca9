//! Edge case tests for hatchvision-eye

mod common;

use common::{config, frame_with_strips, paint, HEIGHT, TAPE, WIDTH};
use hatchvision_core::HsvBounds;
use hatchvision_eye::{AlignmentPipeline, Frame, FrameOutcome, VisionError};

#[test]
fn test_blank_frame() {
    let config = config();
    let pipeline = AlignmentPipeline::new(&config.vision, (WIDTH, HEIGHT)).unwrap();
    let analysis = pipeline.process(&Frame::new(WIDTH, HEIGHT));
    assert!(analysis.candidates.is_empty());
    assert!(matches!(
        analysis.outcome,
        FrameOutcome::NoTarget { left_found: false, right_found: false }
    ));
}

#[test]
fn test_frame_full_of_target_color() {
    // one region spanning the frame; its centroid sits left of the line
    let config = config();
    let pipeline = AlignmentPipeline::new(&config.vision, (WIDTH, HEIGHT)).unwrap();
    let frame = Frame::from_pixel(WIDTH, HEIGHT, TAPE);

    let analysis = pipeline.process(&frame);
    assert_eq!(analysis.candidates.len(), 1);
    assert!(matches!(
        analysis.outcome,
        FrameOutcome::NoTarget { left_found: true, right_found: false }
    ));
}

#[test]
fn test_min_area_above_every_region() {
    let mut config = config();
    config.vision.min_area = 100_000.0;
    let pipeline = AlignmentPipeline::new(&config.vision, (WIDTH, HEIGHT)).unwrap();
    let analysis = pipeline.process(&frame_with_strips(&[100, 500]));
    assert!(analysis.candidates.is_empty());
}

#[test]
fn test_bounds_excluding_target_color() {
    let mut config = config();
    // green only
    config.vision.bounds = HsvBounds::new([50, 100, 100], [70, 255, 255]);
    let pipeline = AlignmentPipeline::new(&config.vision, (WIDTH, HEIGHT)).unwrap();
    let analysis = pipeline.process(&frame_with_strips(&[100, 500]));
    assert!(analysis.candidates.is_empty());
}

#[test]
fn test_strips_touching_each_other_merge() {
    let config = config();
    let pipeline = AlignmentPipeline::new(&config.vision, (WIDTH, HEIGHT)).unwrap();
    let mut frame = Frame::new(WIDTH, HEIGHT);
    paint(&mut frame, 250, 60, 350, 140);

    let analysis = pipeline.process(&frame);
    assert_eq!(analysis.candidates.len(), 1);
    assert!(!analysis.pair.is_complete());
}

#[test]
fn test_frame_size_mismatch_is_recoverable() {
    let mut config = config();
    config.vision.resize_width = None;
    let pipeline = AlignmentPipeline::new(&config.vision, (WIDTH, HEIGHT)).unwrap();
    let analysis = pipeline.process(&Frame::new(WIDTH, HEIGHT + 1));
    match analysis.outcome {
        FrameOutcome::Rejected(e) => {
            assert!(matches!(e, VisionError::FrameSize { .. }));
            assert!(e.is_recoverable());
        }
        other => panic!("expected FrameSize rejection, got {:?}", other),
    }
}

#[test]
fn test_empty_source_dimensions() {
    let config = config();
    assert!(matches!(
        AlignmentPipeline::new(&config.vision, (0, 0)),
        Err(VisionError::Config(_))
    ));
}

#[test]
fn test_explicit_center_on_last_column() {
    let mut config = config();
    config.vision.center_x = Some(WIDTH - 1);
    let pipeline = AlignmentPipeline::new(&config.vision, (WIDTH, HEIGHT)).unwrap();
    // everything is left of the line
    let analysis = pipeline.process(&frame_with_strips(&[100, 500]));
    assert!(matches!(
        analysis.outcome,
        FrameOutcome::NoTarget { left_found: true, right_found: false }
    ));
}
