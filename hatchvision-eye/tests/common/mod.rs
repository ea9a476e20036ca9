//! Synthetic frames for the integration tests

#![allow(dead_code)]

use hatchvision_core::{AlignmentConfig, HsvBounds};
use hatchvision_eye::Frame;
use image::Rgb;

/// Lit reflective tape: bright, barely saturated, hue ~276 degrees
pub const TAPE: Rgb<u8> = Rgb([248, 245, 250]);

pub const WIDTH: u32 = 600;
pub const HEIGHT: u32 = 200;

/// Fill the rectangle with inclusive pixel corners `(x0, y0)`..=`(x1, y1)`
pub fn paint(frame: &mut Frame, x0: u32, y0: u32, x1: u32, y1: u32) {
    for y in y0..=y1 {
        for x in x0..=x1 {
            frame.put_pixel(x, y, TAPE);
        }
    }
}

/// Vertical strip 21 pixels wide centered on `x`
pub fn strip(frame: &mut Frame, x: u32) {
    paint(frame, x - 10, 60, x + 10, 140);
}

/// Working-size frame with strips centered on each of `xs`
pub fn frame_with_strips(xs: &[u32]) -> Frame {
    let mut frame = Frame::new(WIDTH, HEIGHT);
    for &x in xs {
        strip(&mut frame, x);
    }
    frame
}

pub fn config() -> AlignmentConfig {
    let mut config = AlignmentConfig::default();
    config.vision.bounds = HsvBounds::default();
    // unoptimized test builds are far slower than the robot's release build
    config.runtime.frame_deadline_ms = 10_000;
    config
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} within {}, got {}",
        expected,
        tolerance,
        actual
    );
}
