//! Color segmentation

use crate::frame::{Frame, Mask};
use crate::utils::rgb_to_hsv;
use hatchvision_core::HsvBounds;
use image::Luma;
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{dilate, erode};
use tracing::trace;

/// Standard deviation of the smoothing pass, in pixels
pub const BLUR_SIGMA: f32 = 2.0;

/// Chebyshev radius of the opening; equal to two passes of a 3x3 element
pub const OPENING_RADIUS: u8 = 2;

const FOREGROUND: Luma<u8> = Luma([255]);
const BACKGROUND: Luma<u8> = Luma([0]);

/// Turns a frame into a binary mask of target-colored pixels
#[derive(Debug, Clone)]
pub struct Segmenter {
    bounds: HsvBounds,
}

impl Segmenter {
    pub fn new(bounds: HsvBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &HsvBounds {
        &self.bounds
    }

    /// Blur, threshold in HSV, then erode and dilate to drop speckle.
    ///
    /// Output has the frame's dimensions and only the values 0 and 255.
    pub fn segment(&self, frame: &Frame) -> Mask {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Mask::new(width, height);
        }

        let blurred = gaussian_blur_f32(frame, BLUR_SIGMA);
        let thresholded = self.threshold(&blurred);
        let opened = dilate(&erode(&thresholded, Norm::LInf, OPENING_RADIUS), Norm::LInf, OPENING_RADIUS);

        trace!(
            "Segmented {}x{} frame, {} foreground pixels",
            width,
            height,
            opened.pixels().filter(|p| p.0[0] != 0).count()
        );
        opened
    }

    /// Inclusive per-channel range test, without smoothing or cleanup
    pub fn threshold(&self, frame: &Frame) -> Mask {
        Mask::from_fn(frame.width(), frame.height(), |x, y| {
            if self.bounds.contains(rgb_to_hsv(frame.get_pixel(x, y).0)) {
                FOREGROUND
            } else {
                BACKGROUND
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const TAPE: Rgb<u8> = Rgb([248, 245, 250]);

    fn frame_with_rect(x0: u32, y0: u32, w: u32, h: u32) -> Frame {
        let mut frame = Frame::new(120, 80);
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                frame.put_pixel(x, y, TAPE);
            }
        }
        frame
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let bounds = HsvBounds::new([138, 5, 250], [138, 5, 250]);
        let segmenter = Segmenter::new(bounds);
        let mut frame = Frame::new(2, 1);
        frame.put_pixel(0, 0, TAPE);

        let mask = segmenter.threshold(&frame);
        assert_eq!(mask.get_pixel(0, 0).0[0], 255);
        assert_eq!(mask.get_pixel(1, 0).0[0], 0);
    }

    #[test]
    fn test_mask_is_binary_and_same_size() {
        let segmenter = Segmenter::new(HsvBounds::default());
        let mask = segmenter.segment(&frame_with_rect(30, 20, 25, 30));
        assert_eq!(mask.dimensions(), (120, 80));
        assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        // rectangle interior survives
        assert_eq!(mask.get_pixel(42, 35).0[0], 255);
        assert_eq!(mask.get_pixel(5, 5).0[0], 0);
    }

    #[test]
    fn test_speckle_is_removed() {
        let segmenter = Segmenter::new(HsvBounds::default());
        let mut frame = Frame::new(60, 60);
        frame.put_pixel(30, 30, TAPE);
        frame.put_pixel(31, 30, TAPE);

        let mask = segmenter.segment(&frame);
        assert!(mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_empty_frame() {
        let segmenter = Segmenter::new(HsvBounds::default());
        let mask = segmenter.segment(&Frame::new(0, 0));
        assert_eq!(mask.dimensions(), (0, 0));
    }
}
