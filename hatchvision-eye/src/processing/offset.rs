//! Offset estimation
//!
//! Maps the center line's pixel position between the two strips linearly
//! onto the physical gap between them. Positions outside the strips
//! extrapolate along the same line.

use crate::error::VisionError;
use crate::processing::pair::TargetPair;
use hatchvision_core::Offset;

#[derive(Debug, Clone, Copy)]
pub struct OffsetEstimator {
    center_x: f64,
    separation: f64,
}

impl OffsetEstimator {
    /// `separation` is the physical distance between the strips, in the
    /// units the offset is reported in
    pub fn new(center_x: f64, separation: f64) -> Self {
        Self { center_x, separation }
    }

    pub fn separation(&self) -> f64 {
        self.separation
    }

    /// Offset of the center line from the midpoint of the pair.
    ///
    /// Positive means the camera sits left of the slot centerline.
    pub fn estimate(&self, pair: &TargetPair) -> Result<Offset, VisionError> {
        let (left_x, right_x) = pair.xs().ok_or(VisionError::SegmentationDegenerate {
            left_found: pair.left.is_some(),
            right_found: pair.right.is_some(),
        })?;

        let from_left = distance_from_left(left_x, right_x, self.center_x, self.separation)?;
        let value = self.separation / 2.0 - from_left;
        if !value.is_finite() {
            return Err(VisionError::Interpolation(format!("offset {} is not finite", value)));
        }
        Ok(Offset::new(value))
    }
}

/// Physical distance of `center_x` from the left strip, unclamped
pub fn distance_from_left(left_x: f64, right_x: f64, center_x: f64, separation: f64) -> Result<f64, VisionError> {
    if left_x == right_x {
        return Err(VisionError::Interpolation(format!(
            "strips coincide at x={}",
            left_x
        )));
    }

    let distance = (center_x - left_x) / (right_x - left_x) * separation;
    if !distance.is_finite() {
        return Err(VisionError::Interpolation(format!(
            "cannot place {} between {} and {}",
            center_x, left_x, right_x
        )));
    }
    Ok(distance)
}
