//! Candidate region extraction
//!
//! Finds the external boundaries of a mask's foreground regions, measures
//! each one and keeps those large enough to be a target strip.

use crate::frame::Mask;
use crate::utils::distance;
use image::imageops;
use imageproc::contours::{find_contours, BorderType, Contour};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fixed seed for the enclosing circle point shuffle, so results repeat
const CIRCLE_SEED: u64 = 0x5EED_C12C;

/// Slack when testing whether a point lies inside a circle
const CIRCLE_EPSILON: f64 = 1e-7;

/// Point in pixel coordinates, x to the right and y down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn tuple(self) -> (f64, f64) {
        (self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2,
    pub radius: f64,
}

impl Circle {
    fn point(center: Point2) -> Self {
        Self { center, radius: 0.0 }
    }

    fn from_diameter(a: Point2, b: Point2) -> Self {
        Self {
            center: Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0),
            radius: distance(a.tuple(), b.tuple()) / 2.0,
        }
    }

    /// Circle through three points, `None` when they are collinear
    fn circumscribe(a: Point2, b: Point2, c: Point2) -> Option<Self> {
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d.abs() < f64::EPSILON {
            return None;
        }
        let a2 = a.x * a.x + a.y * a.y;
        let b2 = b.x * b.x + b.y * b.y;
        let c2 = c.x * c.x + c.y * c.y;
        let center = Point2::new(
            (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
            (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
        );
        Some(Self {
            center,
            radius: distance(center.tuple(), a.tuple()),
        })
    }

    /// Smallest circle with all three points on or inside it
    fn spanning(a: Point2, b: Point2, c: Point2) -> Self {
        match Self::circumscribe(a, b, c) {
            Some(circle) => circle,
            None => [
                Self::from_diameter(a, b),
                Self::from_diameter(a, c),
                Self::from_diameter(b, c),
            ]
            .into_iter()
            .fold(Self::point(a), |best, circle| {
                if circle.radius > best.radius { circle } else { best }
            }),
        }
    }

    pub fn contains(&self, p: Point2) -> bool {
        distance(self.center.tuple(), p.tuple()) <= self.radius + CIRCLE_EPSILON * self.radius.max(1.0)
    }
}

/// Zeroth and first order moments of a closed polygon
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl Moments {
    /// Moments of the polygon through `points`, closed back to the first.
    ///
    /// `m00` is the signed area; its sign follows the winding order.
    pub fn of_polygon(points: &[Point2]) -> Self {
        let mut moments = Self::default();
        let n = points.len();
        if n < 3 {
            return moments;
        }
        for i in 0..n {
            let p = points[i];
            let q = points[(i + 1) % n];
            let cross = p.x * q.y - q.x * p.y;
            moments.m00 += cross;
            moments.m10 += (p.x + q.x) * cross;
            moments.m01 += (p.y + q.y) * cross;
        }
        moments.m00 /= 2.0;
        moments.m10 /= 6.0;
        moments.m01 /= 6.0;
        moments
    }

    pub fn area(&self) -> f64 {
        self.m00.abs()
    }

    /// `None` for a zero-area polygon
    pub fn centroid(&self) -> Option<Point2> {
        if self.m00 == 0.0 {
            return None;
        }
        let centroid = Point2::new(self.m10 / self.m00, self.m01 / self.m00);
        (centroid.x.is_finite() && centroid.y.is_finite()).then_some(centroid)
    }
}

/// Smallest circle enclosing every point
pub fn min_enclosing_circle(points: &[Point2]) -> Option<Circle> {
    let mut pts = points.to_vec();
    let mut rng = StdRng::seed_from_u64(CIRCLE_SEED);
    pts.shuffle(&mut rng);

    let mut circle = Circle::point(*pts.first()?);
    for i in 1..pts.len() {
        if circle.contains(pts[i]) {
            continue;
        }
        circle = Circle::point(pts[i]);
        for j in 0..i {
            if circle.contains(pts[j]) {
                continue;
            }
            circle = Circle::from_diameter(pts[i], pts[j]);
            for k in 0..j {
                if !circle.contains(pts[k]) {
                    circle = Circle::spanning(pts[i], pts[j], pts[k]);
                }
            }
        }
    }
    Some(circle)
}

/// One foreground region large enough to be a target strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Enclosed area of the boundary polygon, in square pixels
    pub area: f64,
    pub centroid: Point2,
    pub enclosing_circle: Circle,
}

/// Extracts [`Candidate`]s from a mask
#[derive(Debug, Clone)]
pub struct CandidateExtractor {
    min_area: f64,
}

impl CandidateExtractor {
    /// Keep regions whose area is strictly greater than `min_area`
    pub fn new(min_area: f64) -> Self {
        Self { min_area }
    }

    pub fn min_area(&self) -> f64 {
        self.min_area
    }

    /// Candidates in boundary discovery order (row-major scan of the mask).
    ///
    /// Regions nested inside another region's hole are ignored.
    pub fn extract(&self, mask: &Mask) -> Vec<Candidate> {
        // find_contours misses regions touching column 0, so trace a copy
        // framed by one pixel of background and shift the points back
        let mut padded = Mask::new(mask.width() + 2, mask.height() + 2);
        imageops::replace(&mut padded, mask, 1, 1);
        let contours: Vec<Contour<i32>> = find_contours(&padded);
        let external = contours
            .iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none());

        let candidates: Vec<Candidate> = external
            .filter_map(|contour| {
                let points: Vec<Point2> = contour
                    .points
                    .iter()
                    .map(|p| Point2::new((p.x - 1) as f64, (p.y - 1) as f64))
                    .collect();
                self.measure(&points)
            })
            .collect();

        debug!(
            "{} boundaries, {} candidates above area {}",
            contours.len(),
            candidates.len(),
            self.min_area
        );
        candidates
    }

    /// Measure one boundary; `None` if it is too small or has no area
    pub fn measure(&self, boundary: &[Point2]) -> Option<Candidate> {
        let moments = Moments::of_polygon(boundary);
        let area = moments.area();
        if area <= self.min_area {
            return None;
        }
        let centroid = moments.centroid()?;
        let enclosing_circle = min_enclosing_circle(boundary)?;
        Some(Candidate {
            area,
            centroid,
            enclosing_circle,
        })
    }
}
