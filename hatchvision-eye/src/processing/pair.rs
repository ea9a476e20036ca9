//! Target pair selection

use crate::processing::candidates::Candidate;
use serde::{Deserialize, Serialize};

/// The candidates nearest the center line on each side of it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetPair {
    pub left: Option<Candidate>,
    pub right: Option<Candidate>,
}

impl TargetPair {
    pub fn is_complete(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    /// Centroid x of the left and right strips when both were found
    pub fn xs(&self) -> Option<(f64, f64)> {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => Some((left.centroid.x, right.centroid.x)),
            _ => None,
        }
    }
}

/// Picks the innermost candidate on each side of a vertical line
#[derive(Debug, Clone, Copy)]
pub struct PairSelector {
    center_x: f64,
}

impl PairSelector {
    pub fn new(center_x: f64) -> Self {
        Self { center_x }
    }

    pub fn center_x(&self) -> f64 {
        self.center_x
    }

    /// A centroid exactly on the line counts as left. Ties go to the
    /// candidate that comes first.
    pub fn select(&self, candidates: &[Candidate]) -> TargetPair {
        let mut left: Option<&Candidate> = None;
        let mut right: Option<&Candidate> = None;

        for candidate in candidates {
            let x = candidate.centroid.x;
            if x <= self.center_x {
                if left.map_or(true, |best| x > best.centroid.x) {
                    left = Some(candidate);
                }
            } else if right.map_or(true, |best| x < best.centroid.x) {
                right = Some(candidate);
            }
        }

        TargetPair {
            left: left.cloned(),
            right: right.cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::candidates::{Circle, Point2};

    fn candidate(x: f64, area: f64) -> Candidate {
        let centroid = Point2::new(x, 100.0);
        Candidate {
            area,
            centroid,
            enclosing_circle: Circle { center: centroid, radius: 10.0 },
        }
    }

    #[test]
    fn test_picks_innermost_on_each_side() {
        let selector = PairSelector::new(300.0);
        let pair = selector.select(&[
            candidate(50.0, 200.0),
            candidate(100.0, 200.0),
            candidate(500.0, 200.0),
            candidate(550.0, 200.0),
        ]);
        assert_eq!(pair.xs(), Some((100.0, 500.0)));
    }

    #[test]
    fn test_center_line_counts_as_left() {
        let pair = PairSelector::new(300.0).select(&[candidate(300.0, 200.0), candidate(301.0, 200.0)]);
        assert_eq!(pair.xs(), Some((300.0, 301.0)));
    }

    #[test]
    fn test_missing_side() {
        let pair = PairSelector::new(300.0).select(&[candidate(100.0, 200.0), candidate(200.0, 200.0)]);
        assert!(!pair.is_complete());
        assert_eq!(pair.left.map(|c| c.centroid.x), Some(200.0));
        assert!(pair.right.is_none());
        assert_eq!(PairSelector::new(300.0).select(&[]), TargetPair::default());
    }

    #[test]
    fn test_tie_goes_to_first_candidate() {
        let pair = PairSelector::new(300.0).select(&[
            candidate(100.0, 150.0),
            candidate(100.0, 900.0),
            candidate(400.0, 150.0),
            candidate(400.0, 900.0),
        ]);
        assert_eq!(pair.left.map(|c| c.area), Some(150.0));
        assert_eq!(pair.right.map(|c| c.area), Some(150.0));
    }
}
