//! Vision processing stages
//!
//! Frame -> [`Segmenter`] -> mask -> [`CandidateExtractor`] -> candidates ->
//! [`PairSelector`] -> target pair -> [`OffsetEstimator`] -> offset.

pub mod segmentation;
pub mod candidates;
pub mod pair;
pub mod offset;

pub use segmentation::Segmenter;
pub use candidates::{Candidate, CandidateExtractor, Circle, Moments, Point2};
pub use pair::{PairSelector, TargetPair};
pub use offset::OffsetEstimator;
