//! Timeline geometry.
//!
//! This module provides:
//! - Free gap detection inside the waking window
//! - Lane assignment for drawing overlapping blocks side by side

mod gap;
mod lanes;

pub use gap::{detect_gaps, Gap, GapDetector, Interval, DEFAULT_MIN_GAP_MINUTES};
pub use lanes::{assign_lanes, LaneAssignment, TimelineBlock};
