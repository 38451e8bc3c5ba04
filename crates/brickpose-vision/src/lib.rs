//! Brick pose from one aligned color + depth image pair.
//!
//! The pipeline crops a fixed ROI, segments the brick outline, scans for its
//! left/right/top/bottom edges, fits the top and bottom boundary lines, places
//! five feature points, back-projects them with the depth image and derives
//! position and roll/pitch/yaw. See [`PoseEstimator::estimate`].

mod error;
pub mod camera;
pub mod config;
pub mod geometry;
pub mod io;
pub mod lines;
pub mod overlay;
pub mod pipeline;
pub mod points;
pub mod pose;
pub mod roi;
pub mod scan;
pub mod segment;

#[cfg(test)]
mod test_utils;

pub use brickpose_proto::{FailureKind, FailureReport, Pose};
pub use camera::{DepthImage, Intrinsics};
pub use config::PoseConfig;
pub use error::{PoseError, Result};
pub use geometry::Orientation;
pub use pipeline::{Estimate, PoseEstimator};
pub use roi::Roi;
pub use segment::{Backend, ForegroundModel, PrecomputedMask};
