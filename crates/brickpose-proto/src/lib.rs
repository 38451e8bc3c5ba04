pub mod pose;

pub use pose::{FailureKind, FailureReport, Pose};
