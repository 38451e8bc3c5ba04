use serde::{Deserialize, Serialize};

/// Estimated brick pose in camera frame: millimeters and degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MalformedInput,
    Configuration,
    AmbiguousSegmentation,
    InsufficientEdgeEvidence,
    InvalidGeometry,
    Model,
}

/// Returned to the caller instead of a pose when a request fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    pub error: FailureKind,
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_serializes_flat() {
        let p = Pose { x: 1.5, y: 350.0, z: -2.0, roll: 0.0, pitch: 1.2, yaw: -0.4 };
        let v: serde_json::Value = serde_json::to_value(p).unwrap();
        assert_eq!(v["y"], 350.0);
        assert_eq!(v["pitch"], 1.2);
        assert_eq!(v.as_object().unwrap().len(), 6);
    }

    #[test]
    fn failure_kind_is_snake_case() {
        let r = FailureReport { error: FailureKind::AmbiguousSegmentation, detail: "3 line clusters".into() };
        let s = serde_json::to_string(&r).unwrap();
        assert!(s.contains("\"ambiguous_segmentation\""));
    }
}
