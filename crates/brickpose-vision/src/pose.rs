use brickpose_proto::Pose;
use tracing::info;

use crate::camera::CameraPoints;
use crate::config::BrickConfig;
use crate::error::{PoseError, Result};
use crate::geometry::Orientation;
use crate::lines::CanonicalLines;

/// Raw angles in degrees, before any orientation swap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Roll from the top/bottom points' depth change over height, yaw from the
/// left/right depth change over width, pitch from the image-space slope of the
/// canonical lines.
pub fn estimate_angles(cam: &CameraPoints, lines: &CanonicalLines) -> Result<Angles> {
    let roll = ((cam.bot[1] - cam.top[1]) / (cam.bot[2] - cam.top[2])).atan().to_degrees();
    let yaw = ((cam.right[1] - cam.left[1]) / (cam.right[0] - cam.left[0])).atan().to_degrees();

    let mut slopes = Vec::with_capacity(2);
    for l in lines.as_array() {
        slopes.push(l.slope().ok_or_else(|| {
            PoseError::InsufficientEdgeEvidence("canonical line has no finite slope".into())
        })?);
    }
    let pitch = (slopes.iter().sum::<f64>() / slopes.len() as f64).atan().to_degrees();

    let a = Angles { roll, pitch, yaw };
    if !(roll.is_finite() && pitch.is_finite() && yaw.is_finite()) {
        return Err(PoseError::InvalidGeometry(format!("degenerate angles {:?}", a)));
    }
    Ok(a)
}

/// Final pose: the visible face's center moved half a brick backwards, axes
/// swapped for corner placement, everything rounded to 0.1.
pub fn assemble(cam: &CameraPoints, angles: Angles, orientation: Orientation, brick: &BrickConfig) -> Pose {
    let [x, y, z] = cam.mid;
    let half = if orientation.is_corner() { brick.width / 2.0 } else { brick.depth / 2.0 };
    let (roll, pitch) = match orientation {
        Orientation::Corner => (angles.pitch, angles.roll),
        Orientation::Face => (angles.roll, angles.pitch),
    };

    let pose = Pose {
        x: round1(x),
        y: round1(y + half),
        z: round1(z),
        roll: round1(roll),
        pitch: round1(pitch),
        yaw: round1(angles.yaw),
    };
    info!(
        "pose: x={} y={} z={} roll={} pitch={} yaw={} ({:?})",
        pose.x, pose.y, pose.z, pose.roll, pose.pitch, pose.yaw, orientation
    );
    pose
}

/// Halves go to the even neighbour.
fn round1(v: f64) -> f64 {
    (v * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::Line;
    use crate::points::Named;

    fn cam() -> CameraPoints {
        Named {
            mid: [-3.04, 300.0, 0.88],
            top: [-3.0, 295.0, -27.0],
            bot: [-3.0, 305.0, 28.0],
            left: [-105.0, 302.0, 0.9],
            right: [100.0, 298.0, 0.9],
        }
    }

    fn flat_lines() -> CanonicalLines {
        CanonicalLines { top: Line::through(200.0, 10.0, 0.02), bot: Line::through(200.0, 90.0, 0.04) }
    }

    #[test]
    fn angles_from_points_and_lines() {
        let a = estimate_angles(&cam(), &flat_lines()).unwrap();
        assert!((a.roll - (10.0f64 / 55.0).atan().to_degrees()).abs() < 1e-9);
        assert!((a.yaw - (-4.0f64 / 205.0).atan().to_degrees()).abs() < 1e-9);
        assert!((a.pitch - 0.03f64.atan().to_degrees()).abs() < 1e-9);
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let mut c = cam();
        c.bot = c.top;
        let err = estimate_angles(&c, &flat_lines()).unwrap_err();
        assert!(matches!(err, PoseError::InvalidGeometry(_)));
    }

    #[test]
    fn face_placement_passes_angles_through() {
        let angles = Angles { roll: 10.34, pitch: -1.26, yaw: 0.07 };
        let p = assemble(&cam(), angles, Orientation::Face, &BrickConfig::default());
        assert_eq!(p.roll, 10.3);
        assert_eq!(p.pitch, -1.3);
        assert_eq!(p.yaw, 0.1);
        assert_eq!(p.x, -3.0);
        assert_eq!(p.y, 350.0);
        assert_eq!(p.z, 0.9);
    }

    #[test]
    fn corner_placement_swaps_roll_and_pitch() {
        let angles = Angles { roll: 10.34, pitch: -1.26, yaw: 0.05 };
        let p = assemble(&cam(), angles, Orientation::Corner, &BrickConfig::default());
        assert_eq!(p.roll, -1.3);
        assert_eq!(p.pitch, 10.3);
        assert_eq!(p.y, 405.0);
    }

    #[test]
    fn halves_round_to_even() {
        assert_eq!(round1(0.25), 0.2);
        assert_eq!(round1(0.75), 0.8);
        assert_eq!(round1(-0.25), -0.2);
        assert_eq!(round1(0.26), 0.3);
    }
}
