use tracing::debug;

use crate::camera::CameraPoints;
use crate::config::BrickConfig;
use crate::error::{PoseError, Result};

/// Which brick face the camera sees. Decided per request and passed along
/// explicitly to the pose assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Long (width) face towards the camera.
    Face,
    /// Short (depth) face towards the camera; roll and pitch swap meaning.
    Corner,
}

impl Orientation {
    pub fn is_corner(self) -> bool {
        self == Orientation::Corner
    }
}

/// Classifies a measured visible width against the nominal brick.
pub fn classify_width(measured: f64, brick: &BrickConfig) -> Result<Orientation> {
    let in_band = |nominal: f64, tol: f64| (nominal - tol..=nominal + tol).contains(&measured);

    if in_band(brick.depth, brick.depth_tolerance) {
        Ok(Orientation::Corner)
    } else if in_band(brick.width, brick.width_tolerance) {
        Ok(Orientation::Face)
    } else {
        Err(PoseError::InvalidGeometry(format!(
            "measured width {:.1}mm matches neither width {}±{} nor depth {}±{}",
            measured, brick.width, brick.width_tolerance, brick.depth, brick.depth_tolerance
        )))
    }
}

/// Checks the left-right extent in camera space.
// No height band: the only available formulation compared bot.z with itself.
pub fn validate(cam: &CameraPoints, brick: &BrickConfig) -> Result<Orientation> {
    let measured = cam.right[0] - cam.left[0];
    let orientation = classify_width(measured, brick)?;
    debug!("geometry: width={:.1}mm -> {:?}", measured, orientation);
    Ok(orientation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_band_is_face() {
        assert_eq!(classify_width(205.0, &BrickConfig::default()).unwrap(), Orientation::Face);
        assert_eq!(classify_width(195.0, &BrickConfig::default()).unwrap(), Orientation::Face);
        assert_eq!(classify_width(225.0, &BrickConfig::default()).unwrap(), Orientation::Face);
    }

    #[test]
    fn depth_band_is_corner() {
        assert_eq!(classify_width(95.0, &BrickConfig::default()).unwrap(), Orientation::Corner);
        assert_eq!(classify_width(110.0, &BrickConfig::default()).unwrap(), Orientation::Corner);
    }

    #[test]
    fn between_bands_is_invalid() {
        for w in [89.9, 150.0, 194.9, 225.1, 0.0, -210.0] {
            let err = classify_width(w, &BrickConfig::default()).unwrap_err();
            assert!(matches!(err, PoseError::InvalidGeometry(_)), "{}", w);
        }
    }

    #[test]
    fn bands_do_not_overlap_in_operating_range() {
        let b = BrickConfig::default();
        let mut w = b.width - b.width_tolerance;
        while w <= b.width + b.width_tolerance {
            assert_eq!(classify_width(w, &b).unwrap(), Orientation::Face);
            w += 0.5;
        }
    }
}
