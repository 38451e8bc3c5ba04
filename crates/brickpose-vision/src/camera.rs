use image::{ImageBuffer, Luma};
use serde::Deserialize;

use crate::error::{ensure_config, PoseError, Result};
use crate::points::{FeaturePoints, Named};
use crate::roi::Roi;

/// Single-channel depth raster in sensor units (see `Intrinsics::depth_scale`).
pub type DepthImage = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Camera-frame coordinates (x, y, z) in millimeters.
pub type CameraPoints = Named<[f64; 3]>;

/// Pinhole intrinsics of the color/depth-aligned sensor.
///
/// Axis convention: y is the depth along the optical axis, x follows image
/// columns and z follows image rows. The geometry checks and angle formulas
/// depend on this order.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Intrinsics {
    pub fx: f64,
    pub fy: f64,
    pub px: f64,
    pub py: f64,
    /// Millimeters per depth raster unit.
    pub depth_scale: f64,
}

impl Default for Intrinsics {
    fn default() -> Self {
        Self {
            fx: 434.5079345703125,
            fy: 434.5079345703125,
            px: 427.6170654296875,
            py: 238.77597045898438,
            depth_scale: 0.1,
        }
    }
}

impl Intrinsics {
    pub fn validate(&self) -> Result<()> {
        ensure_config!(self.fx > 0.0 && self.fy > 0.0, "camera focal lengths must be positive");
        ensure_config!(self.depth_scale > 0.0, "camera.depth_scale must be positive");
        Ok(())
    }

    pub fn back_project(&self, u: f64, v: f64, raw_depth: f64) -> [f64; 3] {
        let y = raw_depth * self.depth_scale;
        let x = (u - self.px) * y / self.fx;
        let z = (v - self.py) * y / self.fy;
        [x, y, z]
    }

    /// Inverse of `back_project`: pixel (u, v) and raw depth.
    pub fn project(&self, p: [f64; 3]) -> ([f64; 2], f64) {
        let [x, y, z] = p;
        let u = x * self.fx / y + self.px;
        let v = z * self.fy / y + self.py;
        ([u, v], y / self.depth_scale)
    }
}

/// ROI-local feature points to global pixel coordinates.
pub fn roi_to_global(points: FeaturePoints, roi: &Roi) -> FeaturePoints {
    points.map(|[x, y]| {
        let (gx, gy) = roi.to_global((x, y));
        [gx, gy]
    })
}

/// Samples depth under each global point and back-projects it.
pub fn to_camera(depth: &DepthImage, points: FeaturePoints, k: &Intrinsics) -> Result<CameraPoints> {
    points.try_map(|name, [u, v]| {
        if u < 0 || v < 0 || u as u32 >= depth.width() || v as u32 >= depth.height() {
            return Err(PoseError::InvalidGeometry(format!(
                "{} point ({}, {}) outside depth image",
                name, u, v
            )));
        }
        let d = depth.get_pixel(u as u32, v as u32)[0];
        Ok(k.back_project(u as f64, v as f64, d as f64))
    })
}
