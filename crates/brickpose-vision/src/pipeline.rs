//! One request, end to end: crop, segment, scan, fit lines, place points,
//! back-project, validate, and assemble the pose.

use brickpose_proto::Pose;
use image::RgbImage;
use tracing::{debug, info};

use crate::camera::{self, DepthImage};
use crate::config::PoseConfig;
use crate::error::{PoseError, Result};
use crate::geometry::{self, Orientation};
use crate::lines::{self, CanonicalLines};
use crate::overlay;
use crate::points::{self, FeaturePoints};
use crate::scan;
use crate::segment::{Backend, ForegroundModel, MaskSet};

#[derive(Debug, Clone)]
pub struct Estimate {
    pub pose: Pose,
    pub orientation: Orientation,
    /// ROI-local feature points.
    pub points: FeaturePoints,
    pub lines: CanonicalLines,
    pub debug_image: Option<RgbImage>,
}

/// Holds the run configuration; every call to `estimate` is independent.
#[derive(Debug, Clone)]
pub struct PoseEstimator {
    cfg: PoseConfig,
}

impl PoseEstimator {
    pub fn new(cfg: PoseConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &PoseConfig {
        &self.cfg
    }

    /// `model` is only consulted when a mask role selects the learned backend.
    pub fn estimate(
        &self,
        color: &RgbImage,
        depth: &DepthImage,
        model: Option<&mut dyn ForegroundModel>,
        with_debug: bool,
    ) -> Result<Estimate> {
        let cfg = &self.cfg;
        if color.dimensions() != depth.dimensions() {
            return Err(PoseError::MalformedInput(format!(
                "color {:?} and depth {:?} differ in size",
                color.dimensions(),
                depth.dimensions()
            )));
        }

        let roi = cfg.roi.crop(color)?;
        debug!("roi: origin={:?} size={}x{}", cfg.roi.origin(), cfg.roi.w, cfg.roi.h);
        let masks = MaskSet::build(&roi, cfg, model)?;

        let rows = scan::scan_top_bottom(masks.get(cfg.masks.horizontal_edges)?, &cfg.scan);
        let cols = scan::scan_left_right(masks.get(cfg.masks.vertical_edges)?, &cfg.scan)?;

        let line_mask = masks.get(cfg.masks.lines)?;
        let canonical = match cfg.masks.lines {
            Backend::Learned => {
                let detected = lines::detect_relaxed(line_mask, &cfg.lines)?;
                lines::canonical_lines_learned(&detected, rows, cfg.roi.w, &cfg.lines)?
            }
            _ => {
                let detected = lines::detect(line_mask, cfg.lines.vote_threshold, cfg.lines.suppression_radius);
                lines::canonical_lines(&detected, rows, cfg.roi.w, &cfg.lines)?
            }
        };

        let local = points::synthesize(cols, &canonical)?;
        let global = camera::roi_to_global(local, &cfg.roi);
        let cam = camera::to_camera(depth, global, &cfg.camera)?;
        for (name, p) in cam.iter() {
            debug!("camera: {}=({:.1}, {:.1}, {:.1})", name, p[0], p[1], p[2]);
        }

        let orientation = geometry::validate(&cam, &cfg.brick)?;
        let angles = crate::pose::estimate_angles(&cam, &canonical)?;
        let pose = crate::pose::assemble(&cam, angles, orientation, &cfg.brick);

        let debug_image = with_debug.then(|| overlay::draw_features(&roi, &local, &canonical));
        info!("estimate: done ({:?})", orientation);

        Ok(Estimate { pose, orientation, points: local, lines: canonical, debug_image })
    }
}
