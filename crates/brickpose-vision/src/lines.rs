//! Boundary lines: Hough detection, single-linkage clustering, and reduction to
//! exactly two canonical lines (top first, bottom second).

use image::GrayImage;
use imageproc::hough::{detect_lines, LineDetectionOptions};
use tracing::debug;

use crate::config::LineConfig;
use crate::error::{PoseError, Result};
use crate::scan::RowEdges;

/// Half length of the segment used to represent an infinite line.
const EXTENT: f64 = 1000.0;

/// Infinite line through two points; the points may lie far outside the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub p1: [f64; 2],
    pub p2: [f64; 2],
}

impl Line {
    pub fn new(p1: [f64; 2], p2: [f64; 2]) -> Self {
        Self { p1, p2 }
    }

    /// From Hough polar form `x*cos(t) + y*sin(t) = r`.
    pub fn from_polar(r: f64, angle_deg: f64) -> Self {
        let (b, a) = angle_deg.to_radians().sin_cos();
        let (x0, y0) = (a * r, b * r);
        Self {
            p1: [x0 - EXTENT * b, y0 + EXTENT * a],
            p2: [x0 + EXTENT * b, y0 - EXTENT * a],
        }
    }

    /// Line with the given slope through (x, y).
    pub fn through(x: f64, y: f64, slope: f64) -> Self {
        Self {
            p1: [x - EXTENT, y - EXTENT * slope],
            p2: [x + EXTENT, y + EXTENT * slope],
        }
    }

    /// `None` for a vertical line.
    pub fn slope(&self) -> Option<f64> {
        let dx = self.p2[0] - self.p1[0];
        if dx.abs() < f64::EPSILON {
            return None;
        }
        Some((self.p2[1] - self.p1[1]) / dx)
    }

    /// y at `x`, interpolated between the endpoints.
    pub fn y_at(&self, x: f64) -> Option<f64> {
        let dx = self.p2[0] - self.p1[0];
        if dx.abs() < f64::EPSILON {
            return None;
        }
        Some((self.p1[1] * (self.p2[0] - x) + self.p2[1] * (x - self.p1[0])) / dx)
    }

    /// Smallest distance between any endpoint of `self` and any endpoint of `other`.
    pub fn closest_distance(&self, other: &Line) -> f64 {
        let mut best = f64::INFINITY;
        for p in [self.p1, self.p2] {
            for q in [other.p1, other.p2] {
                best = best.min((p[0] - q[0]).hypot(p[1] - q[1]));
            }
        }
        best
    }

    /// True when the line crosses column `x` strictly below `row`.
    pub fn is_below(&self, x: f64, row: f64) -> bool {
        self.y_at(x).is_some_and(|y| y > row)
    }

    pub(crate) fn y_at_checked(&self, x: f64) -> Result<f64> {
        self.y_at(x).ok_or_else(|| {
            PoseError::InsufficientEdgeEvidence(format!("vertical line {:?} cannot bound the brick", self))
        })
    }
}

/// The object's top and bottom boundary, ROI-local.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicalLines {
    pub top: Line,
    pub bot: Line,
}

impl CanonicalLines {
    pub fn as_array(&self) -> [Line; 2] {
        [self.top, self.bot]
    }
}

/// Hough transform over every non-zero pixel of `mask`.
pub fn detect(mask: &GrayImage, vote_threshold: u32, suppression_radius: u32) -> Vec<Line> {
    let opts = LineDetectionOptions { vote_threshold, suppression_radius };
    detect_lines(mask, opts)
        .into_iter()
        .map(|l| Line::from_polar(l.r as f64, l.angle_in_degrees as f64))
        .collect()
}

/// Lowers the vote threshold step by step until some line crosses the mask's
/// middle column below the row cutoff, giving up at `relax_floor`.
pub fn detect_relaxed(mask: &GrayImage, cfg: &LineConfig) -> Result<Vec<Line>> {
    let mid_x = (mask.width() / 2) as f64;
    let mut threshold = cfg.relax_start;
    loop {
        let lines = detect(mask, threshold, cfg.suppression_radius);
        if lines.iter().any(|l| l.is_below(mid_x, cfg.row_cutoff)) {
            debug!("lines: relaxed hough threshold to {} ({} lines)", threshold, lines.len());
            return Ok(lines);
        }
        if threshold < cfg.relax_floor + cfg.relax_step {
            break;
        }
        threshold -= cfg.relax_step;
    }
    Err(PoseError::InsufficientEdgeEvidence(format!(
        "no hough line below row {} down to threshold {}",
        cfg.row_cutoff, cfg.relax_floor
    )))
}

/// Single-linkage, first fit: a line joins the first cluster holding any member
/// closer than `threshold`, otherwise it starts a new cluster.
pub fn cluster(lines: &[Line], threshold: f64) -> Vec<Vec<Line>> {
    let mut clusters: Vec<Vec<Line>> = Vec::new();
    for line in lines {
        match clusters
            .iter_mut()
            .find(|c| c.iter().any(|m| line.closest_distance(m) < threshold))
        {
            Some(c) => c.push(*line),
            None => clusters.push(vec![*line]),
        }
    }
    clusters
}

/// Reduces raw detections to the top and bottom boundary.
///
/// One cluster: it is the bottom when its height at the ROI midpoint is below
/// the row cutoff, else the top; the missing twin is a parallel line through
/// the scanned boundary row. Two clusters: ordered top first.
pub fn canonical_lines(lines: &[Line], rows: RowEdges, roi_w: u32, cfg: &LineConfig) -> Result<CanonicalLines> {
    resolve(representatives(lines, cfg), rows, roi_w, cfg)
}

/// Same as [`canonical_lines`] for learned masks, whose silhouettes give a
/// reliable bottom edge: the last cluster crossing the midpoint below the row
/// cutoff is kept alone and the top is synthesized from the scan. Clusters are
/// left as they are when none qualifies.
pub fn canonical_lines_learned(lines: &[Line], rows: RowEdges, roi_w: u32, cfg: &LineConfig) -> Result<CanonicalLines> {
    let mut reps = representatives(lines, cfg);
    let mid_x = (roi_w / 2) as f64;
    if let Some(low) = reps.iter().rev().find(|l| l.is_below(mid_x, cfg.row_cutoff)).copied() {
        debug!("lines: learned mask, keeping bottom line only of {}", reps.len());
        reps = vec![low];
    }
    resolve(reps, rows, roi_w, cfg)
}

fn representatives(lines: &[Line], cfg: &LineConfig) -> Vec<Line> {
    let reps: Vec<Line> = cluster(lines, cfg.cluster_threshold)
        .into_iter()
        .filter_map(|c| c.first().copied())
        .collect();
    debug!("lines: {} detections, {} clusters", lines.len(), reps.len());
    reps
}

fn resolve(reps: Vec<Line>, rows: RowEdges, roi_w: u32, cfg: &LineConfig) -> Result<CanonicalLines> {
    let mid_x = (roi_w / 2) as f64;

    match reps.as_slice() {
        [only] => {
            let slope = only.slope().ok_or_else(|| {
                PoseError::InsufficientEdgeEvidence("single vertical line cannot bound the brick".into())
            })?;
            if only.y_at_checked(mid_x)? > cfg.row_cutoff {
                let top = rows.top.ok_or_else(|| {
                    PoseError::InsufficientEdgeEvidence("only bottom line found and top edge unscanned".into())
                })?;
                debug!("lines: synthesized top through row {}", top);
                Ok(CanonicalLines { top: Line::through(mid_x, top as f64, slope), bot: *only })
            } else {
                let bot = rows.bot.ok_or_else(|| {
                    PoseError::InsufficientEdgeEvidence("only top line found and bottom edge unscanned".into())
                })?;
                debug!("lines: synthesized bottom through row {}", bot);
                Ok(CanonicalLines { top: *only, bot: Line::through(mid_x, bot as f64, slope) })
            }
        }
        [first, second] => {
            second.y_at_checked(mid_x)?;
            if first.y_at_checked(mid_x)? > cfg.row_cutoff {
                Ok(CanonicalLines { top: *second, bot: *first })
            } else {
                Ok(CanonicalLines { top: *first, bot: *second })
            }
        }
        other => Err(PoseError::AmbiguousSegmentation { clusters: other.len() }),
    }
}
