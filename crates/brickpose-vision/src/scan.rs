//! Outward scan from the ROI center to the nearest mask boundary.
//!
//! Several parallel scan lines are walked pixel by pixel; at each pixel a small
//! window of the mask is summed and the walk stops once the sum reaches the
//! threshold. Per side the stop positions are reduced with a median, so one
//! scan line hitting clutter does not move the result.

use image::GrayImage;
use tracing::debug;

use crate::config::ScanConfig;
use crate::error::{PoseError, Result};

/// Top and bottom boundary rows (ROI-local). `None` when no scan line hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowEdges {
    pub top: Option<u32>,
    pub bot: Option<u32>,
}

/// Left and right boundary columns (ROI-local), both resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnEdges {
    pub left: u32,
    pub right: u32,
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    /// walk along y, scan lines are columns
    Vertical,
    /// walk along x, scan lines are rows
    Horizontal,
}

pub fn scan_top_bottom(mask: &GrayImage, cfg: &ScanConfig) -> RowEdges {
    let [rows, cols] = cfg.horizontal_window;
    let top = scan_side(mask, cfg, Axis::Vertical, -1, rows, cols);
    let bot = scan_side(mask, cfg, Axis::Vertical, 1, rows, cols);
    debug!("scan: top={:?} bot={:?}", top, bot);
    RowEdges { top, bot }
}

/// Left/right are both required; an unresolved or zero column fails the request.
pub fn scan_left_right(mask: &GrayImage, cfg: &ScanConfig) -> Result<ColumnEdges> {
    let [rows, cols] = cfg.vertical_window;
    let left = scan_side(mask, cfg, Axis::Horizontal, -1, rows, cols);
    let right = scan_side(mask, cfg, Axis::Horizontal, 1, rows, cols);
    debug!("scan: left={:?} right={:?}", left, right);

    match (left, right) {
        (Some(l), Some(r)) if l > 0 && r > 0 => Ok(ColumnEdges { left: l, right: r }),
        _ => Err(PoseError::InsufficientEdgeEvidence(format!(
            "vertical edges unresolved (left={:?}, right={:?})",
            left, right
        ))),
    }
}

fn scan_side(mask: &GrayImage, cfg: &ScanConfig, axis: Axis, dir: i64, rows: u32, cols: u32) -> Option<u32> {
    let (w, h) = (mask.width() as i64, mask.height() as i64);
    let (cx, cy) = (w / 2, h / 2);
    let half = (cfg.steps / 2) as i64;

    let mut hits = Vec::with_capacity(cfg.steps as usize);
    for i in -half..=half {
        let offset = i * cfg.stride as i64;
        let hit = match axis {
            Axis::Vertical => {
                let x = cx + offset;
                walk(cy, dir, h).find(|&y| window_sum(mask, x, y, rows, cols) >= cfg.threshold)
            }
            Axis::Horizontal => {
                let y = cy + offset;
                walk(cx, dir, w).find(|&x| window_sum(mask, x, y, rows, cols) >= cfg.threshold)
            }
        };
        if let Some(p) = hit {
            hits.push(p);
        }
    }
    median(&mut hits).map(|m| m as u32)
}

/// Positions from `start` (inclusive) to the image border in direction `dir`.
fn walk(start: i64, dir: i64, len: i64) -> impl Iterator<Item = i64> {
    let mut p = start;
    std::iter::from_fn(move || {
        if p < 0 || p >= len {
            return None;
        }
        let cur = p;
        p += dir;
        Some(cur)
    })
}

/// Sum of mask intensity in units of 255 over a `rows` x `cols` window centered
/// on (x, y), clipped to the image.
fn window_sum(mask: &GrayImage, x: i64, y: i64, rows: u32, cols: u32) -> u32 {
    let (w, h) = (mask.width() as i64, mask.height() as i64);
    let (hr, hc) = ((rows / 2) as i64, (cols / 2) as i64);
    let mut sum = 0u32;
    for yy in (y - hr).max(0)..=(y + hr).min(h - 1) {
        for xx in (x - hc).max(0)..=(x + hc).min(w - 1) {
            sum += mask.get_pixel(xx as u32, yy as u32)[0] as u32;
        }
    }
    sum / 255
}

/// Median, truncated toward zero for even counts.
fn median(v: &mut [i64]) -> Option<i64> {
    if v.is_empty() {
        return None;
    }
    v.sort_unstable();
    let n = v.len();
    if n % 2 == 1 {
        Some(v[n / 2])
    } else {
        Some((v[n / 2 - 1] + v[n / 2]) / 2)
    }
}
