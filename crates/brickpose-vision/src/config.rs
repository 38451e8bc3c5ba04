use serde::Deserialize;

use crate::camera::Intrinsics;
use crate::error::{ensure_config, Result};
use crate::roi::Roi;
use crate::segment::Backend;

/// Parameters fixed for a whole run. Nothing per-request is ever stored here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    pub brick: BrickConfig,
    pub roi: Roi,
    pub voting: VotingConfig,
    pub adaptive: AdaptiveConfig,
    pub learned: LearnedConfig,
    pub masks: MaskRoles,
    pub lines: LineConfig,
    pub scan: ScanConfig,
    pub camera: Intrinsics,
}

/// Nominal brick dimensions in millimeters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrickConfig {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub width_tolerance: f64,
    pub depth_tolerance: f64,
}

impl Default for BrickConfig {
    fn default() -> Self {
        Self { width: 210.0, height: 50.0, depth: 100.0, width_tolerance: 15.0, depth_tolerance: 10.0 }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BlurSetting {
    pub kernel: u32,
    /// 0 means "derive from kernel", as a Gaussian with an explicit kernel size would.
    pub sigma: f32,
}

impl BlurSetting {
    pub fn effective_sigma(&self) -> f32 {
        if self.sigma > 0.0 {
            self.sigma
        } else {
            0.3 * ((self.kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
        }
    }
}

/// Multi-configuration Canny voting.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    pub blur: Vec<BlurSetting>,
    /// (low, high) hysteresis thresholds.
    pub canny: Vec<[f32; 2]>,
    pub vote_threshold: u32,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            blur: vec![
                BlurSetting { kernel: 0, sigma: 1.5 },
                BlurSetting { kernel: 5, sigma: 0.0 },
                BlurSetting { kernel: 7, sigma: 0.0 },
            ],
            canny: vec![[30.0, 150.0], [50.0, 200.0], [210.0, 250.0]],
            vote_threshold: 3,
        }
    }
}

impl VotingConfig {
    pub fn combinations(&self) -> usize {
        self.blur.len() * self.canny.len()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    pub median_kernel: u32,
    pub block_size: u32,
    pub c: f32,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self { median_kernel: 9, block_size: 11, c: 2.0 }
    }
}

/// Post-processing applied to the model's foreground mask.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LearnedConfig {
    pub blur_sigma: f32,
    pub canny: [f32; 2],
}

impl Default for LearnedConfig {
    fn default() -> Self {
        Self { blur_sigma: 1.5, canny: [50.0, 150.0] }
    }
}

/// Which backend feeds each consumer of a mask.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MaskRoles {
    pub horizontal_edges: Backend,
    pub vertical_edges: Backend,
    pub lines: Backend,
}

impl Default for MaskRoles {
    fn default() -> Self {
        Self {
            horizontal_edges: Backend::Voting,
            vertical_edges: Backend::Voting,
            lines: Backend::Adaptive,
        }
    }
}

impl MaskRoles {
    pub fn uses(&self, backend: Backend) -> bool {
        self.horizontal_edges == backend || self.vertical_edges == backend || self.lines == backend
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    pub vote_threshold: u32,
    pub suppression_radius: u32,
    pub cluster_threshold: f64,
    /// ROI-local row separating "top" from "bottom" lines.
    pub row_cutoff: f64,
    // threshold relaxation, learned backend only
    pub relax_start: u32,
    pub relax_step: u32,
    pub relax_floor: u32,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            vote_threshold: 220,
            suppression_radius: 8,
            cluster_threshold: 40.0,
            row_cutoff: 50.0,
            relax_start: 120,
            relax_step: 10,
            relax_floor: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// (rows, cols) of the summing window when scanning for top/bottom.
    pub horizontal_window: [u32; 2],
    /// (rows, cols) of the summing window when scanning for left/right.
    pub vertical_window: [u32; 2],
    /// Minimum number of full-intensity pixels inside the window.
    pub threshold: u32,
    pub steps: u32,
    pub stride: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { horizontal_window: [5, 1], vertical_window: [1, 5], threshold: 1, steps: 3, stride: 10 }
    }
}

impl PoseConfig {
    pub fn validate(&self) -> Result<()> {
        let b = &self.brick;
        ensure_config!(b.width > 0.0 && b.height > 0.0 && b.depth > 0.0, "brick dimensions must be positive");
        ensure_config!(self.roi.w > 0 && self.roi.h > 0, "roi size must be non-zero");

        let v = &self.voting;
        ensure_config!(!v.blur.is_empty() && !v.canny.is_empty(), "voting needs at least one blur and one canny setting");
        ensure_config!(
            v.vote_threshold as usize <= v.combinations(),
            "voting.vote_threshold {} exceeds {} blur x canny combinations",
            v.vote_threshold,
            v.combinations()
        );
        for s in &v.blur {
            ensure_config!(s.kernel == 0 || s.kernel % 2 == 1, "blur kernel {} must be odd", s.kernel);
            ensure_config!(s.effective_sigma() > 0.0, "blur setting {:?} yields no smoothing", s);
        }
        for [lo, hi] in &v.canny {
            ensure_config!(lo <= hi, "canny low {} above high {}", lo, hi);
        }

        let a = &self.adaptive;
        ensure_config!(a.median_kernel % 2 == 1, "adaptive.median_kernel must be odd");
        ensure_config!(a.block_size % 2 == 1 && a.block_size >= 3, "adaptive.block_size must be odd and >= 3");
        ensure_config!(self.learned.blur_sigma > 0.0, "learned.blur_sigma must be positive");

        let l = &self.lines;
        ensure_config!(l.cluster_threshold > 0.0, "lines.cluster_threshold must be positive");
        ensure_config!(l.relax_step > 0 && l.relax_floor > 0, "lines.relax_step and relax_floor must be non-zero");
        ensure_config!(l.relax_floor <= l.relax_start, "lines.relax_floor above relax_start");

        let s = &self.scan;
        ensure_config!(s.steps % 2 == 1, "scan.steps must be odd");
        ensure_config!(s.stride > 0, "scan.stride must be non-zero");
        for [r, c] in [s.horizontal_window, s.vertical_window] {
            ensure_config!(r % 2 == 1 && c % 2 == 1, "scan windows must have odd sides");
        }
        let half = (s.steps / 2) * s.stride;
        ensure_config!(half < self.roi.w / 2 && half < self.roi.h / 2, "scan lines fall outside the roi");

        self.camera.validate()
    }
}
