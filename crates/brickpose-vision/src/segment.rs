use image::{imageops, GrayImage, Luma, RgbImage};
use imageproc::{edges::canny, filter};
use serde::Deserialize;
use tracing::debug;

use crate::config::{AdaptiveConfig, LearnedConfig, PoseConfig, VotingConfig};
use crate::error::{ensure_config, PoseError, Result};

/// Strategy producing a {0, 255} boundary/foreground mask of the ROI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    Voting,
    Adaptive,
    Learned,
}

/// External segmentation model: given the ROI crop and a seed point inside the
/// object, return its best foreground mask (same size as the crop).
pub trait ForegroundModel {
    fn predict(&mut self, roi: &RgbImage, seed: (u32, u32)) -> anyhow::Result<GrayImage>;
}

/// A mask produced offline by some other segmenter, served as if it were a model.
#[derive(Debug, Clone)]
pub struct PrecomputedMask {
    mask: GrayImage,
}

impl PrecomputedMask {
    pub fn new(mask: GrayImage) -> Self {
        Self { mask }
    }
}

impl ForegroundModel for PrecomputedMask {
    fn predict(&mut self, roi: &RgbImage, _seed: (u32, u32)) -> anyhow::Result<GrayImage> {
        anyhow::ensure!(
            self.mask.dimensions() == roi.dimensions(),
            "precomputed mask is {:?}, roi is {:?}",
            self.mask.dimensions(),
            roi.dimensions()
        );
        Ok(self.mask.clone())
    }
}

/// Canny edges voted over every (blur, threshold) combination; a pixel survives
/// when strictly more than `vote_threshold` combinations mark it.
pub fn voting_edges(gray: &GrayImage, cfg: &VotingConfig) -> Result<GrayImage> {
    ensure_config!(
        cfg.vote_threshold as usize <= cfg.combinations(),
        "vote threshold {} exceeds {} combinations",
        cfg.vote_threshold,
        cfg.combinations()
    );

    let (w, h) = gray.dimensions();
    let mut votes = vec![0u32; (w * h) as usize];
    for blur in &cfg.blur {
        let blurred = filter::gaussian_blur_f32(gray, blur.effective_sigma());
        for [lo, hi] in &cfg.canny {
            let edges = canny(&blurred, *lo, *hi);
            for (v, p) in votes.iter_mut().zip(edges.as_raw()) {
                if *p > 0 {
                    *v += 1;
                }
            }
        }
    }

    Ok(GrayImage::from_fn(w, h, |x, y| {
        let n = votes[(y * w + x) as usize];
        Luma([if n > cfg.vote_threshold { 255 } else { 0 }])
    }))
}

/// Median blur, then inverted local-mean binarization: a pixel is foreground
/// when it is darker than its neighborhood mean minus `c`.
pub fn adaptive_threshold(gray: &GrayImage, cfg: &AdaptiveConfig) -> GrayImage {
    let r = cfg.median_kernel / 2;
    let blurred = filter::median_filter(gray, r, r);
    let br = cfg.block_size / 2;
    let mean = filter::box_filter(&blurred, br, br);

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let t = mean.get_pixel(x, y)[0] as f32 - cfg.c;
        let v = blurred.get_pixel(x, y)[0] as f32;
        Luma([if v <= t { 255 } else { 0 }])
    })
}

/// Foreground silhouette from the model, reduced to its boundary so it obeys
/// the same contract as the edge masks.
pub fn learned_edges(
    roi: &RgbImage,
    model: &mut dyn ForegroundModel,
    cfg: &LearnedConfig,
) -> Result<GrayImage> {
    let seed = (roi.width() / 2, roi.height() / 2);
    let raw = model.predict(roi, seed).map_err(PoseError::Model)?;
    if raw.dimensions() != roi.dimensions() {
        return Err(PoseError::Model(anyhow::anyhow!(
            "model returned {:?} mask for {:?} roi",
            raw.dimensions(),
            roi.dimensions()
        )));
    }

    let binary = GrayImage::from_fn(raw.width(), raw.height(), |x, y| {
        Luma([if raw.get_pixel(x, y)[0] > 0 { 255 } else { 0 }])
    });
    let blurred = filter::gaussian_blur_f32(&binary, cfg.blur_sigma);
    Ok(canny(&blurred, cfg.canny[0], cfg.canny[1]))
}

/// The masks one request needs, each computed at most once.
#[derive(Debug, Default)]
pub struct MaskSet {
    voting: Option<GrayImage>,
    adaptive: Option<GrayImage>,
    learned: Option<GrayImage>,
}

impl MaskSet {
    pub fn build(roi: &RgbImage, cfg: &PoseConfig, model: Option<&mut dyn ForegroundModel>) -> Result<Self> {
        let gray = imageops::grayscale(roi);
        let mut set = MaskSet::default();

        if cfg.masks.uses(Backend::Voting) {
            set.voting = Some(voting_edges(&gray, &cfg.voting)?);
        }
        if cfg.masks.uses(Backend::Adaptive) {
            set.adaptive = Some(adaptive_threshold(&gray, &cfg.adaptive));
        }
        if cfg.masks.uses(Backend::Learned) {
            let model = model.ok_or_else(|| {
                PoseError::Configuration("learned backend selected but no segmentation model given".into())
            })?;
            set.learned = Some(learned_edges(roi, model, &cfg.learned)?);
        }

        debug!(
            "masks: voting={} adaptive={} learned={}",
            set.voting.is_some(),
            set.adaptive.is_some(),
            set.learned.is_some()
        );
        Ok(set)
    }

    pub fn get(&self, backend: Backend) -> Result<&GrayImage> {
        let m = match backend {
            Backend::Voting => &self.voting,
            Backend::Adaptive => &self.adaptive,
            Backend::Learned => &self.learned,
        };
        m.as_ref()
            .ok_or_else(|| PoseError::Configuration(format!("{:?} mask was not built", backend)))
    }
}
