use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use brickpose_proto::FailureReport;
use brickpose_vision::{io, Backend, ForegroundModel, PoseConfig, PoseError, PoseEstimator, PrecomputedMask};

#[derive(Debug, Parser)]
#[command(name = "brickpose", version, about = "Brick placement pose from an aligned color + depth pair")]
struct Cli {
    /// TOML configuration; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Estimate the pose of the brick in one image pair and print it as JSON.
    Estimate {
        #[arg(long)]
        color: PathBuf,
        #[arg(long)]
        depth: PathBuf,
        /// Full-frame foreground mask from an external segmenter (learned backend).
        #[arg(long)]
        mask: Option<PathBuf>,
        /// Write the ROI with feature points and boundary lines drawn on it.
        #[arg(long)]
        debug_out: Option<PathBuf>,
    },
    /// Check the configuration without processing images.
    Doctor,
}

fn load_config(path: Option<&Path>) -> Result<PoseConfig> {
    let Some(path) = path else { return Ok(PoseConfig::default()); };
    let s = std::fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    toml::from_str(&s).context("parse config toml")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref())?;

    match cli.cmd {
        Command::Doctor => doctor(&cfg),
        Command::Estimate { color, depth, mask, debug_out } => {
            estimate(cfg, &color, &depth, mask.as_deref(), debug_out.as_deref())
        }
    }
}

fn doctor(cfg: &PoseConfig) -> Result<()> {
    info!("doctor: starting");
    cfg.validate().context("configuration invalid")?;

    if cfg.masks.uses(Backend::Learned) {
        warn!("doctor: learned backend selected, `estimate` will need --mask");
    }
    info!(
        "doctor: roi {}x{} at ({}, {}), brick {}x{}x{}mm",
        cfg.roi.w, cfg.roi.h, cfg.roi.cx, cfg.roi.cy, cfg.brick.width, cfg.brick.height, cfg.brick.depth
    );
    info!("doctor: OK");
    Ok(())
}

fn estimate(
    cfg: PoseConfig,
    color_path: &Path,
    depth_path: &Path,
    mask_path: Option<&Path>,
    debug_out: Option<&Path>,
) -> Result<()> {
    let estimator = PoseEstimator::new(cfg).context("configuration invalid")?;

    let result = run_once(&estimator, color_path, depth_path, mask_path, debug_out.is_some());
    let out = match result {
        Ok(out) => out,
        Err(e) => {
            warn!("estimate failed: {}", e);
            let report = FailureReport { error: e.kind(), detail: e.to_string() };
            println!("{}", serde_json::to_string_pretty(&report)?);
            anyhow::bail!("pose estimation failed: {:?}", report.error);
        }
    };

    if let (Some(path), Some(img)) = (debug_out, out.debug_image.as_ref()) {
        img.save(path).with_context(|| format!("write debug image {}", path.display()))?;
        info!("estimate: debug image written to {}", path.display());
    }

    println!("{}", serde_json::to_string_pretty(&out.pose)?);
    Ok(())
}

fn run_once(
    estimator: &PoseEstimator,
    color_path: &Path,
    depth_path: &Path,
    mask_path: Option<&Path>,
    with_debug: bool,
) -> Result<brickpose_vision::Estimate, PoseError> {
    let color = io::load_color(color_path)?;
    let depth = io::load_depth(depth_path)?;

    let mut model = match mask_path {
        Some(p) => {
            let frame = image::open(p)
                .map_err(|e| PoseError::MalformedInput(format!("read mask {}: {}", p.display(), e)))?
                .into_luma8();
            Some(PrecomputedMask::new(estimator.config().roi.crop(&frame)?))
        }
        None => None,
    };

    estimator.estimate(
        &color,
        &depth,
        model.as_mut().map(|m| m as &mut dyn ForegroundModel),
        with_debug,
    )
}
