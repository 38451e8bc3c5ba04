use brickpose_vision::{
    Backend, DepthImage, FailureKind, ForegroundModel, Orientation, PoseConfig, PoseError, PoseEstimator, PrecomputedMask, Roi,
};
use image::{GrayImage, Luma, Rgb, RgbImage};

const W: u32 = 848;
const H: u32 = 480;

fn config() -> PoseConfig {
    let mut cfg = PoseConfig::default();
    cfg.roi = Roi { cx: 424, cy: 240, w: 400, h: 200 };
    cfg.lines.row_cutoff = 100.0;
    cfg
}

/// Dark brick face on a bright background, global pixel bounds `x0..x1`, `y0..y1`.
fn scene(x0: u32, x1: u32, y0: u32, y1: u32) -> RgbImage {
    RgbImage::from_fn(W, H, |x, y| {
        let v = if (x0..x1).contains(&x) && (y0..y1).contains(&y) { 40 } else { 220 };
        Rgb([v, v, v])
    })
}

/// Flat depth at 300mm.
fn flat_depth() -> DepthImage {
    DepthImage::from_pixel(W, H, Luma([3000]))
}

#[test]
fn face_on_brick() {
    // 304px at 300mm is about 210mm
    let color = scene(272, 576, 200, 280);
    let est = PoseEstimator::new(config()).unwrap();
    let out = est.estimate(&color, &flat_depth(), None, true).unwrap();

    assert_eq!(out.orientation, Orientation::Face);
    let p = out.pose;
    assert_eq!(p.y, 350.0);
    assert!((p.x + 2.5).abs() < 2.0, "x={}", p.x);
    assert!(p.z.abs() < 3.0, "z={}", p.z);
    assert_eq!(p.roll, 0.0);
    assert_eq!(p.yaw, 0.0);
    assert!(p.pitch.abs() <= 0.5, "pitch={}", p.pitch);

    // top first, both inside the brick band of the roi
    let top = out.lines.top.y_at(200.0).unwrap();
    let bot = out.lines.bot.y_at(200.0).unwrap();
    assert!(top < bot);
    assert!((55.0..70.0).contains(&top), "top={}", top);
    assert!((130.0..145.0).contains(&bot), "bot={}", bot);

    let dbg = out.debug_image.unwrap();
    assert_eq!(dbg.dimensions(), (400, 200));
}

#[test]
fn corner_brick_swaps_axes() {
    // 145px at 300mm is about 100mm, the brick depth
    let color = scene(352, 497, 200, 280);
    let mut cfg = config();
    // short boundary: lower the vote threshold and keep the threshold band one
    // pixel thick so slightly tilted lines cannot collect as many votes
    cfg.lines.vote_threshold = 100;
    cfg.adaptive.block_size = 3;
    let est = PoseEstimator::new(cfg).unwrap();
    let out = est.estimate(&color, &flat_depth(), None, false).unwrap();

    assert_eq!(out.orientation, Orientation::Corner);
    assert_eq!(out.pose.y, 405.0);
    // computed roll is exactly zero on flat depth; reported as pitch
    assert_eq!(out.pose.pitch, 0.0);
    assert!(out.pose.roll.abs() <= 0.5);
    assert!(out.debug_image.is_none());
}

#[test]
fn learned_mask_drives_lines_and_vertical_edges() {
    let color = scene(272, 576, 200, 280);
    let mut cfg = config();
    cfg.masks.vertical_edges = Backend::Learned;
    cfg.masks.lines = Backend::Learned;

    // silhouette in roi coordinates (roi origin is 224, 140)
    let silhouette = GrayImage::from_fn(400, 200, |x, y| {
        Luma([if (48..352).contains(&x) && (60..140).contains(&y) { 255 } else { 0 }])
    });
    let mut model = PrecomputedMask::new(silhouette);

    let est = PoseEstimator::new(cfg).unwrap();
    let out = est.estimate(&color, &flat_depth(), Some(&mut model as &mut dyn ForegroundModel), false).unwrap();
    assert_eq!(out.orientation, Orientation::Face);
    assert_eq!(out.pose.y, 350.0);
}

#[test]
fn third_boundary_is_ambiguous() {
    // taller roi (rows 90..390) holding the brick and a separate dark stripe
    // well below it, so the adaptive mask yields three row clusters
    let mut cfg = config();
    cfg.roi = Roi { cx: 424, cy: 240, w: 400, h: 300 };
    let mut color = scene(272, 576, 200, 280);
    for y in 370..380 {
        for x in 272..576 {
            color.put_pixel(x, y, Rgb([40, 40, 40]));
        }
    }

    let est = PoseEstimator::new(cfg).unwrap();
    let result = est.estimate(&color, &flat_depth(), None, false);
    assert!(result.is_err(), "a pose was produced");
    let err = result.unwrap_err();
    assert_eq!(err.kind(), FailureKind::AmbiguousSegmentation, "{}", err);
}

#[test]
fn mismatched_shapes_are_malformed() {
    let est = PoseEstimator::new(config()).unwrap();
    let depth = DepthImage::new(W / 2, H / 2);
    let err = est.estimate(&scene(272, 576, 200, 280), &depth, None, false).unwrap_err();
    assert_eq!(err.kind(), FailureKind::MalformedInput);
}

#[test]
fn empty_scene_lacks_edges() {
    let est = PoseEstimator::new(config()).unwrap();
    let color = RgbImage::from_pixel(W, H, Rgb([200, 200, 200]));
    let err = est.estimate(&color, &flat_depth(), None, false).unwrap_err();
    assert!(matches!(err, PoseError::InsufficientEdgeEvidence(_)), "{}", err);
}

#[test]
fn wrong_distance_is_invalid_geometry() {
    // same pixels, twice as far: the brick would be 420mm wide
    let color = scene(272, 576, 200, 280);
    let est = PoseEstimator::new(config()).unwrap();
    let depth = DepthImage::from_pixel(W, H, Luma([6000]));
    let err = est.estimate(&color, &depth, None, false).unwrap_err();
    assert_eq!(err.kind(), FailureKind::InvalidGeometry);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let mut cfg = config();
    cfg.voting.vote_threshold = 42;
    let err = PoseEstimator::new(cfg).unwrap_err();
    assert_eq!(err.kind(), FailureKind::Configuration);
}
