use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::lines::CanonicalLines;
use crate::points::FeaturePoints;

const LINE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const POINT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const MID_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// ROI crop with the canonical lines and the five feature points drawn on top.
pub fn draw_features(roi: &RgbImage, points: &FeaturePoints, lines: &CanonicalLines) -> RgbImage {
    let mut out = roi.clone();
    for l in lines.as_array() {
        draw_line_segment_mut(
            &mut out,
            (l.p1[0] as f32, l.p1[1] as f32),
            (l.p2[0] as f32, l.p2[1] as f32),
            LINE_COLOR,
        );
    }
    for (name, [x, y]) in points.iter() {
        let color = if name == "mid" { MID_COLOR } else { POINT_COLOR };
        draw_filled_circle_mut(&mut out, (*x, *y), 3, color);
    }
    out
}
