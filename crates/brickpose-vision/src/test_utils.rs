//! Synthetic images for unit tests.

use image::{GrayImage, Luma, Rgb, RgbImage};

/// Uniform `bg` image with a filled `fg` rectangle over `x0..x1`, `y0..y1`.
pub(crate) fn brick_rgb(w: u32, h: u32, rect: (u32, u32, u32, u32), fg: u8, bg: u8) -> RgbImage {
    let (x0, y0, x1, y1) = rect;
    RgbImage::from_fn(w, h, |x, y| {
        let v = if (x0..x1).contains(&x) && (y0..y1).contains(&y) { fg } else { bg };
        Rgb([v, v, v])
    })
}

/// One-pixel rectangle outline with corners (x0, y0) and (x1, y1), inclusive.
pub(crate) fn outline_mask(w: u32, h: u32, rect: (u32, u32, u32, u32)) -> GrayImage {
    let (x0, y0, x1, y1) = rect;
    GrayImage::from_fn(w, h, |x, y| {
        let on_row = (y == y0 || y == y1) && (x0..=x1).contains(&x);
        let on_col = (x == x0 || x == x1) && (y0..=y1).contains(&y);
        Luma([if on_row || on_col { 255 } else { 0 }])
    })
}

pub(crate) fn is_binary(mask: &GrayImage) -> bool {
    mask.pixels().all(|p| p[0] == 0 || p[0] == 255)
}
