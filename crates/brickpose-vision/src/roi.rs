use image::{imageops, ImageBuffer, Pixel};
use serde::Deserialize;

use crate::error::{PoseError, Result};

/// Fixed-size working window, in global pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Roi {
    pub cx: u32,
    pub cy: u32,
    pub w: u32,
    pub h: u32,
}

impl Default for Roi {
    fn default() -> Self {
        Self { cx: 424, cy: 300, w: 400, h: 100 }
    }
}

impl Roi {
    /// Top-left corner of the window. Only meaningful once `check_within` passed.
    pub fn origin(&self) -> (u32, u32) {
        (self.cx.saturating_sub(self.w / 2), self.cy.saturating_sub(self.h / 2))
    }

    /// Precondition for every crop: the window lies fully inside a `width` x `height` image.
    pub fn check_within(&self, width: u32, height: u32) -> Result<()> {
        let fits = self.cx >= self.w / 2
            && self.cy >= self.h / 2
            && self.cx - self.w / 2 + self.w <= width
            && self.cy - self.h / 2 + self.h <= height;
        if !fits {
            return Err(PoseError::Configuration(format!(
                "roi {:?} crosses image bounds {}x{}",
                self, width, height
            )));
        }
        Ok(())
    }

    pub fn crop<P>(&self, img: &ImageBuffer<P, Vec<P::Subpixel>>) -> Result<ImageBuffer<P, Vec<P::Subpixel>>>
    where
        P: Pixel + 'static,
        P::Subpixel: 'static,
    {
        self.check_within(img.width(), img.height())?;
        let (x, y) = self.origin();
        Ok(imageops::crop_imm(img, x, y, self.w, self.h).to_image())
    }

    /// ROI-local pixel to global pixel.
    pub fn to_global(&self, p: (i32, i32)) -> (i32, i32) {
        let (x, y) = self.origin();
        (p.0 + x as i32, p.1 + y as i32)
    }
}
