use std::path::Path;

use image::{DynamicImage, RgbImage};

use crate::camera::DepthImage;
use crate::error::{PoseError, Result};

/// 8-bit color image, any format the `image` crate decodes.
pub fn load_color(path: &Path) -> Result<RgbImage> {
    let img = image::open(path)
        .map_err(|e| PoseError::MalformedInput(format!("read color image {}: {}", path.display(), e)))?;
    Ok(img.into_rgb8())
}

/// Raw single-channel 16-bit depth; any other layout would change the depth unit.
pub fn load_depth(path: &Path) -> Result<DepthImage> {
    let img = image::open(path)
        .map_err(|e| PoseError::MalformedInput(format!("read depth image {}: {}", path.display(), e)))?;
    match img {
        DynamicImage::ImageLuma16(depth) => Ok(depth),
        other => Err(PoseError::MalformedInput(format!(
            "depth image {} is {:?}, expected 16-bit single channel",
            path.display(),
            other.color()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn missing_file_is_malformed_input() {
        let err = load_color(Path::new("/nonexistent/color.png")).unwrap_err();
        assert!(matches!(err, PoseError::MalformedInput(_)));
        let err = load_depth(Path::new("/nonexistent/depth.png")).unwrap_err();
        assert!(matches!(err, PoseError::MalformedInput(_)));
    }

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("brickpose-{}-{}.png", std::process::id(), name))
    }

    #[test]
    fn depth_keeps_raw_16_bit_values() {
        let path = scratch("depth16");
        DepthImage::from_pixel(4, 3, Luma([3000])).save(&path).unwrap();
        let depth = load_depth(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(depth.dimensions(), (4, 3));
        assert_eq!(depth.get_pixel(2, 1)[0], 3000);
    }

    #[test]
    fn eight_bit_depth_is_rejected() {
        let path = scratch("depth8");
        GrayImage::from_pixel(4, 3, Luma([30])).save(&path).unwrap();
        let err = load_depth(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, PoseError::MalformedInput(_)), "{}", err);
    }
}
