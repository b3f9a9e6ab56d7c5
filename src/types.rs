// Core types shared by the transform, the render loop and the window.

use std::path::Path;

use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};

use crate::error::Error;

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the window back buffer is (pixels)
    pub height: usize,     // how tall it is (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A buffer filled with one color.
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }
}

/// The decoded input picture, kept in its own channel layout so the
/// augmented frames come out with the same number of channels.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceImage {
    Luma(GrayImage),
    LumaAlpha(GrayAlphaImage),
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl SourceImage {
    /// Load once at startup. Anything that is not 8-bit gets converted to
    /// 8-bit RGB (or RGBA when it carries alpha).
    pub fn open(path: &Path) -> Result<Self, Error> {
        let decoded = image::open(path).map_err(|source| Error::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_dynamic(decoded))
    }

    pub fn from_dynamic(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(b) => SourceImage::Luma(b),
            DynamicImage::ImageLumaA8(b) => SourceImage::LumaAlpha(b),
            DynamicImage::ImageRgb8(b) => SourceImage::Rgb(b),
            DynamicImage::ImageRgba8(b) => SourceImage::Rgba(b),
            other if other.color().has_alpha() => SourceImage::Rgba(other.to_rgba8()),
            other => SourceImage::Rgb(other.to_rgb8()),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            SourceImage::Luma(b) => b.dimensions(),
            SourceImage::LumaAlpha(b) => b.dimensions(),
            SourceImage::Rgb(b) => b.dimensions(),
            SourceImage::Rgba(b) => b.dimensions(),
        }
    }

    pub fn channels(&self) -> usize {
        match self {
            SourceImage::Luma(_) => 1,
            SourceImage::LumaAlpha(_) => 2,
            SourceImage::Rgb(_) => 3,
            SourceImage::Rgba(_) => 4,
        }
    }

    /// Pixel at (x,y) packed as 0x00RRGGBB for the window.
    /// Alpha is composited over black, matching how the preview looks.
    pub fn packed_rgb(&self, x: u32, y: u32) -> u32 {
        let (r, g, b) = match self {
            SourceImage::Luma(buf) => {
                let v = buf.get_pixel(x, y)[0];
                (v, v, v)
            }
            SourceImage::LumaAlpha(buf) => {
                let p = buf.get_pixel(x, y);
                let v = premultiply(p[0], p[1]);
                (v, v, v)
            }
            SourceImage::Rgb(buf) => {
                let p = buf.get_pixel(x, y);
                (p[0], p[1], p[2])
            }
            SourceImage::Rgba(buf) => {
                let p = buf.get_pixel(x, y);
                (premultiply(p[0], p[3]), premultiply(p[1], p[3]), premultiply(p[2], p[3]))
            }
        };
        ((r as u32) << 16) | ((g as u32) << 8) | b as u32
    }
}

#[inline]
fn premultiply(c: u8, a: u8) -> u8 {
    ((c as u16 * a as u16 + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, Rgba};

    #[test]
    fn keeps_8bit_layouts() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 3, Luma([9])));
        let src = SourceImage::from_dynamic(gray);
        assert_eq!(src.channels(), 1);
        assert_eq!(src.dimensions(), (4, 3));
    }

    #[test]
    fn converts_16bit_to_8bit_rgb() {
        let deep = DynamicImage::ImageRgb16(image::ImageBuffer::from_pixel(2, 2, Rgb([65535u16, 0, 0])));
        let src = SourceImage::from_dynamic(deep);
        assert_eq!(src.channels(), 3);
        assert_eq!(src.packed_rgb(0, 0), 0x00FF_0000);
    }

    #[test]
    fn packs_alpha_over_black() {
        let src = SourceImage::Rgba(RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 0])));
        assert_eq!(src.packed_rgb(0, 0), 0);
        let src = SourceImage::Rgba(RgbaImage::from_pixel(1, 1, Rgba([255, 128, 0, 255])));
        assert_eq!(src.packed_rgb(0, 0), 0x00FF_8000);
    }

    #[test]
    fn missing_file_is_an_image_load_error() {
        let err = SourceImage::open(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, Error::ImageLoad { .. }));
    }
}
