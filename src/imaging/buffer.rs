//! The in-memory raster every effect reads and produces.
//!
//! [`Buffer`] is an 8-bit RGB image. Anything the decoder hands back (RGBA,
//! greyscale, 16-bit) is collapsed to RGB8 on the way in. Operations never
//! mutate `self`; they return a new buffer.

use super::quantize;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    image: RgbImage,
}

impl Buffer {
    /// Wrap an existing RGB image.
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// A buffer of one solid color.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::new(RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    /// Build a buffer pixel by pixel.
    pub fn from_fn(width: u32, height: u32, f: impl FnMut(u32, u32) -> Rgb<u8>) -> Self {
        Self::new(RgbImage::from_fn(width, height, f))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// RGB samples of one pixel. Panics when out of bounds, like `RgbImage`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.image.get_pixel(x, y).0
    }

    pub fn as_rgb_image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_rgb_image(self) -> RgbImage {
        self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        DynamicImage::ImageRgb8(self.image)
    }

    /// Nearest-neighbor resize. Returns a copy when the size already matches.
    pub fn resize_nearest(&self, width: u32, height: u32) -> Self {
        if self.dimensions() == (width, height) {
            return self.clone();
        }
        Self::new(image::imageops::resize(
            &self.image,
            width,
            height,
            FilterType::Nearest,
        ))
    }

    /// Reduce to at most `palette_size` colors (clamped to 1–256).
    ///
    /// See [`quantize`](super::quantize) for the palette algorithm.
    pub fn quantize(&self, palette_size: u16, dither: bool) -> Self {
        Self::new(quantize::quantize(
            &self.image,
            palette_size as usize,
            dither,
        ))
    }

    /// Number of distinct RGB colors present.
    pub fn distinct_colors(&self) -> usize {
        self.image
            .pixels()
            .map(|p| p.0)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Build a new buffer of the same size from a per-pixel function of this one.
    ///
    /// The closure receives `(x, y, self)` so it can sample any source pixel.
    pub fn map_pixels(&self, mut f: impl FnMut(u32, u32, &RgbImage) -> [u8; 3]) -> Self {
        let source = &self.image;
        Self::from_fn(self.width(), self.height(), |x, y| Rgb(f(x, y, source)))
    }
}

impl From<DynamicImage> for Buffer {
    fn from(image: DynamicImage) -> Self {
        Self::new(image.into_rgb8())
    }
}

impl From<RgbImage> for Buffer {
    fn from(image: RgbImage) -> Self {
        Self::new(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn rgba_collapses_to_rgb() {
        let rgba = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 40]));
        let buffer = Buffer::from(DynamicImage::ImageRgba8(rgba));
        assert_eq!(buffer.dimensions(), (3, 2));
        assert_eq!(buffer.pixel(2, 1), [10, 20, 30]);
    }

    #[test]
    fn greyscale_expands_to_rgb() {
        let grey = image::GrayImage::from_pixel(2, 2, image::Luma([77]));
        let buffer = Buffer::from(DynamicImage::ImageLuma8(grey));
        assert_eq!(buffer.pixel(0, 0), [77, 77, 77]);
    }

    #[test]
    fn resize_same_size_is_copy() {
        let buffer = Buffer::from_fn(5, 4, |x, y| Rgb([x as u8, y as u8, 9]));
        assert_eq!(buffer.resize_nearest(5, 4), buffer);
    }

    #[test]
    fn resize_changes_dimensions() {
        let buffer = Buffer::filled(10, 6, [1, 2, 3]);
        let small = buffer.resize_nearest(3, 2);
        assert_eq!(small.dimensions(), (3, 2));
        assert_eq!(small.pixel(2, 1), [1, 2, 3]);
    }

    #[test]
    fn resize_nearest_keeps_source_colors() {
        let buffer = Buffer::from_fn(8, 8, |x, _| {
            if x < 4 { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) }
        });
        let up = buffer.resize_nearest(2, 2).resize_nearest(8, 8);
        for pixel in up.as_rgb_image().pixels() {
            assert!(pixel.0 == [255, 0, 0] || pixel.0 == [0, 0, 255]);
        }
    }

    #[test]
    fn quantize_does_not_touch_input() {
        let buffer = Buffer::from_fn(16, 16, |x, y| Rgb([(x * 16) as u8, (y * 16) as u8, 0]));
        let before = buffer.clone();
        let out = buffer.quantize(4, true);
        assert_eq!(buffer, before);
        assert!(out.distinct_colors() <= 4);
    }

    #[test]
    fn distinct_colors_counts() {
        assert_eq!(Buffer::filled(4, 4, [0, 0, 0]).distinct_colors(), 1);
        let two = Buffer::from_fn(2, 1, |x, _| Rgb([x as u8, 0, 0]));
        assert_eq!(two.distinct_colors(), 2);
    }

    #[test]
    fn map_pixels_samples_source() {
        let buffer = Buffer::from_fn(3, 1, |x, _| Rgb([x as u8, 0, 0]));
        let mirrored = buffer.map_pixels(|x, y, src| src.get_pixel(2 - x, y).0);
        assert_eq!(mirrored.pixel(0, 0), [2, 0, 0]);
        assert_eq!(mirrored.pixel(2, 0), [0, 0, 0]);
    }
}
