//! Shared fixtures for the unit test suite.
//!
//! Synthetic buffers with known structure, so effect tests can assert exact
//! pixel values without image files on disk.

use crate::imaging::Buffer;
use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Single-color image.
pub fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(rgb))
}

/// Red ramps along x, green along y, blue fixed. Distinct colors up to 64×64.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 4 % 256) as u8, (y * 4 % 256) as u8, 128])
    })
}

pub fn gradient_buffer(width: u32, height: u32) -> Buffer {
    Buffer::new(gradient_image(width, height))
}

/// Reproducible random pixels.
pub fn noise_buffer(width: u32, height: u32, seed: u64) -> Buffer {
    let mut rng = StdRng::seed_from_u64(seed);
    Buffer::from_fn(width, height, |_, _| Rgb(rng.random()))
}

/// Every pixel of row `y` has the same non-black color, unique per row.
pub fn row_numbered_buffer(width: u32, height: u32) -> Buffer {
    Buffer::from_fn(width, height, |_, y| {
        Rgb([
            (10 + y * 40 % 240) as u8,
            (5 + y * 20 % 240) as u8,
            (1 + y * 10 % 240) as u8,
        ])
    })
}
