//! VHS glitch: chroma misregistration, tracking wobble, scanlines and tape noise.
//!
//! Stages run in a fixed order, each producing a new buffer:
//!
//! ```text
//! channel shift → row warp → scanline darkening → noise
//! ```
//!
//! Any stage whose parameter is zero is skipped, so
//! [`VhsParams::shift_only`] gives the plain channel-shift variant.

use super::params::VhsParams;
use crate::imaging::Buffer;
use crate::imaging::calculations::{
    is_scanline_row, scale_channel, warp_offset, wrapped_source_column,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn vhs(buffer: &Buffer, params: &VhsParams) -> Buffer {
    let mut current = if params.color_shift != 0 {
        shift_channels(buffer, params.color_shift)
    } else {
        buffer.clone()
    };

    if params.warp_intensity > 0.0 {
        current = warp_rows(&current, params.warp_intensity);
    }

    if params.scanline_intensity > 0.0 {
        current = darken_scanlines(&current, params.scanline_intensity);
    }

    if params.noise_amount > 0.0 {
        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        current = add_noise(&current, params.noise_amount, &mut rng);
    }

    current
}

/// Red moves right by `shift` columns, green moves left by the same amount,
/// blue stays put. Columns wrap around the row.
pub fn shift_channels(buffer: &Buffer, shift: i32) -> Buffer {
    let width = buffer.width();
    let shift = shift as i64;
    buffer.map_pixels(|x, y, src| {
        let red = src.get_pixel(wrapped_source_column(x, shift, width), y)[0];
        let green = src.get_pixel(wrapped_source_column(x, -shift, width), y)[1];
        let blue = src.get_pixel(x, y)[2];
        [red, green, blue]
    })
}

/// Circularly shift each row by `round(intensity * sin(y / 20))` columns.
pub fn warp_rows(buffer: &Buffer, intensity: f32) -> Buffer {
    let width = buffer.width();
    buffer.map_pixels(|x, y, src| {
        let offset = warp_offset(y, intensity);
        src.get_pixel(wrapped_source_column(x, offset, width), y).0
    })
}

/// Cap even rows at `255 * (1 - intensity)` per channel; odd rows pass through.
pub fn darken_scanlines(buffer: &Buffer, intensity: f32) -> Buffer {
    let ceiling = scale_channel(255, 1.0 - intensity.clamp(0.0, 1.0));
    buffer.map_pixels(|x, y, src| {
        let rgb = src.get_pixel(x, y).0;
        if is_scanline_row(y) {
            rgb.map(|c| c.min(ceiling))
        } else {
            rgb
        }
    })
}

/// Add or subtract a random per-pixel magnitude below `255 * amount`.
///
/// Magnitudes below `255 * amount / 2` darken the pixel, the rest brighten
/// it. All three channels get the same value; results are clamped.
pub fn add_noise(buffer: &Buffer, amount: f32, rng: &mut impl Rng) -> Buffer {
    let amount = amount.clamp(0.0, 1.0);
    let bound = (255.0 * amount) as u32;
    if bound == 0 {
        return buffer.clone();
    }
    let midpoint = 255.0 * amount / 2.0;
    buffer.map_pixels(|x, y, src| {
        let magnitude = rng.random_range(0..bound) as i32;
        let delta = if (magnitude as f32) < midpoint {
            -magnitude
        } else {
            magnitude
        };
        src.get_pixel(x, y)
            .0
            .map(|c| (c as i32 + delta).clamp(0, 255) as u8)
    })
}
