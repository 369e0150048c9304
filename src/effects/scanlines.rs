//! CRT scanline overlay.

use super::params::ScanlineParams;
use crate::imaging::Buffer;
use crate::imaging::calculations::{is_scanline_row, scale_channel, scanline_keep_factor};

/// Darken every even row to `1 - opacity/100` of its brightness.
///
/// Equivalent to compositing the image over black through a 2-row mask
/// (one row shaded, one transparent). Odd rows are copied untouched.
pub fn crt_scanlines(buffer: &Buffer, params: &ScanlineParams) -> Buffer {
    let keep = scanline_keep_factor(params.opacity);
    if keep >= 1.0 {
        return buffer.clone();
    }
    buffer.map_pixels(|x, y, src| {
        let rgb = src.get_pixel(x, y).0;
        if is_scanline_row(y) {
            rgb.map(|c| scale_channel(c, keep))
        } else {
            rgb
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{noise_buffer, row_numbered_buffer};

    #[test]
    fn zero_opacity_is_identity() {
        let input = noise_buffer(9, 9, 1);
        assert_eq!(crt_scanlines(&input, &ScanlineParams::new(0)), input);
    }

    #[test]
    fn full_opacity_blackens_even_rows_only() {
        let input = row_numbered_buffer(4, 4);
        let out = crt_scanlines(&input, &ScanlineParams::new(100));
        for y in 0..4 {
            for x in 0..4 {
                if y % 2 == 0 {
                    assert_eq!(out.pixel(x, y), [0, 0, 0]);
                } else {
                    assert_eq!(out.pixel(x, y), input.pixel(x, y));
                }
            }
        }
    }

    #[test]
    fn half_opacity_halves_even_rows() {
        let input = Buffer::filled(3, 2, [200, 100, 50]);
        let out = crt_scanlines(&input, &ScanlineParams::new(50));
        assert_eq!(out.pixel(0, 0), [100, 50, 25]);
        assert_eq!(out.pixel(0, 1), [200, 100, 50]);
    }

    #[test]
    fn dimensions_preserved() {
        let input = noise_buffer(13, 7, 2);
        assert_eq!(crt_scanlines(&input, &ScanlineParams::default()).dimensions(), (13, 7));
    }
}
