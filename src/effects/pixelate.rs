//! Block mosaic with palette reduction.

use super::params::{EightBitParams, PixelateParams};
use crate::imaging::calculations::calculate_block_dimensions;
use crate::imaging::{Buffer, MAX_PALETTE_SIZE};

/// Downsample by `pixel_size`, scale back up with nearest-neighbor, then
/// reduce the palette when fewer than 256 colors are requested.
///
/// Output dimensions always equal the input's.
pub fn pixelate(buffer: &Buffer, params: &PixelateParams) -> Buffer {
    let (width, height) = buffer.dimensions();
    let (small_w, small_h) = calculate_block_dimensions((width, height), params.pixel_size);

    let blocky = buffer
        .resize_nearest(small_w, small_h)
        .resize_nearest(width, height);

    if (params.palette_size as usize) < MAX_PALETTE_SIZE {
        blocky.quantize(params.palette_size, params.dither)
    } else {
        blocky
    }
}

/// Palette reduction without the block stage and without dithering.
pub fn eight_bit(buffer: &Buffer, params: &EightBitParams) -> Buffer {
    buffer.quantize(params.palette_size, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_buffer, noise_buffer};
    use image::Rgb;

    #[test]
    fn pixel_size_one_full_palette_is_identity() {
        let input = noise_buffer(23, 17, 7);
        let out = pixelate(&input, &PixelateParams::new(1, 256, true));
        assert_eq!(out, input);
    }

    #[test]
    fn dimensions_preserved_for_any_block_size() {
        let input = gradient_buffer(37, 21);
        for size in [1, 2, 3, 10, 36, 37, 100, 10_000] {
            let out = pixelate(&input, &PixelateParams::new(size, 16, true));
            assert_eq!(out.dimensions(), (37, 21), "pixel_size {size}");
        }
    }

    #[test]
    fn oversized_block_gives_single_color() {
        let input = gradient_buffer(20, 12);
        let out = pixelate(&input, &PixelateParams::new(50, 256, false));
        assert_eq!(out.distinct_colors(), 1);
    }

    #[test]
    fn blocks_are_uniform() {
        let input = noise_buffer(40, 40, 3);
        let out = pixelate(&input, &PixelateParams::new(10, 256, false));
        // Each 10x10 block is one color
        for by in 0..4 {
            for bx in 0..4 {
                let first = out.pixel(bx * 10, by * 10);
                for y in 0..10 {
                    for x in 0..10 {
                        assert_eq!(out.pixel(bx * 10 + x, by * 10 + y), first);
                    }
                }
            }
        }
    }

    #[test]
    fn palette_limits_colors() {
        let input = gradient_buffer(64, 64);
        for dither in [false, true] {
            let out = pixelate(&input, &PixelateParams::new(2, 4, dither));
            assert!(out.distinct_colors() <= 4);
        }
    }

    #[test]
    fn larger_palette_never_fewer_colors() {
        let input = gradient_buffer(64, 64);
        let mut previous = 0;
        for palette in [1, 2, 4, 8, 16, 64, 255] {
            let out = pixelate(&input, &PixelateParams::new(2, palette, false));
            let count = out.distinct_colors();
            assert!(count >= previous, "palette {palette}: {count} < {previous}");
            previous = count;
        }
    }

    #[test]
    fn input_is_not_mutated() {
        let input = gradient_buffer(16, 16);
        let before = input.clone();
        let _ = pixelate(&input, &PixelateParams::default());
        assert_eq!(input, before);
    }

    #[test]
    fn eight_bit_limits_colors_and_keeps_size() {
        let input = gradient_buffer(30, 30);
        let out = eight_bit(&input, &EightBitParams::new(8));
        assert_eq!(out.dimensions(), (30, 30));
        assert!(out.distinct_colors() <= 8);
    }

    #[test]
    fn eight_bit_keeps_two_tone_image() {
        let input = Buffer::from_fn(6, 6, |x, _| {
            if x % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([250, 250, 250]) }
        });
        assert_eq!(eight_bit(&input, &EightBitParams::default()), input);
    }
}
