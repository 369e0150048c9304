//! Pure calculation functions for effect geometry.
//!
//! All functions here are pure and testable without any pixels involved.

/// Calculate the downsampled size for a pixelation block size.
///
/// Each dimension is divided by `block` and rounded up, so a block larger
/// than the image collapses that dimension to a single pixel, never zero.
///
/// # Examples
/// ```
/// # use retrofx::imaging::calculations::calculate_block_dimensions;
/// assert_eq!(calculate_block_dimensions((100, 100), 10), (10, 10));
/// assert_eq!(calculate_block_dimensions((105, 31), 10), (11, 4));
/// assert_eq!(calculate_block_dimensions((8, 300), 50), (1, 6));
/// ```
pub fn calculate_block_dimensions(source: (u32, u32), block: u32) -> (u32, u32) {
    let block = block.max(1);
    let (w, h) = source;
    (w.div_ceil(block).max(1), h.div_ceil(block).max(1))
}

/// Source column for output column `x` after a circular shift right by `shift`.
///
/// Negative shifts move pixels left. Shifts larger than the row wrap around.
pub fn wrapped_source_column(x: u32, shift: i64, width: u32) -> u32 {
    if width == 0 {
        return 0;
    }
    let w = width as i64;
    (x as i64 - shift.rem_euclid(w)).rem_euclid(w) as u32
}

/// Horizontal offset for row `y` of the sinusoidal warp.
///
/// The wobble has amplitude `intensity` and advances `1/20` radian per row.
pub fn warp_offset(y: u32, intensity: f32) -> i64 {
    (intensity as f64 * (y as f64 / 20.0).sin()).round() as i64
}

/// Whether a row belongs to the darkened half of a 2-row scanline pattern.
///
/// Even rows (0, 2, 4, …) are darkened; odd rows are left alone.
pub fn is_scanline_row(y: u32) -> bool {
    y % 2 == 0
}

/// Multiplier applied to darkened rows for an opacity in percent.
pub fn scanline_keep_factor(opacity: u8) -> f32 {
    1.0 - opacity.min(100) as f32 / 100.0
}

/// Scale a channel value, rounding to the nearest integer.
pub fn scale_channel(value: u8, factor: f32) -> u8 {
    (value as f32 * factor).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // calculate_block_dimensions
    // =========================================================================

    #[test]
    fn block_dimensions_exact_division() {
        assert_eq!(calculate_block_dimensions((100, 50), 10), (10, 5));
    }

    #[test]
    fn block_dimensions_round_up() {
        assert_eq!(calculate_block_dimensions((101, 59), 10), (11, 6));
    }

    #[test]
    fn block_dimensions_block_of_one_is_identity() {
        assert_eq!(calculate_block_dimensions((37, 13), 1), (37, 13));
    }

    #[test]
    fn block_dimensions_oversized_block_floors_to_one() {
        assert_eq!(calculate_block_dimensions((20, 30), 500), (1, 1));
        assert_eq!(calculate_block_dimensions((20, 3000), 500), (1, 6));
    }

    #[test]
    fn block_dimensions_zero_block_treated_as_one() {
        assert_eq!(calculate_block_dimensions((12, 7), 0), (12, 7));
    }

    // =========================================================================
    // wrapped_source_column
    // =========================================================================

    #[test]
    fn wrap_no_shift() {
        for x in 0..5 {
            assert_eq!(wrapped_source_column(x, 0, 5), x);
        }
    }

    #[test]
    fn wrap_right_shift_pulls_from_left() {
        // Shift right by 2: output column 0 comes from column 3 (wrapped)
        assert_eq!(wrapped_source_column(0, 2, 5), 3);
        assert_eq!(wrapped_source_column(2, 2, 5), 0);
    }

    #[test]
    fn wrap_left_shift_pulls_from_right() {
        assert_eq!(wrapped_source_column(0, -1, 5), 1);
        assert_eq!(wrapped_source_column(4, -1, 5), 0);
    }

    #[test]
    fn wrap_shift_larger_than_width() {
        assert_eq!(wrapped_source_column(0, 7, 5), wrapped_source_column(0, 2, 5));
        assert_eq!(wrapped_source_column(1, -12, 5), wrapped_source_column(1, -2, 5));
    }

    #[test]
    fn wrap_extreme_shifts_do_not_overflow() {
        // i64::MIN ≡ 2 (mod 5), i64::MAX ≡ 2 (mod 5)
        assert_eq!(wrapped_source_column(0, i64::MIN, 5), 3);
        assert_eq!(wrapped_source_column(4, i64::MAX, 5), 2);
    }

    // =========================================================================
    // warp_offset
    // =========================================================================

    #[test]
    fn warp_offset_row_zero_is_zero() {
        assert_eq!(warp_offset(0, 5.0), 0);
    }

    #[test]
    fn warp_offset_zero_intensity_is_zero() {
        for y in 0..200 {
            assert_eq!(warp_offset(y, 0.0), 0);
        }
    }

    #[test]
    fn warp_offset_bounded_by_intensity() {
        for y in 0..500 {
            assert!(warp_offset(y, 5.0).abs() <= 5);
        }
    }

    #[test]
    fn warp_offset_peaks_near_quarter_period() {
        // sin(31 / 20) ≈ 0.9998
        assert_eq!(warp_offset(31, 5.0), 5);
    }

    #[test]
    fn warp_offset_huge_intensity_saturates() {
        assert_eq!(warp_offset(31, f32::MAX), i64::MAX);
    }

    // =========================================================================
    // scanline helpers
    // =========================================================================

    #[test]
    fn scanline_rows_alternate() {
        assert!(is_scanline_row(0));
        assert!(!is_scanline_row(1));
        assert!(is_scanline_row(2));
        assert!(!is_scanline_row(3));
    }

    #[test]
    fn keep_factor_bounds() {
        assert_eq!(scanline_keep_factor(0), 1.0);
        assert_eq!(scanline_keep_factor(100), 0.0);
        assert_eq!(scanline_keep_factor(50), 0.5);
        assert_eq!(scanline_keep_factor(250), 0.0);
    }

    #[test]
    fn scale_channel_rounds() {
        assert_eq!(scale_channel(255, 1.0), 255);
        assert_eq!(scale_channel(255, 0.0), 0);
        assert_eq!(scale_channel(201, 0.5), 101);
    }
}
