//! Parameter types for the effects.
//!
//! These structs describe *what* an effect should do. Each one has a
//! `Default` matching the stock request schema and a `new` constructor that
//! clamps every value into its valid range, so out-of-range input never
//! reaches the pixel code.
//!
//! ## Types
//!
//! - [`PixelateParams`]: block size (≥1, default 10), palette size (1–256, default 16), dithering (default on).
//! - [`ScanlineParams`]: darkening opacity in percent (0–100, default 50).
//! - [`EightBitParams`]: palette size (1–256, default 16).
//! - [`VhsParams`]: channel shift, warp amplitude, scanline strength, noise amount, optional noise seed.
//!
//! [`ParamReader`] decodes a loosely-typed JSON parameter map into these
//! structs: absent keys fall back to the default, values of the wrong type
//! are logged and ignored.

use crate::imaging::MAX_PALETTE_SIZE;
use serde_json::{Map, Value};

fn clamp_palette(size: f64) -> u16 {
    size.round().clamp(1.0, MAX_PALETTE_SIZE as f64) as u16
}

/// Block-mosaic pixelation plus optional palette reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelateParams {
    pub pixel_size: u32,
    pub palette_size: u16,
    pub dither: bool,
}

impl PixelateParams {
    pub fn new(pixel_size: u32, palette_size: u16, dither: bool) -> Self {
        Self {
            pixel_size: pixel_size.max(1),
            palette_size: palette_size.clamp(1, MAX_PALETTE_SIZE as u16),
            dither,
        }
    }

    pub(crate) fn from_reader(reader: &ParamReader<'_>) -> Self {
        let d = Self::default();
        Self::new(
            reader
                .number_any(&["pixel_size", "size"])
                .map(|n| n.round().clamp(1.0, u32::MAX as f64) as u32)
                .unwrap_or(d.pixel_size),
            reader
                .number("palette_size")
                .map(clamp_palette)
                .unwrap_or(d.palette_size),
            reader.flag("dither").unwrap_or(d.dither),
        )
    }
}

impl Default for PixelateParams {
    fn default() -> Self {
        Self {
            pixel_size: 10,
            palette_size: 16,
            dither: true,
        }
    }
}

/// Alternating-row darkening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanlineParams {
    /// Percent darkening of the shaded rows: 0 leaves them alone, 100 makes them black.
    pub opacity: u8,
}

impl ScanlineParams {
    pub fn new(opacity: u8) -> Self {
        Self {
            opacity: opacity.min(100),
        }
    }

    pub(crate) fn from_reader(reader: &ParamReader<'_>) -> Self {
        reader
            .number("opacity")
            .map(|n| Self::new(n.round().clamp(0.0, 100.0) as u8))
            .unwrap_or_default()
    }
}

impl Default for ScanlineParams {
    fn default() -> Self {
        Self { opacity: 50 }
    }
}

/// Straight palette reduction, no dithering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EightBitParams {
    pub palette_size: u16,
}

impl EightBitParams {
    pub fn new(palette_size: u16) -> Self {
        Self {
            palette_size: palette_size.clamp(1, MAX_PALETTE_SIZE as u16),
        }
    }

    pub(crate) fn from_reader(reader: &ParamReader<'_>) -> Self {
        reader
            .number("palette_size")
            .map(|n| Self::new(clamp_palette(n)))
            .unwrap_or_default()
    }
}

impl Default for EightBitParams {
    fn default() -> Self {
        Self { palette_size: 16 }
    }
}

/// VHS glitch.
///
/// - `color_shift`: columns the red channel moves right (green moves left by the same amount)
/// - `warp_intensity`: amplitude in pixels of the per-row sinusoidal wobble
/// - `scanline_intensity`: 0–1 strength of the even-row darkening
/// - `noise_amount`: 0–1 fraction of the full range used for per-pixel noise
/// - `seed`: fixes the noise pattern when set
///
/// A zero value disables its stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VhsParams {
    pub color_shift: i32,
    pub warp_intensity: f32,
    pub scanline_intensity: f32,
    pub noise_amount: f32,
    pub seed: Option<u64>,
}

impl VhsParams {
    pub fn new(
        color_shift: i32,
        warp_intensity: f32,
        scanline_intensity: f32,
        noise_amount: f32,
    ) -> Self {
        Self {
            color_shift,
            warp_intensity: finite_or_zero(warp_intensity).clamp(0.0, MAX_WARP_INTENSITY),
            scanline_intensity: finite_or_zero(scanline_intensity).clamp(0.0, 1.0),
            noise_amount: finite_or_zero(noise_amount).clamp(0.0, 1.0),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Channel shift only, every other stage disabled.
    pub fn shift_only(color_shift: i32) -> Self {
        Self::new(color_shift, 0.0, 0.0, 0.0)
    }

    pub(crate) fn from_reader(reader: &ParamReader<'_>) -> Self {
        let d = Self::default();
        let params = Self::new(
            reader
                .number_any(&["color_shift", "glitch_intensity"])
                .map(|n| n.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
                .unwrap_or(d.color_shift),
            reader
                .number("warp_intensity")
                .map(|n| n as f32)
                .unwrap_or(d.warp_intensity),
            reader
                .number("scanline_intensity")
                .map(|n| n as f32)
                .unwrap_or(d.scanline_intensity),
            reader
                .number("noise_amount")
                .map(|n| n as f32)
                .unwrap_or(d.noise_amount),
        );
        match reader.number("seed") {
            Some(seed) => params.with_seed(seed.round().clamp(0.0, u64::MAX as f64) as u64),
            None => params,
        }
    }
}

impl Default for VhsParams {
    fn default() -> Self {
        Self {
            color_shift: 2,
            warp_intensity: 5.0,
            scanline_intensity: 0.5,
            noise_amount: 0.3,
            seed: None,
        }
    }
}

/// Largest warp amplitude in pixels. Anything wider than the image already wraps.
const MAX_WARP_INTENSITY: f32 = i32::MAX as f32;

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

/// Typed access to a request's JSON parameter map.
///
/// Numbers may arrive as JSON numbers or numeric strings (HTML form values);
/// flags as booleans, numbers (non-zero is true) or the usual strings.
/// Anything else is logged at `warn` and treated as absent.
pub struct ParamReader<'a> {
    effect: &'a str,
    params: &'a Map<String, Value>,
}

impl<'a> ParamReader<'a> {
    pub fn new(effect: &'a str, params: &'a Map<String, Value>) -> Self {
        Self { effect, params }
    }

    /// Finite numeric value for `key`, if present and usable.
    pub fn number(&self, key: &str) -> Option<f64> {
        let value = self.params.get(key)?;
        let parsed = match value {
            Value::Null => return None,
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed.filter(|n| n.is_finite()) {
            Some(n) => Some(n),
            None => {
                self.ignored(key, value, "a number");
                None
            }
        }
    }

    /// First key from `keys` that yields a number; earlier keys take precedence.
    pub fn number_any(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|key| self.number(key))
    }

    /// Boolean value for `key`, if present and usable.
    pub fn flag(&self, key: &str) -> Option<bool> {
        let value = self.params.get(key)?;
        let parsed = match value {
            Value::Null => return None,
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|n| n != 0.0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" | "" => Some(false),
                _ => None,
            },
            _ => None,
        };
        if parsed.is_none() {
            self.ignored(key, value, "a boolean");
        }
        parsed
    }

    fn ignored(&self, key: &str, value: &Value, expected: &str) {
        log::warn!(
            "{}: parameter `{}` should be {}, got {}; using default",
            self.effect,
            key,
            expected,
            value
        );
    }
}
