//! The effect library: a closed set of pure buffer transforms.
//!
//! | Name | Effect | Parameters |
//! |---|---|---|
//! | `pixelate` | block mosaic + palette | [`PixelateParams`] |
//! | `crt_scanlines` | even-row darkening | [`ScanlineParams`] |
//! | `8bit` | palette reduction only | [`EightBitParams`] |
//! | `vhs` | channel shift, warp, scanlines, noise | [`VhsParams`] |
//!
//! Every transform borrows its input and returns a new [`Buffer`]. The names
//! in the table are the stable contract with whatever builds the requests;
//! [`EffectKind::from_name`] is the only place they are matched.

mod params;
mod pixelate;
mod scanlines;
mod vhs;

pub use params::{EightBitParams, ParamReader, PixelateParams, ScanlineParams, VhsParams};
pub use pixelate::{eight_bit, pixelate};
pub use scanlines::crt_scanlines;
pub use vhs::{add_noise, darken_scanlines, shift_channels, vhs, warp_rows};

use crate::imaging::Buffer;
use serde_json::{Map, Value};
use std::fmt;

/// One fully-parameterized effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Pixelate(PixelateParams),
    CrtScanlines(ScanlineParams),
    EightBit(EightBitParams),
    Vhs(VhsParams),
}

impl Effect {
    /// Build an effect from a loosely-typed parameter map, taking defaults for absent keys.
    pub fn from_params(kind: EffectKind, params: &Map<String, Value>) -> Self {
        let reader = ParamReader::new(kind.name(), params);
        match kind {
            EffectKind::Pixelate => Effect::Pixelate(PixelateParams::from_reader(&reader)),
            EffectKind::CrtScanlines => Effect::CrtScanlines(ScanlineParams::from_reader(&reader)),
            EffectKind::EightBit => Effect::EightBit(EightBitParams::from_reader(&reader)),
            EffectKind::Vhs => Effect::Vhs(VhsParams::from_reader(&reader)),
        }
    }

    /// The effect with every parameter at its default.
    pub fn default_for(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Pixelate => Effect::Pixelate(PixelateParams::default()),
            EffectKind::CrtScanlines => Effect::CrtScanlines(ScanlineParams::default()),
            EffectKind::EightBit => Effect::EightBit(EightBitParams::default()),
            EffectKind::Vhs => Effect::Vhs(VhsParams::default()),
        }
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::Pixelate(_) => EffectKind::Pixelate,
            Effect::CrtScanlines(_) => EffectKind::CrtScanlines,
            Effect::EightBit(_) => EffectKind::EightBit,
            Effect::Vhs(_) => EffectKind::Vhs,
        }
    }

    pub fn apply(&self, buffer: &Buffer) -> Buffer {
        match self {
            Effect::Pixelate(p) => pixelate(buffer, p),
            Effect::CrtScanlines(p) => crt_scanlines(buffer, p),
            Effect::EightBit(p) => eight_bit(buffer, p),
            Effect::Vhs(p) => vhs(buffer, p),
        }
    }
}

/// The effect names a request may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Pixelate,
    CrtScanlines,
    EightBit,
    Vhs,
}

impl EffectKind {
    pub const ALL: [EffectKind; 4] = [
        EffectKind::Pixelate,
        EffectKind::CrtScanlines,
        EffectKind::EightBit,
        EffectKind::Vhs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Pixelate => "pixelate",
            EffectKind::CrtScanlines => "crt_scanlines",
            EffectKind::EightBit => "8bit",
            EffectKind::Vhs => "vhs",
        }
    }

    /// Look up a request name. Surrounding whitespace and ASCII case are ignored.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    pub fn summary(self) -> &'static str {
        match self {
            EffectKind::Pixelate => "Blocky mosaic with a reduced, optionally dithered palette",
            EffectKind::CrtScanlines => "Darkened horizontal bands on every other row",
            EffectKind::EightBit => "Reduce to a small palette without dithering",
            EffectKind::Vhs => "Chroma shift, tracking wobble, scanlines and tape noise",
        }
    }

    /// Parameter table for help output.
    pub fn params(self) -> &'static [ParamSpec] {
        match self {
            EffectKind::Pixelate => PIXELATE_PARAMS,
            EffectKind::CrtScanlines => SCANLINE_PARAMS,
            EffectKind::EightBit => EIGHT_BIT_PARAMS,
            EffectKind::Vhs => VHS_PARAMS,
        }
    }
}

const PIXELATE_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("pixel_size", "10", "integer >= 1 (alias: size)"),
    ParamSpec::new("palette_size", "16", "integer 1-256; 256 skips quantization"),
    ParamSpec::new("dither", "true", "boolean, Floyd-Steinberg"),
];

const SCANLINE_PARAMS: &[ParamSpec] = &[ParamSpec::new("opacity", "50", "0-100 percent")];

const EIGHT_BIT_PARAMS: &[ParamSpec] = &[ParamSpec::new("palette_size", "16", "integer 1-256")];

const VHS_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("color_shift", "2", "integer columns (alias: glitch_intensity)"),
    ParamSpec::new("warp_intensity", "5", "pixels >= 0; 0 disables"),
    ParamSpec::new("scanline_intensity", "0.5", "0-1; 0 disables"),
    ParamSpec::new("noise_amount", "0.3", "0-1; 0 disables"),
    ParamSpec::new("seed", "random", "integer, fixes the noise pattern"),
];

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Description of one effect parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: &'static str,
    pub range: &'static str,
}

impl ParamSpec {
    const fn new(name: &'static str, default: &'static str, range: &'static str) -> Self {
        Self {
            name,
            default,
            range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::gradient_buffer;
    use serde_json::json;

    #[test]
    fn names_round_trip() {
        for kind in EffectKind::ALL {
            assert_eq!(EffectKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn from_name_ignores_case_and_whitespace() {
        assert_eq!(EffectKind::from_name(" VHS "), Some(EffectKind::Vhs));
        assert_eq!(EffectKind::from_name("Crt_Scanlines"), Some(EffectKind::CrtScanlines));
    }

    #[test]
    fn unknown_name_is_none() {
        assert_eq!(EffectKind::from_name("foo"), None);
        assert_eq!(EffectKind::from_name(""), None);
    }

    #[test]
    fn from_empty_params_equals_defaults() {
        let empty = Map::new();
        for kind in EffectKind::ALL {
            assert_eq!(Effect::from_params(kind, &empty), Effect::default_for(kind));
        }
    }

    #[test]
    fn from_params_applies_overrides() {
        let params = match json!({"opacity": 80}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        assert_eq!(
            Effect::from_params(EffectKind::CrtScanlines, &params),
            Effect::CrtScanlines(ScanlineParams::new(80))
        );
    }

    #[test]
    fn kind_matches_variant() {
        for kind in EffectKind::ALL {
            assert_eq!(Effect::default_for(kind).kind(), kind);
        }
    }

    #[test]
    fn every_effect_preserves_dimensions() {
        let input = gradient_buffer(19, 11);
        for kind in EffectKind::ALL {
            let out = Effect::default_for(kind).apply(&input);
            assert_eq!(out.dimensions(), (19, 11), "{kind}");
        }
    }

    #[test]
    fn every_kind_documents_params() {
        for kind in EffectKind::ALL {
            assert!(!kind.params().is_empty());
            assert!(!kind.summary().is_empty());
        }
    }
}
