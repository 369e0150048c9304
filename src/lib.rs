//! # retrofx
//!
//! Retro image filters: pixelation with palette quantization, CRT scanlines,
//! 8-bit palette reduction and VHS-style glitching.
//!
//! # Architecture: Pure Core, Thin Shell
//!
//! ```text
//! file ─▶ decode ─▶ Buffer ─▶ pipeline (E1 ─▶ E2 ─▶ … ─▶ En) ─▶ Buffer ─▶ encode ─▶ file
//!         └──────── process ────────┘                          └──────── process ──────┘
//! ```
//!
//! Everything between decode and encode is a pure function of a buffer and
//! parameters. Effects never mutate their input and never touch the
//! filesystem, so the whole effect library is tested on in-memory buffers.
//! The shell ([`process`]) owns input rules, naming and file I/O.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | RGB buffer adapter: resize, quantize, pixel math |
//! | [`effects`] | The closed effect set and its typed, clamped parameters |
//! | [`pipeline`] | Effect requests and the ordered fold over a buffer |
//! | [`process`] | Decode, run, encode; batch processing with rayon |
//! | [`naming`] | Filename sanitizing and output naming |
//! | [`config`] | `retrofx.toml` loading, merging over defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Loose Requests, Strict Effects
//!
//! Requests carry a name and a JSON parameter map, the shape callers already
//! send. Resolution turns them into [`effects::Effect`], a closed enum with one
//! typed parameter struct per variant. Missing parameters take defaults and
//! out-of-range values are clamped, so an effect always runs.
//!
//! ## Unknown Effects Are Skipped
//!
//! A name outside the effect set is logged and skipped. The remaining effects
//! still apply in order.
//!
//! ## Reproducible Noise
//!
//! The VHS effect draws noise from a seedable RNG. With a `seed` parameter the
//! output is identical across runs.

pub mod config;
pub mod effects;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod process;

#[cfg(test)]
pub(crate) mod test_helpers;
