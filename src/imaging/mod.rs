//! Image buffer adapter: the raster primitives the effects are built on.
//!
//! | Capability | Crate / function |
//! |---|---|
//! | **Decode → RGB8** | `image::DynamicImage::into_rgb8` |
//! | **Resize** | `image::imageops::resize` with `Nearest` filter |
//! | **Palette** | median cut over the color histogram |
//! | **Dithering** | `image::imageops::dither` (Floyd–Steinberg) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for block sizes, shifts and row offsets (unit testable)
//! - **Quantize**: Palette construction and color mapping
//! - **Buffer**: [`Buffer`], the RGB8 raster that flows through the pipeline

mod buffer;
pub mod calculations;
pub mod quantize;

pub use buffer::Buffer;
pub use quantize::{MAX_PALETTE_SIZE, Palette};
