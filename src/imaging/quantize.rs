//! Median-cut palette quantization.
//!
//! Builds a palette from the color histogram of an image, then maps every
//! pixel onto it. Two mapping modes:
//!
//! - **Plain**: each pixel takes the color of the histogram box it fell into.
//!   An image that already has no more colors than the palette is returned
//!   unchanged.
//! - **Dithered**: Floyd–Steinberg error diffusion via
//!   [`image::imageops::dither`], with [`Palette`] acting as the color map.
//!
//! ## Algorithm
//!
//! 1. Count every distinct RGB color.
//! 2. Start with one box holding all colors.
//! 3. Pick the splittable box with the widest channel range and split it on
//!    that channel at the pixel-count median, snapped to a value boundary so
//!    both halves are non-empty and disjoint on the split channel.
//! 4. Repeat until the palette is full or no box has more than one color.
//! 5. Each box contributes its pixel-weighted average color.

use image::imageops::ColorMap;
use image::{Rgb, RgbImage};
use std::collections::HashMap;

/// Largest palette the quantizer produces.
pub const MAX_PALETTE_SIZE: usize = 256;

type Color = [u8; 3];

/// A reduced color palette plus the exact color → entry table it was built from.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<Rgb<u8>>,
    lookup: HashMap<Color, usize>,
}

impl Palette {
    /// Build a palette of at most `size` colors from an image's histogram.
    ///
    /// `size` is clamped to `1..=256`.
    pub fn median_cut(image: &RgbImage, size: usize) -> Self {
        let size = size.clamp(1, MAX_PALETTE_SIZE);

        let mut histogram: HashMap<Color, u32> = HashMap::new();
        for pixel in image.pixels() {
            *histogram.entry(pixel.0).or_insert(0) += 1;
        }

        let mut entries: Vec<(Color, u32)> = histogram.into_iter().collect();
        // HashMap order is random; sort so palettes are reproducible
        entries.sort_unstable();

        let mut boxes = if entries.is_empty() {
            Vec::new()
        } else {
            vec![ColorBox::new(entries)]
        };

        while boxes.len() < size {
            let Some(index) = widest_splittable_box(&boxes) else {
                break;
            };
            let target = boxes.swap_remove(index);
            let (low, high) = target.split();
            boxes.push(low);
            boxes.push(high);
        }

        let mut colors = Vec::with_capacity(boxes.len());
        let mut lookup = HashMap::new();
        for (index, color_box) in boxes.iter().enumerate() {
            colors.push(Rgb(color_box.average()));
            for (color, _) in &color_box.entries {
                lookup.insert(*color, index);
            }
        }

        Self { colors, lookup }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.colors
    }

    /// Index of the nearest palette entry by squared RGB distance.
    fn nearest(&self, color: &Color) -> usize {
        self.colors
            .iter()
            .enumerate()
            .min_by_key(|(_, entry)| distance_sq(&entry.0, color))
            .map(|(index, _)| index)
            .unwrap_or(0)
    }
}

impl ColorMap for Palette {
    type Color = Rgb<u8>;

    fn index_of(&self, color: &Rgb<u8>) -> usize {
        match self.lookup.get(&color.0) {
            Some(&index) => index,
            None => self.nearest(&color.0),
        }
    }

    fn lookup(&self, index: usize) -> Option<Rgb<u8>> {
        self.colors.get(index).copied()
    }

    fn has_lookup(&self) -> bool {
        true
    }

    fn map_color(&self, color: &mut Rgb<u8>) {
        if let Some(entry) = self.colors.get(self.index_of(color)) {
            *color = *entry;
        }
    }
}

/// Quantize an image to at most `palette_size` colors, returning a new image.
pub fn quantize(image: &RgbImage, palette_size: usize, dither: bool) -> RgbImage {
    let palette = Palette::median_cut(image, palette_size);
    let mut output = image.clone();
    if palette.is_empty() {
        return output;
    }

    // Error diffusion needs a right and a lower neighbor
    let (width, height) = output.dimensions();
    if dither && width > 1 && height > 1 {
        image::imageops::dither(&mut output, &palette);
    } else {
        for pixel in output.pixels_mut() {
            palette.map_color(pixel);
        }
    }
    output
}

fn distance_sq(a: &Color, b: &Color) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            (d * d) as u32
        })
        .sum()
}

fn widest_splittable_box(boxes: &[ColorBox]) -> Option<usize> {
    boxes
        .iter()
        .enumerate()
        .filter(|(_, b)| b.entries.len() > 1)
        .max_by_key(|(_, b)| (b.widest_channel().1, b.pixel_count()))
        .map(|(index, _)| index)
}

/// A set of histogram entries occupying one region of RGB space.
#[derive(Debug, Clone)]
struct ColorBox {
    entries: Vec<(Color, u32)>,
}

impl ColorBox {
    fn new(entries: Vec<(Color, u32)>) -> Self {
        Self { entries }
    }

    fn pixel_count(&self) -> u64 {
        self.entries.iter().map(|(_, n)| *n as u64).sum()
    }

    /// Channel with the largest value range, and that range.
    fn widest_channel(&self) -> (usize, u8) {
        (0..3)
            .map(|channel| {
                let (min, max) = self.entries.iter().fold((u8::MAX, u8::MIN), |(lo, hi), e| {
                    (lo.min(e.0[channel]), hi.max(e.0[channel]))
                });
                (channel, max.saturating_sub(min))
            })
            .max_by_key(|&(channel, range)| (range, std::cmp::Reverse(channel)))
            .unwrap_or((0, 0))
    }

    /// Split at the pixel-count median of the widest channel.
    ///
    /// Requires at least two distinct colors. Colors sharing a value on the
    /// split channel always land in the same half.
    fn split(mut self) -> (ColorBox, ColorBox) {
        let (channel, _) = self.widest_channel();
        self.entries.sort_unstable_by_key(|(color, _)| color[channel]);

        let half = self.pixel_count().div_ceil(2);
        let mut running = 0u64;
        let mut cut = self.entries.len();
        for (i, (_, count)) in self.entries.iter().enumerate() {
            running += *count as u64;
            if running >= half {
                cut = i + 1;
                break;
            }
        }

        let value_at = |i: usize, entries: &[(Color, u32)]| entries[i].0[channel];
        // Move forward to the next value boundary, or back if none remains
        while cut < self.entries.len()
            && value_at(cut, &self.entries) == value_at(cut - 1, &self.entries)
        {
            cut += 1;
        }
        if cut >= self.entries.len() {
            cut = self.entries.len() - 1;
            while cut > 0 && value_at(cut, &self.entries) == value_at(cut - 1, &self.entries) {
                cut -= 1;
            }
        }
        if cut == 0 {
            // Widest channel has zero range, which means a single color; split by position
            cut = self.entries.len() / 2;
        }

        let high = self.entries.split_off(cut);
        (ColorBox::new(self.entries), ColorBox::new(high))
    }

    fn average(&self) -> Color {
        let total = self.pixel_count().max(1);
        let mut sums = [0u64; 3];
        for (color, count) in &self.entries {
            for c in 0..3 {
                sums[c] += color[c] as u64 * *count as u64;
            }
        }
        sums.map(|s| ((s + total / 2) / total) as u8)
    }
}
