//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Apply
//!
//! ```text
//! 001 cat.png → processed_1718000000_cat.png (640x480)
//!     Source: photos/cat.png
//!     Effects: pixelate → crt_scanlines
//!     Skipped: foo
//! 002 broken.png
//!     Source: photos/broken.png
//!     Error: Failed to decode photos/broken.png: ...
//!
//! Processed 1 image, 1 failed
//! ```
//!
//! ## Effects
//!
//! ```text
//! pixelate       Blocky mosaic with a reduced, optionally dithered palette
//!     pixel_size         10       integer >= 1 (alias: size)
//!     palette_size       16       integer 1-256; 256 skips quantization
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::effects::EffectKind;
use crate::process::{BatchResult, ProcessEvent};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Apply output
// ============================================================================

/// Format a single progress event as display lines.
///
/// Events arrive in completion order, so each leads with its input position.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Processed { index, image, .. } => {
            let mut lines = vec![format!(
                "{} {} → {} ({}x{})",
                format_index(index + 1),
                display_name(&image.source),
                image.filename,
                image.width,
                image.height
            )];
            lines.push(format!("    Source: {}", image.source.display()));
            if let Some(staged) = &image.staged {
                lines.push(format!("    Staged: {}", staged.display()));
            }
            if image.applied.is_empty() {
                lines.push("    Effects: none".to_string());
            } else {
                lines.push(format!("    Effects: {}", image.applied.join(" → ")));
            }
            if !image.skipped.is_empty() {
                lines.push(format!("    Skipped: {}", image.skipped.join(", ")));
            }
            lines
        }
        ProcessEvent::Failed {
            index,
            source,
            error,
            ..
        } => vec![
            format!("{} {}", format_index(index + 1), display_name(source)),
            format!("    Source: {}", source.display()),
            format!("    Error: {}", error),
        ],
    }
}

/// Format the closing summary line of a batch.
pub fn format_summary(result: &BatchResult) -> Vec<String> {
    let mut line = format!("Processed {}", plural(result.processed.len(), "image"));
    if !result.failed.is_empty() {
        line.push_str(&format!(", {} failed", result.failed.len()));
    }
    vec![String::new(), line]
}

pub fn print_summary(result: &BatchResult) {
    for line in format_summary(result) {
        println!("{}", line);
    }
}

// ============================================================================
// Effects catalog
// ============================================================================

/// Format the list of effects with their parameters, defaults and ranges.
pub fn format_effect_catalog() -> Vec<String> {
    let mut lines = Vec::new();
    for (i, kind) in EffectKind::ALL.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format!("{:<14} {}", kind.name(), kind.summary()));
        for spec in kind.params() {
            lines.push(
                format!("    {:<18} {:<8} {}", spec.name, spec.default, spec.range)
                    .trim_end()
                    .to_string(),
            );
        }
    }
    lines
}

pub fn print_effect_catalog() {
    for line in format_effect_catalog() {
        println!("{}", line);
    }
}
