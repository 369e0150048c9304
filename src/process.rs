//! File-level processing: decode, run the effect pipeline, encode.
//!
//! This is the shell around the pure [`pipeline`](crate::pipeline). It owns
//! everything the pipeline does not: input acceptance rules, decoding,
//! naming, staging and writing results.
//!
//! ## Flow per input
//!
//! ```text
//! input file ─▶ extension + size check ─▶ decode ─▶ Buffer
//!            ─▶ pipeline::run ─▶ encode ─▶ processed_<ts>_<name>
//! ```
//!
//! ## Output Structure
//!
//! ```text
//! static/
//! ├── uploads/
//! │   └── 1718000000_cat.png             # only with --stage
//! └── processed/
//!     └── processed_1718000000_cat.png   # same extension as the input
//! ```
//!
//! ## Parallel Processing
//!
//! Batches are processed in parallel using [rayon](https://docs.rs/rayon).
//! Every input gets its own buffer; nothing is shared between workers except
//! the read-only request list. A failing input does not stop the others.

use crate::config::AppConfig;
use crate::imaging::Buffer;
use crate::naming;
use crate::pipeline::{self, EffectRequest};
use image::ImageReader;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Invalid file type: {0}")]
    UnsupportedExtension(PathBuf),
    #[error("No usable filename in {0}")]
    InvalidName(PathBuf),
    #[error("{path} is {size} bytes, limit is {limit}")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Everything a run needs besides the inputs and the effect list.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub processed_dir: PathBuf,
    pub upload_dir: PathBuf,
    /// Copy each input into `upload_dir` before processing.
    pub stage: bool,
    pub allowed_extensions: Vec<String>,
    pub max_input_bytes: u64,
    /// Prefix for every name written in this run.
    pub timestamp: u64,
}

impl ProcessOptions {
    /// Build options from config values, stamped with the current time.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            processed_dir: config.paths.processed_dir.clone(),
            upload_dir: config.paths.upload_dir.clone(),
            stage: false,
            allowed_extensions: config.input.allowed_extensions.clone(),
            max_input_bytes: config.input.max_input_bytes,
            timestamp: naming::unix_timestamp(),
        }
    }
}

/// Record of one processed input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedImage {
    pub source: PathBuf,
    pub output: PathBuf,
    pub filename: String,
    /// Server-style path of the result, e.g. `/static/processed/processed_…png`.
    pub processed_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staged: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub applied: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

/// Progress events sent while a batch runs.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Processed {
        index: usize,
        total: usize,
        image: ProcessedImage,
    },
    Failed {
        index: usize,
        total: usize,
        source: PathBuf,
        error: String,
    },
}

/// Result of a batch: successes and failures, each in input order.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub processed: Vec<ProcessedImage>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Effect list file: either the original request body or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeFile {
    Request { effects: Vec<EffectRequest> },
    List(Vec<EffectRequest>),
}

/// Load an effect list from a JSON file.
///
/// Accepts `{"effects": [...]}` (other keys such as `filename` are ignored)
/// or a bare `[...]`.
pub fn load_recipe(path: &Path) -> Result<Vec<EffectRequest>, ProcessError> {
    let content = std::fs::read_to_string(path)?;
    parse_recipe(&content)
}

pub fn parse_recipe(json: &str) -> Result<Vec<EffectRequest>, ProcessError> {
    Ok(match serde_json::from_str::<RecipeFile>(json)? {
        RecipeFile::Request { effects } => effects,
        RecipeFile::List(effects) => effects,
    })
}

/// Expand inputs: directories are walked for files with an allowed
/// extension, sorted per directory. Anything else is kept as given, so a
/// missing path fails on its own when processed.
pub fn collect_inputs(inputs: &[PathBuf], allowed_extensions: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = walkdir::WalkDir::new(input)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| naming::is_allowed(n, allowed_extensions))
                })
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Check acceptance rules and decode a file into a buffer.
pub fn load_buffer(path: &Path, options: &ProcessOptions) -> Result<Buffer, ProcessError> {
    if !path.exists() {
        return Err(ProcessError::SourceNotFound(path.to_path_buf()));
    }
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if !naming::is_allowed(name, &options.allowed_extensions) {
        return Err(ProcessError::UnsupportedExtension(path.to_path_buf()));
    }
    let size = std::fs::metadata(path)?.len();
    if size > options.max_input_bytes {
        return Err(ProcessError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: options.max_input_bytes,
        });
    }

    let image = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|source| ProcessError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Buffer::from(image))
}

/// Encode a buffer to `path`, choosing the format from the extension.
pub fn save_buffer(buffer: &Buffer, path: &Path) -> Result<(), ProcessError> {
    buffer
        .as_rgb_image()
        .save(path)
        .map_err(|source| ProcessError::Encode {
            path: path.to_path_buf(),
            source,
        })
}

/// Process one file, writing the result under `filename` in the processed folder.
fn process_one(
    source: &Path,
    filename: &str,
    requests: &[EffectRequest],
    options: &ProcessOptions,
) -> Result<ProcessedImage, ProcessError> {
    let buffer = load_buffer(source, options)?;

    let staged = if options.stage {
        std::fs::create_dir_all(&options.upload_dir)?;
        let sanitized = sanitized_name(source)?;
        let staged = options
            .upload_dir
            .join(naming::upload_name(options.timestamp, &sanitized));
        std::fs::copy(source, &staged)?;
        Some(staged)
    } else {
        None
    };

    let run = pipeline::run(&buffer, requests);

    std::fs::create_dir_all(&options.processed_dir)?;
    let output = options.processed_dir.join(filename);
    save_buffer(&run.buffer, &output)?;
    log::info!("wrote {}", output.display());

    Ok(ProcessedImage {
        source: source.to_path_buf(),
        processed_url: processed_url(&options.processed_dir, filename),
        output,
        filename: filename.to_string(),
        staged,
        width: run.buffer.width(),
        height: run.buffer.height(),
        applied: run.applied.iter().map(|k| k.name().to_string()).collect(),
        skipped: run.skipped,
    })
}

/// Process a single file.
pub fn process_file(
    source: &Path,
    requests: &[EffectRequest],
    options: &ProcessOptions,
) -> Result<ProcessedImage, ProcessError> {
    let filename = naming::processed_name(options.timestamp, &sanitized_name(source)?);
    process_one(source, &filename, requests, options)
}

/// Process many files in parallel, reporting progress over `progress`.
pub fn process_batch(
    inputs: &[PathBuf],
    requests: &[EffectRequest],
    options: &ProcessOptions,
    progress: Option<Sender<ProcessEvent>>,
) -> BatchResult {
    let total = inputs.len();
    let planned = plan_output_names(inputs, options.timestamp);

    let outcomes: Vec<Result<ProcessedImage, (PathBuf, String)>> = inputs
        .par_iter()
        .zip(planned.par_iter())
        .enumerate()
        .map(|(index, (source, filename))| {
            let outcome = match filename {
                Some(filename) => process_one(source, filename, requests, options),
                None => Err(ProcessError::InvalidName(source.clone())),
            };
            let event = match &outcome {
                Ok(image) => ProcessEvent::Processed {
                    index,
                    total,
                    image: image.clone(),
                },
                Err(e) => {
                    log::warn!("{}: {}", source.display(), e);
                    ProcessEvent::Failed {
                        index,
                        total,
                        source: source.clone(),
                        error: e.to_string(),
                    }
                }
            };
            if let Some(tx) = progress.as_ref() {
                tx.send(event).ok();
            }
            outcome.map_err(|e| (source.clone(), e.to_string()))
        })
        .collect();

    let mut result = BatchResult::default();
    for outcome in outcomes {
        match outcome {
            Ok(image) => result.processed.push(image),
            Err(failure) => result.failed.push(failure),
        }
    }
    result
}

/// Assign each input its processed filename up front, so workers never race
/// on the same name. Repeated names get a `-N` suffix before the extension.
fn plan_output_names(inputs: &[PathBuf], timestamp: u64) -> Vec<Option<String>> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let sanitized = sanitized_name(input).ok()?;
            let base = naming::processed_name(timestamp, &sanitized);
            let mut candidate = base.clone();
            let mut n = 1;
            while !taken.insert(candidate.clone()) {
                candidate = with_suffix(&base, n);
                n += 1;
            }
            Some(candidate)
        })
        .collect()
}

fn with_suffix(name: &str, n: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}-{n}.{ext}"),
        None => format!("{name}-{n}"),
    }
}

fn sanitized_name(path: &Path) -> Result<String, ProcessError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(naming::sanitize_filename)
        .ok_or_else(|| ProcessError::InvalidName(path.to_path_buf()))
}

fn processed_url(processed_dir: &Path, filename: &str) -> String {
    let dir = processed_dir
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    if dir.is_empty() {
        format!("/{filename}")
    } else {
        format!("/{dir}/{filename}")
    }
}
