//! The effect pipeline: a left-to-right fold of effect requests over a buffer.
//!
//! ```text
//! buffer ─▶ E1 ─▶ E2 ─▶ … ─▶ En ─▶ result
//! ```
//!
//! Requests arrive loosely typed: an effect name plus a JSON map of parameter
//! overrides (the shape of the original request payload). Each request is
//! resolved against the closed [`EffectKind`] set, its parameters are merged
//! over that effect's defaults, and the output of effect *i* becomes the
//! input of effect *i + 1*.
//!
//! ## Unknown names
//!
//! An unrecognized name is skipped with a warning and recorded in
//! [`PipelineRun::skipped`]. One bad entry never voids the rest of the list.
//!
//! ## CLI form
//!
//! [`EffectRequest`] also parses from `name:key=value,key=value`, e.g.
//! `pixelate:pixel_size=8,palette_size=4,dither=false`.

use crate::effects::{Effect, EffectKind};
use crate::imaging::Buffer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;

/// A named effect plus its parameter overrides, as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectRequest {
    pub name: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl EffectRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Resolve into a concrete effect, or `None` when the name is not known.
    pub fn resolve(&self) -> Option<Effect> {
        EffectKind::from_name(&self.name).map(|kind| Effect::from_params(kind, &self.params))
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum RequestParseError {
    #[error("empty effect name in `{0}`")]
    EmptyName(String),
    #[error("parameter `{0}` is not of the form key=value")]
    MalformedParam(String),
}

impl FromStr for EffectRequest {
    type Err = RequestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, rest) = match s.split_once(':') {
            Some((name, rest)) => (name.trim(), Some(rest)),
            None => (s.trim(), None),
        };
        if name.is_empty() {
            return Err(RequestParseError::EmptyName(s.to_string()));
        }

        let mut request = EffectRequest::new(name);
        for pair in rest.into_iter().flat_map(|r| r.split(',')) {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair
                .split_once('=')
                .filter(|(k, _)| !k.trim().is_empty())
                .ok_or_else(|| RequestParseError::MalformedParam(pair.to_string()))?;
            request
                .params
                .insert(key.trim().to_string(), parse_cli_value(value.trim()));
        }
        Ok(request)
    }
}

fn parse_cli_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => serde_json::from_str::<serde_json::Number>(raw)
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}

/// Outcome of running a request list: the final buffer plus what happened.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub buffer: Buffer,
    /// Effects applied, in order.
    pub applied: Vec<EffectKind>,
    /// Request names that matched no effect, in order.
    pub skipped: Vec<String>,
}

/// Apply requests in order and return the final buffer.
///
/// The input is left untouched. Unknown names are skipped.
pub fn apply(buffer: &Buffer, requests: &[EffectRequest]) -> Buffer {
    run(buffer, requests).buffer
}

/// Apply already-resolved effects in order.
pub fn apply_effects(buffer: &Buffer, effects: &[Effect]) -> Buffer {
    let mut current = buffer.clone();
    for effect in effects {
        log::debug!("applying {}", effect.kind());
        current = effect.apply(&current);
    }
    current
}

/// Apply requests in order, reporting applied and skipped effects.
pub fn run(buffer: &Buffer, requests: &[EffectRequest]) -> PipelineRun {
    let mut effects = Vec::with_capacity(requests.len());
    let mut skipped = Vec::new();

    for request in requests {
        match request.resolve() {
            Some(effect) => effects.push(effect),
            None => {
                log::warn!("unknown effect `{}`, skipping", request.name);
                skipped.push(request.name.clone());
            }
        }
    }

    PipelineRun {
        buffer: apply_effects(buffer, &effects),
        applied: effects.iter().map(Effect::kind).collect(),
        skipped,
    }
}
