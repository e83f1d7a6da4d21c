//! Typed extraction from a request's JSON parameter mapping.
//!
//! Missing optional keys fall back to the command's documented default;
//! present-but-wrong-typed values are failures, never silently coerced.

use serde_json::Value;

use crate::bridge::protocol::CommandParams;
use crate::bridge::registry::CommandFailure;

pub(super) fn require_str<'a>(
    params: &'a CommandParams,
    key: &str,
) -> Result<&'a str, CommandFailure> {
    match params.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(CommandFailure::new(format!(
            "Parameter '{key}' must be a string"
        ))),
        None => Err(CommandFailure::new(format!(
            "Missing required parameter '{key}'"
        ))),
    }
}

pub(super) fn opt_str<'a>(
    params: &'a CommandParams,
    key: &str,
) -> Result<Option<&'a str>, CommandFailure> {
    match params.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(CommandFailure::new(format!(
            "Parameter '{key}' must be a string"
        ))),
    }
}

pub(super) fn f64_or(
    params: &CommandParams,
    key: &str,
    default: f64,
) -> Result<f64, CommandFailure> {
    match params.get(key) {
        None => Ok(default),
        Some(value) => value.as_f64().ok_or_else(|| {
            CommandFailure::new(format!("Parameter '{key}' must be a number"))
        }),
    }
}

pub(super) fn opt_f64(params: &CommandParams, key: &str) -> Result<Option<f64>, CommandFailure> {
    match params.get(key) {
        None => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or_else(|| {
            CommandFailure::new(format!("Parameter '{key}' must be a number"))
        }),
    }
}

pub(super) fn require_f64(params: &CommandParams, key: &str) -> Result<f64, CommandFailure> {
    params
        .get(key)
        .ok_or_else(|| CommandFailure::new(format!("Missing required parameter '{key}'")))?
        .as_f64()
        .ok_or_else(|| CommandFailure::new(format!("Parameter '{key}' must be a number")))
}

pub(super) fn u64_or(
    params: &CommandParams,
    key: &str,
    default: u64,
) -> Result<u64, CommandFailure> {
    match params.get(key) {
        None => Ok(default),
        Some(value) => value.as_u64().ok_or_else(|| {
            CommandFailure::new(format!("Parameter '{key}' must be a positive integer"))
        }),
    }
}

pub(super) fn bool_or(
    params: &CommandParams,
    key: &str,
    default: bool,
) -> Result<bool, CommandFailure> {
    match params.get(key) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(CommandFailure::new(format!(
            "Parameter '{key}' must be a boolean"
        ))),
    }
}

fn numbers(key: &str, value: &Value, want: usize) -> Result<Vec<f64>, CommandFailure> {
    let items = value.as_array().ok_or_else(|| {
        CommandFailure::new(format!("Parameter '{key}' must be an array of {want} numbers"))
    })?;
    if items.len() != want {
        return Err(CommandFailure::new(format!(
            "Parameter '{key}' must have exactly {want} components"
        )));
    }
    items
        .iter()
        .map(|v| {
            v.as_f64().ok_or_else(|| {
                CommandFailure::new(format!("Parameter '{key}' must contain only numbers"))
            })
        })
        .collect()
}

pub(super) fn opt_vec3(
    params: &CommandParams,
    key: &str,
) -> Result<Option<[f64; 3]>, CommandFailure> {
    match params.get(key) {
        None => Ok(None),
        Some(value) => {
            let v = numbers(key, value, 3)?;
            Ok(Some([v[0], v[1], v[2]]))
        }
    }
}

pub(super) fn require_vec3(params: &CommandParams, key: &str) -> Result<[f64; 3], CommandFailure> {
    opt_vec3(params, key)?
        .ok_or_else(|| CommandFailure::new(format!("Missing required parameter '{key}'")))
}

/// RGB or RGBA; a missing alpha component defaults to opaque.
pub(super) fn rgba_or(
    params: &CommandParams,
    key: &str,
    default: [f64; 4],
) -> Result<[f64; 4], CommandFailure> {
    let Some(value) = params.get(key) else {
        return Ok(default);
    };
    let items = value.as_array().ok_or_else(|| {
        CommandFailure::new(format!("Parameter '{key}' must be an array of 3 or 4 numbers"))
    })?;
    if items.len() != 3 && items.len() != 4 {
        return Err(CommandFailure::new(format!(
            "Parameter '{key}' must have 3 or 4 components"
        )));
    }
    let mut out = [0.0, 0.0, 0.0, 1.0];
    for (i, item) in items.iter().enumerate() {
        out[i] = item.as_f64().ok_or_else(|| {
            CommandFailure::new(format!("Parameter '{key}' must contain only numbers"))
        })?;
    }
    Ok(out)
}
