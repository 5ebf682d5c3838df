//! Tag resolution and the inference table

use std::str::FromStr;

use crate::error::{ColError, Result};
use super::{Serializer, Value};

/// Inference precedence: runtime type name → codec.
///
/// Evaluated top to bottom; every [`Value`] variant has exactly one entry.
pub const INFERENCE_TABLE: [(&str, Serializer); 6] = [
    ("bytes", Serializer::Bytes),
    ("string", Serializer::String),
    ("integer", Serializer::Integer),
    ("long", Serializer::Long),
    ("boolean", Serializer::Boolean),
    ("double", Serializer::Double),
];

/// Resolve a symbolic tag to a serializer
///
/// Tags are case-insensitive and may carry a leading `:`.
pub fn resolve(tag: &str) -> Result<Serializer> {
    let normalized = tag.trim().trim_start_matches(':').to_ascii_lowercase();
    let serializer = match normalized.as_str() {
        "bytes" | "bytes_array" => Serializer::Bytes,
        "string" | "utf8" => Serializer::String,
        "ascii" => Serializer::Ascii,
        "integer" | "int" => Serializer::Integer,
        "long" => Serializer::Long,
        "boolean" | "bool" => Serializer::Boolean,
        "double" => Serializer::Double,
        "infer" => Serializer::Infer,
        _ => return Err(ColError::UnknownSerializer(tag.to_string())),
    };
    Ok(serializer)
}

/// Pick the concrete codec for a value by its runtime type
pub fn infer(value: &Value) -> Serializer {
    let type_name = value.type_name();
    INFERENCE_TABLE
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, serializer)| *serializer)
        .unwrap_or(Serializer::Bytes)
}

impl FromStr for Serializer {
    type Err = ColError;

    fn from_str(s: &str) -> Result<Self> {
        resolve(s)
    }
}
