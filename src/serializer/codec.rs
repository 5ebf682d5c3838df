//! Serializer codecs
//!
//! Encoding and decoding for every concrete tag, plus write-time inference.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use super::{registry, Value};

/// A resolved serializer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Serializer {
    Bytes,
    String,
    Ascii,
    Integer,
    Long,
    Boolean,
    Double,
    /// Picks a codec from the value's runtime type. Write-only.
    Infer,
}

impl Serializer {
    /// The symbolic tag this serializer resolves from
    pub fn tag(&self) -> &'static str {
        match self {
            Serializer::Bytes => "bytes",
            Serializer::String => "string",
            Serializer::Ascii => "ascii",
            Serializer::Integer => "integer",
            Serializer::Long => "long",
            Serializer::Boolean => "boolean",
            Serializer::Double => "double",
            Serializer::Infer => "infer",
        }
    }

    pub fn is_infer(&self) -> bool {
        matches!(self, Serializer::Infer)
    }

    /// The concrete codec that would encode `value`
    ///
    /// For `Infer` this consults the inference table; concrete serializers
    /// return themselves.
    pub fn concrete_for(&self, value: &Value) -> Serializer {
        match self {
            Serializer::Infer => registry::infer(value),
            other => *other,
        }
    }

    /// Encode a value to its stored bytes
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let mismatch = || CodecError::TypeMismatch {
            tag: self.tag(),
            found: value.type_name(),
        };

        match (self, value) {
            (Serializer::Infer, v) => registry::infer(v).encode(v),
            (Serializer::Bytes, Value::Bytes(b)) => Ok(b.clone()),
            (Serializer::String, Value::String(s)) => Ok(s.as_bytes().to_vec()),
            (Serializer::Ascii, Value::String(s)) => {
                if !s.is_ascii() {
                    return Err(CodecError::Invalid {
                        tag: self.tag(),
                        reason: format!("non-ASCII text {:?}", s),
                    });
                }
                Ok(s.as_bytes().to_vec())
            }
            (Serializer::Integer, Value::Integer(v)) => Ok(v.to_be_bytes().to_vec()),
            (Serializer::Long, Value::Long(v)) => Ok(v.to_be_bytes().to_vec()),
            (Serializer::Boolean, Value::Boolean(v)) => Ok(vec![u8::from(*v)]),
            (Serializer::Double, Value::Double(v)) => Ok(v.to_be_bytes().to_vec()),
            _ => Err(mismatch()),
        }
    }

    /// Decode stored bytes into a value
    pub fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        match self {
            Serializer::Infer => Err(CodecError::InferOnRead),
            Serializer::Bytes => Ok(Value::Bytes(bytes.to_vec())),
            Serializer::String => std::str::from_utf8(bytes)
                .map(|s| Value::String(s.to_string()))
                .map_err(|e| CodecError::Invalid {
                    tag: self.tag(),
                    reason: e.to_string(),
                }),
            Serializer::Ascii => {
                if !bytes.is_ascii() {
                    return Err(CodecError::Invalid {
                        tag: self.tag(),
                        reason: "byte outside 7-bit range".to_string(),
                    });
                }
                // ASCII is always valid UTF-8
                Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
            }
            Serializer::Integer => {
                let raw: [u8; 4] = self.fixed(bytes)?;
                Ok(Value::Integer(i32::from_be_bytes(raw)))
            }
            Serializer::Long => {
                let raw: [u8; 8] = self.fixed(bytes)?;
                Ok(Value::Long(i64::from_be_bytes(raw)))
            }
            Serializer::Boolean => {
                let [b]: [u8; 1] = self.fixed(bytes)?;
                match b {
                    0 => Ok(Value::Boolean(false)),
                    1 => Ok(Value::Boolean(true)),
                    other => Err(CodecError::Invalid {
                        tag: self.tag(),
                        reason: format!("byte 0x{:02x} is not a boolean", other),
                    }),
                }
            }
            Serializer::Double => {
                let raw: [u8; 8] = self.fixed(bytes)?;
                Ok(Value::Double(f64::from_be_bytes(raw)))
            }
        }
    }

    /// Read a value this serializer accepts from its text form
    ///
    /// Text serializers (and `infer`) take the text as is; `bytes` takes its
    /// UTF-8 bytes; numeric and boolean serializers parse it.
    pub fn parse_text(&self, text: &str) -> Result<Value, CodecError> {
        let invalid = |what: &str| CodecError::Invalid {
            tag: self.tag(),
            reason: format!("{:?} is not {}", text, what),
        };
        let value = match self {
            Serializer::Bytes => Value::Bytes(text.as_bytes().to_vec()),
            Serializer::String | Serializer::Ascii | Serializer::Infer => Value::String(text.to_string()),
            Serializer::Integer => Value::Integer(text.trim().parse().map_err(|_| invalid("an integer"))?),
            Serializer::Long => Value::Long(text.trim().parse().map_err(|_| invalid("a long"))?),
            Serializer::Boolean => Value::Boolean(text.trim().parse().map_err(|_| invalid("a boolean"))?),
            Serializer::Double => Value::Double(text.trim().parse().map_err(|_| invalid("a double"))?),
        };
        Ok(value)
    }

    fn fixed<const N: usize>(&self, bytes: &[u8]) -> Result<[u8; N], CodecError> {
        bytes.try_into().map_err(|_| CodecError::Width {
            tag: self.tag(),
            expected: N,
            actual: bytes.len(),
        })
    }
}
