//! Option Resolver
//!
//! Merges per-call options over typed read or write defaults.
//!
//! ## Defaults
//! ```text
//! ┌──────────────┬──────────┬────────────────┐
//! │ Option       │ Write    │ Read           │
//! ├──────────────┼──────────┼────────────────┤
//! │ k_serializer │ infer    │ infer          │
//! │ n_serializer │ infer    │ bytes          │
//! │ v_serializer │ infer    │ bytes          │
//! │ s_serializer │ infer    │ bytes          │
//! │ count        │ i32::MAX │ i32::MAX       │
//! │ start/finish │ none     │ none           │
//! │ reversed     │ false    │ false          │
//! └──────────────┴──────────┴────────────────┘
//! ```
//!
//! Caller keys override defaults. Keys this module does not know are kept in
//! [`OptionSet::extra`] untouched; builders ignore them.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CodecError, ColError, OpContext, Result};
use crate::serializer::{self, Serializer, Value};

/// Column cap used when the caller gives none
pub const UNBOUNDED_COUNT: u32 = i32::MAX as u32;

pub const K_SERIALIZER: &str = "k_serializer";
pub const N_SERIALIZER: &str = "n_serializer";
pub const V_SERIALIZER: &str = "v_serializer";
pub const S_SERIALIZER: &str = "s_serializer";
pub const COUNT: &str = "count";
pub const START: &str = "start";
pub const FINISH: &str = "finish";
pub const REVERSED: &str = "reversed";

/// Which default table applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Read,
    Write,
}

/// A serializer given either by tag or already resolved
#[derive(Debug, Clone, PartialEq)]
pub enum SerializerArg {
    Tag(String),
    Resolved(Serializer),
}

impl From<&str> for SerializerArg {
    fn from(tag: &str) -> Self {
        SerializerArg::Tag(tag.to_string())
    }
}

impl From<String> for SerializerArg {
    fn from(tag: String) -> Self {
        SerializerArg::Tag(tag)
    }
}

impl From<Serializer> for SerializerArg {
    fn from(s: Serializer) -> Self {
        SerializerArg::Resolved(s)
    }
}

/// One caller-supplied option value
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Serializer(SerializerArg),
    Count(u32),
    Bound(Value),
    Flag(bool),
    Text(String),
}

/// Options supplied to a single call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    entries: BTreeMap<String, OptionValue>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set any option by name, including ones this crate does not know
    pub fn set(mut self, key: impl Into<String>, value: OptionValue) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    pub fn k_serializer(self, s: impl Into<SerializerArg>) -> Self {
        self.set(K_SERIALIZER, OptionValue::Serializer(s.into()))
    }

    pub fn n_serializer(self, s: impl Into<SerializerArg>) -> Self {
        self.set(N_SERIALIZER, OptionValue::Serializer(s.into()))
    }

    pub fn v_serializer(self, s: impl Into<SerializerArg>) -> Self {
        self.set(V_SERIALIZER, OptionValue::Serializer(s.into()))
    }

    pub fn s_serializer(self, s: impl Into<SerializerArg>) -> Self {
        self.set(S_SERIALIZER, OptionValue::Serializer(s.into()))
    }

    pub fn count(self, count: u32) -> Self {
        self.set(COUNT, OptionValue::Count(count))
    }

    pub fn start(self, bound: impl Into<Value>) -> Self {
        self.set(START, OptionValue::Bound(bound.into()))
    }

    pub fn finish(self, bound: impl Into<Value>) -> Self {
        self.set(FINISH, OptionValue::Bound(bound.into()))
    }

    pub fn reversed(self, reversed: bool) -> Self {
        self.set(REVERSED, OptionValue::Flag(reversed))
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A `start`/`finish` bound as the caller gave it
///
/// Text bounds are parsed by whichever serializer the range runs over, so
/// `"5"` can bound a `long` name range.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeBound {
    Value(Value),
    Text(String),
}

impl RangeBound {
    fn encode(&self, serializer: Serializer) -> std::result::Result<Vec<u8>, CodecError> {
        match self {
            RangeBound::Value(v) => serializer.encode(v),
            RangeBound::Text(t) => serializer.encode(&serializer.parse_text(t)?),
        }
    }
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeBound::Value(v) => write!(f, "{}", v),
            RangeBound::Text(t) => write!(f, "{:?}", t),
        }
    }
}

impl<T: Into<Value>> From<T> for RangeBound {
    fn from(v: T) -> Self {
        RangeBound::Value(v.into())
    }
}

/// Fully resolved options for one call
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSet {
    pub k_serializer: Serializer,
    pub n_serializer: Serializer,
    pub v_serializer: Serializer,
    pub s_serializer: Serializer,
    pub count: u32,
    pub start: Option<RangeBound>,
    pub finish: Option<RangeBound>,
    pub reversed: bool,
    /// Unknown keys, passed through for forward compatibility
    pub extra: BTreeMap<String, OptionValue>,
}

impl OptionSet {
    /// Default table for a mode
    pub fn defaults(mode: Mode) -> Self {
        let (names, values, supers) = match mode {
            Mode::Write => (Serializer::Infer, Serializer::Infer, Serializer::Infer),
            Mode::Read => (Serializer::Bytes, Serializer::Bytes, Serializer::Bytes),
        };
        Self {
            k_serializer: Serializer::Infer,
            n_serializer: names,
            v_serializer: values,
            s_serializer: supers,
            count: UNBOUNDED_COUNT,
            start: None,
            finish: None,
            reversed: false,
            extra: BTreeMap::new(),
        }
    }

    /// Merge call options over the defaults for `mode`
    ///
    /// Fails with `UnknownSerializer` on a bad tag and `InvalidRange` when a
    /// range bound is not a value. Bounds are encoded later, by the request
    /// builder, with the serializer of whatever the range runs over.
    pub fn resolve(call: &CallOptions, mode: Mode, ctx: OpContext<'_>) -> Result<Self> {
        let mut set = Self::defaults(mode);

        for (key, value) in &call.entries {
            match key.as_str() {
                K_SERIALIZER => set.k_serializer = serializer_option(key, value)?,
                N_SERIALIZER => set.n_serializer = serializer_option(key, value)?,
                V_SERIALIZER => set.v_serializer = serializer_option(key, value)?,
                S_SERIALIZER => set.s_serializer = serializer_option(key, value)?,
                COUNT => {
                    set.count = match value {
                        OptionValue::Count(c) => *c,
                        OptionValue::Text(t) => t.parse().map_err(|_| {
                            ColError::Config(format!("{}: {:?} is not a column count", key, t))
                        })?,
                        other => return Err(type_error(key, "a count", other)),
                    }
                }
                START | FINISH => {
                    let bound = match value {
                        OptionValue::Bound(v) => RangeBound::Value(v.clone()),
                        OptionValue::Text(t) => RangeBound::Text(t.clone()),
                        other => {
                            return Err(ctx.invalid_range(format!(
                                "{} must be a value, got {:?}",
                                key, other
                            )))
                        }
                    };
                    if key == START {
                        set.start = Some(bound);
                    } else {
                        set.finish = Some(bound);
                    }
                }
                REVERSED => {
                    set.reversed = match value {
                        OptionValue::Flag(b) => *b,
                        OptionValue::Text(t) => t.parse().map_err(|_| {
                            ColError::Config(format!("{}: {:?} is not a boolean", key, t))
                        })?,
                        other => return Err(type_error(key, "a flag", other)),
                    }
                }
                _ => {
                    set.extra.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(set)
    }

    /// Replace an `infer` key serializer with the codec `sample` infers to
    ///
    /// Reads must decode row keys, and `infer` cannot decode, so read calls
    /// pin the key codec from the first key they were given.
    pub fn pin_key_serializer(&mut self, sample: &Value) {
        self.k_serializer = self.k_serializer.concrete_for(sample);
    }

    /// Encode `start`/`finish` with `names`
    ///
    /// `names` is the serializer of the range: column names for slices,
    /// supercolumn names for super slices. An absent bound encodes to the
    /// empty slice, which the store reads as unbounded.
    pub fn encoded_bounds(&self, names: Serializer, ctx: OpContext<'_>) -> Result<(Vec<u8>, Vec<u8>)> {
        let encode = |which: &str, bound: &Option<RangeBound>| -> Result<Vec<u8>> {
            match bound {
                None => Ok(Vec::new()),
                Some(b) => b.encode(names).map_err(|e| {
                    ctx.invalid_range(format!("{} bound {}: {}", which, b, e))
                }),
            }
        };
        Ok((encode(START, &self.start)?, encode(FINISH, &self.finish)?))
    }
}

fn serializer_option(key: &str, value: &OptionValue) -> Result<Serializer> {
    match value {
        OptionValue::Serializer(SerializerArg::Resolved(s)) => Ok(*s),
        OptionValue::Serializer(SerializerArg::Tag(tag)) | OptionValue::Text(tag) => {
            serializer::resolve(tag)
        }
        other => Err(type_error(key, "a serializer", other)),
    }
}

fn type_error(key: &str, expected: &str, found: &OptionValue) -> ColError {
    ColError::Config(format!("option {} must be {}, got {:?}", key, expected, found))
}
