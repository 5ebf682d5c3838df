//! Serializer Registry
//!
//! Maps symbolic tags (`bytes`, `string`, `long`, `infer`, ...) to codecs that
//! turn tagged host [`Value`]s into stored bytes and back.
//!
//! ## Codecs
//! ```text
//! ┌──────────┬────────────────────┬────────────────────────────┐
//! │ Tag      │ Host value         │ Stored bytes               │
//! ├──────────┼────────────────────┼────────────────────────────┤
//! │ bytes    │ Value::Bytes       │ as-is                      │
//! │ string   │ Value::String      │ UTF-8                      │
//! │ ascii    │ Value::String      │ 7-bit ASCII                │
//! │ integer  │ Value::Integer     │ 4 bytes, big-endian        │
//! │ long     │ Value::Long        │ 8 bytes, big-endian        │
//! │ boolean  │ Value::Boolean     │ 1 byte (0x00 / 0x01)       │
//! │ double   │ Value::Double      │ 8 bytes, IEEE-754 BE       │
//! │ infer    │ any (write only)   │ picked from the value type │
//! └──────────┴────────────────────┴────────────────────────────┘
//! ```
//!
//! ## Inference
//! `infer` is a closed dispatch on the [`Value`] variant, evaluated once per
//! encode. It is write-only: the bytes it produces carry no type tag, so a
//! read must always name a concrete codec.
//!
//! `Integer` and `Long` are distinct host types. `Value::Integer(1)` infers
//! to the 4-byte codec and `Value::Long(1)` to the 8-byte one; reading either
//! back with the other width fails with a decode error rather than guessing.

mod codec;
mod registry;
mod value;

pub use codec::Serializer;
pub use registry::{infer, resolve, INFERENCE_TABLE};
pub use value::Value;
