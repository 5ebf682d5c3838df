//! # ColKV
//!
//! A synchronous client for a Cassandra-like column store:
//! - Serializer registry with write-time type inference
//! - Per-call option resolution over typed read/write defaults
//! - Typed slice, range, count and supercolumn requests
//! - Total decoding of column and supercolumn trees
//! - Single-use mutation batches committed as one unit
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Client                              │
//! │       put_row / get_rows / get_range / count_columns ...    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────┐
//!          ▼            ▼                 ▼
//!   ┌─────────────┐ ┌──────────────┐ ┌─────────────┐
//!   │   Options   │ │   Request    │ │  Response   │
//!   │  Resolver   │ │   Builder    │ │   Decoder   │
//!   └──────┬──────┘ └──────┬───────┘ └──────▲──────┘
//!          │               │                │
//!          ▼               ▼                │
//!   ┌─────────────┐ ┌──────────────┐        │
//!   │ Serializer  │ │ MutationBatch│        │
//!   │  Registry   │ └──────┬───────┘        │
//!   └─────────────┘        ▼                │
//! ┌─────────────────────────────────────────┴───────────────────┐
//! │                Transport (memory / TCP)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       ▼
//!               ┌──────────────┐
//!               │ ColumnStore  │
//!               └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod serializer;
pub mod options;
pub mod model;
pub mod request;
pub mod response;
pub mod batch;
pub mod client;

pub mod transport;
pub mod store;
pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use batch::MutationBatch;
pub use client::Client;
pub use config::{ClientConfig, ServerConfig};
pub use error::{ColError, Result};
pub use model::{fields, super_field, Columns, Field, Fields, Rows, SubColumnTargets, SuperColumn, SuperRows};
pub use options::CallOptions;
pub use serializer::{Serializer, Value};
pub use transport::{MemoryTransport, TcpTransport, Transport};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ColKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
