//! Response Decoder
//!
//! Normalizes raw store responses into host maps using the read-side
//! options. Decoding is total: one undecodable key, name or value fails the
//! whole call.
//!
//! Rows the store did not return are simply absent from the result. A row
//! that exists but has no live columns decodes to an empty map.

mod decoder;

use serde::{Deserialize, Serialize};

use crate::model::{RawColumn, RawRow};

pub use decoder::ResponseDecoder;

/// Raw result of a read request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawResponse {
    /// Multiget, range and super slices
    Rows(Vec<RawRow>),
    /// Point lookup; `None` when the column does not exist
    Column(Option<RawColumn>),
    /// Columns inside one supercolumn
    Columns(Vec<RawColumn>),
    Count(u32),
}

impl RawResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            RawResponse::Rows(_) => "rows",
            RawResponse::Column(_) => "column",
            RawResponse::Columns(_) => "columns",
            RawResponse::Count(_) => "count",
        }
    }
}
