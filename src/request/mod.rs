//! Request Builder
//!
//! Turns a resolved [`OptionSet`](crate::options::OptionSet) plus keys and
//! selectors into typed, fully encoded requests.
//!
//! ## Read requests
//! - `MultigetSlice`: several rows, name range per row
//! - `Column`: point lookup of one column
//! - `RangeSlices`: key range scan, name range per row
//! - `Count`: number of columns in a name range of one row
//! - `MultigetSuperSlice`: supercolumns of several rows
//! - `SubSlice`: named columns inside one supercolumn
//!
//! ## Writes
//! Inserts and deletes become [`Mutation`] entries collected by a
//! [`MutationBatch`](crate::batch::MutationBatch).

mod builder;

use serde::{Deserialize, Serialize};

use crate::model::ColumnNode;

pub use builder::RequestBuilder;

/// Name range over the columns of a row
///
/// Empty `start`/`finish` are unbounded. With `reversed` set the slice walks
/// from `start` down to `finish`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceRange {
    pub start: Vec<u8>,
    pub finish: Vec<u8>,
    pub reversed: bool,
    pub count: u32,
}

/// Supercolumn selection: explicit names or a name range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlicePredicate {
    Names(Vec<Vec<u8>>),
    Range(SliceRange),
}

/// A read request against one column family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadRequest {
    MultigetSlice {
        column_family: String,
        keys: Vec<Vec<u8>>,
        range: SliceRange,
    },
    Column {
        column_family: String,
        key: Vec<u8>,
        name: Vec<u8>,
    },
    RangeSlices {
        column_family: String,
        start_key: Vec<u8>,
        finish_key: Vec<u8>,
        range: SliceRange,
    },
    /// Expensive: the store walks every column in the range to count it.
    Count {
        column_family: String,
        key: Vec<u8>,
        range: SliceRange,
    },
    MultigetSuperSlice {
        column_family: String,
        keys: Vec<Vec<u8>>,
        predicate: SlicePredicate,
    },
    SubSlice {
        column_family: String,
        key: Vec<u8>,
        super_name: Vec<u8>,
        names: Vec<Vec<u8>>,
    },
}

impl ReadRequest {
    pub fn column_family(&self) -> &str {
        match self {
            ReadRequest::MultigetSlice { column_family, .. }
            | ReadRequest::Column { column_family, .. }
            | ReadRequest::RangeSlices { column_family, .. }
            | ReadRequest::Count { column_family, .. }
            | ReadRequest::MultigetSuperSlice { column_family, .. }
            | ReadRequest::SubSlice { column_family, .. } => column_family,
        }
    }
}

/// What a deletion removes from a row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deletion {
    /// The whole row
    Row,
    /// One top-level column (or a whole supercolumn by name)
    Column(Vec<u8>),
    /// Named columns inside one supercolumn
    SubColumns {
        super_name: Vec<u8>,
        names: Vec<Vec<u8>>,
    },
}

/// One pending write entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    Insert {
        column_family: String,
        key: Vec<u8>,
        node: ColumnNode,
    },
    Delete {
        column_family: String,
        key: Vec<u8>,
        deletion: Deletion,
        timestamp: i64,
    },
}

impl Mutation {
    pub fn column_family(&self) -> &str {
        match self {
            Mutation::Insert { column_family, .. } | Mutation::Delete { column_family, .. } => {
                column_family
            }
        }
    }

    pub fn key(&self) -> &[u8] {
        match self {
            Mutation::Insert { key, .. } | Mutation::Delete { key, .. } => key,
        }
    }
}
