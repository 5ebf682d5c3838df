//! Column-family data model
//!
//! Two views of the same tree:
//! - the host view ([`Field`], [`Rows`], [`SuperRows`]) holds tagged [`Value`]s
//! - the raw view ([`RawColumn`], [`ColumnNode`], [`RawRow`]) holds encoded
//!   bytes and is what travels through a transport

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::serializer::Value;

// =============================================================================
// Host view
// =============================================================================

/// Column name → decoded value
pub type Columns = BTreeMap<Value, Value>;

/// Row key → columns
pub type Rows = BTreeMap<Value, Columns>;

/// Row key → supercolumns in store order
pub type SuperRows = BTreeMap<Value, Vec<SuperColumn>>;

/// A decoded supercolumn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperColumn {
    pub name: Value,
    pub columns: Columns,
}

/// One field of a row to insert
///
/// A `Super` field becomes a supercolumn whose inner columns are the map.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Leaf(Value),
    Super(BTreeMap<Value, Value>),
}

impl<T: Into<Value>> From<T> for Field {
    fn from(v: T) -> Self {
        Field::Leaf(v.into())
    }
}

/// Top-level fields of a row to insert
pub type Fields = BTreeMap<Value, Field>;

/// Build a `Fields` map from `(name, field)` pairs
pub fn fields<N, F, I>(pairs: I) -> Fields
where
    N: Into<Value>,
    F: Into<Field>,
    I: IntoIterator<Item = (N, F)>,
{
    pairs
        .into_iter()
        .map(|(n, f)| (n.into(), f.into()))
        .collect()
}

/// Build a supercolumn field from `(name, value)` pairs
pub fn super_field<N, V, I>(pairs: I) -> Field
where
    N: Into<Value>,
    V: Into<Value>,
    I: IntoIterator<Item = (N, V)>,
{
    Field::Super(
        pairs
            .into_iter()
            .map(|(n, v)| (n.into(), v.into()))
            .collect(),
    )
}

// =============================================================================
// Raw view
// =============================================================================

/// An encoded column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawColumn {
    pub name: Vec<u8>,
    pub value: Vec<u8>,
    /// Microseconds since the unix epoch
    pub timestamp: i64,
}

/// An encoded column tree node: a leaf column or a supercolumn of leaves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnNode {
    Leaf(RawColumn),
    Super { name: Vec<u8>, columns: Vec<RawColumn> },
}

impl ColumnNode {
    pub fn name(&self) -> &[u8] {
        match self {
            ColumnNode::Leaf(c) => &c.name,
            ColumnNode::Super { name, .. } => name,
        }
    }
}

/// An encoded row as returned by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub key: Vec<u8>,
    pub nodes: Vec<ColumnNode>,
}

/// Row key → supercolumn name → inner column names to delete
pub type SubColumnTargets = BTreeMap<Value, BTreeMap<Value, Vec<Value>>>;
