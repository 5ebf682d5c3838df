//! Store Module
//!
//! Reference in-memory column store that transports execute against.
//!
//! ## Responsibilities
//! - Keyspace → column family → row → column tree, all byte-ordered
//! - Apply a mutation batch under one write lock (no partial visibility)
//! - Serve slice, range, count and supercolumn reads
//!
//! ## Semantics
//! - Keyspaces and column families appear on first write; there is no DDL
//! - Deleting columns never removes the row itself, only row deletion does
//! - Last write wins by timestamp; a deletion removes cells stamped at or
//!   before it

mod table;

pub use table::{ColumnFamily, ColumnStore};

/// A stored cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: Vec<u8>,
    pub timestamp: i64,
}

/// A stored column tree node
#[derive(Debug, Clone, PartialEq)]
pub enum StoredNode {
    Column(Cell),
    Super(std::collections::BTreeMap<Vec<u8>, Cell>),
}
