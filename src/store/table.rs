//! Column store implementation
//!
//! BTreeMap-based tables behind one RwLock.

use std::collections::BTreeMap;
use std::ops::Bound;

use parking_lot::RwLock;

use crate::model::{ColumnNode, RawColumn, RawRow};
use crate::request::{Deletion, Mutation, ReadRequest, SlicePredicate, SliceRange};
use crate::response::RawResponse;

use super::{Cell, StoredNode};

type Row = BTreeMap<Vec<u8>, StoredNode>;

/// One column family: row key → column tree
#[derive(Debug, Default)]
pub struct ColumnFamily {
    rows: BTreeMap<Vec<u8>, Row>,
}

impl ColumnFamily {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn apply(&mut self, key: &[u8], mutation: &Mutation) {
        match mutation {
            Mutation::Insert { node, .. } => {
                let row = self.rows.entry(key.to_vec()).or_default();
                insert_node(row, node);
            }
            Mutation::Delete {
                deletion, timestamp, ..
            } => self.delete(key, deletion, *timestamp),
        }
    }

    fn delete(&mut self, key: &[u8], deletion: &Deletion, timestamp: i64) {
        match deletion {
            Deletion::Row => {
                if let Some(row) = self.rows.get_mut(key) {
                    row.retain(|_, node| retain_newer(node, timestamp));
                    if row.is_empty() {
                        self.rows.remove(key);
                    }
                }
            }
            Deletion::Column(name) => {
                if let Some(row) = self.rows.get_mut(key) {
                    if let Some(node) = row.get_mut(name) {
                        if !retain_newer(node, timestamp) {
                            row.remove(name);
                        }
                    }
                }
            }
            Deletion::SubColumns { super_name, names } => {
                let Some(row) = self.rows.get_mut(key) else {
                    return;
                };
                if let Some(StoredNode::Super(cells)) = row.get_mut(super_name) {
                    for name in names {
                        if cells.get(name).is_some_and(|c| c.timestamp <= timestamp) {
                            cells.remove(name);
                        }
                    }
                    if cells.is_empty() {
                        row.remove(super_name);
                    }
                }
            }
        }
    }

    fn read(&self, request: &ReadRequest) -> RawResponse {
        match request {
            ReadRequest::MultigetSlice { keys, range, .. } => RawResponse::Rows(
                keys.iter()
                    .filter_map(|key| {
                        self.rows.get(key).map(|row| RawRow {
                            key: key.clone(),
                            nodes: slice(row, range).map(|(n, node)| to_raw(n, node)).collect(),
                        })
                    })
                    .collect(),
            ),
            ReadRequest::Column { key, name, .. } => {
                let column = match self.rows.get(key).and_then(|row| row.get(name)) {
                    Some(StoredNode::Column(cell)) => Some(raw_column(name, cell)),
                    _ => None,
                };
                RawResponse::Column(column)
            }
            ReadRequest::RangeSlices {
                start_key,
                finish_key,
                range,
                ..
            } => RawResponse::Rows(
                bounded(&self.rows, start_key, finish_key, false)
                    .map(|(key, row)| RawRow {
                        key: key.clone(),
                        nodes: slice(row, range).map(|(n, node)| to_raw(n, node)).collect(),
                    })
                    .collect(),
            ),
            ReadRequest::Count { key, range, .. } => {
                let count = self.rows.get(key).map(|row| slice(row, range).count()).unwrap_or(0);
                RawResponse::Count(count as u32)
            }
            ReadRequest::MultigetSuperSlice { keys, predicate, .. } => RawResponse::Rows(
                keys.iter()
                    .filter_map(|key| {
                        let row = self.rows.get(key)?;
                        let nodes = match predicate {
                            SlicePredicate::Names(names) => names
                                .iter()
                                .filter_map(|n| row.get_key_value(n))
                                .filter(|(_, node)| matches!(node, StoredNode::Super(_)))
                                .map(|(n, node)| to_raw(n, node))
                                .collect(),
                            SlicePredicate::Range(range) => slice(row, range)
                                .filter(|(_, node)| matches!(node, StoredNode::Super(_)))
                                .map(|(n, node)| to_raw(n, node))
                                .collect(),
                        };
                        Some(RawRow {
                            key: key.clone(),
                            nodes,
                        })
                    })
                    .collect(),
            ),
            ReadRequest::SubSlice {
                key,
                super_name,
                names,
                ..
            } => {
                let columns = match self.rows.get(key).and_then(|row| row.get(super_name)) {
                    Some(StoredNode::Super(cells)) => names
                        .iter()
                        .filter_map(|n| cells.get_key_value(n))
                        .map(|(n, cell)| raw_column(n, cell))
                        .collect(),
                    _ => Vec::new(),
                };
                RawResponse::Columns(columns)
            }
        }
    }
}

/// In-memory column store
///
/// ## Concurrency
/// - Reads take the read lock; many can run at once
/// - A whole mutation batch is applied under one write lock
#[derive(Debug, Default)]
pub struct ColumnStore {
    keyspaces: RwLock<BTreeMap<String, BTreeMap<String, ColumnFamily>>>,
}

impl ColumnStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every mutation atomically with respect to readers
    pub fn apply(&self, keyspace: &str, mutations: &[Mutation]) {
        let mut keyspaces = self.keyspaces.write();
        let families = keyspaces.entry(keyspace.to_string()).or_default();
        for mutation in mutations {
            families
                .entry(mutation.column_family().to_string())
                .or_default()
                .apply(mutation.key(), mutation);
        }
    }

    /// Serve a read; an unknown keyspace or column family reads as empty
    pub fn read(&self, keyspace: &str, request: &ReadRequest) -> RawResponse {
        let keyspaces = self.keyspaces.read();
        match keyspaces
            .get(keyspace)
            .and_then(|families| families.get(request.column_family()))
        {
            Some(family) => family.read(request),
            None => ColumnFamily::default().read(request),
        }
    }

    /// Number of rows in a column family (0 if it does not exist)
    pub fn row_count(&self, keyspace: &str, column_family: &str) -> usize {
        self.keyspaces
            .read()
            .get(keyspace)
            .and_then(|families| families.get(column_family))
            .map(ColumnFamily::row_count)
            .unwrap_or(0)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn insert_node(row: &mut Row, node: &ColumnNode) {
    match node {
        ColumnNode::Leaf(column) => {
            let newer = match row.get(&column.name) {
                Some(StoredNode::Column(existing)) => existing.timestamp <= column.timestamp,
                _ => true,
            };
            if newer {
                row.insert(column.name.clone(), StoredNode::Column(cell(column)));
            }
        }
        ColumnNode::Super { name, columns } => {
            let entry = row
                .entry(name.clone())
                .or_insert_with(|| StoredNode::Super(BTreeMap::new()));
            if !matches!(entry, StoredNode::Super(_)) {
                *entry = StoredNode::Super(BTreeMap::new());
            }
            if let StoredNode::Super(cells) = entry {
                for column in columns {
                    if cells.get(&column.name).map_or(true, |c| c.timestamp <= column.timestamp) {
                        cells.insert(column.name.clone(), cell(column));
                    }
                }
            }
        }
    }
}

/// Drop everything stamped at or before `timestamp`; true if anything remains
fn retain_newer(node: &mut StoredNode, timestamp: i64) -> bool {
    match node {
        StoredNode::Column(cell) => cell.timestamp > timestamp,
        StoredNode::Super(cells) => {
            cells.retain(|_, c| c.timestamp > timestamp);
            !cells.is_empty()
        }
    }
}

fn cell(column: &RawColumn) -> Cell {
    Cell {
        value: column.value.clone(),
        timestamp: column.timestamp,
    }
}

fn raw_column(name: &[u8], cell: &Cell) -> RawColumn {
    RawColumn {
        name: name.to_vec(),
        value: cell.value.clone(),
        timestamp: cell.timestamp,
    }
}

fn to_raw(name: &[u8], node: &StoredNode) -> ColumnNode {
    match node {
        StoredNode::Column(cell) => ColumnNode::Leaf(raw_column(name, cell)),
        StoredNode::Super(cells) => ColumnNode::Super {
            name: name.to_vec(),
            columns: cells.iter().map(|(n, c)| raw_column(n, c)).collect(),
        },
    }
}

/// Columns of a row within a slice range, honouring `reversed` and `count`
fn slice<'a>(row: &'a Row, range: &'a SliceRange) -> impl Iterator<Item = (&'a Vec<u8>, &'a StoredNode)> + 'a {
    bounded(row, &range.start, &range.finish, range.reversed).take(range.count as usize)
}

/// Entries between two bounds, empty bounds meaning unbounded
///
/// Forward: `start <= name <= finish`. Reversed: walks from `start` down to
/// `finish`. A start past the finish in walking order yields nothing.
fn bounded<'a, V>(
    map: &'a BTreeMap<Vec<u8>, V>,
    start: &'a [u8],
    finish: &'a [u8],
    reversed: bool,
) -> Box<dyn Iterator<Item = (&'a Vec<u8>, &'a V)> + 'a> {
    let (low, high) = if reversed { (finish, start) } else { (start, finish) };

    if !low.is_empty() && !high.is_empty() && low > high {
        return Box::new(std::iter::empty());
    }

    let lower = if low.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(low.to_vec())
    };
    let upper = if high.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(high.to_vec())
    };

    let iter = map.range::<Vec<u8>, _>((lower, upper));
    if reversed {
        Box::new(iter.rev())
    } else {
        Box::new(iter)
    }
}
