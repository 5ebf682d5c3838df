//! Request builder implementation

use crate::error::{OpContext, Result};
use crate::model::{ColumnNode, Field, Fields, RawColumn, SubColumnTargets};
use crate::options::OptionSet;
use crate::serializer::{Serializer, Value};

use super::{Deletion, Mutation, ReadRequest, SlicePredicate, SliceRange};

/// Builds requests for one call
///
/// Holds the call's context (for error messages) and its resolved options.
/// Every key, name and value is encoded here; nothing downstream sees a
/// host [`Value`].
pub struct RequestBuilder<'a> {
    ctx: OpContext<'a>,
    options: &'a OptionSet,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(ctx: OpContext<'a>, options: &'a OptionSet) -> Self {
        Self { ctx, options }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Multi-key row fetch with a name range
    pub fn multiget_slice(&self, keys: &[Value]) -> Result<ReadRequest> {
        Ok(ReadRequest::MultigetSlice {
            column_family: self.column_family(),
            keys: self.encode_keys(keys)?,
            range: self.slice_range(self.options.n_serializer)?,
        })
    }

    /// Point lookup of a single column
    ///
    /// Only one name is supported. Asking for more is an error rather than
    /// a silently truncated result.
    pub fn column(&self, key: &Value, names: &[Value]) -> Result<ReadRequest> {
        let name = match names {
            [name] => name,
            [] => return Err(self.ctx.unsupported("point lookup needs a column name")),
            _ => {
                return Err(self.ctx.unsupported(format!(
                    "fetching {} named columns in one call is not implemented",
                    names.len()
                )))
            }
        };
        Ok(ReadRequest::Column {
            column_family: self.column_family(),
            key: self.encode_key(key)?,
            name: self.encode_with(self.options.n_serializer, "column name", name)?,
        })
    }

    /// Key range scan, inclusive on both ends
    pub fn range_slices(&self, start_key: &Value, finish_key: &Value) -> Result<ReadRequest> {
        let ks = self.options.k_serializer;
        let encode_key = |which: &str, key: &Value| {
            ks.encode(key).map_err(|e| {
                self.ctx
                    .invalid_range(format!("{} key {}: {}", which, key, e))
            })
        };
        Ok(ReadRequest::RangeSlices {
            column_family: self.column_family(),
            start_key: encode_key("start", start_key)?,
            finish_key: encode_key("finish", finish_key)?,
            range: self.slice_range(self.options.n_serializer)?,
        })
    }

    /// Column count over a name range of one row
    pub fn count(&self, key: &Value) -> Result<ReadRequest> {
        Ok(ReadRequest::Count {
            column_family: self.column_family(),
            key: self.encode_key(key)?,
            range: self.slice_range(self.options.n_serializer)?,
        })
    }

    /// Supercolumns of several rows
    ///
    /// Named supercolumns when `super_names` is non-empty, otherwise the
    /// `start`/`finish` range over supercolumn names.
    pub fn multiget_super_slice(&self, keys: &[Value], super_names: &[Value]) -> Result<ReadRequest> {
        let ss = self.options.s_serializer;
        let predicate = if super_names.is_empty() {
            SlicePredicate::Range(self.slice_range(ss)?)
        } else {
            SlicePredicate::Names(self.encode_all(ss, "supercolumn name", super_names)?)
        };
        Ok(ReadRequest::MultigetSuperSlice {
            column_family: self.column_family(),
            keys: self.encode_keys(keys)?,
            predicate,
        })
    }

    /// Named columns inside one supercolumn
    pub fn sub_slice(&self, key: &Value, super_name: &Value, names: &[Value]) -> Result<ReadRequest> {
        Ok(ReadRequest::SubSlice {
            column_family: self.column_family(),
            key: self.encode_key(key)?,
            super_name: self.encode_with(self.options.s_serializer, "supercolumn name", super_name)?,
            names: self.encode_all(self.options.n_serializer, "column name", names)?,
        })
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// One insertion per top-level field
    ///
    /// A `Field::Super` becomes a supercolumn: its name goes through the
    /// supercolumn serializer, its contents through the name and value
    /// serializers.
    pub fn insertions(&self, key: &Value, fields: &Fields, timestamp: i64) -> Result<Vec<Mutation>> {
        let key = self.encode_key(key)?;
        fields
            .iter()
            .map(|(name, field)| {
                Ok(Mutation::Insert {
                    column_family: self.column_family(),
                    key: key.clone(),
                    node: self.column_node(name, field, timestamp)?,
                })
            })
            .collect()
    }

    /// One deletion per named column of a row
    pub fn column_deletions(&self, key: &Value, names: &[Value], timestamp: i64) -> Result<Vec<Mutation>> {
        let key = self.encode_key(key)?;
        names
            .iter()
            .map(|name| {
                let name = self.encode_with(self.options.n_serializer, "column name", name)?;
                Ok(self.deletion(key.clone(), Deletion::Column(name), timestamp))
            })
            .collect()
    }

    /// One deletion per row
    pub fn row_deletions(&self, keys: &[Value], timestamp: i64) -> Result<Vec<Mutation>> {
        Ok(self
            .encode_keys(keys)?
            .into_iter()
            .map(|key| self.deletion(key, Deletion::Row, timestamp))
            .collect())
    }

    /// One deletion per (row, supercolumn) pair, naming the inner columns
    pub fn sub_column_deletions(&self, targets: &SubColumnTargets, timestamp: i64) -> Result<Vec<Mutation>> {
        let mut mutations = Vec::new();
        for (key, supers) in targets {
            let key = self.encode_key(key)?;
            for (super_name, names) in supers {
                let deletion = Deletion::SubColumns {
                    super_name: self.encode_with(self.options.s_serializer, "supercolumn name", super_name)?,
                    names: self.encode_all(self.options.n_serializer, "column name", names)?,
                };
                mutations.push(self.deletion(key.clone(), deletion, timestamp));
            }
        }
        Ok(mutations)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn column_node(&self, name: &Value, field: &Field, timestamp: i64) -> Result<ColumnNode> {
        match field {
            Field::Leaf(value) => Ok(ColumnNode::Leaf(self.raw_column(name, value, timestamp)?)),
            Field::Super(inner) => {
                let columns = inner
                    .iter()
                    .map(|(n, v)| self.raw_column(n, v, timestamp))
                    .collect::<Result<Vec<_>>>()?;
                Ok(ColumnNode::Super {
                    name: self.encode_with(self.options.s_serializer, "supercolumn name", name)?,
                    columns,
                })
            }
        }
    }

    fn raw_column(&self, name: &Value, value: &Value, timestamp: i64) -> Result<RawColumn> {
        Ok(RawColumn {
            name: self.encode_with(self.options.n_serializer, "column name", name)?,
            value: self.encode_with(self.options.v_serializer, "value", value)?,
            timestamp,
        })
    }

    fn deletion(&self, key: Vec<u8>, deletion: Deletion, timestamp: i64) -> Mutation {
        Mutation::Delete {
            column_family: self.column_family(),
            key,
            deletion,
            timestamp,
        }
    }

    fn slice_range(&self, names: Serializer) -> Result<SliceRange> {
        let (start, finish) = self.options.encoded_bounds(names, self.ctx)?;
        Ok(SliceRange {
            start,
            finish,
            reversed: self.options.reversed,
            count: self.options.count,
        })
    }

    fn encode_key(&self, key: &Value) -> Result<Vec<u8>> {
        self.encode_with(self.options.k_serializer, "row key", key)
    }

    fn encode_keys(&self, keys: &[Value]) -> Result<Vec<Vec<u8>>> {
        self.encode_all(self.options.k_serializer, "row key", keys)
    }

    fn encode_all(&self, serializer: Serializer, what: &str, values: &[Value]) -> Result<Vec<Vec<u8>>> {
        values
            .iter()
            .map(|v| self.encode_with(serializer, what, v))
            .collect()
    }

    fn encode_with(&self, serializer: Serializer, what: &str, value: &Value) -> Result<Vec<u8>> {
        serializer
            .encode(value)
            .map_err(|e| self.ctx.encode(&format!("{} {}", what, value), e))
    }

    fn column_family(&self) -> String {
        self.ctx.column_family.to_string()
    }
}
