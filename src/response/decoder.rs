//! Response decoder implementation

use crate::error::{ColError, OpContext, Result};
use crate::model::{ColumnNode, Columns, RawColumn, RawRow, Rows, SuperColumn, SuperRows};
use crate::options::OptionSet;
use crate::serializer::{Serializer, Value};

use super::RawResponse;

/// A decoded column tree node
#[derive(Debug, Clone, PartialEq)]
enum DecodedNode {
    Leaf(Value, Value),
    Super(SuperColumn),
}

/// Decodes responses for one call
pub struct ResponseDecoder<'a> {
    ctx: OpContext<'a>,
    options: &'a OptionSet,
}

impl<'a> ResponseDecoder<'a> {
    pub fn new(ctx: OpContext<'a>, options: &'a OptionSet) -> Self {
        Self { ctx, options }
    }

    /// Row key → column name → value
    pub fn rows(&self, response: RawResponse) -> Result<Rows> {
        let rows = self.expect_rows(response)?;
        let mut decoded = Rows::new();
        for row in rows {
            let (key, nodes) = self.decode_row(&row)?;
            let mut columns = Columns::new();
            for node in nodes {
                match node {
                    DecodedNode::Leaf(name, value) => {
                        columns.insert(name, value);
                    }
                    DecodedNode::Super(sc) => {
                        return Err(self.shape_error(&key, &sc.name, "supercolumn in a flat row"));
                    }
                }
            }
            decoded.insert(key, columns);
        }
        Ok(decoded)
    }

    /// Row key → supercolumns in store order
    pub fn super_rows(&self, response: RawResponse) -> Result<SuperRows> {
        let rows = self.expect_rows(response)?;
        let mut decoded = SuperRows::new();
        for row in rows {
            let (key, nodes) = self.decode_row(&row)?;
            let mut supers = Vec::with_capacity(nodes.len());
            for node in nodes {
                match node {
                    DecodedNode::Super(sc) => supers.push(sc),
                    DecodedNode::Leaf(name, _) => {
                        return Err(self.shape_error(&key, &name, "flat column in a supercolumn row"));
                    }
                }
            }
            decoded.insert(key, supers);
        }
        Ok(decoded)
    }

    /// Point lookup result: empty map when the column is missing
    pub fn column(&self, key: &Value, response: RawResponse) -> Result<Columns> {
        match response {
            RawResponse::Column(None) => Ok(Columns::new()),
            RawResponse::Column(Some(column)) => {
                let (name, value) = self.decode_column(&key.to_string(), &column)?;
                Ok(Columns::from([(name, value)]))
            }
            other => Err(self.unexpected(&other)),
        }
    }

    /// Columns inside one supercolumn
    pub fn sub_columns(&self, key: &Value, response: RawResponse) -> Result<Columns> {
        match response {
            RawResponse::Columns(columns) => {
                let label = key.to_string();
                columns
                    .iter()
                    .map(|c| self.decode_column(&label, c))
                    .collect()
            }
            other => Err(self.unexpected(&other)),
        }
    }

    pub fn count(&self, response: RawResponse) -> Result<u32> {
        match response {
            RawResponse::Count(n) => Ok(n),
            other => Err(self.unexpected(&other)),
        }
    }

    // =========================================================================
    // Tree decoding
    // =========================================================================

    fn decode_row(&self, row: &RawRow) -> Result<(Value, Vec<DecodedNode>)> {
        let key = self
            .options
            .k_serializer
            .decode(&row.key)
            .map_err(|e| self.ctx.decode(raw_label(&row.key), "<row key>", e))?;
        let label = key.to_string();
        let nodes = row
            .nodes
            .iter()
            .map(|node| self.decode_node(&label, node))
            .collect::<Result<Vec<_>>>()?;
        Ok((key, nodes))
    }

    fn decode_node(&self, key: &str, node: &ColumnNode) -> Result<DecodedNode> {
        match node {
            ColumnNode::Leaf(column) => {
                let (name, value) = self.decode_column(key, column)?;
                Ok(DecodedNode::Leaf(name, value))
            }
            ColumnNode::Super { name, columns } => {
                let name = self.decode_with(self.options.s_serializer, key, name, name)?;
                let columns = columns
                    .iter()
                    .map(|c| self.decode_column(key, c))
                    .collect::<Result<Columns>>()?;
                Ok(DecodedNode::Super(SuperColumn { name, columns }))
            }
        }
    }

    fn decode_column(&self, key: &str, column: &RawColumn) -> Result<(Value, Value)> {
        let name = self.decode_with(self.options.n_serializer, key, &column.name, &column.name)?;
        let value = self.decode_with(self.options.v_serializer, key, &column.name, &column.value)?;
        Ok((name, value))
    }

    fn decode_with(&self, serializer: Serializer, key: &str, column: &[u8], bytes: &[u8]) -> Result<Value> {
        serializer.decode(bytes).map_err(|e| {
            let column = self
                .options
                .n_serializer
                .decode(column)
                .map(|v| v.to_string())
                .unwrap_or_else(|_| raw_label(column));
            self.ctx.decode(key, column, e)
        })
    }

    fn expect_rows(&self, response: RawResponse) -> Result<Vec<RawRow>> {
        match response {
            RawResponse::Rows(rows) => Ok(rows),
            other => Err(self.unexpected(&other)),
        }
    }

    fn shape_error(&self, key: &Value, column: &Value, reason: &str) -> ColError {
        ColError::Decode {
            operation: self.ctx.operation,
            column_family: self.ctx.column_family.to_string(),
            key: key.to_string(),
            column: column.to_string(),
            reason: reason.to_string(),
        }
    }

    fn unexpected(&self, response: &RawResponse) -> ColError {
        ColError::Protocol(format!(
            "{} on {}: unexpected {} response",
            self.ctx.operation,
            self.ctx.column_family,
            response.kind()
        ))
    }
}

fn raw_label(bytes: &[u8]) -> String {
    Value::Bytes(bytes.to_vec()).to_string()
}
