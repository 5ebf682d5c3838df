//! Client
//!
//! The public CRUD surface. Every call resolves its own options, builds its
//! own request (and, for writes, its own batch), runs it through the
//! transport and decodes the answer. Nothing is shared between calls except
//! the handles, so one `Client` can serve many threads.
//!
//! ## Call flow
//! ```text
//!   CallOptions ──► OptionSet ──► RequestBuilder ──► Transport
//!                                                       │
//!   Rows / Columns / count ◄── ResponseDecoder ◄────────┘
//! ```

use crate::batch::MutationBatch;
use crate::config::ClientConfig;
use crate::error::{OpContext, Result};
use crate::model::{Columns, Fields, Rows, SubColumnTargets, SuperRows};
use crate::options::{CallOptions, Mode, OptionSet};
use crate::request::{Mutation, ReadRequest, RequestBuilder};
use crate::response::{RawResponse, ResponseDecoder};
use crate::serializer::Value;
use crate::transport::{ClusterHandle, KeyspaceHandle, Transport};

/// A connected column-family client
pub struct Client<T: Transport> {
    transport: T,
    cluster: ClusterHandle,
    keyspace: KeyspaceHandle,
}

impl<T: Transport> Client<T> {
    /// Connect to the configured cluster and open its keyspace
    pub fn connect(transport: T, config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let cluster = transport.connect(&config.cluster_name, &config.endpoints)?;
        let keyspace = transport.open_keyspace(&cluster, &config.keyspace)?;
        tracing::debug!(
            "Client connected to cluster {}, keyspace {}",
            cluster.name(),
            keyspace.name()
        );
        Ok(Self {
            transport,
            cluster,
            keyspace,
        })
    }

    /// Switch to another keyspace on the same cluster
    pub fn set_keyspace(&mut self, name: &str) -> Result<()> {
        self.keyspace = self.transport.open_keyspace(&self.cluster, name)?;
        Ok(())
    }

    pub fn keyspace(&self) -> &KeyspaceHandle {
        &self.keyspace
    }

    pub fn cluster(&self) -> &ClusterHandle {
        &self.cluster
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Close the cluster handle
    pub fn disconnect(self) -> Result<()> {
        self.transport.disconnect(self.cluster)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Insert the fields of one row
    ///
    /// A `Field::Super` value becomes a supercolumn.
    pub fn put_row(&self, column_family: &str, key: impl Into<Value>, fields: &Fields, options: &CallOptions) -> Result<()> {
        let ctx = OpContext::new("put_row", column_family);
        let key = key.into();
        tracing::debug!("put_row {} key={} fields={}", column_family, key, fields.len());
        self.write(ctx, options, |b, ts| b.insertions(&key, fields, ts))
    }

    /// Delete named columns of one row; the row itself stays
    pub fn delete_columns(&self, column_family: &str, key: impl Into<Value>, names: &[Value], options: &CallOptions) -> Result<()> {
        let ctx = OpContext::new("delete_columns", column_family);
        let key = key.into();
        tracing::debug!("delete_columns {} key={} columns={}", column_family, key, names.len());
        self.write(ctx, options, |b, ts| b.column_deletions(&key, names, ts))
    }

    /// Delete whole rows
    pub fn delete_rows(&self, column_family: &str, keys: &[Value], options: &CallOptions) -> Result<()> {
        let ctx = OpContext::new("delete_rows", column_family);
        tracing::debug!("delete_rows {} keys={}", column_family, keys.len());
        self.write(ctx, options, |b, ts| b.row_deletions(keys, ts))
    }

    /// Delete named columns inside supercolumns
    pub fn delete_super_columns(&self, column_family: &str, targets: &SubColumnTargets, options: &CallOptions) -> Result<()> {
        let ctx = OpContext::new("delete_super_columns", column_family);
        tracing::debug!("delete_super_columns {} rows={}", column_family, targets.len());
        self.write(ctx, options, |b, ts| b.sub_column_deletions(targets, ts))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetch several rows, each sliced by the name range
    ///
    /// Keys with no data are absent from the result.
    pub fn get_rows(&self, column_family: &str, keys: &[Value], options: &CallOptions) -> Result<Rows> {
        let ctx = OpContext::new("get_rows", column_family);
        tracing::debug!("get_rows {} keys={}", column_family, keys.len());
        let Some(first) = keys.first() else {
            return Ok(Rows::new());
        };
        let set = read_options(options, ctx, first)?;
        let request = RequestBuilder::new(ctx, &set).multiget_slice(keys)?;
        ResponseDecoder::new(ctx, &set).rows(self.read(ctx, &request)?)
    }

    /// Fetch named columns of one row
    ///
    /// One name is a point lookup. More than one fails with `Unsupported`.
    pub fn get_columns(&self, column_family: &str, key: impl Into<Value>, names: &[Value], options: &CallOptions) -> Result<Columns> {
        let ctx = OpContext::new("get_columns", column_family);
        let key = key.into();
        tracing::debug!("get_columns {} key={} columns={}", column_family, key, names.len());
        let set = read_options(options, ctx, &key)?;
        if names.is_empty() {
            return Ok(Columns::new());
        }
        let request = RequestBuilder::new(ctx, &set).column(&key, names)?;
        ResponseDecoder::new(ctx, &set).column(&key, self.read(ctx, &request)?)
    }

    /// Scan rows from `start_key` through `finish_key`
    pub fn get_range(&self, column_family: &str, start_key: impl Into<Value>, finish_key: impl Into<Value>, options: &CallOptions) -> Result<Rows> {
        let ctx = OpContext::new("get_range", column_family);
        let (start_key, finish_key) = (start_key.into(), finish_key.into());
        tracing::debug!("get_range {} keys={}..={}", column_family, start_key, finish_key);
        let set = read_options(options, ctx, &start_key)?;
        let request = RequestBuilder::new(ctx, &set).range_slices(&start_key, &finish_key)?;
        ResponseDecoder::new(ctx, &set).rows(self.read(ctx, &request)?)
    }

    /// Count the columns of one row within the name range
    ///
    /// Not O(1): the store walks every column in the range to count it and
    /// only saves shipping them back. Keep your own counter if you need a
    /// cheap count.
    pub fn count_columns(&self, column_family: &str, key: impl Into<Value>, options: &CallOptions) -> Result<u32> {
        let ctx = OpContext::new("count_columns", column_family);
        let key = key.into();
        tracing::debug!("count_columns {} key={}", column_family, key);
        let set = read_options(options, ctx, &key)?;
        let request = RequestBuilder::new(ctx, &set).count(&key)?;
        ResponseDecoder::new(ctx, &set).count(self.read(ctx, &request)?)
    }

    /// Fetch supercolumns of several rows
    ///
    /// Named supercolumns when `super_names` is non-empty, otherwise the
    /// `start`/`finish` range over supercolumn names.
    pub fn get_super_rows(&self, column_family: &str, keys: &[Value], super_names: &[Value], options: &CallOptions) -> Result<SuperRows> {
        let ctx = OpContext::new("get_super_rows", column_family);
        tracing::debug!("get_super_rows {} keys={} supercolumns={}", column_family, keys.len(), super_names.len());
        let Some(first) = keys.first() else {
            return Ok(SuperRows::new());
        };
        let set = read_options(options, ctx, first)?;
        let request = RequestBuilder::new(ctx, &set).multiget_super_slice(keys, super_names)?;
        ResponseDecoder::new(ctx, &set).super_rows(self.read(ctx, &request)?)
    }

    /// Fetch named columns inside one supercolumn
    pub fn get_super_columns(&self, column_family: &str, key: impl Into<Value>, super_name: impl Into<Value>, names: &[Value], options: &CallOptions) -> Result<Columns> {
        let ctx = OpContext::new("get_super_columns", column_family);
        let (key, super_name) = (key.into(), super_name.into());
        tracing::debug!("get_super_columns {} key={} supercolumn={}", column_family, key, super_name);
        let set = read_options(options, ctx, &key)?;
        let request = RequestBuilder::new(ctx, &set).sub_slice(&key, &super_name, names)?;
        ResponseDecoder::new(ctx, &set).sub_columns(&key, self.read(ctx, &request)?)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn read(&self, ctx: OpContext<'_>, request: &ReadRequest) -> Result<RawResponse> {
        tracing::trace!("{} request: {:?}", ctx.operation, request);
        self.transport
            .execute_read(&self.keyspace, request)
            .map_err(|e| ctx.wrap(e))
    }

    /// Resolve write options, build one batch and commit it
    fn write<F>(&self, ctx: OpContext<'_>, options: &CallOptions, build: F) -> Result<()>
    where
        F: FnOnce(&RequestBuilder<'_>, i64) -> Result<Vec<Mutation>>,
    {
        let set = OptionSet::resolve(options, Mode::Write, ctx)?;
        let mut batch = MutationBatch::new(self.keyspace.clone());
        let mutations = build(&RequestBuilder::new(ctx, &set), batch.timestamp())?;
        batch.extend(mutations)?;
        batch.commit(&self.transport).map_err(|e| ctx.wrap(e))
    }
}

fn read_options(options: &CallOptions, ctx: OpContext<'_>, sample_key: &Value) -> Result<OptionSet> {
    let mut set = OptionSet::resolve(options, Mode::Read, ctx)?;
    set.pin_key_serializer(sample_key);
    Ok(set)
}
