//! Mutation Batch
//!
//! Accumulates insert/delete entries for one keyspace and hands them to the
//! transport as a single unit. A batch is single-use: once `commit()` has
//! been called, both another commit and any new entry fail with
//! `BatchClosed`.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ColError, Result};
use crate::request::Mutation;
use crate::transport::{KeyspaceHandle, Transport};

/// Microseconds since the unix epoch
pub fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

/// A single-use batch of mutations
#[derive(Debug)]
pub struct MutationBatch {
    keyspace: KeyspaceHandle,
    timestamp: i64,
    entries: Vec<Mutation>,
    committed: bool,
}

impl MutationBatch {
    /// Create an empty batch stamped with the current time
    pub fn new(keyspace: KeyspaceHandle) -> Self {
        Self::with_timestamp(keyspace, now_micros())
    }

    pub fn with_timestamp(keyspace: KeyspaceHandle, timestamp: i64) -> Self {
        Self {
            keyspace,
            timestamp,
            entries: Vec::new(),
            committed: false,
        }
    }

    /// Timestamp applied to every entry built for this batch
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn add(&mut self, mutation: Mutation) -> Result<()> {
        self.ensure_open()?;
        self.entries.push(mutation);
        Ok(())
    }

    pub fn extend(&mut self, mutations: impl IntoIterator<Item = Mutation>) -> Result<()> {
        self.ensure_open()?;
        self.entries.extend(mutations);
        Ok(())
    }

    /// Send every entry to the transport in one write
    ///
    /// The batch is closed even when the write fails; build a new one to
    /// try again.
    pub fn commit<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<()> {
        self.ensure_open()?;
        self.committed = true;

        if self.entries.is_empty() {
            return Ok(());
        }

        tracing::trace!(
            "Committing {} mutations to keyspace {}",
            self.entries.len(),
            self.keyspace.name()
        );
        transport.execute_write(&self.keyspace, &self.entries)
    }

    pub fn entries(&self) -> &[Mutation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn keyspace(&self) -> &KeyspaceHandle {
        &self.keyspace
    }

    fn ensure_open(&self) -> Result<()> {
        if self.committed {
            return Err(ColError::BatchClosed {
                keyspace: self.keyspace.name().to_string(),
            });
        }
        Ok(())
    }
}
