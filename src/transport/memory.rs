//! In-process transport

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{ColError, Result};
use crate::request::{Mutation, ReadRequest};
use crate::response::RawResponse;
use crate::store::ColumnStore;

use super::{ClusterHandle, KeyspaceHandle, Transport};

/// Transport that executes directly against a shared [`ColumnStore`]
///
/// Endpoints are accepted and ignored. Handles are still tracked, so using
/// a handle after `disconnect` fails with a connection error just like a
/// network transport would.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    store: Arc<ColumnStore>,
    open: Arc<Mutex<HashSet<u64>>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing store
    pub fn with_store(store: Arc<ColumnStore>) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    pub fn store(&self) -> &Arc<ColumnStore> {
        &self.store
    }

    fn ensure_open(&self, cluster_id: u64) -> Result<()> {
        if self.open.lock().contains(&cluster_id) {
            Ok(())
        } else {
            Err(ColError::Connection(format!(
                "cluster handle {} is not connected",
                cluster_id
            )))
        }
    }
}

impl Transport for MemoryTransport {
    fn connect(&self, cluster_name: &str, endpoints: &[String]) -> Result<ClusterHandle> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.open.lock().insert(id);
        tracing::debug!("Connected in-memory cluster {} (handle {})", cluster_name, id);
        Ok(ClusterHandle::new(id, cluster_name, endpoints.to_vec()))
    }

    fn open_keyspace(&self, cluster: &ClusterHandle, name: &str) -> Result<KeyspaceHandle> {
        self.ensure_open(cluster.id())?;
        Ok(KeyspaceHandle::new(cluster, name))
    }

    fn execute_read(&self, keyspace: &KeyspaceHandle, request: &ReadRequest) -> Result<RawResponse> {
        self.ensure_open(keyspace.cluster_id())?;
        Ok(self.store.read(keyspace.name(), request))
    }

    fn execute_write(&self, keyspace: &KeyspaceHandle, mutations: &[Mutation]) -> Result<()> {
        self.ensure_open(keyspace.cluster_id())?;
        self.store.apply(keyspace.name(), mutations);
        Ok(())
    }

    fn disconnect(&self, cluster: ClusterHandle) -> Result<()> {
        if !self.open.lock().remove(&cluster.id()) {
            return Err(ColError::Connection(format!(
                "cluster handle {} is not connected",
                cluster.id()
            )));
        }
        tracing::debug!("Disconnected in-memory cluster {}", cluster.name());
        Ok(())
    }
}
