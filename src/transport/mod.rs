//! Transport Module
//!
//! The collaborator the client runs on top of. A transport owns connections,
//! routing and execution; the client only builds requests and decodes
//! responses.
//!
//! ## Implementations
//! - [`MemoryTransport`]: executes against an in-process [`ColumnStore`](crate::store::ColumnStore)
//! - [`TcpTransport`]: speaks the wire protocol to a `colkv-server` node

mod memory;
mod tcp;

use crate::error::Result;
use crate::request::{Mutation, ReadRequest};
use crate::response::RawResponse;

pub use memory::MemoryTransport;
pub use tcp::TcpTransport;

/// An open cluster connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterHandle {
    id: u64,
    name: String,
    endpoints: Vec<String>,
}

impl ClusterHandle {
    pub fn new(id: u64, name: impl Into<String>, endpoints: Vec<String>) -> Self {
        Self {
            id,
            name: name.into(),
            endpoints,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }
}

/// A keyspace opened on a cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyspaceHandle {
    cluster_id: u64,
    name: String,
}

impl KeyspaceHandle {
    pub fn new(cluster: &ClusterHandle, name: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster.id(),
            name: name.into(),
        }
    }

    pub fn cluster_id(&self) -> u64 {
        self.cluster_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Connection, routing and execution for the client
///
/// Every call blocks until the store answers, the transport's own timeout
/// fires, or the transport fails. Implementations do not retry on behalf of
/// the client.
pub trait Transport: Send + Sync {
    fn connect(&self, cluster_name: &str, endpoints: &[String]) -> Result<ClusterHandle>;

    fn open_keyspace(&self, cluster: &ClusterHandle, name: &str) -> Result<KeyspaceHandle>;

    fn execute_read(&self, keyspace: &KeyspaceHandle, request: &ReadRequest) -> Result<RawResponse>;

    /// Apply all mutations as one unit
    fn execute_write(&self, keyspace: &KeyspaceHandle, mutations: &[Mutation]) -> Result<()>;

    fn disconnect(&self, cluster: ClusterHandle) -> Result<()>;
}
