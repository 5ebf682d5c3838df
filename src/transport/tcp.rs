//! TCP transport
//!
//! Client side of the wire protocol. One connection per cluster handle.

use std::collections::HashMap;
use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::ClientConfig;
use crate::error::{ColError, Result};
use crate::protocol::{encode_command, read_response, Command, Reply};
use crate::request::{Mutation, ReadRequest};
use crate::response::RawResponse;

use super::{ClusterHandle, KeyspaceHandle, Transport};

/// An open connection to one store node
struct Link {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    peer: String,
}

impl Link {
    fn open(endpoint: &str, connect: Duration, read: Duration, write: Duration) -> Result<Self> {
        let addr = endpoint
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| ColError::Config(format!("endpoint {} resolves to nothing", endpoint)))?;

        let stream = TcpStream::connect_timeout(&addr, connect)?;
        stream.set_nodelay(true)?;
        if !read.is_zero() {
            stream.set_read_timeout(Some(read))?;
        }
        if !write.is_zero() {
            stream.set_write_timeout(Some(write))?;
        }

        let mut link = Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
            peer: endpoint.to_string(),
        };
        match link.round_trip(&Command::Ping)? {
            Reply::Pong => Ok(link),
            other => Err(ColError::Protocol(format!("expected PONG, got {:?}", other))),
        }
    }

    fn round_trip(&mut self, command: &Command) -> Result<Reply> {
        let frame = encode_command(command)?;
        self.exchange(&frame)
    }

    /// Send one encoded command frame and read its response
    fn exchange(&mut self, frame: &[u8]) -> Result<Reply> {
        self.writer.write_all(frame)?;
        self.writer.flush()?;
        read_response(&mut self.reader)?.into_reply()
    }
}

/// Transport speaking the wire protocol to a `colkv-server` node
///
/// Endpoints are tried in order on connect; the first one that answers a
/// PING serves the handle until `disconnect`. An I/O failure closes the
/// handle's connection and surfaces as a connection error, as does a
/// malformed or oversized response frame; nothing is retried.
pub struct TcpTransport {
    connect_timeout: Duration,
    read_timeout: Duration,
    write_timeout: Duration,
    links: Mutex<HashMap<u64, Arc<Mutex<Link>>>>,
    next_id: AtomicU64,
}

impl TcpTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            connect_timeout: Duration::from_millis(config.connect_timeout_ms.max(1)),
            read_timeout: Duration::from_millis(config.read_timeout_ms),
            write_timeout: Duration::from_millis(config.write_timeout_ms),
            links: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn link(&self, cluster_id: u64) -> Result<Arc<Mutex<Link>>> {
        self.links.lock().get(&cluster_id).cloned().ok_or_else(|| {
            ColError::Connection(format!("cluster handle {} is not connected", cluster_id))
        })
    }

    /// Run one command on the handle's link
    ///
    /// Encoding failures leave the link untouched since nothing was sent.
    /// A remote ERROR reply is a complete frame, so the link stays usable.
    /// Any other failure leaves the stream at an unknown position: the link
    /// is dropped and the handle must be reconnected.
    fn execute(&self, cluster_id: u64, command: &Command) -> Result<Reply> {
        let frame = encode_command(command)?;
        let link = self.link(cluster_id)?;
        let mut link = link.lock();
        match link.exchange(&frame) {
            Ok(reply) => Ok(reply),
            Err(ColError::Remote(msg)) => Err(ColError::Remote(msg)),
            Err(e) => {
                tracing::warn!("Connection to {} failed: {}", link.peer, e);
                self.links.lock().remove(&cluster_id);
                Err(ColError::Connection(format!("{}: {}", link.peer, e)))
            }
        }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl Transport for TcpTransport {
    fn connect(&self, cluster_name: &str, endpoints: &[String]) -> Result<ClusterHandle> {
        let mut last_error = None;
        for endpoint in endpoints {
            match Link::open(
                endpoint,
                self.connect_timeout,
                self.read_timeout,
                self.write_timeout,
            ) {
                Ok(link) => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    self.links.lock().insert(id, Arc::new(Mutex::new(link)));
                    tracing::info!("Connected cluster {} via {} (handle {})", cluster_name, endpoint, id);
                    return Ok(ClusterHandle::new(id, cluster_name, endpoints.to_vec()));
                }
                Err(e) => {
                    tracing::warn!("Endpoint {} unreachable: {}", endpoint, e);
                    last_error = Some(e);
                }
            }
        }
        Err(ColError::Connection(match last_error {
            Some(e) => format!("cluster {}: no endpoint reachable, last error: {}", cluster_name, e),
            None => format!("cluster {}: no endpoints given", cluster_name),
        }))
    }

    fn open_keyspace(&self, cluster: &ClusterHandle, name: &str) -> Result<KeyspaceHandle> {
        self.link(cluster.id())?;
        Ok(KeyspaceHandle::new(cluster, name))
    }

    fn execute_read(&self, keyspace: &KeyspaceHandle, request: &ReadRequest) -> Result<RawResponse> {
        let command = Command::Read {
            keyspace: keyspace.name().to_string(),
            request: request.clone(),
        };
        match self.execute(keyspace.cluster_id(), &command)? {
            Reply::Read(response) => Ok(response),
            other => Err(ColError::Protocol(format!("expected read reply, got {:?}", other))),
        }
    }

    fn execute_write(&self, keyspace: &KeyspaceHandle, mutations: &[Mutation]) -> Result<()> {
        let command = Command::Write {
            keyspace: keyspace.name().to_string(),
            mutations: mutations.to_vec(),
        };
        match self.execute(keyspace.cluster_id(), &command)? {
            Reply::Written => Ok(()),
            other => Err(ColError::Protocol(format!("expected write ack, got {:?}", other))),
        }
    }

    fn disconnect(&self, cluster: ClusterHandle) -> Result<()> {
        match self.links.lock().remove(&cluster.id()) {
            Some(_) => {
                tracing::info!("Disconnected cluster {}", cluster.name());
                Ok(())
            }
            None => Err(ColError::Connection(format!(
                "cluster handle {} is not connected",
                cluster.id()
            ))),
        }
    }
}
