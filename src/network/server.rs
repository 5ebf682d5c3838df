//! TCP Server
//!
//! Accepts connections and dispatches them to a fixed pool of workers.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver};

use crate::config::ServerConfig;
use crate::error::{ColError, Result};
use crate::store::ColumnStore;

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Signals a running server to stop accepting connections
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// TCP server for a ColKV store node
pub struct Server {
    config: ServerConfig,
    store: Arc<ColumnStore>,
    listener: Option<TcpListener>,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Create a new server with the given config and store
    pub fn new(config: ServerConfig, store: Arc<ColumnStore>) -> Self {
        Self {
            config,
            store,
            listener: None,
            shutdown: ShutdownHandle::default(),
        }
    }

    /// Bind the listen address, returning the bound address
    ///
    /// Useful with port 0 to learn the port before `run`.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Ok(listener.local_addr()?);
        }
        let listener = TcpListener::bind(&self.config.listen_addr)?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        let addr = self.bind()?;
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| ColError::Config("listener not bound".to_string()))?;

        let workers = self.config.workers.max(1);
        let (tx, rx) = channel::bounded::<TcpStream>(self.config.max_pending);
        let handles: Vec<JoinHandle<()>> = (0..workers)
            .map(|id| self.spawn_worker(id, rx.clone()))
            .collect::<Result<_>>()?;
        drop(rx);

        tracing::info!("Listening on {} with {} workers", addr, workers);

        while !self.shutdown.is_shutdown() {
            match listener.accept() {
                Ok((stream, peer)) => {
                    stream.set_nonblocking(false)?;
                    if tx.send(stream).is_err() {
                        tracing::error!("Worker pool gone, dropping connection from {}", peer);
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL_INTERVAL),
                Err(e) => tracing::warn!("Accept failed: {}", e),
            }
        }

        tracing::info!("Shutting down, waiting for workers");
        drop(tx);
        for handle in handles {
            let _ = handle.join();
        }
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    fn spawn_worker(&self, id: usize, rx: Receiver<TcpStream>) -> Result<JoinHandle<()>> {
        let store = Arc::clone(&self.store);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        let handle = thread::Builder::new()
            .name(format!("colkv-worker-{}", id))
            .spawn(move || {
                for stream in rx {
                    let result = Connection::new(stream, Arc::clone(&store)).and_then(|mut conn| {
                        conn.set_timeouts(read_ms, write_ms)?;
                        conn.handle()
                    });
                    if let Err(e) = result {
                        tracing::warn!("Worker {} connection error: {}", id, e);
                    }
                }
            })?;
        Ok(handle)
    }
}
