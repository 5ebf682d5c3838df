//! Network Module
//!
//! TCP server exposing a [`ColumnStore`](crate::store::ColumnStore) as a
//! store node.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool for connections
//! - Commands executed directly against the shared store

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
