//! Command definitions
//!
//! Requests a client sends to a store node.

use crate::request::{Mutation, ReadRequest};

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Read = 0x01,
    Write = 0x02,
    Ping = 0x03,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Execute a read request in a keyspace
    Read { keyspace: String, request: ReadRequest },

    /// Apply a mutation batch in a keyspace
    Write {
        keyspace: String,
        mutations: Vec<Mutation>,
    },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Read { .. } => CommandType::Read,
            Command::Write { .. } => CommandType::Write,
            Command::Ping => CommandType::Ping,
        }
    }
}
