//! Protocol Module
//!
//! Defines the wire protocol between [`TcpTransport`](crate::transport::TcpTransport)
//! and a `colkv-server` node.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬──────────┬──────────┬─────────────────────────────┐
//! │ Type (1) │ Len (4)  │ CRC (4)  │    Payload (bincode)        │
//! └──────────┴──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: READ  - Payload: (keyspace, ReadRequest)
//! - 0x02: WRITE - Payload: (keyspace, Vec<Mutation>)
//! - 0x03: PING  - Payload: empty
//!
//! ### Status Codes
//! - 0x00: OK    - Payload: Reply
//! - 0x02: ERROR - Payload: UTF-8 message

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Reply, Response, Status};
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command, read_response,
    write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
