//! Response definitions
//!
//! Represents responses to clients.

use serde::{Deserialize, Serialize};

use crate::response::RawResponse;
use super::MAX_PAYLOAD_SIZE;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    Error = 0x02,
}

/// Body of an OK response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    Read(RawResponse),
    Written,
    Pong,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Encoded `Reply` for OK, error message for ERROR
    pub payload: Vec<u8>,
}

impl Response {
    /// Create an OK response carrying a reply
    ///
    /// Fails with a protocol error when the encoded reply would not fit in
    /// one frame.
    pub fn ok(reply: &Reply) -> crate::Result<Self> {
        let payload = bincode::serialize(reply)?;
        if payload.len() > MAX_PAYLOAD_SIZE as usize {
            return Err(crate::ColError::Protocol(format!(
                "reply of {} bytes exceeds the {} byte frame limit",
                payload.len(),
                MAX_PAYLOAD_SIZE
            )));
        }
        Ok(Self {
            status: Status::Ok,
            payload,
        })
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: message.as_bytes().to_vec(),
        }
    }

    /// Decode the reply, turning an ERROR status into `ColError::Remote`
    pub fn into_reply(self) -> crate::Result<Reply> {
        match self.status {
            Status::Ok => Ok(bincode::deserialize(&self.payload)?),
            Status::Error => Err(crate::ColError::Remote(
                String::from_utf8_lossy(&self.payload).into_owned(),
            )),
        }
    }
}
