//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! Every frame, command or response, shares one header:
//! ```text
//! ┌──────────┬──────────┬──────────┬─────────────────────────────┐
//! │ Type (1) │ Len (4)  │ CRC (4)  │         Payload             │
//! └──────────┴──────────┴──────────┴─────────────────────────────┘
//! ```
//! The CRC32 covers the payload only.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{ColError, Result};
use crate::request::{Mutation, ReadRequest};
use super::{Command, CommandType, Response, Status};

/// Header size: 1 byte type/status + 4 bytes length + 4 bytes CRC
pub const HEADER_SIZE: usize = 9;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// Parsed frame header
struct Header {
    kind: u8,
    payload_len: usize,
    crc: u32,
}

fn frame(kind: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_u8(kind);
    buf.put_u32(payload.len() as u32);
    buf.put_u32(crc32fast::hash(payload));
    buf.put_slice(payload);
    buf.to_vec()
}

fn parse_header(mut bytes: &[u8], what: &str) -> Result<Header> {
    if bytes.len() < HEADER_SIZE {
        return Err(ColError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let kind = bytes.get_u8();
    let payload_len = bytes.get_u32();
    let crc = bytes.get_u32();

    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(ColError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    Ok(Header {
        kind,
        payload_len: payload_len as usize,
        crc,
    })
}

/// Validate length and checksum, returning the payload slice
fn payload<'a>(bytes: &'a [u8], header: &Header, what: &str) -> Result<&'a [u8]> {
    let total_len = HEADER_SIZE + header.payload_len;
    if bytes.len() < total_len {
        return Err(ColError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    let payload = &bytes[HEADER_SIZE..total_len];
    let actual = crc32fast::hash(payload);
    if actual != header.crc {
        return Err(ColError::Protocol(format!(
            "{} checksum mismatch: header 0x{:08x}, payload 0x{:08x}",
            what, header.crc, actual
        )));
    }
    Ok(payload)
}

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
pub fn encode_command(command: &Command) -> Result<Vec<u8>> {
    let cmd_type = command.command_type() as u8;

    let payload = match command {
        Command::Read { keyspace, request } => bincode::serialize(&(keyspace, request))?,
        Command::Write {
            keyspace,
            mutations,
        } => bincode::serialize(&(keyspace, mutations))?,
        Command::Ping => Vec::new(),
    };

    if payload.len() > MAX_PAYLOAD_SIZE as usize {
        return Err(ColError::Protocol(format!(
            "command payload too large: {} bytes (max {})",
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }
    Ok(frame(cmd_type, &payload))
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let header = parse_header(bytes, "command")?;
    let payload = payload(bytes, &header, "command")?;

    match header.kind {
        k if k == CommandType::Read as u8 => {
            let (keyspace, request): (String, ReadRequest) = bincode::deserialize(payload)?;
            Ok(Command::Read { keyspace, request })
        }
        k if k == CommandType::Write as u8 => {
            let (keyspace, mutations): (String, Vec<Mutation>) = bincode::deserialize(payload)?;
            Ok(Command::Write {
                keyspace,
                mutations,
            })
        }
        k if k == CommandType::Ping as u8 => {
            if !payload.is_empty() {
                return Err(ColError::Protocol(format!(
                    "PING command: unexpected payload of {} bytes",
                    payload.len()
                )));
            }
            Ok(Command::Ping)
        }
        other => Err(ColError::Protocol(format!(
            "Unknown command type: 0x{:02x}",
            other
        ))),
    }
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
pub fn encode_response(response: &Response) -> Vec<u8> {
    frame(response.status as u8, &response.payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let header = parse_header(bytes, "response")?;
    let payload = payload(bytes, &header, "response")?;

    let status = match header.kind {
        0x00 => Status::Ok,
        0x02 => Status::Error,
        other => {
            return Err(ColError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                other
            )))
        }
    };

    Ok(Response {
        status,
        payload: payload.to_vec(),
    })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete frame (header + payload) from a stream
fn read_frame<R: Read>(reader: &mut R, what: &str) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let parsed = parse_header(&header, what)?;

    let mut message = Vec::with_capacity(HEADER_SIZE + parsed.payload_len);
    message.extend_from_slice(&header);
    message.resize(HEADER_SIZE + parsed.payload_len, 0);
    if parsed.payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }
    Ok(message)
}

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let message = read_frame(reader, "command")?;
    decode_command(&message)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader, "response")?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
