//! Protocol Module
//!
//! Defines the wire protocol between [`crate::store::RemoteStore`] and the
//! server.
//!
//! ## Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │   Payload (bincode Command) │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: SETNX     0x02: SETNX_EX   0x03: GET     0x04: GETSET
//! - 0x05: INCR      0x06: EXPIRE     0x07: TTL     0x08: DEL
//! - 0x09: EVAL      0x0A: PING
//!
//! ## Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │   Payload                   │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK (payload is a bincode `Value`)
//! - 0x01: NOT_FOUND (empty payload)
//! - 0x02: ERROR (payload is a UTF-8 message)

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{
    encode_command, decode_command, encode_response, decode_response,
    read_command, write_command, read_response, write_response,
    HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
