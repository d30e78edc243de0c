//! Command definitions
//!
//! Represents store requests from clients.

use serde::{Deserialize, Serialize};

/// Command types (the header's first byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    SetNx = 0x01,
    SetNxEx = 0x02,
    Get = 0x03,
    GetSet = 0x04,
    Incr = 0x05,
    Expire = 0x06,
    Ttl = 0x07,
    Delete = 0x08,
    Eval = 0x09,
    Ping = 0x0A,
}

impl CommandType {
    /// Parse a header byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        let cmd = match byte {
            0x01 => CommandType::SetNx,
            0x02 => CommandType::SetNxEx,
            0x03 => CommandType::Get,
            0x04 => CommandType::GetSet,
            0x05 => CommandType::Incr,
            0x06 => CommandType::Expire,
            0x07 => CommandType::Ttl,
            0x08 => CommandType::Delete,
            0x09 => CommandType::Eval,
            0x0A => CommandType::Ping,
            _ => return None,
        };
        Some(cmd)
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Set only if the key is absent
    SetNx { key: String, value: String },

    /// Set only if absent, with a TTL
    SetNxEx {
        key: String,
        value: String,
        ttl_secs: u64,
    },

    /// Get a value by key
    Get { key: String },

    /// Replace a value, returning the previous one
    GetSet { key: String, value: String },

    /// Increment an integer value
    Incr { key: String },

    /// Set a TTL in seconds
    Expire { key: String, ttl_secs: u64 },

    /// Remaining TTL in seconds
    Ttl { key: String },

    /// Delete a key
    Delete { key: String },

    /// Run a registered script
    Eval {
        script: String,
        keys: Vec<String>,
        args: Vec<String>,
    },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::SetNx { .. } => CommandType::SetNx,
            Command::SetNxEx { .. } => CommandType::SetNxEx,
            Command::Get { .. } => CommandType::Get,
            Command::GetSet { .. } => CommandType::GetSet,
            Command::Incr { .. } => CommandType::Incr,
            Command::Expire { .. } => CommandType::Expire,
            Command::Ttl { .. } => CommandType::Ttl,
            Command::Delete { .. } => CommandType::Delete,
            Command::Eval { .. } => CommandType::Eval,
            Command::Ping => CommandType::Ping,
        }
    }
}
