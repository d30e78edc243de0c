//! Response definitions
//!
//! Represents responses to clients.

use crate::error::{LeaseError, Result};
use crate::store::Value;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (encoded value for OK, error message for ERROR)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response carrying a value
    pub fn ok(value: &Value) -> Result<Self> {
        Ok(Self {
            status: Status::Ok,
            payload: Some(bincode::serialize(value)?),
        })
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            payload: None,
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Map a value to OK, or NOT_FOUND for `Nil`
    pub fn from_value(value: &Value) -> Result<Self> {
        if value.is_nil() {
            Ok(Self::not_found())
        } else {
            Self::ok(value)
        }
    }

    /// Turn a response back into a value, surfacing ERROR as a store error
    pub fn into_value(self) -> Result<Value> {
        match self.status {
            Status::Ok => {
                let payload = self.payload.ok_or_else(|| {
                    LeaseError::Protocol("OK response without payload".to_string())
                })?;
                Ok(bincode::deserialize(&payload)?)
            }
            Status::NotFound => Ok(Value::Nil),
            Status::Error => {
                let message = self
                    .payload
                    .map(|p| String::from_utf8_lossy(&p).into_owned())
                    .unwrap_or_default();
                Err(LeaseError::Store(message))
            }
        }
    }
}
