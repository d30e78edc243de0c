//! Remote store
//!
//! [`KeyValueStore`] over TCP. Each call opens its own connection, sends one
//! command, reads one response, and closes the connection, so nothing is held
//! open across a caller's retry loop.

use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::{KeyValueStore, Value};
use crate::error::{LeaseError, Result};
use crate::protocol::{read_response, write_command, Command};
use crate::script::Script;

/// Client side of the networked store
#[derive(Debug, Clone)]
pub struct RemoteStore {
    addr: SocketAddr,
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl RemoteStore {
    /// Resolve `addr` and use 1s connect / 5s I/O timeouts
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| LeaseError::Network("address resolved to nothing".to_string()))?;
        Ok(Self {
            addr,
            connect_timeout: Duration::from_secs(1),
            io_timeout: Duration::from_secs(5),
        })
    }

    pub fn with_timeouts(mut self, connect: Duration, io: Duration) -> Self {
        self.connect_timeout = connect;
        self.io_timeout = io;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Health check
    pub fn ping(&self) -> Result<bool> {
        Ok(self.call(Command::Ping)? == Value::Text("PONG".to_string()))
    }

    /// One round trip on a fresh connection
    fn call(&self, command: Command) -> Result<Value> {
        let stream = TcpStream::connect_timeout(&self.addr, self.connect_timeout).map_err(|e| {
            LeaseError::Network(format!("connect to {} failed: {}", self.addr, e))
        })?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(self.io_timeout))?;
        stream.set_write_timeout(Some(self.io_timeout))?;

        let mut writer = BufWriter::new(stream.try_clone()?);
        let mut reader = BufReader::new(stream);

        tracing::trace!(addr = %self.addr, ?command, "sending command");
        write_command(&mut writer, &command)?;
        read_response(&mut reader)?.into_value()
    }

    fn call_flag(&self, command: Command) -> Result<bool> {
        match self.call(command)? {
            Value::Int(n) => Ok(n == 1),
            other => Err(unexpected(other)),
        }
    }

    fn call_text(&self, command: Command) -> Result<Option<String>> {
        match self.call(command)? {
            Value::Nil => Ok(None),
            Value::Text(s) => Ok(Some(s)),
            other => Err(unexpected(other)),
        }
    }

    fn call_int(&self, command: Command) -> Result<i64> {
        self.call(command)?
            .as_int()
            .ok_or_else(|| LeaseError::Protocol("expected integer reply".to_string()))
    }
}

fn unexpected(value: Value) -> LeaseError {
    LeaseError::Protocol(format!("unexpected reply: {:?}", value))
}

impl KeyValueStore for RemoteStore {
    fn set_if_absent(&self, key: &str, value: &str) -> Result<bool> {
        self.call_flag(Command::SetNx {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn set_if_absent_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<bool> {
        self.call_flag(Command::SetNxEx {
            key: key.to_string(),
            value: value.to_string(),
            ttl_secs,
        })
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.call_text(Command::Get {
            key: key.to_string(),
        })
    }

    fn get_and_replace(&self, key: &str, value: &str) -> Result<Option<String>> {
        self.call_text(Command::GetSet {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn incr(&self, key: &str) -> Result<i64> {
        self.call_int(Command::Incr {
            key: key.to_string(),
        })
    }

    fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool> {
        self.call_flag(Command::Expire {
            key: key.to_string(),
            ttl_secs,
        })
    }

    fn ttl(&self, key: &str) -> Result<Option<u64>> {
        match self.call(Command::Ttl {
            key: key.to_string(),
        })? {
            Value::Nil => Ok(None),
            Value::Int(secs) => Ok(Some(secs.max(0) as u64)),
            other => Err(unexpected(other)),
        }
    }

    fn delete(&self, key: &str) -> Result<u64> {
        Ok(self
            .call_int(Command::Delete {
                key: key.to_string(),
            })?
            .max(0) as u64)
    }

    /// The script runs server-side; only its registered name travels
    fn run_script(&self, script: &dyn Script, keys: &[String], args: &[String]) -> Result<Value> {
        self.call(Command::Eval {
            script: script.name().to_string(),
            keys: keys.to_vec(),
            args: args.to_vec(),
        })
    }
}
