//! Line protocol spoken between clients and the cache server.
//!
//! A request is one line: `STORE <key> <value>`, `RETRIEVE <key>`,
//! `DELETE <key>`, `PING`, `INFO` or `QUIT`. Verbs are case-sensitive and
//! tokens are separated by whitespace, so neither keys nor values can contain
//! spaces. A value with spaces is rejected rather than cut at the first one.
//! A response is one line.

use std::fmt;

use bytes::Bytes;
use cachestore::{StatsSnapshot, StoreError};
use corelib::NodeId;

/// A parsed client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `STORE <key> <value>`
    Store { key: String, value: Bytes },
    /// `RETRIEVE <key>`
    Retrieve { key: String },
    /// `DELETE <key>`
    Delete { key: String },
    /// `PING`
    Ping,
    /// `INFO`: per-node counters
    Info,
    /// `QUIT`: the server replies and closes the connection
    Quit,
}

impl Request {
    /// Parse one request line. A trailing `\n` or `\r\n` is ignored.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let mut tokens = line.split_whitespace();

        let request = match tokens.next() {
            Some("STORE") => {
                let key = tokens.next().ok_or(ProtocolError::MissingKey)?;
                let value = tokens.next().ok_or(ProtocolError::MissingValue)?;
                if tokens.next().is_some() {
                    return Err(ProtocolError::ValueNotSingleToken);
                }
                return Ok(Request::Store {
                    key: key.to_owned(),
                    value: Bytes::copy_from_slice(value.as_bytes()),
                });
            }
            Some("RETRIEVE") => Request::Retrieve {
                key: tokens.next().ok_or(ProtocolError::MissingKey)?.to_owned(),
            },
            Some("DELETE") => Request::Delete {
                key: tokens.next().ok_or(ProtocolError::MissingKey)?.to_owned(),
            },
            Some("PING") => Request::Ping,
            Some("INFO") => Request::Info,
            Some("QUIT") => Request::Quit,
            _ => return Err(ProtocolError::UnknownCommand),
        };

        if tokens.next().is_some() {
            return Err(ProtocolError::TooManyArguments);
        }
        Ok(request)
    }
}

/// Malformed request lines. The message is what the client sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Unknown command")]
    UnknownCommand,
    #[error("Missing key")]
    MissingKey,
    #[error("Missing value")]
    MissingValue,
    #[error("Value must be a single token")]
    ValueNotSingleToken,
    #[error("Too many arguments")]
    TooManyArguments,
    #[error("Line too long")]
    LineTooLong,
    #[error("Invalid UTF-8")]
    InvalidEncoding,
}

/// Reply to one request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Stored,
    Value(Bytes),
    NotFound,
    Deleted,
    Pong,
    /// Counters for every registered node, in ascending id order.
    Info(Vec<(NodeId, StatsSnapshot)>),
    /// Last reply on a connection.
    Bye,
    CacheFull,
    KeyEmpty,
    KeyTooLong,
    ValueTooLong,
    /// The ring has no nodes to route to.
    NoNodes,
    Protocol(ProtocolError),
}

impl Response {
    /// Wire form of the response, newline terminated.
    pub fn to_line(&self) -> Vec<u8> {
        let mut line = match self {
            Response::Value(value) => value.to_vec(),
            other => other.to_string().into_bytes(),
        };
        line.push(b'\n');
        line
    }

    /// True for every response that reports a failed or rejected request.
    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            Response::Stored
                | Response::Value(_)
                | Response::Deleted
                | Response::Pong
                | Response::Info(_)
                | Response::Bye
        )
    }

    /// True if the server closes the connection after sending this reply.
    pub fn closes_connection(&self) -> bool {
        matches!(self, Response::Bye | Response::Protocol(ProtocolError::LineTooLong))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Stored => f.write_str("Stored"),
            Response::Value(value) => f.write_str(&String::from_utf8_lossy(value)),
            Response::NotFound => f.write_str("Not found"),
            Response::Deleted => f.write_str("Deleted"),
            Response::Pong => f.write_str("PONG"),
            Response::Info(nodes) => {
                write!(f, "nodes={}", nodes.len())?;
                for (node_id, s) in nodes {
                    write!(
                        f,
                        "; {} entries={} hits={} misses={} inserts={} deletes={} rejections={}",
                        node_id, s.entries, s.hits, s.misses, s.inserts, s.deletes, s.rejections
                    )?;
                }
                Ok(())
            }
            Response::Bye => f.write_str("Bye"),
            Response::CacheFull => f.write_str("Cache is full!"),
            Response::KeyEmpty => f.write_str("Key must not be empty"),
            Response::KeyTooLong => f.write_str("Key too long"),
            Response::ValueTooLong => f.write_str("Value too long"),
            Response::NoNodes => f.write_str("No nodes available"),
            Response::Protocol(e) => write!(f, "{}", e),
        }
    }
}

impl From<StoreError> for Response {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Full { .. } => Response::CacheFull,
            StoreError::KeyEmpty => Response::KeyEmpty,
            StoreError::KeyTooLong { .. } => Response::KeyTooLong,
            StoreError::ValueTooLong { .. } => Response::ValueTooLong,
        }
    }
}

impl From<ProtocolError> for Response {
    fn from(err: ProtocolError) -> Self {
        Response::Protocol(err)
    }
}
