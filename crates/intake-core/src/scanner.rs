//! Malware scanning through a clamd daemon
//!
//! Speaks the null-terminated ("z"-prefixed) clamd commands over TCP:
//! `zPING` for the availability handshake and `zINSTREAM` to stream a
//! document as length-prefixed chunks.

use std::io::{Read, Write};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use service_probe::{ProbeError, ServiceEndpoint, TcpEndpoint};
use thiserror::Error;
use tracing::debug;

/// What to do when the scanner cannot give a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanPolicy {
    /// Continue to structural validation and log the bypass
    FailOpen,
    /// Reject with `scan-unavailable`
    #[default]
    FailClosed,
}

impl FromStr for ScanPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-open" | "open" => Ok(ScanPolicy::FailOpen),
            "fail-closed" | "closed" => Ok(ScanPolicy::FailClosed),
            other => Err(format!("unknown scan policy '{}'", other)),
        }
    }
}

impl std::fmt::Display for ScanPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanPolicy::FailOpen => f.write_str("fail-open"),
            ScanPolicy::FailClosed => f.write_str("fail-closed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanVerdict {
    Clean,
    Infected(String),
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Connect(#[from] ProbeError),

    #[error("Scanner I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The daemon answered but refused this stream (size limit, bad input)
    #[error("Scanner refused the document: {0}")]
    Refused(String),

    #[error("Unexpected scanner reply: {0}")]
    Protocol(String),
}

impl ScanError {
    /// Whether the error says the daemon itself cannot be reached or trusted,
    /// as opposed to a problem scanning this one document
    pub fn is_service_failure(&self) -> bool {
        !matches!(self, ScanError::Refused(_))
    }
}

/// A scanner that is also a probe target
pub trait MalwareScanner: Send + Sync {
    fn endpoint(&self) -> &dyn ServiceEndpoint;

    fn scan(&self, bytes: &[u8]) -> Result<ScanVerdict, ScanError>;
}

/// Client for a clamd daemon listening on TCP
#[derive(Debug, Clone)]
pub struct ClamdScanner {
    endpoint: TcpEndpoint,
    chunk_size: usize,
}

impl ClamdScanner {
    pub const DEFAULT_PORT: u16 = 3310;
    const CHUNK_SIZE: usize = 64 * 1024;

    pub fn new(host: &str, port: u16, timeout: Duration) -> Self {
        Self {
            endpoint: TcpEndpoint::new("clamd", host, port, timeout),
            chunk_size: Self::CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn ping(&self) -> Result<(), ScanError> {
        let mut stream = self.endpoint.connect()?;
        stream.write_all(b"zPING\0")?;
        let reply = read_reply(&mut stream)?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(ScanError::Protocol(reply))
        }
    }
}

impl ServiceEndpoint for ClamdScanner {
    fn name(&self) -> &str {
        self.endpoint.name()
    }

    fn is_present(&self) -> bool {
        self.endpoint.is_present()
    }

    fn handshake(&self) -> Result<(), ProbeError> {
        self.ping()
            .map_err(|e| ProbeError::Handshake(self.endpoint.name.clone(), e.to_string()))
    }
}

impl MalwareScanner for ClamdScanner {
    fn endpoint(&self) -> &dyn ServiceEndpoint {
        self
    }

    fn scan(&self, bytes: &[u8]) -> Result<ScanVerdict, ScanError> {
        let mut stream = self.endpoint.connect()?;
        stream.write_all(b"zINSTREAM\0")?;
        for chunk in bytes.chunks(self.chunk_size) {
            stream.write_all(&(chunk.len() as u32).to_be_bytes())?;
            stream.write_all(chunk)?;
        }
        stream.write_all(&0u32.to_be_bytes())?;
        stream.flush()?;

        let reply = read_reply(&mut stream)?;
        debug!("clamd replied: {}", reply);
        parse_verdict(&reply)
    }
}

/// Read until the terminating NUL or EOF
fn read_reply<R: Read>(reader: &mut R) -> Result<String, ScanError> {
    let mut reply = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte)? {
            0 => break,
            _ if byte[0] == 0 => break,
            _ => reply.push(byte[0]),
        }
    }
    Ok(String::from_utf8_lossy(&reply).trim().to_string())
}

/// `stream: OK`, `stream: <signature> FOUND` or `<message> ERROR`
pub fn parse_verdict(reply: &str) -> Result<ScanVerdict, ScanError> {
    let body = reply.strip_prefix("stream:").unwrap_or(reply).trim();
    if body == "OK" {
        return Ok(ScanVerdict::Clean);
    }
    if let Some(signature) = body.strip_suffix("FOUND") {
        return Ok(ScanVerdict::Infected(signature.trim().to_string()));
    }
    if let Some(message) = body.strip_suffix("ERROR") {
        return Err(ScanError::Refused(message.trim().to_string()));
    }
    Err(ScanError::Protocol(reply.to_string()))
}
