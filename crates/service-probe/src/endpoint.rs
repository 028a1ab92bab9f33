//! Reachability targets

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("{0} is not reachable: {1}")]
    Unreachable(String, String),

    #[error("{0} handshake failed: {1}")]
    Handshake(String, String),
}

/// Something the probe can check for reachability
pub trait ServiceEndpoint {
    fn name(&self) -> &str;

    /// Cheap presence check. A negative answer short-circuits the probe
    /// without attempting [`handshake`](Self::handshake), which can hang
    /// against a host that is not running.
    fn is_present(&self) -> bool;

    /// The real protocol-level handshake
    fn handshake(&self) -> Result<(), ProbeError>;
}

/// Resolve `host:port`; an empty result counts as absent
pub fn resolve(host: &str, port: u16) -> Option<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs().ok()?.collect();
    if addrs.is_empty() {
        None
    } else {
        Some(addrs)
    }
}

/// Plain TCP endpoint: present if the host resolves, up if it accepts a connection
#[derive(Debug, Clone)]
pub struct TcpEndpoint {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl TcpEndpoint {
    pub fn new(name: &str, host: &str, port: u16, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            host: host.to_string(),
            port,
            timeout,
        }
    }

    /// Open a connection to the first address that accepts within the timeout
    pub fn connect(&self) -> Result<TcpStream, ProbeError> {
        let addrs = resolve(&self.host, self.port).ok_or_else(|| {
            ProbeError::Unreachable(self.name.clone(), format!("cannot resolve {}", self.host))
        })?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(Some(self.timeout))
                        .and_then(|_| stream.set_write_timeout(Some(self.timeout)))
                        .map_err(|e| ProbeError::Handshake(self.name.clone(), e.to_string()))?;
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(ProbeError::Unreachable(
            self.name.clone(),
            last_err.map(|e| e.to_string()).unwrap_or_default(),
        ))
    }
}

impl ServiceEndpoint for TcpEndpoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_present(&self) -> bool {
        resolve(&self.host, self.port).is_some()
    }

    fn handshake(&self) -> Result<(), ProbeError> {
        self.connect().map(|_| ())
    }
}
