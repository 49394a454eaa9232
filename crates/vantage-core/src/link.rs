//! Console link transports and connection-string parsing.
//!
//! A Vantage console is reached either directly over a serial line or over
//! TCP via a serial bridge. This crate ships the TCP transport; anything
//! that implements [`Transport`] (blocking read/write) can drive a
//! [`Station`](crate::station::Station), so other transports plug in from
//! the outside.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::error::{ConnectivityReason, Error, Result};

/// A blocking byte link to a console.
pub trait Transport: Read + Write + Send {
    /// Discard any bytes the peer already buffered.
    ///
    /// Called before issuing a command so a stale reply cannot be
    /// mistaken for the new one. Transports without a receive buffer
    /// worth clearing keep the no-op default.
    fn drain(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A parsed connection string.
///
/// The accepted form is `tcp:host:port`, e.g. `tcp:192.168.1.18:1111`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LinkUrl {
    /// TCP connection through a serial bridge.
    Tcp {
        /// Host name or address of the bridge.
        host: String,
        /// TCP port the console is exposed on.
        port: u16,
    },
}

impl LinkUrl {
    /// Parse a connection string.
    pub fn parse(url: &str) -> Result<Self> {
        let mut parts = url.splitn(3, ':');
        let scheme = parts.next().unwrap_or_default();
        match scheme {
            "tcp" => {
                let host = parts
                    .next()
                    .filter(|h| !h.is_empty())
                    .ok_or_else(|| Error::invalid_url(url, "missing host"))?;
                let port = parts
                    .next()
                    .ok_or_else(|| Error::invalid_url(url, "missing port"))?
                    .parse::<u16>()
                    .map_err(|e| Error::invalid_url(url, format!("bad port: {}", e)))?;
                Ok(LinkUrl::Tcp {
                    host: host.to_string(),
                    port,
                })
            }
            other => Err(Error::invalid_url(
                url,
                format!("unsupported link scheme '{}', expected 'tcp'", other),
            )),
        }
    }
}

impl std::fmt::Display for LinkUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tcp { host, port } => write!(f, "tcp:{}:{}", host, port),
        }
    }
}

/// Blocking TCP transport with a per-operation read/write timeout.
#[derive(Debug)]
pub struct TcpLink {
    stream: TcpStream,
    timeout: Duration,
}

impl TcpLink {
    /// Connect to a console behind a TCP serial bridge.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let url = format!("tcp:{}:{}", host, port);
        let addr = (host, port)
            .to_socket_addrs()
            .map_err(|e| {
                Error::connectivity(
                    Some(url.clone()),
                    ConnectivityReason::Unreachable(e.to_string()),
                )
            })?
            .next()
            .ok_or_else(|| {
                Error::connectivity(
                    Some(url.clone()),
                    ConnectivityReason::Unreachable("address did not resolve".into()),
                )
            })?;

        debug!("Connecting to {} (timeout {:?})", url, timeout);
        let stream = TcpStream::connect_timeout(&addr, timeout).map_err(|e| {
            Error::connectivity(
                Some(url.clone()),
                ConnectivityReason::Unreachable(e.to_string()),
            )
        })?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;

        Ok(Self { stream, timeout })
    }

    /// The configured per-operation timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Transport for TcpLink {
    fn drain(&mut self) -> io::Result<()> {
        self.stream.set_read_timeout(Some(Duration::from_millis(50)))?;
        let mut scratch = [0u8; 256];
        loop {
            match self.stream.read(&mut scratch) {
                Ok(0) => break,
                Ok(_) => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) => {
                    self.stream.set_read_timeout(Some(self.timeout))?;
                    return Err(e);
                }
            }
        }
        self.stream.set_read_timeout(Some(self.timeout))?;
        Ok(())
    }
}

impl Read for TcpLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for TcpLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}
