//! `[address:]port` parsing for listener arguments.

use std::fmt;
use std::net::TcpListener;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AddrError {
    #[error("illegal port")]
    IllegalPort,
}

/// A listen address: bare ports bind the wildcard address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPort {
    pub host: String,
    pub port: u16,
}

impl HostPort {
    pub fn bind(&self) -> std::io::Result<TcpListener> {
        TcpListener::bind((self.host.as_str(), self.port))
    }
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Parse `host:port` or a bare `port` (host defaults to `0.0.0.0`). Port
/// must be in `1..65535`, matching the historical contract.
pub fn parse_address(arg: &str) -> Result<HostPort, AddrError> {
    let (host, port) = match arg.split_once(':') {
        Some((host, port)) => (host.to_string(), port),
        None => ("0.0.0.0".to_string(), arg),
    };

    let port: u32 = port.parse().map_err(|_| AddrError::IllegalPort)?;
    if port == 0 || port >= 65535 {
        return Err(AddrError::IllegalPort);
    }

    Ok(HostPort {
        host,
        port: port as u16,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_port_binds_wildcard() {
        let hp = parse_address("8000").unwrap();
        assert_eq!(hp.host, "0.0.0.0");
        assert_eq!(hp.port, 8000);
        assert_eq!(hp.to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn host_and_port() {
        let hp = parse_address("127.0.0.1:443").unwrap();
        assert_eq!(hp.host, "127.0.0.1");
        assert_eq!(hp.port, 443);
    }

    #[test]
    fn port_boundaries() {
        assert!(parse_address("1").is_ok());
        assert!(parse_address("65534").is_ok());
        assert!(matches!(parse_address("0"), Err(AddrError::IllegalPort)));
        assert!(matches!(parse_address("65535"), Err(AddrError::IllegalPort)));
        assert!(matches!(parse_address("65536"), Err(AddrError::IllegalPort)));
        assert!(matches!(parse_address("http"), Err(AddrError::IllegalPort)));
        assert!(matches!(parse_address(""), Err(AddrError::IllegalPort)));
        assert!(matches!(
            parse_address("localhost:"),
            Err(AddrError::IllegalPort)
        ));
    }
}
