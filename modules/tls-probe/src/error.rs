use std::time::Duration;
use thiserror::Error;

/// Why a probe did not produce a handshake. The `Display` text is what gets recorded in
/// [`crate::ProbeResult`]'s `error` field.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to build TLS client configuration: {0}")]
    Config(#[from] rustls::Error),

    #[error("invalid server name: {0}")]
    ServerName(String),

    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to resolve {0}: no addresses returned")]
    NoAddress(String),

    #[error("connection failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("tls handshake failed: {0}")]
    Handshake(#[source] std::io::Error),

    #[error("timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("peer certificate could not be decoded: {0}")]
    Certificate(String),

    #[error("probe task failed: {0}")]
    Task(String),
}
