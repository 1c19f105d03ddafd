use std::io;
use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error("failed to join multicast group {group}: {source}")]
    JoinMulticast { group: Ipv4Addr, source: io::Error },
    #[error("failed to leave multicast group {group}: {source}")]
    DropMulticast { group: Ipv4Addr, source: io::Error },
    #[error("failed to send to {target}: {source}")]
    Send { target: SocketAddr, source: io::Error },
    #[error("socket setup failed: {0}")]
    Io(#[from] io::Error),
    #[error("no tokio runtime available on this thread")]
    NoRuntime,
}
