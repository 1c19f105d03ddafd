//! UDP transport.
//!
//! Owns socket lifecycle only: bind, broadcast, multicast membership, the
//! receive loop and sends. Nothing here knows about lighting protocols; the
//! engine talks to it through [`DatagramTransport`], which also lets tests
//! drive the engine without real sockets.

mod error;
mod socket;
mod udp;

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

pub use error::TransportError;
pub use udp::UdpTransport;

/// Largest datagram the receive loop accepts.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// One received UDP payload and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub payload: Vec<u8>,
    pub source: SocketAddr,
}

impl Datagram {
    pub fn new(payload: Vec<u8>, source: SocketAddr) -> Self {
        Self { payload, source }
    }
}

/// Callback invoked by the receive loop for every datagram.
pub type DatagramHandler = Arc<dyn Fn(Datagram) + Send + Sync>;

pub trait DatagramTransport: Send + Sync + 'static {
    /// Address the transport binds to (adapter address and protocol port).
    fn local_endpoint(&self) -> SocketAddr;

    /// Binds the socket. Calling it on a bound transport is a no-op.
    fn bind(&self) -> Result<(), TransportError>;

    fn is_bound(&self) -> bool;

    /// Binds if needed and starts the receive loop. A no-op while a loop is
    /// already running.
    fn start_listening(&self, handler: DatagramHandler) -> Result<(), TransportError>;

    /// Cancels the receive loop, waits for it to finish and releases the
    /// socket. Multicast memberships survive and are re-applied on the next bind.
    fn stop_listening(&self) -> impl Future<Output = ()> + Send;

    fn is_listening(&self) -> bool;

    /// Joins `group`. Joining a group twice is a no-op.
    fn join_multicast_group(&self, group: Ipv4Addr) -> Result<(), TransportError>;

    /// Leaves `group`. Leaving a group that was never joined is a no-op.
    fn drop_multicast_group(&self, group: Ipv4Addr) -> Result<(), TransportError>;

    fn multicast_groups(&self) -> Vec<Ipv4Addr>;

    /// Sends one datagram, returning the number of bytes written.
    fn send_to(&self, payload: &[u8], target: SocketAddr) -> Result<usize, TransportError>;

    fn send_to_async(
        &self,
        payload: &[u8],
        target: SocketAddr,
    ) -> impl Future<Output = Result<usize, TransportError>> + Send;
}
