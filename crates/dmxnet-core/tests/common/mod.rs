#![allow(dead_code)]

use std::collections::BTreeSet;
use std::net::{Ipv4Addr, SocketAddr};

use dmxnet_core::transport::{Datagram, DatagramHandler, DatagramTransport, TransportError};
use parking_lot::Mutex;

/// In-memory transport: records sends and memberships, lets tests inject
/// datagrams through the installed handler.
pub struct MemoryTransport {
    local: SocketAddr,
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    bound: bool,
    handler: Option<DatagramHandler>,
    groups: BTreeSet<Ipv4Addr>,
    joins: Vec<Ipv4Addr>,
    drops: Vec<Ipv4Addr>,
    sent: Vec<(Vec<u8>, SocketAddr)>,
    fail_sends: bool,
    short_writes: bool,
    fail_joins: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            local: "127.0.0.1:0".parse().unwrap(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    pub fn inject(&self, payload: Vec<u8>, source: SocketAddr) {
        let handler = self.state.lock().handler.clone();
        let handler = handler.expect("transport is not listening");
        handler(Datagram::new(payload, source));
    }

    pub fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        self.state.lock().sent.clone()
    }

    pub fn joins(&self) -> Vec<Ipv4Addr> {
        self.state.lock().joins.clone()
    }

    pub fn drops(&self) -> Vec<Ipv4Addr> {
        self.state.lock().drops.clone()
    }

    pub fn set_fail_sends(&self, fail: bool) {
        self.state.lock().fail_sends = fail;
    }

    pub fn set_short_writes(&self, short: bool) {
        self.state.lock().short_writes = short;
    }

    pub fn set_fail_joins(&self, fail: bool) {
        self.state.lock().fail_joins = fail;
    }

    fn record_send(&self, payload: &[u8], target: SocketAddr) -> Result<usize, TransportError> {
        let mut state = self.state.lock();
        if state.fail_sends {
            return Err(TransportError::Send {
                target,
                source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            });
        }
        state.sent.push((payload.to_vec(), target));
        if state.short_writes {
            return Ok(payload.len() / 2);
        }
        Ok(payload.len())
    }
}

impl DatagramTransport for MemoryTransport {
    fn local_endpoint(&self) -> SocketAddr {
        self.local
    }

    fn bind(&self) -> Result<(), TransportError> {
        self.state.lock().bound = true;
        Ok(())
    }

    fn is_bound(&self) -> bool {
        self.state.lock().bound
    }

    fn start_listening(&self, handler: DatagramHandler) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.bound = true;
        if state.handler.is_none() {
            state.handler = Some(handler);
        }
        Ok(())
    }

    async fn stop_listening(&self) {
        let mut state = self.state.lock();
        state.handler = None;
        state.bound = false;
    }

    fn is_listening(&self) -> bool {
        self.state.lock().handler.is_some()
    }

    fn join_multicast_group(&self, group: Ipv4Addr) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.fail_joins {
            return Err(TransportError::JoinMulticast {
                group,
                source: std::io::Error::from(std::io::ErrorKind::AddrNotAvailable),
            });
        }
        if state.groups.insert(group) {
            state.joins.push(group);
        }
        Ok(())
    }

    fn drop_multicast_group(&self, group: Ipv4Addr) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.groups.remove(&group) {
            state.drops.push(group);
        }
        Ok(())
    }

    fn multicast_groups(&self) -> Vec<Ipv4Addr> {
        self.state.lock().groups.iter().copied().collect()
    }

    fn send_to(&self, payload: &[u8], target: SocketAddr) -> Result<usize, TransportError> {
        self.record_send(payload, target)
    }

    async fn send_to_async(
        &self,
        payload: &[u8],
        target: SocketAddr,
    ) -> Result<usize, TransportError> {
        self.record_send(payload, target)
    }
}
