use std::collections::BTreeSet;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket as StdUdpSocket};
use std::sync::Arc;

use parking_lot::Mutex;
use socket2::Socket;
use tokio::net::UdpSocket as TokioUdpSocket;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use super::socket::{is_transient_receive_error, multicast_interface, open_ephemeral, open_socket};
use super::{Datagram, DatagramHandler, DatagramTransport, MAX_DATAGRAM_SIZE, TransportError};

/// UDP transport over one socket bound to the adapter address and protocol port.
///
/// The socket is created unbound at construction with broadcast and address
/// reuse enabled. Sends issued while unbound go out through an ephemeral
/// socket on the same adapter, so an output-only host never claims the
/// protocol port.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use dmxnet_core::transport::{DatagramTransport, UdpTransport};
///
/// # async fn run() -> Result<(), dmxnet_core::transport::TransportError> {
/// let transport = UdpTransport::new("0.0.0.0:6454".parse().unwrap())?;
/// transport.start_listening(Arc::new(|datagram| {
///     println!("{} bytes from {}", datagram.payload.len(), datagram.source);
/// }))?;
/// transport.stop_listening().await;
/// # Ok(())
/// # }
/// ```
pub struct UdpTransport {
    local: SocketAddr,
    inner: Mutex<TransportInner>,
}

struct TransportInner {
    unbound: Option<Socket>,
    bound: Option<BoundSocket>,
    groups: BTreeSet<Ipv4Addr>,
    listener: Option<Listener>,
    ephemeral_sync: Option<Arc<StdUdpSocket>>,
    ephemeral_async: Option<Arc<TokioUdpSocket>>,
}

/// Two handles onto the same bound socket: one for the receive loop and
/// async sends, one for blocking-free sends from threads without a runtime.
#[derive(Clone)]
struct BoundSocket {
    sync: Arc<StdUdpSocket>,
    tokio: Arc<TokioUdpSocket>,
}

struct Listener {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl UdpTransport {
    pub fn new(local: SocketAddr) -> Result<Self, TransportError> {
        let socket = open_socket(local)?;
        Ok(Self {
            local,
            inner: Mutex::new(TransportInner {
                unbound: Some(socket),
                bound: None,
                groups: BTreeSet::new(),
                listener: None,
                ephemeral_sync: None,
                ephemeral_async: None,
            }),
        })
    }

    /// Actual bound address, which differs from [`local_endpoint`] when the
    /// requested port was 0.
    ///
    /// [`local_endpoint`]: DatagramTransport::local_endpoint
    pub fn bound_addr(&self) -> Option<SocketAddr> {
        let inner = self.inner.lock();
        inner
            .bound
            .as_ref()
            .and_then(|bound| bound.sync.local_addr().ok())
    }

    fn interface(&self) -> Ipv4Addr {
        multicast_interface(self.local).unwrap_or(Ipv4Addr::UNSPECIFIED)
    }

    fn sync_send_socket(&self) -> Result<Arc<StdUdpSocket>, TransportError> {
        let mut inner = self.inner.lock();
        if let Some(bound) = &inner.bound {
            return Ok(Arc::clone(&bound.sync));
        }
        if let Some(socket) = &inner.ephemeral_sync {
            return Ok(Arc::clone(socket));
        }
        let socket: StdUdpSocket = open_ephemeral(self.local)?.into();
        let socket = Arc::new(socket);
        inner.ephemeral_sync = Some(Arc::clone(&socket));
        Ok(socket)
    }

    fn async_send_socket(&self) -> Result<Arc<TokioUdpSocket>, TransportError> {
        let mut inner = self.inner.lock();
        if let Some(bound) = &inner.bound {
            return Ok(Arc::clone(&bound.tokio));
        }
        if let Some(socket) = &inner.ephemeral_async {
            return Ok(Arc::clone(socket));
        }
        Handle::try_current().map_err(|_| TransportError::NoRuntime)?;
        let socket = open_ephemeral(self.local)?;
        socket.set_nonblocking(true)?;
        let socket = Arc::new(TokioUdpSocket::from_std(socket.into())?);
        inner.ephemeral_async = Some(Arc::clone(&socket));
        Ok(socket)
    }

    /// Drops the bound socket and prepares a fresh unbound one carrying the
    /// current multicast memberships.
    fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.bound.take().is_none() {
            return;
        }
        match open_socket(self.local) {
            Ok(socket) => {
                for group in &inner.groups {
                    if let Err(err) = socket.join_multicast_v4(group, &self.interface()) {
                        warn!(group = %group, error = %err, "failed to re-join multicast group");
                    }
                }
                inner.unbound = Some(socket);
            }
            Err(err) => warn!(error = %err, "failed to reopen UDP socket"),
        }
        debug!(local = %self.local, "UDP socket closed");
    }
}

impl DatagramTransport for UdpTransport {
    fn local_endpoint(&self) -> SocketAddr {
        self.local
    }

    fn bind(&self) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if inner.bound.is_some() {
            return Ok(());
        }
        Handle::try_current().map_err(|_| TransportError::NoRuntime)?;

        let socket = match inner.unbound.take() {
            Some(socket) => socket,
            None => open_socket(self.local)?,
        };
        if let Err(source) = socket.bind(&self.local.into()) {
            warn!(local = %self.local, error = %source, "failed to bind UDP socket");
            inner.unbound = Some(socket);
            return Err(TransportError::Bind {
                addr: self.local,
                source,
            });
        }
        socket.set_nonblocking(true)?;

        let std_socket: StdUdpSocket = socket.into();
        let sync = Arc::new(std_socket.try_clone()?);
        let tokio = Arc::new(TokioUdpSocket::from_std(std_socket)?);
        inner.bound = Some(BoundSocket { sync, tokio });
        info!(local = %self.local, "UDP socket bound");
        Ok(())
    }

    fn is_bound(&self) -> bool {
        self.inner.lock().bound.is_some()
    }

    fn start_listening(&self, handler: DatagramHandler) -> Result<(), TransportError> {
        self.bind()?;
        let mut inner = self.inner.lock();
        if inner
            .listener
            .as_ref()
            .is_some_and(|listener| !listener.task.is_finished())
        {
            return Ok(());
        }
        let Some(bound) = inner.bound.clone() else {
            return Err(TransportError::Bind {
                addr: self.local,
                source: std::io::Error::from(std::io::ErrorKind::NotConnected),
            });
        };
        let runtime = Handle::try_current().map_err(|_| TransportError::NoRuntime)?;

        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = runtime.spawn(receive_loop(bound.tokio, handler, shutdown_rx));
        inner.listener = Some(Listener { shutdown, task });
        info!(local = %self.local, "UDP receive loop started");
        Ok(())
    }

    async fn stop_listening(&self) {
        let listener = self.inner.lock().listener.take();
        if let Some(listener) = listener {
            let _ = listener.shutdown.send(());
            if let Err(err) = listener.task.await {
                warn!(error = %err, "UDP receive loop ended abnormally");
            }
            info!(local = %self.local, "UDP receive loop stopped");
        }
        self.close();
    }

    fn is_listening(&self) -> bool {
        self.inner
            .lock()
            .listener
            .as_ref()
            .is_some_and(|listener| !listener.task.is_finished())
    }

    fn join_multicast_group(&self, group: Ipv4Addr) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if inner.groups.contains(&group) {
            return Ok(());
        }
        let interface = self.interface();
        let result = match (&inner.bound, &inner.unbound) {
            (Some(bound), _) => bound.sync.join_multicast_v4(&group, &interface),
            (None, Some(socket)) => socket.join_multicast_v4(&group, &interface),
            (None, None) => Err(std::io::Error::from(std::io::ErrorKind::NotConnected)),
        };
        result.map_err(|source| TransportError::JoinMulticast { group, source })?;
        inner.groups.insert(group);
        debug!(group = %group, "joined multicast group");
        Ok(())
    }

    fn drop_multicast_group(&self, group: Ipv4Addr) -> Result<(), TransportError> {
        let mut inner = self.inner.lock();
        if !inner.groups.remove(&group) {
            return Ok(());
        }
        let interface = self.interface();
        let result = match (&inner.bound, &inner.unbound) {
            (Some(bound), _) => bound.sync.leave_multicast_v4(&group, &interface),
            (None, Some(socket)) => socket.leave_multicast_v4(&group, &interface),
            (None, None) => Ok(()),
        };
        result.map_err(|source| TransportError::DropMulticast { group, source })?;
        debug!(group = %group, "left multicast group");
        Ok(())
    }

    fn multicast_groups(&self) -> Vec<Ipv4Addr> {
        self.inner.lock().groups.iter().copied().collect()
    }

    fn send_to(&self, payload: &[u8], target: SocketAddr) -> Result<usize, TransportError> {
        let socket = self.sync_send_socket()?;
        socket
            .send_to(payload, target)
            .map_err(|source| TransportError::Send { target, source })
    }

    async fn send_to_async(
        &self,
        payload: &[u8],
        target: SocketAddr,
    ) -> Result<usize, TransportError> {
        let socket = self.async_send_socket()?;
        socket
            .send_to(payload, target)
            .await
            .map_err(|source| TransportError::Send { target, source })
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        if let Some(listener) = self.inner.get_mut().listener.take() {
            let _ = listener.shutdown.send(());
            listener.task.abort();
        }
    }
}

async fn receive_loop(
    socket: Arc<TokioUdpSocket>,
    handler: DatagramHandler,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            result = socket.recv_from(&mut buffer) => match result {
                Ok((len, source)) => handler(Datagram::new(buffer[..len].to_vec(), source)),
                Err(err) if is_transient_receive_error(&err) => {
                    trace!(error = %err, "ignoring transient receive error");
                }
                Err(err) => {
                    error!(error = %err, "UDP receive failed, stopping receive loop");
                    break;
                }
            },
        }
    }
}
