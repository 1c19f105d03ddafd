//! Protocol engine.
//!
//! [`DmxService`] owns one transport for one protocol family and keeps the
//! registries of input and output endpoints. Received datagrams are decoded
//! and delivered to every input endpoint of the packet's universe in
//! registration order; `send_output` fans the output endpoints' buffers out
//! to the network once per call. The host drives the output rate (for
//! example with [`PrecisionTimer`](crate::timer::PrecisionTimer)) and polls
//! [`DmxService::refresh_status`].
//!
//! The engine is generic over a [`DmxProtocol`] supplying everything
//! protocol-specific, and over a [`DatagramTransport`] so it can run without
//! real sockets.
//!
//! Version française (résumé):
//! Un moteur par protocole : registre des points d'entrée et de sortie,
//! réception et distribution par univers, émission groupée. Les
//! appartenances multicast sACN suivent le premier et le dernier point
//! d'entrée de chaque univers.

mod endpoint;
mod error;
mod info;
mod protocol;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{info, trace, warn};
use uuid::Uuid;

use crate::address::UniverseAddress;
use crate::config::ServiceConfig;
use crate::protocols::{DmxDataPacket, NULL_START_CODE};
use crate::transport::{Datagram, DatagramTransport, UdpTransport};

pub use endpoint::{
    DATA_TIMEOUT, DmxDataReceived, InputEndpoint, NO_DATA_MESSAGE, OutputEndpoint,
    SEND_FAILED_MESSAGE, SendOutcome,
};
pub use error::ServiceError;
pub use info::{
    ArtNetOutputInfo, ArtNetTarget, InputEndpointInfo, OutputEndpointInfo, SacnOutputInfo,
    SacnTarget,
};
pub use protocol::{ArtNet, DmxProtocol, DmxProtocolKind, Sacn, UnknownProtocolKind};

pub type ArtNetService<T = UdpTransport> = DmxService<ArtNet, T>;
pub type SacnService<T = UdpTransport> = DmxService<Sacn, T>;

/// Shared by the engine and its output endpoints.
pub(crate) struct ServiceContext<P, T> {
    pub(crate) protocol: P,
    pub(crate) transport: T,
    /// Destination port for outputs.
    pub(crate) port: u16,
}

type InputRegistry = RwLock<BTreeMap<UniverseAddress, Vec<Arc<InputEndpoint>>>>;

/// One protocol engine.
///
/// # Examples
/// ```no_run
/// use dmxnet_core::address::UniverseAddress;
/// use dmxnet_core::config::ServiceConfig;
/// use dmxnet_core::service::{ArtNet, ArtNetOutputInfo, ArtNetTarget, DmxService};
///
/// let service = DmxService::new(ArtNet, ServiceConfig::default())?;
/// let universe = UniverseAddress::new(1)?;
/// let output = service.add_output_endpoint(ArtNetOutputInfo::new(universe, ArtNetTarget::Broadcast))?;
/// output.set_data(&[255; 512])?;
/// for outcome in service.send_output() {
///     println!("{} -> {}", outcome.endpoint_id, outcome.success);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct DmxService<P: DmxProtocol, T: DatagramTransport = UdpTransport> {
    config: ServiceConfig,
    context: Arc<ServiceContext<P, T>>,
    inputs: Arc<InputRegistry>,
    outputs: RwLock<Vec<Arc<OutputEndpoint<P, T>>>>,
}

impl<P: DmxProtocol> DmxService<P, UdpTransport> {
    /// Creates the engine over a UDP transport on the configured adapter and
    /// port. The socket is not bound until [`start_listening`](Self::start_listening).
    pub fn new(protocol: P, config: ServiceConfig) -> Result<Self, ServiceError> {
        config.validate()?;
        let transport = UdpTransport::new(config.bind_addr(P::PORT))?;
        Self::with_transport(protocol, config, transport)
    }
}

impl<P: DmxProtocol, T: DatagramTransport> DmxService<P, T> {
    pub fn with_transport(
        protocol: P,
        config: ServiceConfig,
        transport: T,
    ) -> Result<Self, ServiceError> {
        config.validate()?;
        let port = config.port_or(P::PORT);
        Ok(Self {
            config,
            context: Arc::new(ServiceContext {
                protocol,
                transport,
                port,
            }),
            inputs: Arc::new(RwLock::new(BTreeMap::new())),
            outputs: RwLock::new(Vec::new()),
        })
    }

    pub fn kind(&self) -> DmxProtocolKind {
        P::KIND
    }

    pub fn protocol(&self) -> &P {
        &self.context.protocol
    }

    pub fn transport(&self) -> &T {
        &self.context.transport
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn output_framerate(&self) -> f64 {
        self.config.output_framerate
    }

    pub fn local_endpoint(&self) -> SocketAddr {
        self.context.transport.local_endpoint()
    }

    pub fn is_bound(&self) -> bool {
        self.context.transport.is_bound()
    }

    pub fn is_listening(&self) -> bool {
        self.context.transport.is_listening()
    }

    /// Registers an input endpoint on `info`'s universe.
    ///
    /// For multicast protocols the first input on a universe joins its group;
    /// if the join fails the endpoint is not created.
    pub fn add_input_endpoint(
        &self,
        info: InputEndpointInfo,
    ) -> Result<Arc<InputEndpoint>, ServiceError> {
        let universe = info.universe();
        P::check_universe(universe).inspect_err(|err| {
            warn!(protocol = P::KIND.name(), universe = %universe, error = %err, "rejected input endpoint");
        })?;

        let mut inputs = self.inputs.write();
        if inputs.values().flatten().any(|input| input.id() == info.id()) {
            warn!(endpoint = %info.id(), "input endpoint id already registered");
            return Err(ServiceError::DuplicateEndpoint { id: info.id() });
        }

        let first_on_universe = inputs.get(&universe).is_none_or(Vec::is_empty);
        if first_on_universe {
            if let Some(group) = self.context.protocol.input_multicast_group(universe) {
                self.context
                    .transport
                    .join_multicast_group(group)
                    .inspect_err(|err| {
                        warn!(universe = %universe, group = %group, error = %err, "failed to join multicast group");
                    })?;
            }
        }

        let endpoint = Arc::new(InputEndpoint::new(info));
        inputs.entry(universe).or_default().push(Arc::clone(&endpoint));
        info!(protocol = P::KIND.name(), endpoint = %endpoint.id(), universe = %universe, "input endpoint added");
        Ok(endpoint)
    }

    /// Unregisters an input endpoint, leaving the universe's multicast group
    /// when it was the last input there.
    pub fn remove_input_endpoint(&self, id: Uuid) -> bool {
        let mut inputs = self.inputs.write();
        let Some((universe, index)) = inputs.iter().find_map(|(universe, list)| {
            list.iter()
                .position(|input| input.id() == id)
                .map(|index| (*universe, index))
        }) else {
            return false;
        };

        let now_empty = inputs.get_mut(&universe).is_some_and(|list| {
            list.remove(index);
            list.is_empty()
        });
        if now_empty {
            inputs.remove(&universe);
            if let Some(group) = self.context.protocol.input_multicast_group(universe) {
                if let Err(err) = self.context.transport.drop_multicast_group(group) {
                    warn!(universe = %universe, group = %group, error = %err, "failed to leave multicast group");
                }
            }
        }
        info!(protocol = P::KIND.name(), endpoint = %id, universe = %universe, "input endpoint removed");
        true
    }

    pub fn add_output_endpoint(
        &self,
        info: P::OutputInfo,
    ) -> Result<Arc<OutputEndpoint<P, T>>, ServiceError> {
        let universe = info.universe();
        P::check_universe(universe).inspect_err(|err| {
            warn!(protocol = P::KIND.name(), universe = %universe, error = %err, "rejected output endpoint");
        })?;

        let mut outputs = self.outputs.write();
        if outputs.iter().any(|output| output.id() == info.id()) {
            warn!(endpoint = %info.id(), "output endpoint id already registered");
            return Err(ServiceError::DuplicateEndpoint { id: info.id() });
        }
        let endpoint = Arc::new(OutputEndpoint::new(info, Arc::clone(&self.context)));
        outputs.push(Arc::clone(&endpoint));
        info!(
            protocol = P::KIND.name(),
            endpoint = %endpoint.id(),
            universe = %universe,
            target = %endpoint.destination(),
            "output endpoint added"
        );
        Ok(endpoint)
    }

    pub fn remove_output_endpoint(&self, id: Uuid) -> bool {
        let mut outputs = self.outputs.write();
        let before = outputs.len();
        outputs.retain(|output| output.id() != id);
        let removed = outputs.len() != before;
        if removed {
            info!(protocol = P::KIND.name(), endpoint = %id, "output endpoint removed");
        }
        removed
    }

    /// Input endpoints ordered by universe, then registration.
    pub fn input_endpoints(&self) -> Vec<Arc<InputEndpoint>> {
        self.inputs.read().values().flatten().cloned().collect()
    }

    /// Output endpoints in registration order.
    pub fn output_endpoints(&self) -> Vec<Arc<OutputEndpoint<P, T>>> {
        self.outputs.read().clone()
    }

    /// Sends one packet from every output endpoint.
    pub fn send_output(&self) -> Vec<SendOutcome> {
        self.output_endpoints()
            .iter()
            .map(|output| output.outcome(output.send_data_packet()))
            .collect()
    }

    /// Sends one packet from every output endpoint concurrently and waits for
    /// all of them.
    pub async fn send_output_async(&self) -> Vec<SendOutcome> {
        let outputs = self.output_endpoints();
        futures::future::join_all(outputs.iter().map(|output| async move {
            output.outcome(output.send_data_packet_async().await)
        }))
        .await
    }

    /// Decodes `datagram` and delivers it to the inputs of its universe.
    pub fn on_packet_received(&self, datagram: &Datagram) {
        dispatch(&self.context.protocol, &self.inputs, datagram);
    }

    /// Re-evaluates every input endpoint's status.
    pub fn refresh_status(&self) {
        for input in self.inputs.read().values().flatten() {
            input.refresh_status();
        }
    }

    /// Binds and starts receiving when at least one input endpoint exists.
    ///
    /// Returns whether the engine is listening afterwards. A bind failure is
    /// logged and leaves the engine able to retry.
    pub fn start_listening(&self) -> bool {
        if self.inputs.read().is_empty() || self.is_listening() {
            return self.is_listening();
        }
        let context: Weak<ServiceContext<P, T>> = Arc::downgrade(&self.context);
        let inputs = Arc::clone(&self.inputs);
        let handler = Arc::new(move |datagram: Datagram| {
            if let Some(context) = context.upgrade() {
                dispatch(&context.protocol, &inputs, &datagram);
            }
        });
        if let Err(err) = self.context.transport.start_listening(handler) {
            warn!(protocol = P::KIND.name(), local = %self.local_endpoint(), error = %err, "failed to start listening");
        }
        self.is_listening()
    }

    pub async fn stop_listening(&self) {
        self.context.transport.stop_listening().await;
    }
}

fn dispatch<P: DmxProtocol>(protocol: &P, inputs: &InputRegistry, datagram: &Datagram) {
    let Some(packet) = protocol.deserialize(&datagram.payload) else {
        trace!(source = %datagram.source, len = datagram.payload.len(), "ignoring datagram");
        return;
    };
    if packet.start_code() != NULL_START_CODE {
        trace!(
            source = %datagram.source,
            start_code = packet.start_code(),
            "ignoring packet with alternate start code"
        );
        return;
    }
    let inputs = inputs.read();
    let Some(endpoints) = inputs.get(&packet.universe()) else {
        return;
    };
    for endpoint in endpoints {
        endpoint.deliver(datagram.source, packet.data());
    }
}
