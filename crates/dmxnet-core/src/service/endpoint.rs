use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::{broadcast, watch};
use tracing::debug;
use uuid::Uuid;

use super::ServiceContext;
use super::error::ServiceError;
use super::info::{InputEndpointInfo, OutputEndpointInfo};
use super::protocol::DmxProtocol;
use crate::address::{ChannelAddress, ParameterResolution, UniverseAddress};
use crate::protocols::{DMX_MAX_SLOTS, next_sequence};
use crate::status::{ServiceStatus, StatusCell};
use crate::transport::{DatagramTransport, TransportError};

/// Inputs with no packet for longer than this report a warning.
pub const DATA_TIMEOUT: Duration = Duration::from_millis(500);

pub const NO_DATA_MESSAGE: &str = "Not receiving data packets";
pub const SEND_FAILED_MESSAGE: &str = "Failed to send data packet";

const EVENT_CAPACITY: usize = 64;

/// Raised by an input endpoint for every accepted data packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DmxDataReceived {
    pub endpoint_id: Uuid,
    pub universe: UniverseAddress,
    pub source: SocketAddr,
    pub data: Arc<[u8]>,
    #[serde(with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
}

/// Outcome of one output endpoint's send within a fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SendOutcome {
    pub endpoint_id: Uuid,
    pub success: bool,
}

#[derive(Default)]
struct InputState {
    data: Option<Arc<[u8]>>,
    last_received: Option<Instant>,
    last_received_at: Option<OffsetDateTime>,
    last_source: Option<SocketAddr>,
}

/// Receives one universe for a host.
///
/// The engine hands every accepted packet for the endpoint's universe to
/// [`InputEndpoint`], which keeps the latest frame and raises a
/// [`DmxDataReceived`] event to subscribers.
pub struct InputEndpoint {
    info: InputEndpointInfo,
    state: Mutex<InputState>,
    status: StatusCell,
    events: broadcast::Sender<DmxDataReceived>,
}

impl std::fmt::Debug for InputEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputEndpoint")
            .field("info", &self.info)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl InputEndpoint {
    pub(crate) fn new(info: InputEndpointInfo) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            info,
            state: Mutex::new(InputState::default()),
            status: StatusCell::new(),
            events,
        }
    }

    pub fn info(&self) -> &InputEndpointInfo {
        &self.info
    }

    pub fn id(&self) -> Uuid {
        self.info.id()
    }

    pub fn universe(&self) -> UniverseAddress {
        self.info.universe()
    }

    /// Latest received channel data, start code excluded.
    pub fn data(&self) -> Option<Arc<[u8]>> {
        self.state.lock().data.clone()
    }

    pub fn last_received(&self) -> Option<Instant> {
        self.state.lock().last_received
    }

    pub fn last_received_at(&self) -> Option<OffsetDateTime> {
        self.state.lock().last_received_at
    }

    pub fn last_source(&self) -> Option<SocketAddr> {
        self.state.lock().last_source
    }

    /// Reads a big-endian parameter from the latest frame.
    ///
    /// `None` when nothing was received yet, `address` is on another
    /// universe, or the parameter runs past the received data.
    pub fn read(&self, address: ChannelAddress, resolution: ParameterResolution) -> Option<u32> {
        if address.universe() != self.universe() {
            return None;
        }
        let state = self.state.lock();
        let data = state.data.as_deref()?;
        resolution.read_be(data, address.offset())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DmxDataReceived> {
        self.events.subscribe()
    }

    pub fn status(&self) -> ServiceStatus {
        self.status.get()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ServiceStatus> {
        self.status.subscribe()
    }

    pub fn refresh_status(&self) {
        self.refresh_status_at(Instant::now());
    }

    /// Re-evaluates staleness as of `now`.
    pub fn refresh_status_at(&self, now: Instant) {
        let last_received = self.state.lock().last_received;
        let stale = last_received
            .is_none_or(|last| now.saturating_duration_since(last) > DATA_TIMEOUT);
        if stale {
            self.status.set(ServiceStatus::warning(NO_DATA_MESSAGE));
        } else {
            self.status.set(ServiceStatus::Ok);
        }
    }

    pub(crate) fn deliver(&self, source: SocketAddr, data: &[u8]) {
        let data: Arc<[u8]> = Arc::from(data);
        let received_at = OffsetDateTime::now_utc();
        {
            let mut state = self.state.lock();
            state.data = Some(Arc::clone(&data));
            state.last_received = Some(Instant::now());
            state.last_received_at = Some(received_at);
            state.last_source = Some(source);
        }
        self.status.set(ServiceStatus::Ok);
        // No subscribers is not an error.
        let _ = self.events.send(DmxDataReceived {
            endpoint_id: self.id(),
            universe: self.universe(),
            source,
            data,
            received_at,
        });
    }
}

struct OutputState {
    data: [u8; DMX_MAX_SLOTS],
    sequence: u8,
}

/// Sends one universe for a host.
///
/// Holds a full 512-slot buffer and the next sequence number under one lock,
/// so each send snapshots the buffer together with its sequence.
pub struct OutputEndpoint<P: DmxProtocol, T: DatagramTransport> {
    info: P::OutputInfo,
    destination: SocketAddr,
    context: Arc<ServiceContext<P, T>>,
    state: Mutex<OutputState>,
    status: StatusCell,
}

impl<P: DmxProtocol, T: DatagramTransport> std::fmt::Debug for OutputEndpoint<P, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputEndpoint")
            .field("info", &self.info)
            .field("destination", &self.destination)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl<P: DmxProtocol, T: DatagramTransport> OutputEndpoint<P, T> {
    pub(crate) fn new(info: P::OutputInfo, context: Arc<ServiceContext<P, T>>) -> Self {
        let destination = context.protocol.destination(&info, context.port);
        Self {
            info,
            destination,
            context,
            state: Mutex::new(OutputState {
                data: [0; DMX_MAX_SLOTS],
                sequence: P::INITIAL_SEQUENCE,
            }),
            status: StatusCell::new(),
        }
    }

    pub fn info(&self) -> &P::OutputInfo {
        &self.info
    }

    pub fn id(&self) -> Uuid {
        self.info.id()
    }

    pub fn universe(&self) -> UniverseAddress {
        self.info.universe()
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// Copies `data` over the start of the buffer; later slots keep their values.
    pub fn set_data(&self, data: &[u8]) -> Result<(), ServiceError> {
        if data.len() > DMX_MAX_SLOTS {
            return Err(ServiceError::DataTooLong { length: data.len() });
        }
        self.state.lock().data[..data.len()].copy_from_slice(data);
        Ok(())
    }

    pub fn data(&self) -> [u8; DMX_MAX_SLOTS] {
        self.state.lock().data
    }

    /// Stores the low bytes of `value` big-endian starting at `channel` (1..=512).
    pub fn write(
        &self,
        channel: u16,
        value: u32,
        resolution: ParameterResolution,
    ) -> Result<(), ServiceError> {
        let address = ChannelAddress::new(self.universe(), channel)?;
        if !address.can_fit_resolution(resolution) {
            return Err(ServiceError::ParameterDoesNotFit {
                channel,
                width: resolution.width(),
            });
        }
        let mut state = self.state.lock();
        resolution.write_be(&mut state.data, address.offset(), value);
        Ok(())
    }

    /// Writes `value` scaled from `0.0..=1.0` to the resolution's full range.
    pub fn write_normalized(
        &self,
        channel: u16,
        value: f64,
        resolution: ParameterResolution,
    ) -> Result<(), ServiceError> {
        self.write(channel, resolution.denormalize(value), resolution)
    }

    /// Sequence number the next packet will carry.
    pub fn sequence(&self) -> u8 {
        self.state.lock().sequence
    }

    pub fn status(&self) -> ServiceStatus {
        self.status.get()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ServiceStatus> {
        self.status.subscribe()
    }

    /// Sends the current buffer, returning whether every byte went out.
    pub fn send_data_packet(&self) -> bool {
        let Some(packet) = self.next_packet() else {
            return false;
        };
        let result = self.context.transport.send_to(&packet, self.destination);
        self.finish_send(result, packet.len())
    }

    pub async fn send_data_packet_async(&self) -> bool {
        let Some(packet) = self.next_packet() else {
            return false;
        };
        let result = self
            .context
            .transport
            .send_to_async(&packet, self.destination)
            .await;
        self.finish_send(result, packet.len())
    }

    pub(crate) fn outcome(&self, success: bool) -> SendOutcome {
        SendOutcome {
            endpoint_id: self.id(),
            success,
        }
    }

    /// Builds the packet for the current buffer and advances the sequence.
    fn next_packet(&self) -> Option<Vec<u8>> {
        let packet = {
            let mut state = self.state.lock();
            let packet = self
                .context
                .protocol
                .build_packet(&self.info, state.sequence, &state.data);
            state.sequence = next_sequence(state.sequence);
            packet
        };
        match packet {
            Ok(packet) => Some(packet),
            Err(err) => {
                debug!(endpoint = %self.id(), error = %err, "failed to build data packet");
                self.status.set(ServiceStatus::warning(SEND_FAILED_MESSAGE));
                None
            }
        }
    }

    fn finish_send(
        &self,
        result: Result<usize, TransportError>,
        expected: usize,
    ) -> bool {
        let success = match result {
            Ok(sent) if sent == expected => true,
            Ok(sent) => {
                debug!(
                    protocol = P::KIND.name(),
                    target = %self.destination,
                    sent,
                    expected,
                    "short write sending data packet"
                );
                false
            }
            Err(err) => {
                debug!(
                    protocol = P::KIND.name(),
                    target = %self.destination,
                    error = %err,
                    "failed to send data packet"
                );
                false
            }
        };
        if success {
            self.status.set(ServiceStatus::Ok);
        } else {
            self.status.set(ServiceStatus::warning(SEND_FAILED_MESSAGE));
        }
        success
    }
}
