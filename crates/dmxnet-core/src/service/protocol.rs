use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::error::ServiceError;
use super::info::{ArtNetOutputInfo, ArtNetTarget, OutputEndpointInfo, SacnOutputInfo, SacnTarget};
use crate::address::UniverseAddress;
use crate::protocols::DmxDataPacket;
use crate::protocols::artnet::{self, ArtDmx};
use crate::protocols::sacn::{self, SacnDataPacket};

/// The two supported DMX-over-IP protocol families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DmxProtocolKind {
    ArtNet,
    Sacn,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown DMX protocol '{0}' (expected artnet or sacn)")]
pub struct UnknownProtocolKind(pub String);

impl FromStr for DmxProtocolKind {
    type Err = UnknownProtocolKind;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "artnet" | "art-net" => Ok(Self::ArtNet),
            "sacn" | "acn" | "streaming acn" | "streaming-acn" | "e1.31" => Ok(Self::Sacn),
            _ => Err(UnknownProtocolKind(input.to_string())),
        }
    }
}

impl fmt::Display for DmxProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Protocol-specific behavior plugged into [`DmxService`](super::DmxService).
///
/// Implementors supply the codec, the well-known port, the universe bounds
/// endpoints are checked against, the first output sequence number, the
/// multicast rule for inputs and destination resolution for outputs.
pub trait DmxProtocol: Send + Sync + 'static {
    type Packet: DmxDataPacket + Send;
    type OutputInfo: OutputEndpointInfo;

    const KIND: DmxProtocolKind;
    const PORT: u16;
    const UNIVERSE_MIN: u16;
    const UNIVERSE_MAX: u16;
    const INITIAL_SEQUENCE: u8;

    /// Decodes a received payload; `None` for foreign or malformed traffic.
    fn deserialize(&self, payload: &[u8]) -> Option<Self::Packet>;

    /// Group to join while at least one input listens on `universe`.
    fn input_multicast_group(&self, _universe: UniverseAddress) -> Option<Ipv4Addr> {
        None
    }

    fn destination(&self, info: &Self::OutputInfo, port: u16) -> SocketAddr;

    /// Serializes one data packet for `info`.
    fn build_packet(
        &self,
        info: &Self::OutputInfo,
        sequence: u8,
        data: &[u8],
    ) -> Result<Vec<u8>, ServiceError>;

    fn accepts_universe(universe: UniverseAddress) -> bool {
        (Self::UNIVERSE_MIN..=Self::UNIVERSE_MAX).contains(&universe.value())
    }

    fn check_universe(universe: UniverseAddress) -> Result<(), ServiceError> {
        if Self::accepts_universe(universe) {
            return Ok(());
        }
        Err(ServiceError::InvalidUniverse {
            protocol: Self::KIND.name(),
            universe,
            min: Self::UNIVERSE_MIN,
            max: Self::UNIVERSE_MAX,
        })
    }
}

impl DmxProtocolKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::ArtNet => "Art-Net",
            Self::Sacn => "sACN",
        }
    }
}

/// Art-Net: ArtDmx over broadcast or unicast on port 6454.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtNet;

impl DmxProtocol for ArtNet {
    type Packet = ArtDmx;
    type OutputInfo = ArtNetOutputInfo;

    const KIND: DmxProtocolKind = DmxProtocolKind::ArtNet;
    const PORT: u16 = artnet::layout::PORT;
    const UNIVERSE_MIN: u16 = 0;
    const UNIVERSE_MAX: u16 = UniverseAddress::ARTNET_MAX;
    const INITIAL_SEQUENCE: u8 = 1;

    fn deserialize(&self, payload: &[u8]) -> Option<ArtDmx> {
        ArtDmx::deserialize(payload)
    }

    fn destination(&self, info: &ArtNetOutputInfo, port: u16) -> SocketAddr {
        let ip = match info.target() {
            ArtNetTarget::Broadcast => IpAddr::V4(artnet::layout::BROADCAST_ADDRESS),
            ArtNetTarget::AltBroadcast => IpAddr::V4(artnet::layout::ALT_BROADCAST_ADDRESS),
            ArtNetTarget::Unicast(ip) => ip,
        };
        SocketAddr::new(ip, port)
    }

    fn build_packet(
        &self,
        info: &ArtNetOutputInfo,
        sequence: u8,
        data: &[u8],
    ) -> Result<Vec<u8>, ServiceError> {
        Ok(ArtDmx::new(info.universe(), data, sequence, 0)?.serialize())
    }
}

/// sACN (E1.31): data packets over per-universe multicast on port 5568.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sacn {
    cid: Uuid,
}

impl Sacn {
    /// Uses the host-derived CID from [`sacn::default_cid`].
    pub fn new() -> Self {
        Self::with_cid(sacn::default_cid())
    }

    pub fn with_cid(cid: Uuid) -> Self {
        Self { cid }
    }

    pub fn cid(&self) -> Uuid {
        self.cid
    }
}

impl Default for Sacn {
    fn default() -> Self {
        Self::new()
    }
}

impl DmxProtocol for Sacn {
    type Packet = SacnDataPacket;
    type OutputInfo = SacnOutputInfo;

    const KIND: DmxProtocolKind = DmxProtocolKind::Sacn;
    const PORT: u16 = sacn::layout::PORT;
    const UNIVERSE_MIN: u16 = sacn::layout::UNIVERSE_MIN;
    const UNIVERSE_MAX: u16 = sacn::layout::UNIVERSE_MAX;
    const INITIAL_SEQUENCE: u8 = 0;

    fn deserialize(&self, payload: &[u8]) -> Option<SacnDataPacket> {
        SacnDataPacket::deserialize(payload)
    }

    fn input_multicast_group(&self, universe: UniverseAddress) -> Option<Ipv4Addr> {
        Some(universe.sacn_multicast_group())
    }

    fn destination(&self, info: &SacnOutputInfo, port: u16) -> SocketAddr {
        let ip = match info.target() {
            SacnTarget::Multicast => IpAddr::V4(info.universe().sacn_multicast_group()),
            SacnTarget::Unicast(ip) => ip,
        };
        SocketAddr::new(ip, port)
    }

    fn build_packet(
        &self,
        info: &SacnOutputInfo,
        sequence: u8,
        data: &[u8],
    ) -> Result<Vec<u8>, ServiceError> {
        let packet = SacnDataPacket::builder(self.cid, info.universe())
            .source_name(info.source_name())
            .sequence(sequence)
            .data(data)
            .build()?;
        Ok(packet.serialize())
    }
}
