use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::address::UniverseAddress;
use crate::protocols::sacn::{SacnError, check_source_name};

fn id_or_random(id: Uuid) -> Uuid {
    if id.is_nil() { Uuid::new_v4() } else { id }
}

/// Registration of an input endpoint: which universe to listen on.
///
/// Input endpoints carry the same information for every protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputEndpointInfo {
    id: Uuid,
    universe: UniverseAddress,
}

impl InputEndpointInfo {
    pub fn new(universe: UniverseAddress) -> Self {
        Self {
            id: Uuid::new_v4(),
            universe,
        }
    }

    /// Uses `id` as the endpoint identifier; the nil UUID draws a random one.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id_or_random(id);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn universe(&self) -> UniverseAddress {
        self.universe
    }
}

/// Registration of an output endpoint, specialized per protocol.
pub trait OutputEndpointInfo: Clone + fmt::Debug + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn universe(&self) -> UniverseAddress;
}

/// Where ArtDmx packets for one output go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtNetTarget {
    /// `2.255.255.255`
    Broadcast,
    /// `10.255.255.255`
    AltBroadcast,
    Unicast(IpAddr),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtNetOutputInfo {
    id: Uuid,
    universe: UniverseAddress,
    target: ArtNetTarget,
}

impl ArtNetOutputInfo {
    pub fn new(universe: UniverseAddress, target: ArtNetTarget) -> Self {
        Self {
            id: Uuid::new_v4(),
            universe,
            target,
        }
    }

    /// Uses `id` as the endpoint identifier; the nil UUID draws a random one.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id_or_random(id);
        self
    }

    pub fn target(&self) -> ArtNetTarget {
        self.target
    }
}

impl OutputEndpointInfo for ArtNetOutputInfo {
    fn id(&self) -> Uuid {
        self.id
    }

    fn universe(&self) -> UniverseAddress {
        self.universe
    }
}

/// Where sACN packets for one output go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SacnTarget {
    /// The universe's `239.255.hi.lo` group.
    #[default]
    Multicast,
    Unicast(IpAddr),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SacnOutputInfo {
    id: Uuid,
    universe: UniverseAddress,
    source_name: String,
    target: SacnTarget,
}

impl SacnOutputInfo {
    /// Fails when `source_name` exceeds 63 UTF-8 bytes or contains a NUL; see
    /// [`truncate_utf8`](crate::protocols::truncate_utf8) for trimming a name first.
    pub fn new(
        universe: UniverseAddress,
        source_name: impl Into<String>,
        target: SacnTarget,
    ) -> Result<Self, SacnError> {
        let source_name = source_name.into();
        check_source_name(&source_name)?;
        Ok(Self {
            id: Uuid::new_v4(),
            universe,
            source_name,
            target,
        })
    }

    /// Uses `id` as the endpoint identifier; the nil UUID draws a random one.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id_or_random(id);
        self
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn target(&self) -> SacnTarget {
        self.target
    }
}

impl OutputEndpointInfo for SacnOutputInfo {
    fn id(&self) -> Uuid {
        self.id
    }

    fn universe(&self) -> UniverseAddress {
        self.universe
    }
}
