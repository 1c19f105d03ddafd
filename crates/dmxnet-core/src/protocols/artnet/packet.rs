use tracing::trace;

use super::error::ArtNetError;
use super::layout;
use super::parser::parse_artdmx;
use super::writer::write_artdmx;
use crate::address::UniverseAddress;
use crate::protocols::{DmxDataPacket, NULL_START_CODE};

/// An ArtDmx packet: one universe of channel data.
///
/// Values are validated on construction and immutable afterwards. ArtDmx
/// always carries start code 0.
///
/// # Examples
/// ```
/// use dmxnet_core::address::UniverseAddress;
/// use dmxnet_core::protocols::artnet::ArtDmx;
///
/// let universe = UniverseAddress::new(3)?;
/// let packet = ArtDmx::new(universe, vec![255, 128], 1, 0)?;
/// let bytes = packet.serialize();
/// assert_eq!(bytes.len(), 20);
/// assert_eq!(ArtDmx::deserialize(&bytes), Some(packet));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtDmx {
    sequence: u8,
    physical: u8,
    universe: UniverseAddress,
    data: Vec<u8>,
}

impl ArtDmx {
    pub fn new(
        universe: UniverseAddress,
        data: impl Into<Vec<u8>>,
        sequence: u8,
        physical: u8,
    ) -> Result<Self, ArtNetError> {
        if !universe.is_artnet_addressable() {
            return Err(ArtNetError::UniverseNotAddressable { universe });
        }
        let data = data.into();
        if !(layout::DMX_MIN_SLOTS..=layout::DMX_MAX_SLOTS).contains(&data.len()) {
            return Err(ArtNetError::InvalidLength { length: data.len() });
        }
        Ok(Self {
            sequence,
            physical,
            universe,
            data,
        })
    }

    pub fn physical(&self) -> u8 {
        self.physical
    }

    pub fn serialize(&self) -> Vec<u8> {
        write_artdmx(self)
    }

    pub fn deserialize(payload: &[u8]) -> Option<Self> {
        match parse_artdmx(payload) {
            Ok(packet) => packet,
            Err(err) => {
                trace!(error = %err, "discarding malformed ArtDmx");
                None
            }
        }
    }
}

impl DmxDataPacket for ArtDmx {
    fn universe(&self) -> UniverseAddress {
        self.universe
    }

    fn sequence(&self) -> u8 {
        self.sequence
    }

    fn start_code(&self) -> u8 {
        NULL_START_CODE
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}
