use tracing::trace;
use uuid::Uuid;

use super::error::SacnError;
use super::layout;
use super::options::SacnOptions;
use super::parser::parse_sacn_dmx;
use super::writer::write_data_packet;
use crate::address::UniverseAddress;
use crate::protocols::{DmxDataPacket, NULL_START_CODE};

/// An E1.31 data packet.
///
/// Built through [`SacnDataPacketBuilder`], which validates every field;
/// the packet is immutable afterwards.
///
/// # Examples
/// ```
/// use dmxnet_core::address::UniverseAddress;
/// use dmxnet_core::protocols::sacn::SacnDataPacket;
/// use uuid::Uuid;
///
/// let packet = SacnDataPacket::builder(Uuid::nil(), UniverseAddress::new(1)?)
///     .source_name("console")
///     .sequence(42)
///     .data(vec![255; 512])
///     .build()?;
/// let bytes = packet.serialize();
/// assert_eq!(bytes.len(), 638);
/// assert_eq!(SacnDataPacket::deserialize(&bytes), Some(packet));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SacnDataPacket {
    cid: Uuid,
    source_name: String,
    priority: u8,
    sync_address: Option<UniverseAddress>,
    sequence: u8,
    options: SacnOptions,
    universe: UniverseAddress,
    start_code: u8,
    data: Vec<u8>,
}

impl SacnDataPacket {
    pub fn builder(cid: Uuid, universe: UniverseAddress) -> SacnDataPacketBuilder {
        SacnDataPacketBuilder {
            packet: SacnDataPacket {
                cid,
                source_name: String::new(),
                priority: layout::PRIORITY_DEFAULT,
                sync_address: None,
                sequence: 0,
                options: SacnOptions::default(),
                universe,
                start_code: NULL_START_CODE,
                data: Vec::new(),
            },
        }
    }

    pub fn cid(&self) -> Uuid {
        self.cid
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }

    pub fn sync_address(&self) -> Option<UniverseAddress> {
        self.sync_address
    }

    pub fn options(&self) -> SacnOptions {
        self.options
    }

    pub fn serialize(&self) -> Vec<u8> {
        write_data_packet(self)
    }

    pub fn deserialize(payload: &[u8]) -> Option<Self> {
        match parse_sacn_dmx(payload) {
            Ok(packet) => packet,
            Err(err) => {
                trace!(error = %err, "discarding malformed sACN packet");
                None
            }
        }
    }
}

impl DmxDataPacket for SacnDataPacket {
    fn universe(&self) -> UniverseAddress {
        self.universe
    }

    fn sequence(&self) -> u8 {
        self.sequence
    }

    fn start_code(&self) -> u8 {
        self.start_code
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Builder for [`SacnDataPacket`]; defaults are priority 100, start code 0,
/// no sync address, no options and empty data.
#[derive(Debug, Clone)]
pub struct SacnDataPacketBuilder {
    packet: SacnDataPacket,
}

impl SacnDataPacketBuilder {
    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.packet.source_name = name.into();
        self
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.packet.priority = priority;
        self
    }

    pub fn sync_address(mut self, sync_address: Option<UniverseAddress>) -> Self {
        self.packet.sync_address = sync_address;
        self
    }

    pub fn sequence(mut self, sequence: u8) -> Self {
        self.packet.sequence = sequence;
        self
    }

    pub fn options(mut self, options: SacnOptions) -> Self {
        self.packet.options = options;
        self
    }

    pub fn start_code(mut self, start_code: u8) -> Self {
        self.packet.start_code = start_code;
        self
    }

    pub fn data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.packet.data = data.into();
        self
    }

    pub fn build(self) -> Result<SacnDataPacket, SacnError> {
        let packet = self.packet;
        check_source_name(&packet.source_name)?;
        if packet.priority > layout::PRIORITY_MAX {
            return Err(SacnError::InvalidPriority {
                priority: packet.priority,
            });
        }
        if sacn_universe(packet.universe.value().into()).is_none() {
            return Err(SacnError::InvalidUniverse {
                universe: packet.universe.value().into(),
            });
        }
        if let Some(sync) = packet.sync_address {
            if sacn_universe(sync.value().into()).is_none() {
                return Err(SacnError::InvalidSyncAddress {
                    universe: sync.value().into(),
                });
            }
        }
        if packet.data.len() > layout::DMX_MAX_SLOTS {
            return Err(SacnError::InvalidDmxLength {
                length: packet.data.len(),
            });
        }
        Ok(packet)
    }
}

/// Universe numbers valid on an sACN wire: 1..=63999.
pub(crate) fn sacn_universe(value: u32) -> Option<UniverseAddress> {
    if value < u32::from(layout::UNIVERSE_MIN) || value > u32::from(layout::UNIVERSE_MAX) {
        return None;
    }
    UniverseAddress::new(value).ok()
}

/// Checks that `name` fits the 64-byte null-terminated source name field.
///
/// The wire field ends at the first NUL, so an embedded NUL would not
/// survive a round trip.
pub fn check_source_name(name: &str) -> Result<(), SacnError> {
    if name.len() > layout::SOURCE_NAME_MAX_LEN {
        return Err(SacnError::SourceNameTooLong { length: name.len() });
    }
    if let Some(offset) = name.find('\0') {
        return Err(SacnError::SourceNameContainsNul { offset });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe(value: u32) -> UniverseAddress {
        UniverseAddress::new(value).unwrap()
    }

    fn sample() -> SacnDataPacket {
        SacnDataPacket::builder(Uuid::from_bytes([7; 16]), universe(258))
            .source_name("front of house")
            .priority(150)
            .sync_address(Some(universe(9)))
            .sequence(200)
            .options(SacnOptions {
                preview: true,
                stream_terminated: false,
                force_sync: true,
            })
            .data(vec![1, 2, 3, 4])
            .build()
            .unwrap()
    }

    #[test]
    fn header_layout() {
        let bytes = sample().serialize();
        assert_eq!(bytes.len(), layout::DMX_DATA_OFFSET + 4);
        assert_eq!(&bytes[layout::PREAMBLE_SIZE_RANGE], &[0x00, 0x10]);
        assert_eq!(&bytes[layout::ACN_PID_RANGE], layout::ACN_PID);
        assert_eq!(&bytes[layout::ROOT_FLAGS_LENGTH_RANGE], &0x7072u16.to_be_bytes());
        assert_eq!(&bytes[layout::ROOT_VECTOR_RANGE], &[0, 0, 0, 4]);
        assert_eq!(&bytes[layout::CID_RANGE], &[7; 16]);
        assert_eq!(&bytes[layout::FRAMING_FLAGS_LENGTH_RANGE], &0x705Cu16.to_be_bytes());
        assert_eq!(&bytes[layout::FRAMING_VECTOR_RANGE], &[0, 0, 0, 2]);
        assert_eq!(&bytes[44..58], b"front of house");
        assert!(bytes[58..108].iter().all(|b| *b == 0));
        assert_eq!(bytes[layout::PRIORITY_OFFSET], 150);
        assert_eq!(&bytes[layout::SYNC_ADDRESS_RANGE], &[0, 9]);
        assert_eq!(bytes[layout::SEQUENCE_OFFSET], 200);
        assert_eq!(bytes[layout::OPTIONS_OFFSET], 0xA0);
        assert_eq!(&bytes[layout::UNIVERSE_RANGE], &[1, 2]);
        assert_eq!(&bytes[layout::DMP_FLAGS_LENGTH_RANGE], &0x700Fu16.to_be_bytes());
        assert_eq!(bytes[layout::DMP_VECTOR_OFFSET], 0x02);
        assert_eq!(bytes[layout::DMP_ADDRESS_TYPE_OFFSET], 0xA1);
        assert_eq!(&bytes[layout::DMP_FIRST_ADDRESS_RANGE], &[0, 0]);
        assert_eq!(&bytes[layout::DMP_ADDRESS_INCREMENT_RANGE], &[0, 1]);
        assert_eq!(&bytes[layout::DMP_PROPERTY_VALUE_COUNT_RANGE], &[0, 5]);
        assert_eq!(bytes[layout::START_CODE_OFFSET], 0);
        assert_eq!(&bytes[layout::DMX_DATA_OFFSET..], &[1, 2, 3, 4]);
    }

    #[test]
    fn round_trip() {
        let packet = sample();
        assert_eq!(SacnDataPacket::deserialize(&packet.serialize()), Some(packet));
    }

    #[test]
    fn round_trip_empty_data_and_no_sync() {
        let packet = SacnDataPacket::builder(Uuid::nil(), universe(63999))
            .start_code(0xDD)
            .build()
            .unwrap();
        let bytes = packet.serialize();
        assert_eq!(bytes.len(), layout::DMX_DATA_OFFSET);
        assert_eq!(&bytes[layout::SYNC_ADDRESS_RANGE], &[0, 0]);
        assert_eq!(SacnDataPacket::deserialize(&bytes), Some(packet));
    }

    #[test]
    fn rejects_invalid_fields() {
        let base = || SacnDataPacket::builder(Uuid::nil(), universe(1));
        assert!(matches!(
            base().priority(201).build(),
            Err(SacnError::InvalidPriority { priority: 201 })
        ));
        assert!(base().priority(200).build().is_ok());
        assert!(matches!(
            base().source_name("x".repeat(64)).build(),
            Err(SacnError::SourceNameTooLong { length: 64 })
        ));
        assert!(base().source_name("x".repeat(63)).build().is_ok());
        assert!(matches!(
            base().source_name("desk\0two").build(),
            Err(SacnError::SourceNameContainsNul { offset: 4 })
        ));
        assert!(matches!(
            base().data(vec![0; 513]).build(),
            Err(SacnError::InvalidDmxLength { length: 513 })
        ));
        assert!(matches!(
            base().sync_address(Some(universe(0))).build(),
            Err(SacnError::InvalidSyncAddress { universe: 0 })
        ));
        assert!(matches!(
            SacnDataPacket::builder(Uuid::nil(), universe(0)).build(),
            Err(SacnError::InvalidUniverse { universe: 0 })
        ));
    }

    #[test]
    fn deserialize_garbage_is_none() {
        assert_eq!(SacnDataPacket::deserialize(&[]), None);
        assert_eq!(SacnDataPacket::deserialize(&[0x55; 200]), None);
        let mut truncated = sample().serialize();
        truncated.truncate(100);
        assert_eq!(SacnDataPacket::deserialize(&truncated), None);
    }
}
