use super::error::ArtNetError;
use super::layout;
use super::opcode::ArtNetOpCode;
use super::packet::ArtDmx;
use super::reader::ArtNetReader;
use crate::address::UniverseAddress;

/// Decodes an ArtDmx datagram.
///
/// `Ok(None)` means the datagram is not an ArtDmx packet (foreign protocol or
/// another Art-Net opcode); `Err` means it claims to be ArtDmx but is broken.
pub fn parse_artdmx(payload: &[u8]) -> Result<Option<ArtDmx>, ArtNetError> {
    let reader = ArtNetReader::new(payload);
    reader.require_len(layout::MIN_LEN)?;

    let signature = reader.read_signature()?;
    if signature != layout::ARTNET_ID {
        return Ok(None);
    }

    let opcode = reader.read_u16_le(layout::OP_CODE_RANGE.clone())?;
    if ArtNetOpCode::from_u16(opcode) != Some(ArtNetOpCode::Dmx) {
        return Ok(None);
    }

    let version = reader.read_u16_be(layout::PROTOCOL_VERSION_RANGE.clone())?;
    if version != layout::PROTOCOL_VERSION {
        return Err(ArtNetError::UnsupportedVersion { version });
    }

    reader.require_len(layout::DMX_DATA_OFFSET)?;
    let sequence = reader.read_u8(layout::SEQUENCE_OFFSET)?;
    let physical = reader.read_u8(layout::PHYSICAL_OFFSET)?;
    let sub_uni = reader.read_u8(layout::SUB_UNI_OFFSET)?;
    let net = reader.read_u8(layout::NET_OFFSET)?;
    let universe = UniverseAddress::from_artnet(net, sub_uni >> 4, sub_uni & 0x0F)
        .map_err(|_| ArtNetError::InvalidNet { net })?;

    let length = reader.read_u16_be(layout::LENGTH_RANGE.clone())? as usize;
    if !(layout::DMX_MIN_SLOTS..=layout::DMX_MAX_SLOTS).contains(&length) {
        return Err(ArtNetError::InvalidLength { length });
    }
    let end = layout::DMX_DATA_OFFSET + length;
    reader.require_len(end)?;
    let data = reader.read_slice(layout::DMX_DATA_OFFSET..end)?;

    ArtDmx::new(universe, data, sequence, physical).map(Some)
}
