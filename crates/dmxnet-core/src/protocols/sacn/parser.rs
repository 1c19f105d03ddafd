use super::error::SacnError;
use super::layout;
use super::options::SacnOptions;
use super::packet::{SacnDataPacket, sacn_universe};
use super::reader::SacnReader;
use crate::protocols::common::reader::optional_nonzero_u16;

/// Decodes an E1.31 data packet.
///
/// `Ok(None)` covers foreign traffic and E1.31 extended packets
/// (synchronization, discovery), which carry no channel data.
pub fn parse_sacn_dmx(payload: &[u8]) -> Result<Option<SacnDataPacket>, SacnError> {
    let reader = SacnReader::new(payload);
    reader.require_len(layout::MIN_LEN)?;

    let preamble = reader.read_u16_be(layout::PREAMBLE_SIZE_RANGE)?;
    let postamble = reader.read_u16_be(layout::POSTAMBLE_SIZE_RANGE)?;
    if preamble != layout::PREAMBLE_SIZE || postamble != layout::POSTAMBLE_SIZE {
        return Ok(None);
    }

    let acn_pid = reader.read_slice(layout::ACN_PID_RANGE)?;
    if acn_pid != layout::ACN_PID {
        return Ok(None);
    }

    let root_vector = reader.read_u32_be(layout::ROOT_VECTOR_RANGE)?;
    match root_vector {
        layout::ROOT_VECTOR_DATA => {}
        layout::ROOT_VECTOR_EXTENDED => return Ok(None),
        value => return Err(SacnError::InvalidRootVector { value }),
    }

    reader.require_len(layout::DMX_DATA_OFFSET)?;

    let framing_vector = reader.read_u32_be(layout::FRAMING_VECTOR_RANGE)?;
    if framing_vector != layout::FRAMING_VECTOR_DMX {
        return Err(SacnError::InvalidFramingVector {
            value: framing_vector,
        });
    }

    let dmp_vector = reader.read_u8(layout::DMP_VECTOR_OFFSET)?;
    if dmp_vector != layout::DMP_VECTOR_SET_PROPERTY {
        return Err(SacnError::InvalidDmpVector { value: dmp_vector });
    }
    let address_type = reader.read_u8(layout::DMP_ADDRESS_TYPE_OFFSET)?;
    if address_type != layout::DMP_ADDRESS_TYPE {
        return Err(SacnError::InvalidAddressType {
            value: address_type,
        });
    }

    let count = reader.read_u16_be(layout::DMP_PROPERTY_VALUE_COUNT_RANGE)?;
    if count == 0 || count as usize > layout::DMX_MAX_SLOTS + 1 {
        return Err(SacnError::InvalidPropertyValueCount { count });
    }
    let end = layout::DMX_DATA_OFFSET + count as usize - 1;
    reader.require_len(end)?;

    let cid = reader.read_cid()?;
    let source_name = reader.read_nul_terminated_string(layout::SOURCE_NAME_RANGE)?;
    let priority = reader.read_u8(layout::PRIORITY_OFFSET)?;
    let sync_address = optional_nonzero_u16(reader.read_u16_be(layout::SYNC_ADDRESS_RANGE)?);
    let sequence = reader.read_u8(layout::SEQUENCE_OFFSET)?;
    let options = SacnOptions::from_byte(reader.read_u8(layout::OPTIONS_OFFSET)?);
    let universe = reader.read_u16_be(layout::UNIVERSE_RANGE)?;
    let start_code = reader.read_u8(layout::START_CODE_OFFSET)?;
    let data = reader.read_slice(layout::DMX_DATA_OFFSET..end)?;

    let universe = sacn_universe(universe.into()).ok_or(SacnError::InvalidUniverse {
        universe: universe.into(),
    })?;
    let sync_address = sync_address
        .map(|value| {
            sacn_universe(value.into()).ok_or(SacnError::InvalidSyncAddress {
                universe: value.into(),
            })
        })
        .transpose()?;

    SacnDataPacket::builder(cid, universe)
        .source_name(source_name)
        .priority(priority)
        .sync_address(sync_address)
        .sequence(sequence)
        .options(options)
        .start_code(start_code)
        .data(data)
        .build()
        .map(Some)
}
