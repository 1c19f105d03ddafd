use std::ops::Range;

pub const PREAMBLE_SIZE_RANGE: Range<usize> = 0..2;
pub const POSTAMBLE_SIZE_RANGE: Range<usize> = 2..4;
pub const ACN_PID_RANGE: Range<usize> = 4..16;

pub const ROOT_FLAGS_LENGTH_RANGE: Range<usize> = 16..18;
pub const ROOT_VECTOR_RANGE: Range<usize> = 18..22;
pub const CID_RANGE: Range<usize> = 22..38;

pub const FRAMING_FLAGS_LENGTH_RANGE: Range<usize> = 38..40;
pub const FRAMING_VECTOR_RANGE: Range<usize> = 40..44;
pub const SOURCE_NAME_RANGE: Range<usize> = 44..108;
pub const PRIORITY_OFFSET: usize = 108;
pub const SYNC_ADDRESS_RANGE: Range<usize> = 109..111;
pub const SEQUENCE_OFFSET: usize = 111;
pub const OPTIONS_OFFSET: usize = 112;
pub const UNIVERSE_RANGE: Range<usize> = 113..115;

pub const DMP_FLAGS_LENGTH_RANGE: Range<usize> = 115..117;
pub const DMP_VECTOR_OFFSET: usize = 117;
pub const DMP_ADDRESS_TYPE_OFFSET: usize = 118;
pub const DMP_FIRST_ADDRESS_RANGE: Range<usize> = 119..121;
pub const DMP_ADDRESS_INCREMENT_RANGE: Range<usize> = 121..123;
pub const DMP_PROPERTY_VALUE_COUNT_RANGE: Range<usize> = 123..125;
pub const START_CODE_OFFSET: usize = 125;
pub const DMX_DATA_OFFSET: usize = 126;
pub const DMX_MAX_SLOTS: usize = 512;

pub const ACN_PID: &[u8; 12] = b"ASC-E1.17\0\0\0";
pub const PREAMBLE_SIZE: u16 = 0x0010;
pub const POSTAMBLE_SIZE: u16 = 0x0000;
pub const ROOT_VECTOR_DATA: u32 = 0x0000_0004;
pub const ROOT_VECTOR_EXTENDED: u32 = 0x0000_0008;
pub const FRAMING_VECTOR_DMX: u32 = 0x0000_0002;
pub const DMP_VECTOR_SET_PROPERTY: u8 = 0x02;
pub const DMP_ADDRESS_TYPE: u8 = 0xA1;
pub const DMP_FIRST_ADDRESS: u16 = 0x0000;
pub const DMP_ADDRESS_INCREMENT: u16 = 0x0001;

/// High nibble of every PDU flags/length field.
pub const PDU_FLAGS: u16 = 0x7000;
pub const PDU_LENGTH_MASK: u16 = 0x0FFF;

pub const OPTION_PREVIEW: u8 = 0x80;
pub const OPTION_STREAM_TERMINATED: u8 = 0x40;
pub const OPTION_FORCE_SYNC: u8 = 0x20;

/// Source name bytes, excluding the mandatory NUL terminator.
pub const SOURCE_NAME_MAX_LEN: usize = SOURCE_NAME_RANGE.end - SOURCE_NAME_RANGE.start - 1;
pub const PRIORITY_MAX: u8 = 200;
pub const PRIORITY_DEFAULT: u8 = 100;
pub const UNIVERSE_MIN: u16 = 1;
pub const UNIVERSE_MAX: u16 = 63999;

pub const PORT: u16 = 5568;

pub const MIN_LEN: usize = ACN_PID_RANGE.end;

/// Flags/length word for a PDU starting at `pdu_offset` in a packet of `packet_len` bytes.
pub const fn flags_and_length(packet_len: usize, pdu_offset: usize) -> u16 {
    PDU_FLAGS | ((packet_len - pdu_offset) as u16 & PDU_LENGTH_MASK)
}
