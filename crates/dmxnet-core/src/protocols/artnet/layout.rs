use std::net::Ipv4Addr;
use std::ops::Range;

pub const ARTNET_ID: &[u8; 8] = b"Art-Net\0";

pub const OP_CODE_RANGE: Range<usize> = 8..10;
pub const PROTOCOL_VERSION_RANGE: Range<usize> = 10..12;
pub const SEQUENCE_OFFSET: usize = 12;
pub const PHYSICAL_OFFSET: usize = 13;
pub const SUB_UNI_OFFSET: usize = 14;
pub const NET_OFFSET: usize = 15;
pub const LENGTH_RANGE: Range<usize> = 16..18;
pub const DMX_DATA_OFFSET: usize = 18;

pub const DMX_MIN_SLOTS: usize = 2;
pub const DMX_MAX_SLOTS: usize = 512;

/// Smallest datagram that can carry an opcode and a protocol version.
pub const MIN_LEN: usize = PROTOCOL_VERSION_RANGE.end;

pub const PROTOCOL_VERSION: u16 = 14;
pub const ARTDMX_OPCODE: u16 = 0x5000;

pub const PORT: u16 = 6454;
pub const BROADCAST_ADDRESS: Ipv4Addr = Ipv4Addr::new(2, 255, 255, 255);
pub const ALT_BROADCAST_ADDRESS: Ipv4Addr = Ipv4Addr::new(10, 255, 255, 255);
