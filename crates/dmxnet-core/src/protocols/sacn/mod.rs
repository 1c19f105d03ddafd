//! sACN (E1.31) codec.
//!
//! The parser validates the root layer (preamble, ACN PID, vector), the
//! framing layer and the DMP layer, then decodes the data packet. Extended
//! packets (synchronization, discovery) are recognised and skipped.
//! Construction goes through a validating builder: source name up to 63
//! bytes, priority 0..=200, universe and sync universe 1..=63999, data up to
//! 512 slots.
//!
//! Wire-format details live in `layout`, safe reads in `reader`, header
//! emission in `writer`.

pub mod cid;
pub mod error;
pub mod layout;
pub mod options;
pub mod packet;
pub mod parser;
pub mod reader;
mod writer;

pub use cid::{cid_from_name, default_cid, host_name};
pub use error::SacnError;
pub use options::SacnOptions;
pub use packet::{SacnDataPacket, SacnDataPacketBuilder, check_source_name};
pub use parser::parse_sacn_dmx;
