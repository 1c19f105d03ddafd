//! Art-Net (ArtDmx) codec.
//!
//! The parser validates the Art-Net signature, opcode and protocol version,
//! then decodes the ArtDmx header and payload. Length and universe
//! constraints are enforced: data length within 2..=512, Net within 0..=127.
//!
//! Only the ArtDmx opcode is decoded; every other opcode is treated as
//! foreign traffic. Byte offsets and well-known addresses live in `layout`,
//! safe reads in `reader`, header emission in `writer`.
//!
//! Version française (résumé):
//! Le module encode et décode Art-Net/ArtDMX avec validations strictes
//! (signature, opcode, version 14, univers, longueur dans 2..=512). Les
//! positions sont dans `layout`, les conventions dans `reader`.

pub mod error;
pub mod layout;
pub mod opcode;
pub mod packet;
pub mod parser;
pub mod reader;
mod writer;

pub use error::ArtNetError;
pub use opcode::ArtNetOpCode;
pub use packet::ArtDmx;
pub use parser::parse_artdmx;
