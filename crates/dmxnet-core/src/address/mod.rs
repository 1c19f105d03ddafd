//! Universe and channel addressing shared by Art-Net and sACN.
//!
//! Everything here is pure arithmetic on small `Copy` values. Out-of-range
//! inputs are rejected with [`AddressError`], never clamped. String parsing
//! accepts any of `. , space : / \ - _` between fields.
//!
//! Version française (résumé):
//! Adressage univers/canal commun aux deux protocoles. Les valeurs hors
//! limites sont refusées, jamais tronquées.

mod channel;
mod error;
mod parse;
mod resolution;
mod universe;

pub use channel::ChannelAddress;
pub use error::AddressError;
pub use parse::DELIMITERS;
pub use resolution::ParameterResolution;
pub use universe::{CHANNELS_PER_UNIVERSE, UniverseAddress};
