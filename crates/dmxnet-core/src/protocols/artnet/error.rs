use thiserror::Error;

use crate::address::UniverseAddress;

/// Errors returned by ArtDmx construction and parsing.
///
/// # Examples
/// ```
/// use dmxnet_core::protocols::artnet::ArtNetError;
///
/// let err = ArtNetError::InvalidLength { length: 513 };
/// assert!(err.to_string().contains("invalid ArtDMX length"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtNetError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("invalid ArtDMX length: {length} (expected 2..=512)")]
    InvalidLength { length: usize },
    #[error("unsupported Art-Net protocol version: {version}")]
    UnsupportedVersion { version: u16 },
    #[error("universe {universe} is not addressable by Art-Net (max 32767)")]
    UniverseNotAddressable { universe: UniverseAddress },
    #[error("invalid Art-Net net: {net}")]
    InvalidNet { net: u8 },
}
