use thiserror::Error;
use uuid::Uuid;

use crate::address::{AddressError, UniverseAddress};
use crate::config::ConfigError;
use crate::protocols::artnet::ArtNetError;
use crate::protocols::sacn::SacnError;
use crate::transport::TransportError;

/// Errors returned by the protocol engine and its endpoints.
///
/// # Examples
/// ```
/// use dmxnet_core::service::ServiceError;
///
/// let err = ServiceError::DataTooLong { length: 600 };
/// assert!(err.to_string().contains("too long"));
/// ```
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{protocol} universe {universe} out of range (expected {min}..={max})")]
    InvalidUniverse {
        protocol: &'static str,
        universe: UniverseAddress,
        min: u16,
        max: u16,
    },
    #[error("endpoint {id} is already registered")]
    DuplicateEndpoint { id: Uuid },
    #[error("channel data too long: {length} bytes (max 512)")]
    DataTooLong { length: usize },
    #[error("{width}-byte parameter at channel {channel} does not fit in the universe")]
    ParameterDoesNotFit { channel: u16, width: usize },
    #[error(transparent)]
    ArtNet(#[from] ArtNetError),
    #[error(transparent)]
    Sacn(#[from] SacnError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
