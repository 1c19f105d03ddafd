use thiserror::Error;

/// Errors returned by sACN packet construction and parsing.
///
/// # Examples
/// ```
/// use dmxnet_core::protocols::sacn::SacnError;
///
/// let err = SacnError::InvalidPriority { priority: 201 };
/// assert!(err.to_string().contains("invalid priority"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SacnError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("invalid property value count: {count}")]
    InvalidPropertyValueCount { count: u16 },
    #[error("invalid DMX data length: {length} (max 512)")]
    InvalidDmxLength { length: usize },
    #[error("invalid root vector: {value}")]
    InvalidRootVector { value: u32 },
    #[error("invalid framing vector: {value}")]
    InvalidFramingVector { value: u32 },
    #[error("invalid DMP vector: {value}")]
    InvalidDmpVector { value: u8 },
    #[error("invalid DMP address type: {value:#04x}")]
    InvalidAddressType { value: u8 },
    #[error("invalid priority: {priority} (expected 0..=200)")]
    InvalidPriority { priority: u8 },
    #[error("invalid sACN universe: {universe} (expected 1..=63999)")]
    InvalidUniverse { universe: u32 },
    #[error("invalid synchronization universe: {universe} (expected 1..=63999)")]
    InvalidSyncAddress { universe: u32 },
    #[error("source name too long: {length} bytes (max 63)")]
    SourceNameTooLong { length: usize },
    #[error("source name contains a NUL byte at offset {offset}")]
    SourceNameContainsNul { offset: usize },
}
