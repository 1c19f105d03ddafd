use thiserror::Error;

/// Errors returned when building or parsing universe and channel addresses.
///
/// # Examples
/// ```
/// use dmxnet_core::address::{AddressError, UniverseAddress};
///
/// let err = UniverseAddress::new(64000).unwrap_err();
/// assert!(matches!(err, AddressError::OutOfRange { .. }));
/// assert!(err.to_string().contains("out of range"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("{field} out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
    #[error("invalid {kind} '{input}': {reason}")]
    Parse {
        kind: &'static str,
        input: String,
        reason: String,
    },
}

pub(crate) fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<(), AddressError> {
    if value < min || value > max {
        return Err(AddressError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
