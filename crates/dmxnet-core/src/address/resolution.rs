use serde::{Deserialize, Serialize};

/// Bit depth of a fixture parameter spread over consecutive channels.
///
/// Values are packed big-endian: the coarse byte sits on the lowest channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterResolution {
    Bit8,
    Bit16,
    Bit24,
    Bit32,
}

impl ParameterResolution {
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bit8 => 8,
            Self::Bit16 => 16,
            Self::Bit24 => 24,
            Self::Bit32 => 32,
        }
    }

    /// Number of channels (bytes) the parameter occupies.
    pub const fn width(self) -> usize {
        (self.bits() / 8) as usize
    }

    pub const fn max_value(self) -> u32 {
        match self {
            Self::Bit8 => 0xFF,
            Self::Bit16 => 0xFFFF,
            Self::Bit24 => 0xFF_FFFF,
            Self::Bit32 => 0xFFFF_FFFF,
        }
    }

    /// Reads a big-endian value of this width from `buf` at `offset`.
    ///
    /// Returns `None` when the run does not fit in `buf`.
    pub fn read_be(self, buf: &[u8], offset: usize) -> Option<u32> {
        let bytes = buf.get(offset..offset.checked_add(self.width())?)?;
        Some(
            bytes
                .iter()
                .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte)),
        )
    }

    /// Writes the low `width` bytes of `value` big-endian into `buf` at `offset`.
    ///
    /// Returns `false` and leaves `buf` untouched when the run does not fit.
    pub fn write_be(self, buf: &mut [u8], offset: usize, value: u32) -> bool {
        let width = self.width();
        let Some(end) = offset.checked_add(width) else {
            return false;
        };
        let Some(target) = buf.get_mut(offset..end) else {
            return false;
        };
        target.copy_from_slice(&value.to_be_bytes()[4 - width..]);
        true
    }

    /// Scales a normalized `0.0..=1.0` value to this resolution, rounding half
    /// away from zero. Inputs outside the range are clamped.
    pub fn denormalize(self, value: f64) -> u32 {
        let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        (clamped * f64::from(self.max_value())).round() as u32
    }
}
