use std::fmt;
use std::str::FromStr;

use super::error::{AddressError, check_range};
use super::parse::{parse_number, split_tokens};
use super::resolution::ParameterResolution;
use super::universe::{CHANNELS_PER_UNIVERSE, UniverseAddress};

/// A channel (1..=512) inside a universe.
///
/// Ordering follows the global channel index, so addresses sort the same way
/// whether compared as pairs or as flat numbers.
///
/// # Examples
/// ```
/// use dmxnet_core::address::{ChannelAddress, ParameterResolution, UniverseAddress};
///
/// let address = ChannelAddress::new(UniverseAddress::new(2)?, 1)?;
/// assert_eq!(address.global_channel(), 1024);
/// assert_eq!(ChannelAddress::from_global(1024)?, address);
/// assert!(address.can_fit_resolution(ParameterResolution::Bit32));
/// # Ok::<(), dmxnet_core::address::AddressError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChannelAddress {
    universe: UniverseAddress,
    channel: u16,
}

impl ChannelAddress {
    pub const CHANNEL_MIN: u16 = 1;
    pub const CHANNEL_MAX: u16 = 512;
    pub const GLOBAL_MAX: u32 =
        UniverseAddress::MAX as u32 * CHANNELS_PER_UNIVERSE + CHANNELS_PER_UNIVERSE - 1;

    pub fn new(universe: UniverseAddress, channel: u16) -> Result<Self, AddressError> {
        check_range(
            "channel",
            channel.into(),
            Self::CHANNEL_MIN.into(),
            Self::CHANNEL_MAX.into(),
        )?;
        Ok(Self { universe, channel })
    }

    pub fn from_global(global: u32) -> Result<Self, AddressError> {
        check_range("global channel", global, 0, Self::GLOBAL_MAX)?;
        let universe = UniverseAddress::new(global / CHANNELS_PER_UNIVERSE)?;
        let channel = (global % CHANNELS_PER_UNIVERSE) as u16 + 1;
        Ok(Self { universe, channel })
    }

    pub const fn universe(self) -> UniverseAddress {
        self.universe
    }

    pub const fn channel(self) -> u16 {
        self.channel
    }

    /// Zero-based offset of this channel inside its universe buffer.
    pub const fn offset(self) -> usize {
        self.channel as usize - 1
    }

    pub const fn global_channel(self) -> u32 {
        self.universe.global_channel_base() + self.channel as u32 - 1
    }

    /// Whether `width` consecutive channels starting here stay in the universe.
    pub const fn can_fit(self, width: usize) -> bool {
        self.offset() + width <= Self::CHANNEL_MAX as usize
    }

    pub const fn can_fit_resolution(self, resolution: ParameterResolution) -> bool {
        self.can_fit(resolution.width())
    }

    /// Same universe, different channel.
    pub fn with_channel(self, channel: u16) -> Result<Self, AddressError> {
        Self::new(self.universe, channel)
    }
}

impl fmt::Display for ChannelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.universe, self.channel)
    }
}

impl FromStr for ChannelAddress {
    type Err = AddressError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        const KIND: &str = "channel address";
        let tokens = split_tokens(KIND, input)?;
        match tokens.as_slice() {
            [global] => Self::from_global(parse_number(KIND, input, global)?),
            [universe, channel] => {
                let universe = UniverseAddress::new(parse_number(KIND, input, universe)?)?;
                let channel = parse_number(KIND, input, channel)?;
                check_range(
                    "channel",
                    channel,
                    Self::CHANNEL_MIN.into(),
                    Self::CHANNEL_MAX.into(),
                )?;
                Self::new(universe, channel as u16)
            }
            _ => Err(AddressError::Parse {
                kind: KIND,
                input: input.to_string(),
                reason: format!("expected 1 or 2 fields, got {}", tokens.len()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe(value: u32) -> UniverseAddress {
        UniverseAddress::new(value).unwrap()
    }

    #[test]
    fn channel_bounds() {
        assert!(ChannelAddress::new(universe(0), 0).is_err());
        assert!(ChannelAddress::new(universe(0), 513).is_err());
        assert!(ChannelAddress::new(universe(0), 512).is_ok());
    }

    #[test]
    fn global_conversion() {
        let address = ChannelAddress::from_global(0).unwrap();
        assert_eq!(address.universe(), universe(0));
        assert_eq!(address.channel(), 1);

        let address = ChannelAddress::from_global(513).unwrap();
        assert_eq!(address.universe(), universe(1));
        assert_eq!(address.channel(), 2);
        assert_eq!(address.global_channel(), 513);

        let last = ChannelAddress::from_global(ChannelAddress::GLOBAL_MAX).unwrap();
        assert_eq!(last.universe(), universe(63999));
        assert_eq!(last.channel(), 512);
        assert!(ChannelAddress::from_global(ChannelAddress::GLOBAL_MAX + 1).is_err());
    }

    #[test]
    fn fit_checks() {
        let at_511 = ChannelAddress::new(universe(0), 511).unwrap();
        let at_512 = ChannelAddress::new(universe(0), 512).unwrap();
        assert!(at_511.can_fit_resolution(ParameterResolution::Bit16));
        assert!(!at_512.can_fit_resolution(ParameterResolution::Bit16));
        assert!(at_512.can_fit(1));
    }

    #[test]
    fn ordering_follows_global_channel() {
        let a = ChannelAddress::new(universe(0), 512).unwrap();
        let b = ChannelAddress::new(universe(1), 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn parse_forms() {
        let address: ChannelAddress = "1.10".parse().unwrap();
        assert_eq!(address.universe(), universe(1));
        assert_eq!(address.channel(), 10);
        assert_eq!(address.to_string(), "1.10");

        let address: ChannelAddress = "521".parse().unwrap();
        assert_eq!(address.universe(), universe(1));
        assert_eq!(address.channel(), 10);

        assert!("1.0".parse::<ChannelAddress>().is_err());
        assert!("1.70000".parse::<ChannelAddress>().is_err());
        assert!("1.2.3".parse::<ChannelAddress>().is_err());
    }
}
