use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{AddressError, check_range};
use super::parse::{parse_number, split_tokens};

/// Number of channels carried by one universe.
pub const CHANNELS_PER_UNIVERSE: u32 = 512;

/// A DMX universe number shared by Art-Net and sACN.
///
/// The flat value covers 0..=63999. The Art-Net view (Net/SubNet/Universe)
/// is only meaningful up to [`UniverseAddress::ARTNET_MAX`].
///
/// # Examples
/// ```
/// use std::net::Ipv4Addr;
///
/// use dmxnet_core::address::UniverseAddress;
///
/// let universe = UniverseAddress::from_artnet(1, 2, 3)?;
/// assert_eq!(universe.value(), 0x123);
/// assert_eq!(universe.sacn_multicast_group(), Ipv4Addr::new(239, 255, 1, 35));
/// # Ok::<(), dmxnet_core::address::AddressError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u16")]
pub struct UniverseAddress(u16);

impl UniverseAddress {
    pub const MIN: u16 = 0;
    pub const MAX: u16 = 63999;
    pub const ARTNET_MAX: u16 = 32767;
    pub const ARTNET_NET_MAX: u8 = 127;
    pub const ARTNET_SUBNET_MAX: u8 = 15;
    pub const ARTNET_UNIVERSE_MAX: u8 = 15;

    pub fn new(value: u32) -> Result<Self, AddressError> {
        check_range("universe", value, Self::MIN.into(), Self::MAX.into())?;
        Ok(Self(value as u16))
    }

    /// Builds a universe from the Art-Net triple `net << 8 | subnet << 4 | universe`.
    pub fn from_artnet(net: u8, subnet: u8, universe: u8) -> Result<Self, AddressError> {
        check_range("Art-Net net", net.into(), 0, Self::ARTNET_NET_MAX.into())?;
        check_range("Art-Net subnet", subnet.into(), 0, Self::ARTNET_SUBNET_MAX.into())?;
        check_range(
            "Art-Net universe",
            universe.into(),
            0,
            Self::ARTNET_UNIVERSE_MAX.into(),
        )?;
        Ok(Self(
            (u16::from(net) << 8) | (u16::from(subnet) << 4) | u16::from(universe),
        ))
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    pub const fn is_artnet_addressable(self) -> bool {
        self.0 <= Self::ARTNET_MAX
    }

    pub const fn artnet_net(self) -> u8 {
        ((self.0 >> 8) & 0x7F) as u8
    }

    pub const fn artnet_subnet(self) -> u8 {
        ((self.0 >> 4) & 0x0F) as u8
    }

    pub const fn artnet_universe(self) -> u8 {
        (self.0 & 0x0F) as u8
    }

    /// The SubUni byte of an ArtDmx header: subnet in the high nibble.
    pub const fn artnet_sub_uni(self) -> u8 {
        (self.artnet_subnet() << 4) | self.artnet_universe()
    }

    /// Global channel index of channel 1 of this universe.
    pub const fn global_channel_base(self) -> u32 {
        self.0 as u32 * CHANNELS_PER_UNIVERSE
    }

    /// sACN multicast group `239.255.hi.lo`.
    pub const fn sacn_multicast_group(self) -> Ipv4Addr {
        let [hi, lo] = self.0.to_be_bytes();
        Ipv4Addr::new(239, 255, hi, lo)
    }
}

impl TryFrom<u32> for UniverseAddress {
    type Error = AddressError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UniverseAddress> for u16 {
    fn from(value: UniverseAddress) -> Self {
        value.0
    }
}

impl fmt::Display for UniverseAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UniverseAddress {
    type Err = AddressError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        const KIND: &str = "universe address";
        let tokens = split_tokens(KIND, input)?;
        match tokens.as_slice() {
            [flat] => Self::new(parse_number(KIND, input, flat)?),
            [subnet, universe] => Self::from_artnet(
                0,
                parse_u8(input, subnet)?,
                parse_u8(input, universe)?,
            ),
            [net, subnet, universe] => Self::from_artnet(
                parse_u8(input, net)?,
                parse_u8(input, subnet)?,
                parse_u8(input, universe)?,
            ),
            _ => Err(AddressError::Parse {
                kind: KIND,
                input: input.to_string(),
                reason: format!("expected 1 to 3 fields, got {}", tokens.len()),
            }),
        }
    }
}

fn parse_u8(input: &str, token: &str) -> Result<u8, AddressError> {
    let value = parse_number("universe address", input, token)?;
    u8::try_from(value).map_err(|_| AddressError::Parse {
        kind: "universe address",
        input: input.to_string(),
        reason: format!("field '{token}' does not fit in a byte"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        assert!(UniverseAddress::new(63999).is_ok());
        let err = UniverseAddress::new(64000).unwrap_err();
        assert!(err.to_string().contains("universe out of range"));
    }

    #[test]
    fn artnet_triple_round_trip() {
        let universe = UniverseAddress::from_artnet(127, 15, 15).unwrap();
        assert_eq!(universe.value(), UniverseAddress::ARTNET_MAX);
        assert_eq!(universe.artnet_net(), 127);
        assert_eq!(universe.artnet_subnet(), 15);
        assert_eq!(universe.artnet_universe(), 15);
        assert_eq!(universe.artnet_sub_uni(), 0xFF);
        assert!(universe.is_artnet_addressable());
        assert!(!UniverseAddress::new(32768).unwrap().is_artnet_addressable());
    }

    #[test]
    fn artnet_triple_rejects_wide_fields() {
        assert!(UniverseAddress::from_artnet(128, 0, 0).is_err());
        assert!(UniverseAddress::from_artnet(0, 16, 0).is_err());
        assert!(UniverseAddress::from_artnet(0, 0, 16).is_err());
    }

    #[test]
    fn multicast_group() {
        let one = UniverseAddress::new(1).unwrap();
        assert_eq!(one.sacn_multicast_group(), Ipv4Addr::new(239, 255, 0, 1));
        let last = UniverseAddress::new(63999).unwrap();
        assert_eq!(last.sacn_multicast_group(), Ipv4Addr::new(239, 255, 249, 255));
    }

    #[test]
    fn parse_flat_and_triples() {
        assert_eq!("300".parse::<UniverseAddress>().unwrap().value(), 300);
        assert_eq!("1.2".parse::<UniverseAddress>().unwrap().value(), 0x12);
        assert_eq!("1:2:3".parse::<UniverseAddress>().unwrap().value(), 0x123);
        assert_eq!("1 2_3".parse::<UniverseAddress>().unwrap().value(), 0x123);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<UniverseAddress>().is_err());
        assert!("a.b".parse::<UniverseAddress>().is_err());
        assert!("1.2.3.4".parse::<UniverseAddress>().is_err());
        assert!("1..2".parse::<UniverseAddress>().is_err());
        assert!("64000".parse::<UniverseAddress>().is_err());
    }

    #[test]
    fn serde_is_transparent_and_checked() {
        let universe: UniverseAddress = serde_json::from_str("7").unwrap();
        assert_eq!(universe.value(), 7);
        assert_eq!(serde_json::to_string(&universe).unwrap(), "7");
        assert!(serde_json::from_str::<UniverseAddress>("70000").is_err());
    }
}
