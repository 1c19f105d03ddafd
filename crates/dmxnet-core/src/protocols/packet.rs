use crate::address::UniverseAddress;

/// Start code of standard dimmer data.
pub const NULL_START_CODE: u8 = 0x00;

/// Highest number of channel slots a data packet may carry.
pub const DMX_MAX_SLOTS: usize = 512;

/// Common view over the data-carrying packet of each protocol.
pub trait DmxDataPacket {
    fn universe(&self) -> UniverseAddress;
    fn sequence(&self) -> u8;
    fn start_code(&self) -> u8;
    fn data(&self) -> &[u8];
}

/// Next output sequence number: `current + 1`, skipping 0 on wrap.
///
/// # Examples
/// ```
/// use dmxnet_core::protocols::next_sequence;
///
/// assert_eq!(next_sequence(0), 1);
/// assert_eq!(next_sequence(254), 255);
/// assert_eq!(next_sequence(255), 1);
/// ```
pub const fn next_sequence(current: u8) -> u8 {
    match current.wrapping_add(1) {
        0 => 1,
        next => next,
    }
}
