/// Art-Net operation codes (little-endian on the wire).
///
/// Only [`ArtNetOpCode::Dmx`] is decoded; the rest are recognised so that
/// foreign Art-Net traffic can be told apart from garbage in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ArtNetOpCode {
    Poll = 0x2000,
    PollReply = 0x2100,
    DiagData = 0x2300,
    Command = 0x2400,
    Dmx = 0x5000,
    Nzs = 0x5100,
    Sync = 0x5200,
    Address = 0x6000,
    Input = 0x7000,
    TodRequest = 0x8000,
    TodData = 0x8100,
    TodControl = 0x8200,
    Rdm = 0x8300,
    RdmSub = 0x8400,
    Media = 0x9000,
    MediaPatch = 0x9100,
    MediaControl = 0x9200,
    MediaControlReply = 0x9300,
    TimeCode = 0x9700,
    TimeSync = 0x9800,
    Trigger = 0x9900,
    Directory = 0x9a00,
    DirectoryReply = 0x9b00,
    VideoSetup = 0xa010,
    VideoPalette = 0xa020,
    VideoData = 0xa040,
    MacMaster = 0xf000,
    MacSlave = 0xf100,
    FirmwareMaster = 0xf200,
    FirmwareReply = 0xf300,
    FileTnMaster = 0xf400,
    FileFnMaster = 0xf500,
    FileFnReply = 0xf600,
    IpProg = 0xf800,
    IpProgReply = 0xf900,
}

impl ArtNetOpCode {
    pub fn from_u16(value: u16) -> Option<Self> {
        use ArtNetOpCode::*;
        let opcode = match value {
            0x2000 => Poll,
            0x2100 => PollReply,
            0x2300 => DiagData,
            0x2400 => Command,
            0x5000 => Dmx,
            0x5100 => Nzs,
            0x5200 => Sync,
            0x6000 => Address,
            0x7000 => Input,
            0x8000 => TodRequest,
            0x8100 => TodData,
            0x8200 => TodControl,
            0x8300 => Rdm,
            0x8400 => RdmSub,
            0x9000 => Media,
            0x9100 => MediaPatch,
            0x9200 => MediaControl,
            0x9300 => MediaControlReply,
            0x9700 => TimeCode,
            0x9800 => TimeSync,
            0x9900 => Trigger,
            0x9a00 => Directory,
            0x9b00 => DirectoryReply,
            0xa010 => VideoSetup,
            0xa020 => VideoPalette,
            0xa040 => VideoData,
            0xf000 => MacMaster,
            0xf100 => MacSlave,
            0xf200 => FirmwareMaster,
            0xf300 => FirmwareReply,
            0xf400 => FileTnMaster,
            0xf500 => FileFnMaster,
            0xf600 => FileFnReply,
            0xf800 => IpProg,
            0xf900 => IpProgReply,
            _ => return None,
        };
        Some(opcode)
    }

    pub const fn value(self) -> u16 {
        self as u16
    }
}
