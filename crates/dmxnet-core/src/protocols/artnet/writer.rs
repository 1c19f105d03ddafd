use super::layout;
use super::packet::ArtDmx;
use crate::protocols::DmxDataPacket;
use crate::protocols::common::writer::PacketWriter;

pub(crate) fn write_artdmx(packet: &ArtDmx) -> Vec<u8> {
    let data = packet.data();
    let mut writer = PacketWriter::with_capacity(layout::DMX_DATA_OFFSET + data.len());
    writer.put_slice(layout::ARTNET_ID);
    writer.put_u16_le(layout::ARTDMX_OPCODE);
    writer.put_u16_be(layout::PROTOCOL_VERSION);
    writer.put_u8(packet.sequence());
    writer.put_u8(packet.physical());
    writer.put_u8(packet.universe().artnet_sub_uni());
    writer.put_u8(packet.universe().artnet_net());
    debug_assert_eq!(writer.len(), layout::LENGTH_RANGE.start);
    writer.put_u16_be(data.len() as u16);
    writer.put_slice(data);
    writer.finish()
}
