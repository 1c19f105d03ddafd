use super::layout;
use super::packet::SacnDataPacket;
use crate::protocols::DmxDataPacket;
use crate::protocols::common::writer::PacketWriter;

pub(crate) fn write_data_packet(packet: &SacnDataPacket) -> Vec<u8> {
    let data = packet.data();
    let packet_len = layout::DMX_DATA_OFFSET + data.len();
    let mut writer = PacketWriter::with_capacity(packet_len);

    // Root layer
    writer.put_u16_be(layout::PREAMBLE_SIZE);
    writer.put_u16_be(layout::POSTAMBLE_SIZE);
    writer.put_slice(layout::ACN_PID);
    writer.put_u16_be(layout::flags_and_length(
        packet_len,
        layout::ROOT_FLAGS_LENGTH_RANGE.start,
    ));
    writer.put_u32_be(layout::ROOT_VECTOR_DATA);
    writer.put_slice(packet.cid().as_bytes());

    // Framing layer
    writer.put_u16_be(layout::flags_and_length(
        packet_len,
        layout::FRAMING_FLAGS_LENGTH_RANGE.start,
    ));
    writer.put_u32_be(layout::FRAMING_VECTOR_DMX);
    writer.put_padded(
        packet.source_name().as_bytes(),
        layout::SOURCE_NAME_RANGE.len(),
    );
    writer.put_u8(packet.priority());
    writer.put_u16_be(packet.sync_address().map_or(0, |u| u.value()));
    writer.put_u8(packet.sequence());
    writer.put_u8(packet.options().to_byte());
    writer.put_u16_be(packet.universe().value());

    // DMP layer
    debug_assert_eq!(writer.len(), layout::DMP_FLAGS_LENGTH_RANGE.start);
    writer.put_u16_be(layout::flags_and_length(
        packet_len,
        layout::DMP_FLAGS_LENGTH_RANGE.start,
    ));
    writer.put_u8(layout::DMP_VECTOR_SET_PROPERTY);
    writer.put_u8(layout::DMP_ADDRESS_TYPE);
    writer.put_u16_be(layout::DMP_FIRST_ADDRESS);
    writer.put_u16_be(layout::DMP_ADDRESS_INCREMENT);
    writer.put_u16_be(data.len() as u16 + 1);
    writer.put_u8(packet.start_code());
    writer.put_slice(data);
    writer.finish()
}
