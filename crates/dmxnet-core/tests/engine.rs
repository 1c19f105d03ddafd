mod common;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use common::MemoryTransport;
use dmxnet_core::protocols::DmxDataPacket;
use dmxnet_core::protocols::artnet::ArtDmx;
use dmxnet_core::protocols::sacn::SacnDataPacket;
use dmxnet_core::service::{NO_DATA_MESSAGE, SEND_FAILED_MESSAGE};
use dmxnet_core::{
    ArtNet, ArtNetOutputInfo, ArtNetTarget, ChannelAddress, DmxService, InputEndpointInfo,
    ParameterResolution, Sacn, SacnOutputInfo, SacnTarget, ServiceConfig, ServiceError,
    ServiceStatus, UniverseAddress, Uuid,
};

fn universe(value: u32) -> UniverseAddress {
    UniverseAddress::new(value).unwrap()
}

fn source() -> SocketAddr {
    "192.168.1.20:6454".parse().unwrap()
}

fn artnet_service() -> DmxService<ArtNet, MemoryTransport> {
    DmxService::with_transport(ArtNet, ServiceConfig::default(), MemoryTransport::new()).unwrap()
}

fn sacn_service() -> DmxService<Sacn, MemoryTransport> {
    DmxService::with_transport(
        Sacn::with_cid(Uuid::from_u128(1)),
        ServiceConfig::default(),
        MemoryTransport::new(),
    )
    .unwrap()
}

fn artdmx(universe_value: u32, data: Vec<u8>) -> Vec<u8> {
    ArtDmx::new(universe(universe_value), data, 1, 0)
        .unwrap()
        .serialize()
}

#[test]
fn sacn_joins_once_per_universe_and_leaves_with_last_input() {
    let service = sacn_service();
    let first = service
        .add_input_endpoint(InputEndpointInfo::new(universe(1)))
        .unwrap();
    let second = service
        .add_input_endpoint(InputEndpointInfo::new(universe(1)))
        .unwrap();
    service
        .add_input_endpoint(InputEndpointInfo::new(universe(63999)))
        .unwrap();

    assert_eq!(
        service.transport().joins(),
        vec![Ipv4Addr::new(239, 255, 0, 1), Ipv4Addr::new(239, 255, 249, 255)]
    );

    assert!(service.remove_input_endpoint(first.id()));
    assert!(service.transport().drops().is_empty());
    assert!(service.remove_input_endpoint(second.id()));
    assert_eq!(service.transport().drops(), vec![Ipv4Addr::new(239, 255, 0, 1)]);
    assert!(!service.remove_input_endpoint(second.id()));
}

#[test]
fn artnet_inputs_never_join_groups() {
    let service = artnet_service();
    service
        .add_input_endpoint(InputEndpointInfo::new(universe(1)))
        .unwrap();
    assert!(service.transport().joins().is_empty());
}

#[test]
fn failed_join_rejects_input() {
    let service = sacn_service();
    service.transport().set_fail_joins(true);
    let err = service
        .add_input_endpoint(InputEndpointInfo::new(universe(7)))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Transport(_)));
    assert!(service.input_endpoints().is_empty());
}

#[test]
fn universe_bounds_are_enforced() {
    assert!(UniverseAddress::new(64000).is_err());

    let artnet = artnet_service();
    let err = artnet
        .add_output_endpoint(ArtNetOutputInfo::new(universe(32768), ArtNetTarget::Broadcast))
        .unwrap_err();
    assert!(err.to_string().contains("out of range"));
    assert!(
        artnet
            .add_input_endpoint(InputEndpointInfo::new(universe(32768)))
            .is_err()
    );
    assert!(
        artnet
            .add_output_endpoint(ArtNetOutputInfo::new(universe(32767), ArtNetTarget::Broadcast))
            .is_ok()
    );

    let sacn = sacn_service();
    assert!(matches!(
        sacn.add_input_endpoint(InputEndpointInfo::new(universe(0))),
        Err(ServiceError::InvalidUniverse { .. })
    ));
    assert!(
        sacn.add_input_endpoint(InputEndpointInfo::new(universe(63999)))
            .is_ok()
    );
}

#[test]
fn duplicate_ids_are_rejected() {
    let service = artnet_service();
    let id = Uuid::from_u128(99);
    service
        .add_input_endpoint(InputEndpointInfo::new(universe(1)).with_id(id))
        .unwrap();
    let err = service
        .add_input_endpoint(InputEndpointInfo::new(universe(2)).with_id(id))
        .unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateEndpoint { id: dup } if dup == id));

    let info = ArtNetOutputInfo::new(universe(1), ArtNetTarget::Broadcast).with_id(id);
    service.add_output_endpoint(info.clone()).unwrap();
    assert!(service.add_output_endpoint(info).is_err());
    assert_eq!(service.output_endpoints().len(), 1);
}

#[test]
fn artnet_sequence_starts_at_one_and_skips_zero() {
    let service = artnet_service();
    service
        .add_output_endpoint(ArtNetOutputInfo::new(universe(1), ArtNetTarget::Broadcast))
        .unwrap();
    for _ in 0..257 {
        assert!(service.send_output().iter().all(|outcome| outcome.success));
    }

    let sequences: Vec<u8> = service
        .transport()
        .sent()
        .iter()
        .map(|(bytes, _)| ArtDmx::deserialize(bytes).unwrap().sequence())
        .collect();
    assert_eq!(sequences[0], 1);
    assert_eq!(sequences[254], 255);
    assert_eq!(sequences[255], 1);
    assert_eq!(sequences[256], 2);
    assert!(!sequences.contains(&0));
}

#[test]
fn sacn_sequence_starts_at_zero_then_wraps_to_one() {
    let service = sacn_service();
    service
        .add_output_endpoint(SacnOutputInfo::new(universe(1), "desk", SacnTarget::Multicast).unwrap())
        .unwrap();
    for _ in 0..258 {
        service.send_output();
    }

    let sequences: Vec<u8> = service
        .transport()
        .sent()
        .iter()
        .map(|(bytes, _)| SacnDataPacket::deserialize(bytes).unwrap().sequence())
        .collect();
    assert_eq!(&sequences[..3], &[0, 1, 2]);
    assert_eq!(sequences[255], 255);
    assert_eq!(sequences[256], 1);
    assert_eq!(sequences[257], 2);
}

#[test]
fn multicast_output_targets_universe_group() {
    let service = sacn_service();
    let output = service
        .add_output_endpoint(SacnOutputInfo::new(universe(258), "desk", SacnTarget::Multicast).unwrap())
        .unwrap();
    assert_eq!(output.destination().to_string(), "239.255.1.2:5568");
    service.send_output();
    assert_eq!(service.transport().sent()[0].1, output.destination());
}

#[test]
fn failed_send_still_advances_sequence() {
    let service = artnet_service();
    let output = service
        .add_output_endpoint(ArtNetOutputInfo::new(universe(1), ArtNetTarget::Broadcast))
        .unwrap();
    service.transport().set_fail_sends(true);

    let outcomes = service.send_output();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].endpoint_id, output.id());
    assert!(!outcomes[0].success);
    assert_eq!(output.sequence(), 2);
    assert_eq!(output.status(), ServiceStatus::warning(SEND_FAILED_MESSAGE));

    service.transport().set_fail_sends(false);
    assert!(output.send_data_packet());
    assert_eq!(output.status(), ServiceStatus::Ok);
    assert_eq!(output.sequence(), 3);
}

#[test]
fn short_write_counts_as_failure() {
    let service = artnet_service();
    let output = service
        .add_output_endpoint(ArtNetOutputInfo::new(universe(1), ArtNetTarget::Broadcast))
        .unwrap();
    service.transport().set_short_writes(true);
    assert!(!output.send_data_packet());
    assert_eq!(output.status(), ServiceStatus::warning(SEND_FAILED_MESSAGE));
}

#[tokio::test]
async fn async_fan_out_reports_every_endpoint() {
    let service = artnet_service();
    let first = service
        .add_output_endpoint(ArtNetOutputInfo::new(universe(1), ArtNetTarget::Broadcast))
        .unwrap();
    let second = service
        .add_output_endpoint(ArtNetOutputInfo::new(
            universe(2),
            ArtNetTarget::Unicast("10.0.0.9".parse().unwrap()),
        ))
        .unwrap();

    let outcomes = service.send_output_async().await;
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].endpoint_id, first.id());
    assert_eq!(outcomes[1].endpoint_id, second.id());
    assert!(outcomes.iter().all(|outcome| outcome.success));

    let targets: Vec<SocketAddr> = service.transport().sent().into_iter().map(|(_, t)| t).collect();
    assert!(targets.contains(&"2.255.255.255:6454".parse().unwrap()));
    assert!(targets.contains(&"10.0.0.9:6454".parse().unwrap()));
}

#[test]
fn removed_outputs_stop_sending() {
    let service = artnet_service();
    let output = service
        .add_output_endpoint(ArtNetOutputInfo::new(universe(1), ArtNetTarget::Broadcast))
        .unwrap();
    assert!(service.remove_output_endpoint(output.id()));
    assert!(!service.remove_output_endpoint(output.id()));
    assert!(service.send_output().is_empty());
    assert!(service.transport().sent().is_empty());
}

#[test]
fn start_listening_requires_an_input() {
    let service = artnet_service();
    assert!(!service.start_listening());
    service
        .add_input_endpoint(InputEndpointInfo::new(universe(1)))
        .unwrap();
    assert!(service.start_listening());
    assert!(service.is_bound());
}

#[tokio::test]
async fn stop_listening_releases_transport() {
    let service = artnet_service();
    service
        .add_input_endpoint(InputEndpointInfo::new(universe(1)))
        .unwrap();
    assert!(service.start_listening());
    service.stop_listening().await;
    assert!(!service.is_listening());
    assert!(service.start_listening());
}

#[test]
fn delivers_to_every_input_of_the_universe_in_order() {
    let service = artnet_service();
    let first = service
        .add_input_endpoint(InputEndpointInfo::new(universe(3)))
        .unwrap();
    let second = service
        .add_input_endpoint(InputEndpointInfo::new(universe(3)))
        .unwrap();
    let other = service
        .add_input_endpoint(InputEndpointInfo::new(universe(4)))
        .unwrap();
    let mut first_events = first.subscribe();
    let mut second_events = second.subscribe();
    assert!(service.start_listening());

    service.transport().inject(artdmx(3, vec![10, 20, 30]), source());

    assert_eq!(first.data().as_deref(), Some(&[10, 20, 30][..]));
    assert_eq!(second.data().as_deref(), Some(&[10, 20, 30][..]));
    assert!(other.data().is_none());
    assert!(first.last_received().unwrap() <= second.last_received().unwrap());

    let event = first_events.try_recv().unwrap();
    assert_eq!(event.endpoint_id, first.id());
    assert_eq!(event.universe, universe(3));
    assert_eq!(event.source, source());
    assert_eq!(&event.data[..], &[10, 20, 30]);
    assert_eq!(second_events.try_recv().unwrap().endpoint_id, second.id());
    assert_eq!(first.status(), ServiceStatus::Ok);
    assert_eq!(first.last_source(), Some(source()));
}

#[test]
fn malformed_and_foreign_datagrams_are_ignored() {
    let service = sacn_service();
    let input = service
        .add_input_endpoint(InputEndpointInfo::new(universe(1)))
        .unwrap();
    assert!(service.start_listening());

    service.transport().inject(Vec::new(), source());
    service.transport().inject(vec![0xFF; 700], source());
    service.transport().inject(artdmx(1, vec![1, 2]), source());

    let valid = SacnDataPacket::builder(Uuid::nil(), universe(1))
        .data(vec![9; 16])
        .build()
        .unwrap()
        .serialize();
    service.transport().inject(valid[..valid.len() - 20].to_vec(), source());

    let alternate = SacnDataPacket::builder(Uuid::nil(), universe(1))
        .start_code(0xDD)
        .data(vec![1; 16])
        .build()
        .unwrap()
        .serialize();
    service.transport().inject(alternate, source());

    assert!(input.data().is_none());
    assert_eq!(input.status(), ServiceStatus::Idle);

    service.transport().inject(valid, source());
    assert_eq!(input.data().as_deref(), Some(&[9; 16][..]));
}

#[test]
fn on_packet_received_works_without_listening() {
    let service = artnet_service();
    let input = service
        .add_input_endpoint(InputEndpointInfo::new(universe(0)))
        .unwrap();
    service.on_packet_received(&dmxnet_core::transport::Datagram::new(
        artdmx(0, vec![1, 2, 3, 4]),
        source(),
    ));
    assert_eq!(input.data().map(|data| data.len()), Some(4));
}

#[test]
fn input_status_tracks_staleness() {
    let service = artnet_service();
    let input = service
        .add_input_endpoint(InputEndpointInfo::new(universe(1)))
        .unwrap();
    assert_eq!(input.status(), ServiceStatus::Idle);

    service.refresh_status();
    assert_eq!(input.status(), ServiceStatus::warning(NO_DATA_MESSAGE));

    service.on_packet_received(&dmxnet_core::transport::Datagram::new(
        artdmx(1, vec![0; 512]),
        source(),
    ));
    assert_eq!(input.status(), ServiceStatus::Ok);

    let last = input.last_received().unwrap();
    input.refresh_status_at(last + Duration::from_millis(400));
    assert_eq!(input.status(), ServiceStatus::Ok);
    input.refresh_status_at(last + Duration::from_millis(600));
    assert_eq!(input.status(), ServiceStatus::warning(NO_DATA_MESSAGE));
}

#[test]
fn status_changes_notify_subscribers_once() {
    let service = artnet_service();
    let input = service
        .add_input_endpoint(InputEndpointInfo::new(universe(1)))
        .unwrap();
    let mut status = input.subscribe_status();

    input.refresh_status();
    assert!(status.has_changed().unwrap());
    status.borrow_and_update();
    input.refresh_status();
    assert!(!status.has_changed().unwrap());
}

#[test]
fn parameters_round_trip_through_the_wire() {
    let service = artnet_service();
    let output = service
        .add_output_endpoint(ArtNetOutputInfo::new(universe(5), ArtNetTarget::Broadcast))
        .unwrap();
    let input = service
        .add_input_endpoint(InputEndpointInfo::new(universe(5)))
        .unwrap();

    output.write(511, 0xABCD, ParameterResolution::Bit16).unwrap();
    assert!(matches!(
        output.write(512, 1, ParameterResolution::Bit16),
        Err(ServiceError::ParameterDoesNotFit { channel: 512, width: 2 })
    ));
    assert!(output.write(0, 1, ParameterResolution::Bit8).is_err());
    output.write_normalized(1, 0.5, ParameterResolution::Bit8).unwrap();
    output.set_data(&[]).unwrap();
    assert!(matches!(
        output.set_data(&[0; 513]),
        Err(ServiceError::DataTooLong { length: 513 })
    ));

    service.send_output();
    let (bytes, _) = service.transport().sent().remove(0);
    service.on_packet_received(&dmxnet_core::transport::Datagram::new(bytes, source()));

    let channel = |value| ChannelAddress::new(universe(5), value).unwrap();
    assert_eq!(input.read(channel(511), ParameterResolution::Bit16), Some(0xABCD));
    assert_eq!(input.read(channel(1), ParameterResolution::Bit8), Some(128));
    assert_eq!(input.read(channel(512), ParameterResolution::Bit16), None);
    let elsewhere = ChannelAddress::new(universe(6), 1).unwrap();
    assert_eq!(input.read(elsewhere, ParameterResolution::Bit8), None);
}

#[test]
fn set_data_keeps_trailing_slots() {
    let service = artnet_service();
    let output = service
        .add_output_endpoint(ArtNetOutputInfo::new(universe(1), ArtNetTarget::Broadcast))
        .unwrap();
    output.set_data(&[7; 512]).unwrap();
    output.set_data(&[1, 2]).unwrap();
    let data = output.data();
    assert_eq!(&data[..3], &[1, 2, 7]);
    assert_eq!(data[511], 7);
}

#[test]
fn endpoints_are_listed() {
    let service = artnet_service();
    let high = service
        .add_input_endpoint(InputEndpointInfo::new(universe(9)))
        .unwrap();
    let low = service
        .add_input_endpoint(InputEndpointInfo::new(universe(2)))
        .unwrap();
    let ids: Vec<Uuid> = service.input_endpoints().iter().map(|input| input.id()).collect();
    assert_eq!(ids, vec![low.id(), high.id()]);
    assert!(Arc::ptr_eq(&service.input_endpoints()[1], &high));
}
