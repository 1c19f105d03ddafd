//! dmxnet core library: DMX512 lighting data over Art-Net and sACN.
//!
//! The crate is layered bottom-up: `address` holds universe/channel
//! arithmetic, `protocols` the pure packet codecs (layout/reader/writer/
//! parser), `transport` the UDP socket lifecycle, and `service` the protocol
//! engine that ties them together behind input and output endpoints.
//! `timer` provides the busy-wait clock hosts use to pace output, `status`
//! the level-triggered health value endpoints report. Codecs never perform
//! I/O; every socket operation lives in `transport`.
//!
//! Invariants:
//! - Universe numbers are checked against protocol bounds, never clamped.
//! - Output sequence numbers wrap 255 -> 1 and skip 0.
//! - Packets for one universe reach its input endpoints in registration order.
//!
//! Version française (résumé):
//! Cette crate transporte des univers DMX512 sur Art-Net et sACN :
//! adressage -> codecs purs -> transport UDP -> moteur par protocole.
//! Les E/S restent dans `transport`. Les univers hors limites sont refusés,
//! les numéros de séquence bouclent de 255 à 1.
//!
//! # Examples
//! ```no_run
//! use dmxnet_core::{DmxService, InputEndpointInfo, Sacn, ServiceConfig, UniverseAddress};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = DmxService::new(Sacn::new(), ServiceConfig::default())?;
//! let input = service.add_input_endpoint(InputEndpointInfo::new(UniverseAddress::new(1)?))?;
//! let mut frames = input.subscribe();
//! service.start_listening();
//! let frame = frames.recv().await?;
//! println!("{} slots from {}", frame.data.len(), frame.source);
//! service.stop_listening().await;
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod config;
pub mod protocols;
pub mod service;
pub mod status;
pub mod timer;
pub mod transport;

pub use address::{AddressError, ChannelAddress, ParameterResolution, UniverseAddress};
pub use config::{ConfigError, ServiceConfig};
pub use protocols::truncate_utf8;
pub use service::{
    ArtNet, ArtNetOutputInfo, ArtNetService, ArtNetTarget, DmxDataReceived, DmxProtocol,
    DmxProtocolKind, DmxService, InputEndpoint, InputEndpointInfo, OutputEndpoint,
    OutputEndpointInfo, Sacn, SacnOutputInfo, SacnService, SacnTarget, SendOutcome, ServiceError,
};
pub use status::ServiceStatus;
pub use timer::{PrecisionTimer, TimerError, TimerTick};
pub use uuid::Uuid;
