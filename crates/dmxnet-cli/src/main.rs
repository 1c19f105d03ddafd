use std::fs;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dmxnet_core::protocols::sacn::host_name;
use dmxnet_core::protocols::sacn::layout::SOURCE_NAME_MAX_LEN;
use dmxnet_core::service::OutputEndpointInfo;
use dmxnet_core::{
    ArtNet, ArtNetOutputInfo, ArtNetTarget, DmxDataReceived, DmxProtocol, DmxProtocolKind,
    DmxService, InputEndpointInfo, PrecisionTimer, Sacn, SacnOutputInfo, SacnTarget,
    ServiceConfig, ServiceError, ServiceStatus, UniverseAddress, truncate_utf8,
};
use time::format_description::well_known::Rfc3339;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

mod logging;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("DMXNET_BUILD_COMMIT"),
    ", ",
    env!("DMXNET_BUILD_DATE"),
    ")"
);

const EXAMPLES: &str = "Examples:\n  dmxnet send --protocol artnet --universe 0.1 --level 128\n  dmxnet send --protocol sacn --universe 1 --unicast 192.168.1.50 --ramp\n  dmxnet listen --protocol sacn --universe 1 --json";

const UNIVERSE_HINT: &str =
    "use a flat number, subnet.universe or net.subnet.universe (Art-Net 0..=32767, sACN 1..=63999)";

#[derive(Parser, Debug)]
#[command(name = "dmxnet")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Send and receive DMX512 universes over Art-Net and sACN.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors; suppresses summaries
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct NetworkArgs {
    /// Protocol: artnet (art-net) or sacn (acn, e1.31)
    #[arg(short, long, default_value = "artnet")]
    protocol: String,

    /// Universe: flat number, subnet.universe or net.subnet.universe
    #[arg(short, long, default_value = "1")]
    universe: String,

    /// Local adapter address to bind and send from
    #[arg(long)]
    adapter: Option<IpAddr>,

    /// Override the protocol port (6454 for Art-Net, 5568 for sACN)
    #[arg(long)]
    port: Option<u16>,

    /// JSON file with engine settings; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Transmit one universe at the output framerate.
    #[command(after_help = EXAMPLES)]
    Send {
        #[command(flatten)]
        network: NetworkArgs,

        /// Send to this address instead of broadcast (Art-Net) or multicast (sACN)
        #[arg(long)]
        unicast: Option<IpAddr>,

        /// Art-Net only: broadcast to 10.255.255.255 instead of 2.255.255.255
        #[arg(long, conflicts_with = "unicast")]
        alt_broadcast: bool,

        /// sACN source name (defaults to the host name, max 63 bytes)
        #[arg(long)]
        source_name: Option<String>,

        /// Value written to every channel
        #[arg(long, default_value_t = 255)]
        level: u8,

        /// Step all channels from 0 up to --level, one step per frame, then repeat
        #[arg(long)]
        ramp: bool,

        /// Stop after this many frames (default: until Ctrl-C)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        frames: Option<u64>,

        /// Frames per second
        #[arg(long)]
        framerate: Option<f64>,
    },
    /// Print frames received on one universe.
    #[command(after_help = EXAMPLES)]
    Listen {
        #[command(flatten)]
        network: NetworkArgs,

        /// Stop after this many frames (default: until Ctrl-C)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        frames: Option<u64>,

        /// One JSON object per frame instead of text lines
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Send {
            network,
            unicast,
            alt_broadcast,
            source_name,
            level,
            ramp,
            frames,
            framerate,
        } => cmd_send(
            network,
            SendOptions {
                unicast,
                alt_broadcast,
                source_name,
                pattern: Pattern { level, ramp },
                frames,
                framerate,
                quiet: cli.quiet,
            },
        ),
        Commands::Listen {
            network,
            frames,
            json,
        } => cmd_listen(network, frames, json, cli.quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{:#}", err), None)
    }
}

impl From<ServiceError> for CliError {
    fn from(err: ServiceError) -> Self {
        let hint = match &err {
            ServiceError::InvalidUniverse { .. } => Some(UNIVERSE_HINT.to_string()),
            ServiceError::Transport(_) => {
                Some("check --adapter; another program may hold the port".to_string())
            }
            ServiceError::Config(_) => Some("check the config file or --framerate".to_string()),
            _ => None,
        };
        CliError::new(err.to_string(), hint)
    }
}

#[derive(Debug, Clone, Copy)]
struct Pattern {
    level: u8,
    ramp: bool,
}

impl Pattern {
    /// Channel value for the 1-based frame `count`.
    fn value(self, count: u64) -> u8 {
        if !self.ramp {
            return self.level;
        }
        let steps = u64::from(self.level) + 1;
        // Always < 256.
        ((count.saturating_sub(1)) % steps) as u8
    }
}

struct SendOptions {
    unicast: Option<IpAddr>,
    alt_broadcast: bool,
    source_name: Option<String>,
    pattern: Pattern,
    frames: Option<u64>,
    framerate: Option<f64>,
    quiet: bool,
}

fn parse_kind(input: &str) -> Result<DmxProtocolKind, CliError> {
    input.parse().map_err(|err: dmxnet_core::service::UnknownProtocolKind| {
        CliError::new(err.to_string(), Some("use --protocol artnet or --protocol sacn".to_string()))
    })
}

fn parse_universe(input: &str) -> Result<UniverseAddress, CliError> {
    input
        .parse()
        .map_err(|err: dmxnet_core::AddressError| CliError::new(err.to_string(), Some(UNIVERSE_HINT.to_string())))
}

fn load_config(network: &NetworkArgs, framerate: Option<f64>) -> Result<ServiceConfig, CliError> {
    let mut config = match &network.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            ServiceConfig::from_json_str(&text).map_err(|err| {
                CliError::new(
                    format!("{}: {}", path.display(), err),
                    Some("expected {\"adapter\": \"0.0.0.0\", \"port\": 6454, \"output_framerate\": 44.0}".to_string()),
                )
            })?
        }
        None => ServiceConfig::default(),
    };
    if let Some(adapter) = network.adapter {
        config.adapter = adapter;
    }
    if network.port.is_some() {
        config.port = network.port;
    }
    if let Some(framerate) = framerate {
        config.output_framerate = framerate;
    }
    config.validate().map_err(|err| {
        CliError::new(err.to_string(), Some("use a positive --framerate such as 44".to_string()))
    })?;
    Ok(config)
}

fn cmd_send(network: NetworkArgs, options: SendOptions) -> Result<(), CliError> {
    let kind = parse_kind(&network.protocol)?;
    let universe = parse_universe(&network.universe)?;
    let config = load_config(&network, options.framerate)?;

    match kind {
        DmxProtocolKind::ArtNet => {
            let target = match (options.unicast, options.alt_broadcast) {
                (Some(ip), _) => ArtNetTarget::Unicast(ip),
                (None, true) => ArtNetTarget::AltBroadcast,
                (None, false) => ArtNetTarget::Broadcast,
            };
            let service = DmxService::new(ArtNet, config)?;
            run_send(service, ArtNetOutputInfo::new(universe, target), &options)
        }
        DmxProtocolKind::Sacn => {
            if options.alt_broadcast {
                return Err(CliError::new(
                    "--alt-broadcast only applies to Art-Net",
                    Some("use --unicast <ip> or the default multicast for sACN".to_string()),
                ));
            }
            let target = options.unicast.map_or(SacnTarget::Multicast, SacnTarget::Unicast);
            let name = options.source_name.clone().unwrap_or_else(host_name);
            let info = SacnOutputInfo::new(universe, truncate_utf8(&name, SOURCE_NAME_MAX_LEN), target)
                .map_err(|err| CliError::new(err.to_string(), None))?;
            let service = DmxService::new(Sacn::new(), config)?;
            run_send(service, info, &options)
        }
    }
}

fn run_send<P: DmxProtocol>(
    service: DmxService<P>,
    info: P::OutputInfo,
    options: &SendOptions,
) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let universe = info.universe();
    let service = Arc::new(service);
    let output = service.add_output_endpoint(info)?;
    let destination = output.destination();
    let timer = PrecisionTimer::from_framerate(service.output_framerate())
        .map_err(|err| CliError::new(err.to_string(), Some("use a positive --framerate".to_string())))?
        .with_skip_threshold(Some(Duration::from_millis(5)));

    let sent = Arc::new(AtomicU64::new(0));
    let failed = Arc::new(AtomicU64::new(0));
    let (done_tx, mut done_rx) = tokio::sync::mpsc::unbounded_channel::<()>();
    let pattern = options.pattern;
    let frames = options.frames;

    info!(
        protocol = %P::KIND,
        universe = %universe,
        target = %destination,
        framerate = service.output_framerate(),
        "sending"
    );

    {
        let service = Arc::clone(&service);
        let output = Arc::clone(&output);
        let sent = Arc::clone(&sent);
        let failed = Arc::clone(&failed);
        let mut frame = 0u64;
        timer
            .start(move |tick| {
                if frames.is_some_and(|limit| frame >= limit) {
                    return;
                }
                frame += 1;
                let value = pattern.value(frame);
                if output.set_data(&[value; 512]).is_err() {
                    return;
                }
                for outcome in service.send_output() {
                    if outcome.success {
                        sent.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
                debug!(frame, tick = tick.count, late_by = ?tick.late_by, value, "frame sent");
                if frames.is_some_and(|limit| frame >= limit) {
                    let _ = done_tx.send(());
                }
            })
            .map_err(|err| CliError::new(err.to_string(), None))?;
    }

    let mut status = output.subscribe_status();
    runtime.block_on(async {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        loop {
            tokio::select! {
                _ = done_rx.recv() => break,
                _ = &mut ctrl_c => break,
                changed = status.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let current = status.borrow_and_update().clone();
                    report_status(&current);
                }
            }
        }
    });
    let _ = timer.stop();

    let sent = sent.load(Ordering::Relaxed);
    let failed = failed.load(Ordering::Relaxed);
    if !options.quiet {
        eprintln!("OK: {} frames sent -> {} ({} failed)", sent, destination, failed);
    }
    if sent == 0 && failed > 0 {
        return Err(CliError::new(
            format!("every send to {} failed", destination),
            Some("check --adapter and the network route to the target".to_string()),
        ));
    }
    Ok(())
}

fn cmd_listen(
    network: NetworkArgs,
    frames: Option<u64>,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let kind = parse_kind(&network.protocol)?;
    let universe = parse_universe(&network.universe)?;
    let config = load_config(&network, None)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    match kind {
        DmxProtocolKind::ArtNet => {
            let service = DmxService::new(ArtNet, config)?;
            runtime.block_on(run_listen(service, universe, frames, json, quiet))
        }
        DmxProtocolKind::Sacn => {
            let service = DmxService::new(Sacn::new(), config)?;
            runtime.block_on(run_listen(service, universe, frames, json, quiet))
        }
    }
}

async fn run_listen<P: DmxProtocol>(
    service: DmxService<P>,
    universe: UniverseAddress,
    frames: Option<u64>,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let input = service.add_input_endpoint(InputEndpointInfo::new(universe))?;
    let mut events = input.subscribe();
    let mut status = input.subscribe_status();
    if !service.start_listening() {
        return Err(CliError::new(
            format!("failed to listen on {}", service.local_endpoint()),
            Some("check --adapter and --port; run with --verbose for details".to_string()),
        ));
    }
    info!(protocol = %P::KIND, universe = %universe, local = %service.local_endpoint(), "listening");

    let mut refresh = tokio::time::interval(Duration::from_millis(100));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut received = 0u64;
    let result = loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(frame) => {
                    if let Err(err) = print_frame(&frame, json) {
                        break Err(err);
                    }
                    received += 1;
                    if frames.is_some_and(|limit| received >= limit) {
                        break Ok(());
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "output too slow, frames dropped"),
                Err(RecvError::Closed) => break Ok(()),
            },
            _ = refresh.tick() => service.refresh_status(),
            changed = status.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let current = status.borrow_and_update().clone();
                report_status(&current);
            }
            _ = &mut ctrl_c => break Ok(()),
        }
    };
    service.stop_listening().await;

    if result.is_ok() && !quiet {
        eprintln!("OK: {} frames received", received);
    }
    result
}

fn print_frame(frame: &DmxDataReceived, json: bool) -> Result<(), CliError> {
    if json {
        let line = serde_json::to_string(frame).context("JSON serialization failed")?;
        println!("{}", line);
        return Ok(());
    }
    let timestamp = frame
        .received_at
        .format(&Rfc3339)
        .context("Failed to format timestamp")?;
    let preview: Vec<String> = frame.data.iter().take(8).map(|b| format!("{:02x}", b)).collect();
    println!(
        "{} universe {} from {} ({} slots) {}",
        timestamp,
        frame.universe,
        frame.source,
        frame.data.len(),
        preview.join(" ")
    );
    Ok(())
}

fn report_status(status: &ServiceStatus) {
    match status {
        ServiceStatus::Warning(_) | ServiceStatus::Error(_) => warn!(status = %status, "status changed"),
        _ => info!(status = %status, "status changed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_pattern_ignores_frame() {
        let pattern = Pattern {
            level: 200,
            ramp: false,
        };
        assert_eq!(pattern.value(1), 200);
        assert_eq!(pattern.value(999), 200);
    }

    #[test]
    fn ramp_wraps_after_level() {
        let pattern = Pattern {
            level: 2,
            ramp: true,
        };
        let values: Vec<u8> = (1..=7).map(|count| pattern.value(count)).collect();
        assert_eq!(values, vec![0, 1, 2, 0, 1, 2, 0]);

        let full = Pattern {
            level: 255,
            ramp: true,
        };
        assert_eq!(full.value(256), 255);
        assert_eq!(full.value(257), 0);
    }
}
