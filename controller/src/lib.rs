//! Thruster controller node.
//!
//! Receives observations and acceleration commands over UDP, keeps the vehicle
//! model and environment current, and publishes one thrust command per
//! acceleration command.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vehicle::{builtins::reference_vehicle, EnvironmentThresholds, LmConfig, VehicleSpec};

mod dispatch;
pub use dispatch::{OutboundSink, RecordingSink, ThrusterController};
mod transport;
pub use transport::{InboundSource, UdpLink, UdpPublisher};

#[derive(Parser, Debug, Clone)]
#[command(name = "controller", about = "AUV thruster allocation node")]
pub struct Args {
    /// Path to the TOML configuration.
    #[arg(long, default_value = "controller.toml")]
    pub config: PathBuf,
}

/// Node configuration. `vehicle` has no default: a file without it is
/// rejected rather than run on a built-in hull.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind")]
    pub bind: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Where thrust commands and buoyancy estimates are sent. Required by
    /// `run_node`.
    #[serde(default)]
    pub publish_to: Option<SocketAddr>,
    /// Enables the buoyancy-center estimator and live reconfiguration.
    #[serde(default)]
    pub calibration: bool,
    #[serde(default)]
    pub thresholds: EnvironmentThresholds,
    #[serde(default)]
    pub solver: SolverConfig,
    pub vehicle: VehicleSpec,
}

fn default_bind() -> IpAddr { IpAddr::V4(Ipv4Addr::UNSPECIFIED) }
fn default_port() -> u16 { 7600 }

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            publish_to: None,
            calibration: false,
            thresholds: EnvironmentThresholds::default(),
            solver: SolverConfig::default(),
            vehicle: reference_vehicle(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub allocation: LmConfig,
    pub estimator: LmConfig,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            allocation: LmConfig::default(),
            estimator: LmConfig { max_iterations: vehicle::allocation::ESTIMATOR_MAX_ITERATIONS, ..LmConfig::default() },
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}

/// Bind the sockets, build the controller and serve until `shutdown` is set.
/// Refuses to start without a `publish_to` address.
pub fn run_node(cfg: Config, shutdown: Arc<AtomicBool>) -> Result<()> {
    let target = cfg.publish_to.context("publish_to is not set; thrust commands would have nowhere to go")?;
    let publisher = UdpPublisher::bind(cfg.bind, target)?;
    let mut controller = ThrusterController::new(&cfg, publisher)?;
    let mut link = UdpLink::bind(SocketAddr::new(cfg.bind, cfg.port))?;
    info!(
        addr = %link.local_addr()?,
        publish_to = %target,
        calibration = cfg.calibration,
        protocol = protocol::PROTOCOL_VERSION,
        "Thruster controller listening"
    );

    serve(&mut link, &mut controller, &shutdown);
    info!("Thruster controller stopped");
    Ok(())
}

/// Event loop: one event at a time, a solve blocks until it returns. Receive
/// and handling failures are logged and the loop keeps going.
pub fn serve<I, S>(source: &mut I, controller: &mut ThrusterController<S>, shutdown: &AtomicBool)
where
    I: InboundSource,
    S: OutboundSink,
{
    while !shutdown.load(Ordering::Relaxed) {
        let msg = match source.recv() {
            Ok(Some(msg)) => msg,
            Ok(None) => continue,
            Err(err) => {
                warn!(error = %err, "Failed to receive event");
                continue;
            }
        };
        if let Err(err) = controller.handle(msg) {
            warn!(error = %err, "Failed to handle event");
        }
    }
}
