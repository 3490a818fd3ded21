//! Message contracts between the thruster controller and its collaborators.
//!
//! One message per datagram, bincode-encoded. Angles arrive in degrees, forces
//! leave in Newtons along each thruster's +thrust axis.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PROTOCOL_VERSION: u16 = 1;

/// Observations, commands and (calibration only) reconfiguration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inbound {
    /// Roll/pitch/yaw in degrees, body angular velocity in deg/s.
    Orientation { euler_rpy_deg: [f64; 3], angular_velocity_deg_s: [f64; 3] },
    /// Meters below the surface.
    Depth { depth_m: f64 },
    MassVolume { mass: f64, volume: f64 },
    /// Body-frame accelerations: linear m/s², angular rad/s².
    AccelCommand { linear: [f64; 3], angular: [f64; 3] },
    SetThrusterActive { thruster: String, active: bool },
    SetBuoyancyCenter { x: f64, y: f64, z: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outbound {
    ThrustCommand(ThrustCommand),
    BuoyancyOffset(BuoyancyOffset),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverStats {
    pub iterations: u32,
    pub residual_norm: f64,
    pub converged: bool,
}

/// Signed thrust per thruster, N.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThrustForces {
    pub surge_port_lo: f64,
    pub surge_stbd_lo: f64,
    pub sway_fwd: f64,
    pub sway_aft: f64,
    pub heave_port_fwd: f64,
    pub heave_stbd_fwd: f64,
    pub heave_port_aft: f64,
    pub heave_stbd_aft: f64,
}

impl ThrustForces {
    /// Order: SPL, SSL, SWF, SWA, HPF, HSF, HPA, HSA.
    pub fn from_array(f: [f64; 8]) -> Self {
        Self {
            surge_port_lo: f[0],
            surge_stbd_lo: f[1],
            sway_fwd: f[2],
            sway_aft: f[3],
            heave_port_fwd: f[4],
            heave_stbd_fwd: f[5],
            heave_port_aft: f[6],
            heave_stbd_aft: f[7],
        }
    }

    pub fn to_array(&self) -> [f64; 8] {
        [
            self.surge_port_lo,
            self.surge_stbd_lo,
            self.sway_fwd,
            self.sway_aft,
            self.heave_port_fwd,
            self.heave_stbd_fwd,
            self.heave_port_aft,
            self.heave_stbd_aft,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThrustCommand {
    /// Microseconds since the Unix epoch.
    pub stamp_us: u64,
    pub forces: ThrustForces,
    pub stats: SolverStats,
}

/// Estimated center-of-buoyancy offset, body frame, meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuoyancyOffset {
    pub stamp_us: u64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub stats: SolverStats,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to encode message: {0}")]
    Encode(#[source] bincode::Error),
    #[error("failed to decode message: {0}")]
    Decode(#[source] bincode::Error),
}

pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    bincode::serialize(msg).map_err(ProtocolError::Encode)
}

pub fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, ProtocolError> {
    bincode::deserialize(bytes).map_err(ProtocolError::Decode)
}
