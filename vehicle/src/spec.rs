use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

pub const WATER_DENSITY: f64 = 1000.0; // kg/m^3
pub const GRAVITY: f64 = 9.81; // m/s^2

/// Static vehicle description as loaded from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSpec {
    /// kg
    pub mass: f64,
    /// Displaced volume, m^3.
    pub volume: f64,
    /// Principal moments of inertia, kg·m^2.
    pub ixx: f64,
    pub iyy: f64,
    pub izz: f64,
    /// Initial center-of-buoyancy offset from the center of mass (body frame, meters).
    #[serde(default)]
    pub buoyancy_center: Vec3,
    #[serde(default = "default_water_density")]
    pub water_density: f64,
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    #[serde(default)]
    pub mass_source: MassSource,
    pub geometry: GeometrySpec,
}

/// Where mass/volume come from after startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassSource {
    /// Constants from configuration; live updates are rejected.
    Fixed,
    /// Starts from configuration and accepts live mass/volume updates.
    #[default]
    Live,
}

/// Where thruster positions come from. Keys of `thrusters` are thruster
/// codes (`SPL`, `SSL`, `SWF`, `SWA`, `HPF`, `HSF`, `HPA`, `HSA`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum GeometrySpec {
    /// Positions relative to the center of mass, given directly.
    Static {
        thrusters: BTreeMap<String, ThrusterMount>,
    },
    /// Positions looked up from a table of frame translations expressed in a
    /// common base frame; each thruster position is its frame minus the
    /// center-of-mass frame.
    Frames {
        center_of_mass: String,
        frames: BTreeMap<String, Vec3>,
        thrusters: BTreeMap<String, FrameMount>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrusterMount {
    pub position: Vec3,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameMount {
    pub frame: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_water_density() -> f64 { WATER_DENSITY }
fn default_gravity() -> f64 { GRAVITY }
fn default_active() -> bool { true }
