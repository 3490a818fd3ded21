use std::collections::BTreeMap;

use crate::spec::{GeometrySpec, MassSource, ThrusterMount, VehicleSpec, GRAVITY, WATER_DENSITY};
use crate::{ThrusterId, Vec3};

// Reference eight-thruster AUV (2 surge, 2 sway, 4 heave), SI units.
// Body frame: +X forward, +Y port, +Z up, origin at the center of mass.
pub fn reference_vehicle() -> VehicleSpec {
    VehicleSpec {
        mass: 35.10,
        volume: 0.03371,
        ixx: 0.52607145,
        iyy: 1.50451601,
        izz: 1.62450600,
        buoyancy_center: Vec3::new(0.0, 0.0, 0.0),
        water_density: WATER_DENSITY,
        gravity: GRAVITY,
        mass_source: MassSource::Live,
        geometry: GeometrySpec::Static { thrusters: reference_thrusters() },
    }
}

fn reference_thrusters() -> BTreeMap<String, ThrusterMount> {
    [
        (ThrusterId::SurgePortLo, Vec3::new(-0.20, 0.22, 0.0)),
        (ThrusterId::SurgeStbdLo, Vec3::new(-0.20, -0.22, 0.0)),
        (ThrusterId::SwayFwd, Vec3::new(0.35, 0.0, 0.05)),
        (ThrusterId::SwayAft, Vec3::new(-0.35, 0.0, 0.05)),
        (ThrusterId::HeavePortFwd, Vec3::new(0.30, 0.20, 0.0)),
        (ThrusterId::HeaveStbdFwd, Vec3::new(0.30, -0.20, 0.0)),
        (ThrusterId::HeavePortAft, Vec3::new(-0.30, 0.20, 0.0)),
        (ThrusterId::HeaveStbdAft, Vec3::new(-0.30, -0.20, 0.0)),
    ]
    .into_iter()
    .map(|(id, position)| (id.code().to_string(), ThrusterMount { position, active: true }))
    .collect()
}
