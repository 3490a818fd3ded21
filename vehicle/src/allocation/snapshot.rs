use nalgebra::Vector3;

use crate::{Environment, RigidBodyModel, ThrusterId, THRUSTER_COUNT};

/// Immutable copy of everything one allocation pass reads. Captured between
/// observations so a solve never sees a half-applied update.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalSnapshot {
    /// Unit thrust direction per thruster, body frame.
    pub axes: [Vector3<f64>; THRUSTER_COUNT],
    /// Moment per Newton (`r × axis`) per thruster.
    pub moment_arms: [Vector3<f64>; THRUSTER_COUNT],
    /// Active and, for heave thrusters, available.
    pub participation: [bool; THRUSTER_COUNT],
    pub mass: f64,
    /// (Ixx, Iyy, Izz)
    pub inertia: Vector3<f64>,
    pub weight: f64,
    pub buoyant_force: f64,
    pub buoyancy_center: Vector3<f64>,
    /// World +Z expressed in body coordinates.
    pub world_up_body: Vector3<f64>,
    /// rad/s, body frame.
    pub angular_velocity: Vector3<f64>,
    pub buoyancy_engaged: bool,
}

impl PhysicalSnapshot {
    pub fn capture(model: &RigidBodyModel, env: &Environment) -> Self {
        let layout = model.thrusters();
        let spec = |id: ThrusterId| layout.get(id);
        Self {
            axes: ThrusterId::ALL.map(|id| id.axis().unit()),
            moment_arms: ThrusterId::ALL.map(|id| spec(id).moment_arm()),
            participation: ThrusterId::ALL.map(|id| {
                spec(id).active && id.heave_pair().map_or(true, |pair| env.heave_available(pair))
            }),
            mass: model.mass(),
            inertia: model.inertia(),
            weight: model.weight(),
            buoyant_force: model.buoyant_force(),
            buoyancy_center: model.buoyancy_center(),
            world_up_body: env.world_up_in_body(),
            angular_velocity: env.angular_velocity(),
            buoyancy_engaged: env.buoyancy_engaged(),
        }
    }

    pub fn participates(&self, id: ThrusterId) -> bool { self.participation[id.index()] }
}
