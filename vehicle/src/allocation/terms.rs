use nalgebra::{SMatrix, Vector3, Vector6};

use super::PhysicalSnapshot;
use crate::THRUSTER_COUNT;

pub(super) type WrenchMatrix = SMatrix<f64, 6, THRUSTER_COUNT>;

// ----- Thrusters -----

/// Force/moment on the vehicle per Newton of each thruster. Columns of
/// non-participating thrusters are zero.
pub(super) fn wrench_matrix(s: &PhysicalSnapshot) -> WrenchMatrix {
    let mut w = WrenchMatrix::zeros();
    for i in 0..THRUSTER_COUNT {
        if !s.participation[i] {
            continue;
        }
        let (axis, arm) = (s.axes[i], s.moment_arms[i]);
        w.set_column(i, &Vector6::new(axis.x, axis.y, axis.z, arm.x, arm.y, arm.z));
    }
    w
}

pub(super) fn thruster_force(s: &PhysicalSnapshot, forces: &[f64; THRUSTER_COUNT]) -> Vector3<f64> {
    (0..THRUSTER_COUNT)
        .filter(|&i| s.participation[i])
        .fold(Vector3::zeros(), |acc, i| acc + s.axes[i] * forces[i])
}

pub(super) fn thruster_moment(s: &PhysicalSnapshot, forces: &[f64; THRUSTER_COUNT]) -> Vector3<f64> {
    (0..THRUSTER_COUNT)
        .filter(|&i| s.participation[i])
        .fold(Vector3::zeros(), |acc, i| acc + s.moment_arms[i] * forces[i])
}

// ----- Buoyancy -----

/// Net buoyancy minus weight along world up, in body axes; zero when
/// buoyancy is not engaged.
pub(super) fn buoyancy_net_force(s: &PhysicalSnapshot) -> Vector3<f64> {
    if s.buoyancy_engaged {
        s.world_up_body * (s.buoyant_force - s.weight)
    } else {
        Vector3::zeros()
    }
}

/// Buoyant force along world up, in body axes.
pub(super) fn buoyant_lift(s: &PhysicalSnapshot) -> Vector3<f64> {
    s.world_up_body * s.buoyant_force
}

/// Moment of the buoyant force about the center of mass for a given
/// center-of-buoyancy offset. Not gated.
pub(super) fn buoyancy_moment(s: &PhysicalSnapshot, center: &Vector3<f64>) -> Vector3<f64> {
    center.cross(&buoyant_lift(s))
}

// ----- Rigid body -----

/// ω × (I ω) for a diagonal inertia.
pub(super) fn gyroscopic_coupling(s: &PhysicalSnapshot) -> Vector3<f64> {
    let w = s.angular_velocity;
    let i = s.inertia;
    Vector3::new(
        w.z * w.y * (i.z - i.y),
        w.x * w.z * (i.x - i.z),
        w.y * w.x * (i.y - i.x),
    )
}

/// Per-equation divisors as reciprocals: (1/m, 1/m, 1/m, 1/Ixx, 1/Iyy, 1/Izz).
pub(super) fn inverse_scales(s: &PhysicalSnapshot) -> Vector6<f64> {
    let m = s.mass.recip();
    Vector6::new(m, m, m, s.inertia.x.recip(), s.inertia.y.recip(), s.inertia.z.recip())
}
