use nalgebra::Vector3;

use crate::lsq::LmReport;
use crate::{ThrusterId, THRUSTER_COUNT};

/// Commanded body-frame accelerations: linear (m/s²) and angular (rad/s²).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CommandVector {
    /// (surge, sway, heave)
    pub linear: Vector3<f64>,
    /// (roll, pitch, yaw)
    pub angular: Vector3<f64>,
}

impl CommandVector {
    pub const fn new(linear: Vector3<f64>, angular: Vector3<f64>) -> Self { Self { linear, angular } }

    /// `[surge, sway, heave, roll, pitch, yaw]`
    pub fn from_array(a: [f64; 6]) -> Self {
        Self::new(Vector3::new(a[0], a[1], a[2]), Vector3::new(a[3], a[4], a[5]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveDiagnostics {
    pub iterations: u32,
    pub residual_norm: f64,
    pub converged: bool,
}

impl From<&LmReport> for SolveDiagnostics {
    fn from(r: &LmReport) -> Self {
        Self { iterations: r.iterations, residual_norm: r.residual_norm, converged: r.converged }
    }
}

/// Solved thruster forces, signed along each thruster's +thrust axis and
/// expressed as force applied to the vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveResult {
    pub forces: [f64; THRUSTER_COUNT],
    pub diagnostics: SolveDiagnostics,
}

impl SolveResult {
    pub fn force(&self, id: ThrusterId) -> f64 { self.forces[id.index()] }

    /// What each thruster must output: the reaction to the force on the vehicle.
    pub fn thrust_command(&self) -> [f64; THRUSTER_COUNT] { self.forces.map(|f| -f) }
}
