//! Center-of-buoyancy estimation from a converged allocation.
//!
//! With the vehicle holding still, whatever moment the thrusters must apply
//! to cancel the commanded rotation is attributed to the buoyant force acting
//! away from the center of mass. The offset along world up cannot be observed
//! from one attitude; the estimate leaves that component at zero.

use nalgebra::{DVector, Vector3};

use super::terms::{buoyant_lift, gyroscopic_coupling, thruster_moment};
use super::{PhysicalSnapshot, SolveDiagnostics};
use crate::lsq::{LeastSquaresProblem, LevenbergMarquardt, LmConfig};
use crate::THRUSTER_COUNT;

/// Iteration cap for the estimator's own solve.
pub const ESTIMATOR_MAX_ITERATIONS: u32 = 50;

/// Residual `c × lift + Σ f·(r × axis) − ω × Iω` over the offset `c`.
/// Buoyancy always participates here, regardless of depth.
#[derive(Debug, Clone)]
pub struct BuoyancyCenterProblem {
    lift: Vector3<f64>,
    moments: Vector3<f64>,
}

impl BuoyancyCenterProblem {
    pub fn new(snapshot: &PhysicalSnapshot, forces: &[f64; THRUSTER_COUNT]) -> Self {
        Self {
            lift: buoyant_lift(snapshot),
            moments: thruster_moment(snapshot, forces) - gyroscopic_coupling(snapshot),
        }
    }
}

impl LeastSquaresProblem for BuoyancyCenterProblem {
    fn parameters(&self) -> usize { 3 }

    fn residuals(&self, x: &DVector<f64>) -> DVector<f64> {
        let c = Vector3::new(x[0], x[1], x[2]);
        let r = c.cross(&self.lift) + self.moments;
        DVector::from_column_slice(r.as_slice())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuoyancyEstimate {
    /// Body frame, meters from the center of mass.
    pub offset: Vector3<f64>,
    pub diagnostics: SolveDiagnostics,
}

#[derive(Debug, Clone)]
pub struct BuoyancyCenterEstimator {
    solver: LevenbergMarquardt,
}

impl BuoyancyCenterEstimator {
    pub const fn new(config: LmConfig) -> Self {
        Self { solver: LevenbergMarquardt::new(config) }
    }

    pub fn estimate(&self, snapshot: &PhysicalSnapshot, forces: &[f64; THRUSTER_COUNT]) -> BuoyancyEstimate {
        let problem = BuoyancyCenterProblem::new(snapshot, forces);
        let report = self.solver.minimize(&problem, DVector::zeros(3));
        BuoyancyEstimate {
            offset: Vector3::new(report.x[0], report.x[1], report.x[2]),
            diagnostics: SolveDiagnostics::from(&report),
        }
    }
}

impl Default for BuoyancyCenterEstimator {
    fn default() -> Self {
        Self::new(LmConfig { max_iterations: ESTIMATOR_MAX_ITERATIONS, ..LmConfig::default() })
    }
}
