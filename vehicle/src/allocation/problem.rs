use nalgebra::{DMatrix, DVector, SVector, Vector3, Vector6};

use super::terms::{
    buoyancy_moment, buoyancy_net_force, gyroscopic_coupling, inverse_scales, thruster_force,
    thruster_moment, wrench_matrix, WrenchMatrix,
};
use super::{CommandVector, PhysicalSnapshot, SolveDiagnostics, SolveResult};
use crate::lsq::{LeastSquaresProblem, LevenbergMarquardt, LmConfig};
use crate::THRUSTER_COUNT;

/// The six equations of motion evaluated directly, term by term:
///
/// - linear axis a: `(Σ f·axis_a + buoyancy_net_a) / m − cmd_a`
/// - angular axis a: `(Σ f·(r × axis)_a + buoyancy_moment_a − gyro_a) / I_aa − cmd_a`
///
/// Only participating thrusters contribute; buoyancy terms vanish when
/// buoyancy is not engaged.
pub fn equations_of_motion_residuals(
    s: &PhysicalSnapshot,
    command: &CommandVector,
    forces: &[f64; THRUSTER_COUNT],
) -> Vector6<f64> {
    let linear = (thruster_force(s, forces) + buoyancy_net_force(s)) / s.mass - command.linear;

    let buoyancy = if s.buoyancy_engaged {
        buoyancy_moment(s, &s.buoyancy_center)
    } else {
        Vector3::zeros()
    };
    let torque = thruster_moment(s, forces) + buoyancy - gyroscopic_coupling(s);
    let angular = torque.component_div(&s.inertia) - command.angular;

    Vector6::new(linear.x, linear.y, linear.z, angular.x, angular.y, angular.z)
}

/// Thrust allocation as an affine least-squares problem over the eight
/// thruster forces: `r(f) = J f + b`.
#[derive(Debug, Clone)]
pub struct AllocationProblem {
    jacobian: WrenchMatrix,
    bias: Vector6<f64>,
}

impl AllocationProblem {
    pub fn new(s: &PhysicalSnapshot, command: &CommandVector) -> Self {
        let scales = inverse_scales(s);
        let mut jacobian = wrench_matrix(s);
        for (i, scale) in scales.iter().enumerate() {
            jacobian.row_mut(i).scale_mut(*scale);
        }
        // Everything that does not depend on the forces.
        let bias = equations_of_motion_residuals(s, command, &[0.0; THRUSTER_COUNT]);
        Self { jacobian, bias }
    }
}

impl LeastSquaresProblem for AllocationProblem {
    fn parameters(&self) -> usize { THRUSTER_COUNT }

    fn residuals(&self, x: &DVector<f64>) -> DVector<f64> {
        let f = SVector::<f64, THRUSTER_COUNT>::from_column_slice(x.as_slice());
        let r = self.jacobian * f + self.bias;
        DVector::from_column_slice(r.as_slice())
    }

    fn jacobian(&self, _x: &DVector<f64>) -> DMatrix<f64> {
        DMatrix::from_column_slice(6, THRUSTER_COUNT, self.jacobian.as_slice())
    }
}

/// Solves thrust allocation from a zero initial guess on every call.
#[derive(Debug, Clone)]
pub struct ThrustAllocator {
    solver: LevenbergMarquardt,
}

impl ThrustAllocator {
    pub const fn new(config: LmConfig) -> Self {
        Self { solver: LevenbergMarquardt::new(config) }
    }

    /// One allocation pass. Non-convergence is reported in the diagnostics,
    /// never as an error; the last iterate is returned either way.
    pub fn solve(&self, snapshot: &PhysicalSnapshot, command: &CommandVector) -> SolveResult {
        let problem = AllocationProblem::new(snapshot, command);
        let report = self.solver.minimize(&problem, DVector::zeros(THRUSTER_COUNT));
        let mut forces = [0.0; THRUSTER_COUNT];
        forces.copy_from_slice(report.x.as_slice());
        SolveResult { forces, diagnostics: SolveDiagnostics::from(&report) }
    }
}

impl Default for ThrustAllocator {
    fn default() -> Self { Self::new(LmConfig::default()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::reference_vehicle;
    use crate::lsq::numerical_jacobian;
    use crate::{Environment, RigidBodyModel};
    use approx::assert_relative_eq;

    fn tilted_submerged_snapshot() -> PhysicalSnapshot {
        let mut model = RigidBodyModel::from_spec(&reference_vehicle()).expect("model");
        model.set_buoyancy_center(Vector3::new(0.01, -0.005, 0.04));
        let mut env = Environment::default();
        env.update_orientation(Vector3::new(12.0, -7.0, 40.0), Vector3::new(15.0, -10.0, 25.0));
        env.update_depth(3.0);
        PhysicalSnapshot::capture(&model, &env)
    }

    #[test]
    fn matrix_form_matches_term_by_term_equations() {
        let s = tilted_submerged_snapshot();
        let cmd = CommandVector::from_array([0.3, -0.2, 0.1, 0.05, -0.4, 0.2]);
        let problem = AllocationProblem::new(&s, &cmd);
        let forces = [3.0, -1.0, 0.5, 2.0, -4.0, 1.5, 0.25, -0.75];
        let direct = equations_of_motion_residuals(&s, &cmd, &forces);
        let via_problem = problem.residuals(&DVector::from_column_slice(&forces));
        assert_relative_eq!(DVector::from_column_slice(direct.as_slice()), via_problem, epsilon = 1e-12);
    }

    #[test]
    fn closed_form_jacobian_matches_numerical() {
        let s = tilted_submerged_snapshot();
        let problem = AllocationProblem::new(&s, &CommandVector::from_array([1.0, 0.0, -0.5, 0.0, 0.2, 0.0]));
        let x = DVector::from_column_slice(&[1.0, 2.0, -3.0, 0.5, 0.0, 4.0, -1.0, 2.5]);
        assert_relative_eq!(problem.jacobian(&x), numerical_jacobian(&problem, &x), epsilon = 1e-7);
    }

    #[test]
    fn solved_forces_zero_the_residuals() {
        let s = tilted_submerged_snapshot();
        let cmd = CommandVector::from_array([0.4, 0.1, -0.3, 0.2, -0.1, 0.3]);
        let result = ThrustAllocator::default().solve(&s, &cmd);
        assert!(result.diagnostics.converged, "{:?}", result.diagnostics);
        assert!(result.diagnostics.iterations <= 100);
        let r = equations_of_motion_residuals(&s, &cmd, &result.forces);
        assert!(r.norm() < 1e-8, "residuals {r:?}");
    }

    #[test]
    fn thrust_command_is_negated_force() {
        let s = tilted_submerged_snapshot();
        let result = ThrustAllocator::default().solve(&s, &CommandVector::from_array([0.5, 0.0, 0.2, 0.0, 0.0, 0.1]));
        for (cmd, force) in result.thrust_command().iter().zip(result.forces.iter()) {
            assert_eq!(*cmd, -*force);
        }
    }
}
