mod types;
mod snapshot;
mod terms;
mod problem;
mod estimator;

pub use types::{CommandVector, SolveDiagnostics, SolveResult};
pub use snapshot::PhysicalSnapshot;
pub use problem::{equations_of_motion_residuals, AllocationProblem, ThrustAllocator};
pub use estimator::{BuoyancyCenterEstimator, BuoyancyCenterProblem, BuoyancyEstimate, ESTIMATOR_MAX_ITERATIONS};
