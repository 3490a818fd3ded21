//! Vehicle model and thrust allocation for an eight-thruster AUV.
//!
//! This crate has no I/O. It holds the rigid-body model, tracks the
//! environment (attitude, depth, which heave thrusters are usable) and solves
//! for thruster forces that produce a commanded acceleration. The controller
//! crate drives it from incoming messages.

mod math;
pub use math::{rotation_from_rpy, skew, Vec3};
pub mod spec;
pub use spec::{FrameMount, GeometrySpec, MassSource, ThrusterMount, VehicleSpec};

pub mod builtins;

mod error;
pub use error::ModelError;

mod thruster;
pub use thruster::{HeavePair, ThrustAxis, ThrusterId, ThrusterLayout, ThrusterSpec, THRUSTER_COUNT};

pub mod model;
pub use model::{MassProperties, RigidBodyModel};

mod environment;
pub use environment::{Environment, EnvironmentThresholds};

pub mod lsq;
pub use lsq::LmConfig;

pub mod allocation;
pub use allocation::{
    BuoyancyCenterEstimator, BuoyancyEstimate, CommandVector, PhysicalSnapshot, SolveDiagnostics, SolveResult,
    ThrustAllocator,
};
