//! Orientation and environment tracking.
//!
//! Fed by orientation and depth observations; derives whether buoyancy is
//! part of the force balance and which heave pairs may be used.

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::math::rotation_from_rpy;
use crate::{HeavePair, ModelError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentThresholds {
    /// Buoyancy is engaged strictly below this depth (meters, positive down).
    pub depth_m: f64,
    /// Heave pairs are gated when |pitch| exceeds this (degrees).
    pub pitch_deg: f64,
}

impl Default for EnvironmentThresholds {
    fn default() -> Self {
        Self { depth_m: 0.5, pitch_deg: 20.0 }
    }
}

impl EnvironmentThresholds {
    /// Both must be finite; the pitch band is symmetric so it cannot be negative.
    pub fn validated(self) -> Result<Self, ModelError> {
        if !self.depth_m.is_finite() {
            return Err(ModelError::InvalidThreshold { field: "depth_m", value: self.depth_m });
        }
        if !(self.pitch_deg.is_finite() && self.pitch_deg >= 0.0) {
            return Err(ModelError::InvalidThreshold { field: "pitch_deg", value: self.pitch_deg });
        }
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct Environment {
    thresholds: EnvironmentThresholds,
    euler_deg: Vector3<f64>,
    body_to_world: Rotation3<f64>,
    world_to_body: Rotation3<f64>,
    angular_velocity: Vector3<f64>,
    depth: f64,
    buoyancy_engaged: bool,
    heave_fwd_available: bool,
    heave_aft_available: bool,
}

impl Environment {
    pub fn new(thresholds: EnvironmentThresholds) -> Self {
        Self {
            thresholds,
            euler_deg: Vector3::zeros(),
            body_to_world: Rotation3::identity(),
            world_to_body: Rotation3::identity(),
            angular_velocity: Vector3::zeros(),
            depth: 0.0,
            buoyancy_engaged: false,
            heave_fwd_available: true,
            heave_aft_available: true,
        }
    }

    /// Roll/pitch/yaw in degrees and body angular velocity in deg/s.
    pub fn update_orientation(&mut self, euler_rpy_deg: Vector3<f64>, angular_velocity_deg_s: Vector3<f64>) {
        self.euler_deg = euler_rpy_deg;
        let rpy = euler_rpy_deg.map(f64::to_radians);
        self.body_to_world = rotation_from_rpy(rpy.x, rpy.y, rpy.z);
        self.world_to_body = self.body_to_world.transpose();
        self.angular_velocity = angular_velocity_deg_s.map(f64::to_radians);
    }

    /// Depth in meters. Heave availability is re-derived here from the last
    /// known pitch, never from orientation updates alone.
    pub fn update_depth(&mut self, depth_m: f64) {
        self.depth = depth_m;
        self.buoyancy_engaged = depth_m > self.thresholds.depth_m;
        if self.buoyancy_engaged {
            self.heave_fwd_available = true;
            self.heave_aft_available = true;
            return;
        }
        let pitch = self.euler_deg.y;
        let limit = self.thresholds.pitch_deg;
        // Positive pitch: aft riding high.
        (self.heave_fwd_available, self.heave_aft_available) = if pitch > limit {
            (true, false)
        } else if pitch < -limit {
            (false, true)
        } else {
            (true, true)
        };
    }

    pub fn thresholds(&self) -> EnvironmentThresholds { self.thresholds }

    pub fn euler_deg(&self) -> Vector3<f64> { self.euler_deg }

    pub fn body_to_world(&self) -> &Rotation3<f64> { &self.body_to_world }

    pub fn world_to_body(&self) -> &Rotation3<f64> { &self.world_to_body }

    /// rad/s, body frame.
    pub fn angular_velocity(&self) -> Vector3<f64> { self.angular_velocity }

    pub fn depth(&self) -> f64 { self.depth }

    pub fn buoyancy_engaged(&self) -> bool { self.buoyancy_engaged }

    pub fn heave_available(&self, pair: HeavePair) -> bool {
        match pair {
            HeavePair::Forward => self.heave_fwd_available,
            HeavePair::Aft => self.heave_aft_available,
        }
    }

    /// World +Z (up) expressed in the body frame; component `a` is row `a`
    /// of world→body, z column.
    pub fn world_up_in_body(&self) -> Vector3<f64> {
        self.world_to_body * Vector3::z()
    }
}

impl Default for Environment {
    fn default() -> Self { Self::new(EnvironmentThresholds::default()) }
}
