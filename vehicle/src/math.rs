use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Plain serializable 3-vector used by the configuration schema.
/// Converted to `nalgebra::Vector3<f64>` before any math happens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self { Self { x, y, z } }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for Vec3 {
    fn default() -> Self { Self::ZERO }
}

impl From<Vec3> for Vector3<f64> {
    fn from(v: Vec3) -> Self { Vector3::new(v.x, v.y, v.z) }
}

/// Skew-symmetric (hat) matrix: `skew(a) * b == a × b`.
pub fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y,
        v.z, 0.0, -v.x,
        -v.y, v.x, 0.0,
    )
}

/// Body→world rotation from roll/pitch/yaw in radians.
/// Roll about X, then pitch about Y, then yaw about Z, all about the fixed
/// axes: `R = Rz(yaw) * Ry(pitch) * Rx(roll)`.
pub fn rotation_from_rpy(roll: f64, pitch: f64, yaw: f64) -> Rotation3<f64> {
    Rotation3::from_euler_angles(roll, pitch, yaw)
}
