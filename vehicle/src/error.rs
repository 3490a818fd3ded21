use thiserror::Error;

use crate::ThrusterId;

/// Errors raised while building or mutating the rigid-body model.
///
/// Everything except `MassLocked` and `InvalidQuantity` on a live update is
/// fatal at startup: the allocator never runs with an incomplete model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("thruster {0} has no geometry")]
    MissingThruster(ThrusterId),

    #[error("unknown thruster code {0:?}")]
    UnknownThruster(String),

    #[error("thruster {0} is defined more than once")]
    DuplicateThruster(ThrusterId),

    #[error("transform for frame {0:?} is not available")]
    MissingFrame(String),

    #[error("invalid {field}: {value} (must be finite and > 0)")]
    InvalidQuantity { field: &'static str, value: f64 },

    #[error("thruster {0} position is not finite")]
    NonFinitePosition(ThrusterId),

    #[error("buoyancy center offset is not finite")]
    NonFiniteBuoyancyCenter,

    #[error("invalid {field} threshold: {value}")]
    InvalidThreshold { field: &'static str, value: f64 },

    #[error("mass properties are fixed; live update rejected")]
    MassLocked,
}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<f64, ModelError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ModelError::InvalidQuantity { field, value })
    }
}
