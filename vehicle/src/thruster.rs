use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::ModelError;

pub const THRUSTER_COUNT: usize = 8;

/// The eight thrusters, in the canonical order used by force vectors and
/// thrust commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ThrusterId {
    SurgePortLo,
    SurgeStbdLo,
    SwayFwd,
    SwayAft,
    HeavePortFwd,
    HeaveStbdFwd,
    HeavePortAft,
    HeaveStbdAft,
}

/// Body axis a thruster pushes along. Body frame: +X forward, +Y port, +Z up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrustAxis {
    Surge,
    Sway,
    Heave,
}

/// Heave thrusters are gated in fore/aft pairs by the pitch threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeavePair {
    Forward,
    Aft,
}

impl ThrusterId {
    pub const ALL: [ThrusterId; THRUSTER_COUNT] = [
        ThrusterId::SurgePortLo,
        ThrusterId::SurgeStbdLo,
        ThrusterId::SwayFwd,
        ThrusterId::SwayAft,
        ThrusterId::HeavePortFwd,
        ThrusterId::HeaveStbdFwd,
        ThrusterId::HeavePortAft,
        ThrusterId::HeaveStbdAft,
    ];

    pub const fn index(self) -> usize { self as usize }

    /// Short code used in configuration files and reconfigure messages.
    pub const fn code(self) -> &'static str {
        match self {
            ThrusterId::SurgePortLo => "SPL",
            ThrusterId::SurgeStbdLo => "SSL",
            ThrusterId::SwayFwd => "SWF",
            ThrusterId::SwayAft => "SWA",
            ThrusterId::HeavePortFwd => "HPF",
            ThrusterId::HeaveStbdFwd => "HSF",
            ThrusterId::HeavePortAft => "HPA",
            ThrusterId::HeaveStbdAft => "HSA",
        }
    }

    pub const fn axis(self) -> ThrustAxis {
        match self {
            ThrusterId::SurgePortLo | ThrusterId::SurgeStbdLo => ThrustAxis::Surge,
            ThrusterId::SwayFwd | ThrusterId::SwayAft => ThrustAxis::Sway,
            _ => ThrustAxis::Heave,
        }
    }

    pub const fn heave_pair(self) -> Option<HeavePair> {
        match self {
            ThrusterId::HeavePortFwd | ThrusterId::HeaveStbdFwd => Some(HeavePair::Forward),
            ThrusterId::HeavePortAft | ThrusterId::HeaveStbdAft => Some(HeavePair::Aft),
            _ => None,
        }
    }
}

impl ThrustAxis {
    pub fn unit(self) -> Vector3<f64> {
        match self {
            ThrustAxis::Surge => Vector3::x(),
            ThrustAxis::Sway => Vector3::y(),
            ThrustAxis::Heave => Vector3::z(),
        }
    }
}

impl fmt::Display for ThrusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ThrusterId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThrusterId::ALL
            .into_iter()
            .find(|id| id.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownThruster(s.to_string()))
    }
}

/// One physical thruster: where it sits relative to the center of mass and
/// whether it participates in the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrusterSpec {
    pub id: ThrusterId,
    /// Meters, body frame, relative to the center of mass.
    pub position: Vector3<f64>,
    pub active: bool,
}

impl ThrusterSpec {
    /// Moment produced per Newton of thrust: `r × axis`.
    pub fn moment_arm(&self) -> Vector3<f64> {
        self.position.cross(&self.id.axis().unit())
    }
}

/// All eight thrusters, indexed by `ThrusterId::index`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrusterLayout {
    thrusters: [ThrusterSpec; THRUSTER_COUNT],
}

impl ThrusterLayout {
    /// Build a layout from per-thruster entries. Every thruster must appear
    /// exactly once.
    pub fn from_entries<I>(entries: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = ThrusterSpec>,
    {
        let mut slots: [Option<ThrusterSpec>; THRUSTER_COUNT] = [None; THRUSTER_COUNT];
        for spec in entries {
            if !(spec.position.x.is_finite() && spec.position.y.is_finite() && spec.position.z.is_finite()) {
                return Err(ModelError::NonFinitePosition(spec.id));
            }
            let slot = &mut slots[spec.id.index()];
            if slot.is_some() {
                return Err(ModelError::DuplicateThruster(spec.id));
            }
            *slot = Some(spec);
        }
        let mut thrusters = [ThrusterSpec { id: ThrusterId::SurgePortLo, position: Vector3::zeros(), active: false }; THRUSTER_COUNT];
        for id in ThrusterId::ALL {
            thrusters[id.index()] = slots[id.index()].ok_or(ModelError::MissingThruster(id))?;
        }
        Ok(Self { thrusters })
    }

    pub fn get(&self, id: ThrusterId) -> &ThrusterSpec { &self.thrusters[id.index()] }

    pub(crate) fn set_active(&mut self, id: ThrusterId, active: bool) {
        self.thrusters[id.index()].active = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: ThrusterId) -> ThrusterSpec {
        ThrusterSpec { id, position: Vector3::new(0.1, 0.2, 0.3), active: true }
    }

    #[test]
    fn codes_round_trip_through_from_str() {
        for id in ThrusterId::ALL {
            assert_eq!(id.code().parse::<ThrusterId>(), Ok(id));
        }
        assert_eq!("hpa".parse::<ThrusterId>(), Ok(ThrusterId::HeavePortAft));
        assert!(matches!("XYZ".parse::<ThrusterId>(), Err(ModelError::UnknownThruster(_))));
    }

    #[test]
    fn layout_requires_every_thruster() {
        let entries = ThrusterId::ALL.into_iter().filter(|id| *id != ThrusterId::SwayAft).map(entry);
        assert_eq!(ThrusterLayout::from_entries(entries), Err(ModelError::MissingThruster(ThrusterId::SwayAft)));
    }

    #[test]
    fn layout_rejects_duplicates() {
        let entries = ThrusterId::ALL.into_iter().map(entry).chain(std::iter::once(entry(ThrusterId::SwayFwd)));
        assert_eq!(ThrusterLayout::from_entries(entries), Err(ModelError::DuplicateThruster(ThrusterId::SwayFwd)));
    }

    #[test]
    fn moment_arms_follow_thrust_axis() {
        let heave = ThrusterSpec { id: ThrusterId::HeavePortFwd, position: Vector3::new(0.3, 0.2, 0.0), active: true };
        // roll = y, pitch = -x for a vertical thruster
        assert_eq!(heave.moment_arm(), Vector3::new(0.2, -0.3, 0.0));
        let surge = ThrusterSpec { id: ThrusterId::SurgePortLo, position: Vector3::new(-0.2, 0.25, -0.05), active: true };
        assert_eq!(surge.moment_arm(), Vector3::new(0.0, -0.05, -0.25));
    }
}
