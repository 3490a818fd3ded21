//! Rigid-body model store: thruster geometry, activation and mass properties.
//!
//! Geometry and mass come from providers chosen once at construction. The
//! geometry is resolved immediately and is immutable afterwards; resolving
//! fails for any missing thruster, so a constructed model is always complete.

use std::collections::BTreeMap;
use std::fmt;

use nalgebra::Vector3;

use crate::error::positive;
use crate::spec::{FrameMount, GeometrySpec, MassSource, ThrusterMount, VehicleSpec};
use crate::{ModelError, ThrusterId, ThrusterLayout, ThrusterSpec, Vec3};

pub trait GeometryProvider {
    fn resolve(&self) -> Result<ThrusterLayout, ModelError>;
}

/// Thruster positions given directly relative to the center of mass.
#[derive(Debug, Clone)]
pub struct StaticGeometry {
    mounts: BTreeMap<String, ThrusterMount>,
}

impl StaticGeometry {
    pub fn new(mounts: BTreeMap<String, ThrusterMount>) -> Self { Self { mounts } }
}

impl GeometryProvider for StaticGeometry {
    fn resolve(&self) -> Result<ThrusterLayout, ModelError> {
        let entries = self
            .mounts
            .iter()
            .map(|(code, mount)| {
                Ok(ThrusterSpec {
                    id: code.parse()?,
                    position: mount.position.into(),
                    active: mount.active,
                })
            })
            .collect::<Result<Vec<_>, ModelError>>()?;
        ThrusterLayout::from_entries(entries)
    }
}

/// Source of frame translations in a shared base frame.
pub trait TransformLookup {
    fn translation(&self, frame: &str) -> Option<Vector3<f64>>;
}

/// Transform table backed by configuration.
#[derive(Debug, Clone, Default)]
pub struct FrameTable(pub BTreeMap<String, Vec3>);

impl TransformLookup for FrameTable {
    fn translation(&self, frame: &str) -> Option<Vector3<f64>> {
        self.0.get(frame).copied().map(Into::into)
    }
}

/// Thruster positions derived from a transform lookup, relative to the
/// center-of-mass frame.
#[derive(Debug, Clone)]
pub struct FrameGeometry<L> {
    lookup: L,
    center_of_mass: String,
    mounts: BTreeMap<String, FrameMount>,
}

impl<L: TransformLookup> FrameGeometry<L> {
    pub fn new(lookup: L, center_of_mass: impl Into<String>, mounts: BTreeMap<String, FrameMount>) -> Self {
        Self { lookup, center_of_mass: center_of_mass.into(), mounts }
    }

    fn lookup(&self, frame: &str) -> Result<Vector3<f64>, ModelError> {
        self.lookup
            .translation(frame)
            .ok_or_else(|| ModelError::MissingFrame(frame.to_string()))
    }
}

impl<L: TransformLookup> GeometryProvider for FrameGeometry<L> {
    fn resolve(&self) -> Result<ThrusterLayout, ModelError> {
        let com = self.lookup(&self.center_of_mass)?;
        let entries = self
            .mounts
            .iter()
            .map(|(code, mount)| {
                Ok(ThrusterSpec {
                    id: code.parse()?,
                    position: self.lookup(&mount.frame)? - com,
                    active: mount.active,
                })
            })
            .collect::<Result<Vec<_>, ModelError>>()?;
        ThrusterLayout::from_entries(entries)
    }
}

/// Mass, displaced volume and diagonal inertia.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    pub mass: f64,
    pub volume: f64,
    /// (Ixx, Iyy, Izz)
    pub inertia: Vector3<f64>,
}

impl MassProperties {
    pub fn validated(self) -> Result<Self, ModelError> {
        positive("mass", self.mass)?;
        positive("volume", self.volume)?;
        positive("ixx", self.inertia.x)?;
        positive("iyy", self.inertia.y)?;
        positive("izz", self.inertia.z)?;
        Ok(self)
    }
}

pub trait MassProvider: fmt::Debug + Send {
    fn properties(&self) -> MassProperties;
    fn update(&mut self, mass: f64, volume: f64) -> Result<(), ModelError>;
}

/// Mass properties pinned to their configured values.
#[derive(Debug, Clone)]
pub struct FixedMass(MassProperties);

impl FixedMass {
    pub fn new(props: MassProperties) -> Result<Self, ModelError> { Ok(Self(props.validated()?)) }
}

impl MassProvider for FixedMass {
    fn properties(&self) -> MassProperties { self.0 }

    fn update(&mut self, _mass: f64, _volume: f64) -> Result<(), ModelError> {
        Err(ModelError::MassLocked)
    }
}

/// Mass properties that accept live mass/volume updates (payload changes).
#[derive(Debug, Clone)]
pub struct LiveMass(MassProperties);

impl LiveMass {
    pub fn new(props: MassProperties) -> Result<Self, ModelError> { Ok(Self(props.validated()?)) }
}

impl MassProvider for LiveMass {
    fn properties(&self) -> MassProperties { self.0 }

    fn update(&mut self, mass: f64, volume: f64) -> Result<(), ModelError> {
        let mass = positive("mass", mass)?;
        let volume = positive("volume", volume)?;
        self.0.mass = mass;
        self.0.volume = volume;
        Ok(())
    }
}

#[derive(Debug)]
pub struct RigidBodyModel {
    layout: ThrusterLayout,
    mass: Box<dyn MassProvider>,
    buoyancy_center: Vector3<f64>,
    water_density: f64,
    gravity: f64,
}

impl RigidBodyModel {
    pub fn new(
        geometry: &dyn GeometryProvider,
        mass: Box<dyn MassProvider>,
        buoyancy_center: Vector3<f64>,
        water_density: f64,
        gravity: f64,
    ) -> Result<Self, ModelError> {
        if !buoyancy_center.iter().all(|v| v.is_finite()) {
            return Err(ModelError::NonFiniteBuoyancyCenter);
        }
        Ok(Self {
            layout: geometry.resolve()?,
            mass,
            buoyancy_center,
            water_density: positive("water_density", water_density)?,
            gravity: positive("gravity", gravity)?,
        })
    }

    /// Build the model with the providers selected in `spec`.
    pub fn from_spec(spec: &VehicleSpec) -> Result<Self, ModelError> {
        let props = MassProperties {
            mass: spec.mass,
            volume: spec.volume,
            inertia: Vector3::new(spec.ixx, spec.iyy, spec.izz),
        };
        let mass: Box<dyn MassProvider> = match spec.mass_source {
            MassSource::Fixed => Box::new(FixedMass::new(props)?),
            MassSource::Live => Box::new(LiveMass::new(props)?),
        };
        let cob = spec.buoyancy_center.into();
        match &spec.geometry {
            GeometrySpec::Static { thrusters } => {
                let provider = StaticGeometry::new(thrusters.clone());
                Self::new(&provider, mass, cob, spec.water_density, spec.gravity)
            }
            GeometrySpec::Frames { center_of_mass, frames, thrusters } => {
                let provider = FrameGeometry::new(FrameTable(frames.clone()), center_of_mass.clone(), thrusters.clone());
                Self::new(&provider, mass, cob, spec.water_density, spec.gravity)
            }
        }
    }

    pub fn thrusters(&self) -> &ThrusterLayout { &self.layout }

    pub fn set_active(&mut self, id: ThrusterId, active: bool) {
        self.layout.set_active(id, active);
    }

    pub fn mass_properties(&self) -> MassProperties { self.mass.properties() }

    pub fn mass(&self) -> f64 { self.mass.properties().mass }

    pub fn volume(&self) -> f64 { self.mass.properties().volume }

    pub fn inertia(&self) -> Vector3<f64> { self.mass.properties().inertia }

    /// N, from the current mass.
    pub fn weight(&self) -> f64 { self.mass() * self.gravity }

    /// N, from the current displaced volume.
    pub fn buoyant_force(&self) -> f64 { self.volume() * self.water_density * self.gravity }

    pub fn buoyancy_center(&self) -> Vector3<f64> { self.buoyancy_center }

    pub fn set_buoyancy_center(&mut self, offset: Vector3<f64>) { self.buoyancy_center = offset; }

    /// Live payload change. Weight and buoyant force are derived on read, so
    /// they reflect the new values as soon as this returns.
    pub fn update_mass_volume(&mut self, mass: f64, volume: f64) -> Result<(), ModelError> {
        self.mass.update(mass, volume)
    }
}
