use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use nalgebra::Vector3;
use parking_lot::Mutex;
use protocol::{BuoyancyOffset, Inbound, Outbound, SolverStats, ThrustCommand, ThrustForces};
use tracing::{debug, warn};
use vehicle::{
    BuoyancyCenterEstimator, BuoyancyEstimate, CommandVector, Environment, PhysicalSnapshot, RigidBodyModel,
    SolveDiagnostics, SolveResult, ThrustAllocator, ThrusterId,
};

use crate::Config;

/// Destination for everything the controller publishes.
pub trait OutboundSink {
    fn publish(&mut self, msg: Outbound) -> Result<()>;
}

/// Keeps published messages in memory; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<Vec<Outbound>>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<Outbound> { self.log.lock().clone() }

    pub fn take(&self) -> Vec<Outbound> { std::mem::take(&mut *self.log.lock()) }
}

impl OutboundSink for RecordingSink {
    fn publish(&mut self, msg: Outbound) -> Result<()> {
        self.log.lock().push(msg);
        Ok(())
    }
}

/// Owns all mutable vehicle state and processes one event at a time. Each
/// solve works on a snapshot taken when its command arrives.
#[derive(Debug)]
pub struct ThrusterController<S> {
    model: RigidBodyModel,
    env: Environment,
    allocator: ThrustAllocator,
    /// Present only in calibration mode.
    estimator: Option<BuoyancyCenterEstimator>,
    sink: S,
}

impl<S: OutboundSink> ThrusterController<S> {
    pub fn new(cfg: &Config, sink: S) -> Result<Self> {
        let model = RigidBodyModel::from_spec(&cfg.vehicle).context("invalid vehicle configuration")?;
        let thresholds = cfg.thresholds.validated().context("invalid threshold configuration")?;
        Ok(Self {
            model,
            env: Environment::new(thresholds),
            allocator: ThrustAllocator::new(cfg.solver.allocation),
            estimator: cfg.calibration.then(|| BuoyancyCenterEstimator::new(cfg.solver.estimator)),
            sink,
        })
    }

    pub fn model(&self) -> &RigidBodyModel { &self.model }

    pub fn environment(&self) -> &Environment { &self.env }

    pub fn sink(&self) -> &S { &self.sink }

    pub fn calibrating(&self) -> bool { self.estimator.is_some() }

    /// Apply one inbound event. Returns the solve result for acceleration
    /// commands. Rejected events are logged and leave the state unchanged;
    /// only a failure to publish is returned as an error.
    pub fn handle(&mut self, msg: Inbound) -> Result<Option<SolveResult>> {
        match msg {
            Inbound::Orientation { euler_rpy_deg, angular_velocity_deg_s } => {
                self.env.update_orientation(Vector3::from(euler_rpy_deg), Vector3::from(angular_velocity_deg_s));
            }
            Inbound::Depth { depth_m } => {
                let was_engaged = self.env.buoyancy_engaged();
                self.env.update_depth(depth_m);
                if self.env.buoyancy_engaged() != was_engaged {
                    debug!(depth = self.env.depth(), engaged = self.env.buoyancy_engaged(), "Buoyancy engagement changed");
                }
            }
            Inbound::MassVolume { mass, volume } => {
                if let Err(err) = self.model.update_mass_volume(mass, volume) {
                    warn!(mass, volume, error = %err, "Rejected mass/volume update");
                }
            }
            Inbound::AccelCommand { linear, angular } => {
                let command = CommandVector::new(Vector3::from(linear), Vector3::from(angular));
                return self.solve(&command).map(Some);
            }
            Inbound::SetThrusterActive { thruster, active } => {
                if !self.calibrating() {
                    warn!(%thruster, active, "Thruster reconfiguration ignored outside calibration");
                    return Ok(None);
                }
                match thruster.parse::<ThrusterId>() {
                    Ok(id) => {
                        self.model.set_active(id, active);
                        debug!(thruster = %id, active, "Thruster activation changed");
                    }
                    Err(err) => warn!(error = %err, "Rejected thruster reconfiguration"),
                }
            }
            Inbound::SetBuoyancyCenter { x, y, z } => {
                if !self.calibrating() {
                    warn!(x, y, z, "Buoyancy center update ignored outside calibration");
                    return Ok(None);
                }
                let offset = Vector3::new(x, y, z);
                if offset.iter().all(|v| v.is_finite()) {
                    self.model.set_buoyancy_center(offset);
                } else {
                    warn!(x, y, z, "Rejected non-finite buoyancy center");
                }
            }
        }
        Ok(None)
    }

    fn solve(&mut self, command: &CommandVector) -> Result<SolveResult> {
        let snapshot = PhysicalSnapshot::capture(&self.model, &self.env);
        let result = self.allocator.solve(&snapshot, command);
        let d = result.diagnostics;
        debug!(iterations = d.iterations, residual = d.residual_norm, converged = d.converged, "Allocation solved");

        let stamp_us = now_us();
        self.sink.publish(Outbound::ThrustCommand(ThrustCommand {
            stamp_us,
            forces: ThrustForces::from_array(result.thrust_command()),
            stats: stats(&d),
        }))?;

        if let Some(estimator) = &self.estimator {
            let BuoyancyEstimate { offset, diagnostics } = estimator.estimate(&snapshot, &result.forces);
            debug!(?offset, iterations = diagnostics.iterations, "Buoyancy center estimated");
            self.sink.publish(Outbound::BuoyancyOffset(BuoyancyOffset {
                stamp_us,
                x: offset.x,
                y: offset.y,
                z: offset.z,
                stats: stats(&diagnostics),
            }))?;
        }
        Ok(result)
    }
}

fn stats(d: &SolveDiagnostics) -> SolverStats {
    SolverStats { iterations: d.iterations, residual_norm: d.residual_norm, converged: d.converged }
}

fn now_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or_default()
}
