use controller::{Config, RecordingSink, ThrusterController};
use protocol::{Inbound, Outbound};
use vehicle::ThrusterId;

fn controller(calibration: bool) -> (ThrusterController<RecordingSink>, RecordingSink) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let sink = RecordingSink::default();
    let cfg = Config { calibration, ..Config::default() };
    let controller = ThrusterController::new(&cfg, sink.clone()).expect("controller");
    (controller, sink)
}

fn level_at(depth_m: f64) -> [Inbound; 2] {
    [
        Inbound::Orientation { euler_rpy_deg: [0.0; 3], angular_velocity_deg_s: [0.0; 3] },
        Inbound::Depth { depth_m },
    ]
}

fn surge(accel: f64) -> Inbound {
    Inbound::AccelCommand { linear: [accel, 0.0, 0.0], angular: [0.0; 3] }
}

fn thrust_commands(sink: &RecordingSink) -> Vec<protocol::ThrustCommand> {
    sink.messages()
        .into_iter()
        .filter_map(|m| match m {
            Outbound::ThrustCommand(cmd) => Some(cmd),
            Outbound::BuoyancyOffset(_) => None,
        })
        .collect()
}

#[test]
fn published_thrust_is_reaction_to_solved_force() {
    let (mut ctl, sink) = controller(false);
    for msg in level_at(0.0) {
        assert!(ctl.handle(msg).expect("handle").is_none());
    }
    let result = ctl.handle(surge(1.0)).expect("handle").expect("solve result");

    let published = thrust_commands(&sink);
    assert_eq!(published.len(), 1);
    let cmd = published[0];
    assert_eq!(cmd.forces.to_array(), result.thrust_command());
    assert!((cmd.forces.surge_port_lo + 17.55).abs() < 1e-6, "{:?}", cmd.forces);
    assert!((cmd.forces.surge_stbd_lo + 17.55).abs() < 1e-6, "{:?}", cmd.forces);
    assert!(cmd.stats.converged);
    assert!(cmd.stamp_us > 0);
}

#[test]
fn only_commands_publish() {
    let (mut ctl, sink) = controller(false);
    for msg in level_at(2.0) {
        ctl.handle(msg).expect("handle");
    }
    ctl.handle(Inbound::MassVolume { mass: 36.0, volume: 0.034 }).expect("handle");
    assert!(sink.messages().is_empty());

    ctl.handle(surge(0.5)).expect("handle");
    ctl.handle(surge(-0.5)).expect("handle");
    assert_eq!(thrust_commands(&sink).len(), 2);
}

#[test]
fn invalid_mass_update_is_ignored() {
    let (mut ctl, _sink) = controller(false);
    ctl.handle(Inbound::MassVolume { mass: 0.0, volume: 0.034 }).expect("handle");
    assert_eq!(ctl.model().mass(), 35.10);
    ctl.handle(Inbound::MassVolume { mass: 40.0, volume: 0.04 }).expect("handle");
    assert_eq!(ctl.model().mass(), 40.0);
}

#[test]
fn mass_update_changes_required_surge_force() {
    let (mut ctl, _sink) = controller(false);
    for msg in level_at(0.0) {
        ctl.handle(msg).expect("handle");
    }
    ctl.handle(Inbound::MassVolume { mass: 40.0, volume: 0.04 }).expect("handle");
    let result = ctl.handle(surge(1.0)).expect("handle").expect("solve result");
    assert!((result.force(ThrusterId::SurgePortLo) - 20.0).abs() < 1e-6);
}

#[test]
fn reconfiguration_requires_calibration_mode() {
    let (mut ctl, sink) = controller(false);
    ctl.handle(Inbound::SetThrusterActive { thruster: "SSL".into(), active: false }).expect("handle");
    ctl.handle(Inbound::SetBuoyancyCenter { x: 0.1, y: 0.0, z: 0.0 }).expect("handle");
    assert!(ctl.model().thrusters().get(ThrusterId::SurgeStbdLo).active);
    assert_eq!(ctl.model().buoyancy_center(), nalgebra::Vector3::zeros());

    ctl.handle(surge(1.0)).expect("handle");
    assert!(sink.messages().iter().all(|m| matches!(m, Outbound::ThrustCommand(_))));
}

#[test]
fn calibration_mode_reconfigures_and_reports_buoyancy_offset() {
    let (mut ctl, sink) = controller(true);
    for msg in level_at(2.0) {
        ctl.handle(msg).expect("handle");
    }
    ctl.handle(Inbound::SetThrusterActive { thruster: "ssl".into(), active: false }).expect("handle");
    ctl.handle(Inbound::SetThrusterActive { thruster: "NOPE".into(), active: false }).expect("handle");
    assert!(!ctl.model().thrusters().get(ThrusterId::SurgeStbdLo).active);

    ctl.handle(Inbound::SetBuoyancyCenter { x: 0.02, y: -0.01, z: 0.0 }).expect("handle");
    let result = ctl
        .handle(Inbound::AccelCommand { linear: [0.0; 3], angular: [0.0; 3] })
        .expect("handle")
        .expect("solve result");
    assert_eq!(result.force(ThrusterId::SurgeStbdLo), 0.0);

    let messages = sink.take();
    assert_eq!(messages.len(), 2);
    let Outbound::BuoyancyOffset(offset) = &messages[1] else {
        panic!("expected a buoyancy offset, got {:?}", messages[1]);
    };
    assert!((offset.x - 0.02).abs() < 1e-6, "{offset:?}");
    assert!((offset.y + 0.01).abs() < 1e-6, "{offset:?}");
    assert!(offset.z.abs() < 1e-9, "{offset:?}");
}
