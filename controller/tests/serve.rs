use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use controller::{serve, Config, InboundSource, RecordingSink, ThrusterController};
use protocol::{Inbound, Outbound};

/// Replays a fixed script, then raises the shutdown flag.
struct Scripted {
    events: VecDeque<Result<Option<Inbound>>>,
    shutdown: Arc<AtomicBool>,
}

impl InboundSource for Scripted {
    fn recv(&mut self) -> Result<Option<Inbound>> {
        self.events.pop_front().unwrap_or_else(|| {
            self.shutdown.store(true, Ordering::Relaxed);
            Ok(None)
        })
    }
}

fn surge() -> Inbound {
    Inbound::AccelCommand { linear: [1.0, 0.0, 0.0], angular: [0.0; 3] }
}

#[test]
fn receive_errors_do_not_stop_the_loop() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let sink = RecordingSink::default();
    let mut controller = ThrusterController::new(&Config::default(), sink.clone()).expect("controller");
    let shutdown = Arc::new(AtomicBool::new(false));
    let mut source = Scripted {
        events: VecDeque::from(vec![
            Ok(Some(Inbound::Depth { depth_m: 0.0 })),
            Err(anyhow!("connection reset")),
            Ok(None),
            Ok(Some(surge())),
            Err(anyhow!("connection reset")),
            Ok(Some(surge())),
        ]),
        shutdown: shutdown.clone(),
    };

    serve(&mut source, &mut controller, &shutdown);

    let published = sink.messages();
    assert_eq!(published.len(), 2);
    assert!(published.iter().all(|m| matches!(m, Outbound::ThrustCommand(_))));
    assert!(source.events.is_empty());
}
