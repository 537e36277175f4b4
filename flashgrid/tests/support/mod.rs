#![allow(dead_code)]

use std::sync::Once;

use flashgrid::prelude::*;
use flashgrid::render::grid::RecordingRenderer;
use flashgrid::runtime::collaborators::MediaFormat;
use flashgrid::runtime::simulated::{ClipSink, SimulatedCamera};

pub type TestSession =
    Session<SimulatedCamera, ClipSink<ManualClock>, RecordingRenderer>;

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub fn config(seed: u64) -> Config {
    Config {
        seed: Some(seed),
        ..Config::default()
    }
}

pub fn session(seed: u64) -> (ManualClock, TestSession) {
    session_with(config(seed), SimulatedCamera::new("test camera"))
}

pub fn session_with(
    config: Config,
    camera: SimulatedCamera,
) -> (ManualClock, TestSession) {
    init_logging();
    let clock = ManualClock::new(0);
    let sink = ClipSink::new(clock.clone(), MediaFormat::WebM);
    let session = Session::new(config, camera, sink, RecordingRenderer::new())
        .expect("valid test config");
    (clock, session)
}

/// Jump from deadline to deadline, collecting events with the time they were
/// emitted, until `done` matches one of them or nothing is left scheduled.
pub fn drive_until(
    session: &mut TestSession,
    clock: &ManualClock,
    done: impl Fn(&SessionEvent) -> bool,
) -> Vec<(Millis, SessionEvent)> {
    let mut out = Vec::new();
    while let Some(deadline) = session.next_deadline() {
        clock.sleep_until(deadline);
        let now = clock.now();
        let events = session.advance(now).expect("advance session");
        let finished = events.iter().any(&done);
        out.extend(events.into_iter().map(|event| (now, event)));
        if finished {
            break;
        }
    }
    out
}

pub fn drive_to_end(
    session: &mut TestSession,
    clock: &ManualClock,
) -> Vec<(Millis, SessionEvent)> {
    drive_until(session, clock, |_| false)
}

pub fn flashes(events: &[(Millis, SessionEvent)]) -> Vec<FlashEvent> {
    events
        .iter()
        .filter_map(|(_, event)| match event {
            SessionEvent::Flashed(flash) => Some(*flash),
            _ => None,
        })
        .collect()
}

pub fn time_of(
    events: &[(Millis, SessionEvent)],
    wanted: &SessionEvent,
) -> Option<Millis> {
    events
        .iter()
        .find(|(_, event)| event == wanted)
        .map(|(at, _)| *at)
}
