mod support;

use flashgrid::prelude::*;
use flashgrid::runtime::events::event_channel;
use flashgrid::runtime::runner::{Pacing, Runner};

use support::session;

#[test]
fn deadline_runner_replays_what_it_recorded() {
    let (clock, mut session) = session(21);
    let (tx, rx) = event_channel();

    let report = Runner::new(clock.clone())
        .with_playback_delay(250)
        .with_events(tx)
        .run(&mut session)
        .expect("run session");

    assert_eq!(report.pattern.len(), 10);
    assert_eq!(report.replayed_cells, report.pattern.cell_indices());
    assert_eq!(report.frames, 0);
    assert!(session.is_idle());

    let forwarded: Vec<SessionEvent> = rx.try_iter().collect();
    assert_eq!(forwarded, report.events);
    assert_eq!(forwarded.first(), Some(&SessionEvent::CountdownTick(4)));
    assert_eq!(forwarded.last(), Some(&SessionEvent::ReplayCompleted));
}

#[test]
fn frame_synced_runner_lands_on_frame_boundaries() {
    let (clock, mut session) = session(22);
    let start = clock.now();

    let report = Runner::new(clock.clone())
        .with_pacing(Pacing::FrameSynced { fps: 60 })
        .run(&mut session)
        .expect("run session");

    assert_eq!(report.replayed_cells, report.pattern.cell_indices());
    assert!(report.frames > 0);

    // Every flash was stamped at a frame boundary of the 60Hz clock.
    for flash in report.pattern.iter() {
        let elapsed = flash.timestamp_millis - start;
        let frame = elapsed * 60 / 1_000;
        let boundary = (frame * 1_000).div_ceil(60);
        assert_eq!(elapsed, boundary, "flash at {elapsed}ms is off-frame");
    }
}

#[test]
fn camera_failure_surfaces_from_the_runner() {
    let (clock, mut session) = support::session_with(
        support::config(23),
        flashgrid::runtime::simulated::SimulatedCamera::denied("no device"),
    );

    let result = Runner::new(clock).run(&mut session);
    assert!(matches!(result, Err(SessionError::CameraUnavailable(_))));
}

#[test]
fn events_before_a_sink_failure_still_reach_observers() {
    use flashgrid::render::grid::RecordingRenderer;
    use flashgrid::runtime::collaborators::MediaFormat;
    use flashgrid::runtime::simulated::{ClipSink, SimulatedCamera};

    support::init_logging();
    let clock = ManualClock::new(0);
    let mut session = Session::new(
        support::config(24),
        SimulatedCamera::new("test camera"),
        ClipSink::failing(clock.clone(), MediaFormat::Mp4),
        RecordingRenderer::new(),
    )
    .expect("session");
    let (tx, rx) = event_channel();

    let result = Runner::new(clock).with_events(tx).run(&mut session);
    assert!(matches!(result, Err(SessionError::Sink(_))));

    let forwarded: Vec<SessionEvent> = rx.try_iter().collect();
    let ticks: Vec<SessionEvent> =
        (0..=4).rev().map(SessionEvent::CountdownTick).collect();
    assert_eq!(forwarded, ticks);
}
