use log::{debug, info};

use crate::core::error::SessionError;
use crate::render::grid::CellRenderer;
use crate::runtime::collaborators::{CameraSource, RecordingSink};
use crate::runtime::events::{SessionEvent, SessionEventSender};
use crate::runtime::pattern::Pattern;
use crate::runtime::replayer::ReplayStatus;
use crate::runtime::session::Session;
use crate::time::clock::{Clock, Millis};
use crate::time::frame_clock::FrameClock;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Pacing {
    /// Wake exactly at each deadline.
    #[default]
    Deadline,
    /// Wake on every frame and apply whatever has come due, so visual changes
    /// land on frame boundaries.
    FrameSynced { fps: u32 },
}

#[derive(Clone, Debug, Default)]
pub struct RunReport {
    pub pattern: Pattern,
    pub replayed_cells: Vec<usize>,
    pub events: Vec<SessionEvent>,
    pub frames: u64,
}

/// Drives a session from `start` through replay and returns once nothing is
/// left scheduled.
pub struct Runner<K> {
    clock: K,
    pacing: Pacing,
    playback_delay_millis: Millis,
    event_tx: Option<SessionEventSender>,
}

impl<K: Clock> Runner<K> {
    pub fn new(clock: K) -> Self {
        Self {
            clock,
            pacing: Pacing::Deadline,
            playback_delay_millis: 0,
            event_tx: None,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Time between the clip becoming ready and its playback starting.
    pub fn with_playback_delay(mut self, delay: Millis) -> Self {
        self.playback_delay_millis = delay;
        self
    }

    pub fn with_events(mut self, event_tx: SessionEventSender) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    pub fn run<C, S, R>(
        &self,
        session: &mut Session<C, S, R>,
    ) -> Result<RunReport, SessionError>
    where
        C: CameraSource,
        S: RecordingSink<C::Stream>,
        R: CellRenderer,
    {
        let start = self.clock.now();
        session.start(start)?;

        let mut frames = match self.pacing {
            Pacing::FrameSynced { fps } => {
                Some(FrameClock::with_start(fps, start))
            }
            Pacing::Deadline => None,
        };
        let mut playback_at: Option<Millis> = None;
        let mut report = RunReport::default();

        loop {
            let now = self.clock.now();

            let events = match session.advance(now) {
                Ok(events) => events,
                Err(err) => {
                    for event in session.take_undelivered() {
                        self.record(event, &mut report);
                    }
                    return Err(err);
                }
            };
            for event in events {
                if event == SessionEvent::MediaReady {
                    playback_at = Some(now + self.playback_delay_millis);
                }
                self.record(event, &mut report);
            }

            if playback_at.is_some_and(|at| at <= now) {
                playback_at = None;
                match session.playback_started(now) {
                    ReplayStatus::Started => debug!("Playback started"),
                    ReplayStatus::Finished => {
                        self.record(SessionEvent::ReplayCompleted, &mut report);
                    }
                    ReplayStatus::Ignored => {}
                }
                continue;
            }

            let next = [session.next_deadline(), playback_at]
                .into_iter()
                .flatten()
                .min();
            let Some(next) = next else {
                break;
            };

            match frames.as_mut() {
                None => self.clock.sleep_until(next),
                Some(frame_clock) => loop {
                    self.clock.sleep_until(frame_clock.next_deadline());
                    let tick = frame_clock.tick(self.clock.now());
                    if tick.should_render && self.clock.now() >= next {
                        break;
                    }
                },
            }
        }

        report.pattern = session.pattern().clone();
        report.frames = frames.map_or(0, |f| f.frame_count());
        info!(
            "Session finished: {} flashes recorded, {} replayed",
            report.pattern.len(),
            report.replayed_cells.len()
        );
        Ok(report)
    }

    fn record(&self, event: SessionEvent, report: &mut RunReport) {
        if let SessionEvent::ReplayStep { cell_index, .. } = event {
            report.replayed_cells.push(cell_index);
        }
        if let Some(tx) = &self.event_tx {
            // A dropped observer must not end the session.
            let _ = tx.send(event.clone());
        }
        report.events.push(event);
    }
}
