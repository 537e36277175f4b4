//! One capture-then-replay cycle.
//!
//! A session owns everything that lives for exactly one recording: the grid,
//! the pattern being captured, the camera stream, the finished clip and the
//! timers connecting them. Starting again discards all of it.

use log::{debug, error, info, warn};

use crate::core::config::Config;
use crate::core::error::SessionError;
use crate::render::grid::{CellRenderer, Grid};
use crate::runtime::collaborators::{CameraSource, RecordingSink};
use crate::runtime::events::SessionEvent;
use crate::runtime::pattern::Pattern;
use crate::runtime::recorder::{PatternRecorder, RecorderEvent, RecorderState};
use crate::runtime::replayer::{PatternReplayer, ReplayEvent, ReplayStatus};
use crate::time::clock::Millis;
use crate::time::intervals::FlashIntervals;
use crate::time::timer_queue::TimerQueue;

const COUNTDOWN_TICK_MILLIS: Millis = 1_000;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SessionPhase {
    #[default]
    Created,
    /// `remaining` is the number the next tick will show.
    Countdown {
        remaining: u32,
    },
    Recording,
    /// The sink has stopped; the clip is not ready to show yet.
    Settling,
    Ready,
    Failed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum SessionTimer {
    CountdownTick,
    MediaSettled,
}

pub struct Session<C, S, R>
where
    C: CameraSource,
    S: RecordingSink<C::Stream>,
    R: CellRenderer,
{
    config: Config,
    phase: SessionPhase,
    camera: C,
    sink: S,
    grid: Grid<R>,
    recorder: PatternRecorder,
    replayer: PatternReplayer,
    timers: TimerQueue<SessionTimer>,
    stream: Option<C::Stream>,
    media: Option<S::Media>,
    undelivered: Vec<SessionEvent>,
}

impl<C, S, R> Session<C, S, R>
where
    C: CameraSource,
    S: RecordingSink<C::Stream>,
    R: CellRenderer,
{
    pub fn new(
        config: Config,
        camera: C,
        sink: S,
        renderer: R,
    ) -> Result<Self, SessionError> {
        config.validate()?;

        let intervals = FlashIntervals::new(config.delays, config.seed);
        let recorder =
            PatternRecorder::new(config.recorder_config(), intervals);
        let replayer = PatternReplayer::new(config.replay_config());
        let grid = Grid::new(config.grid_size, renderer);

        Ok(Self {
            config,
            phase: SessionPhase::Created,
            camera,
            sink,
            grid,
            recorder,
            replayer,
            timers: TimerQueue::new(),
            stream: None,
            media: None,
            undelivered: Vec::new(),
        })
    }

    /// Open the camera and begin the countdown. Returns `Ok(false)` if a
    /// recording is already under way.
    pub fn start(&mut self, now: Millis) -> Result<bool, SessionError> {
        if self.is_busy() {
            warn!("Session already running ({:?}); ignoring start", self.phase);
            return Ok(false);
        }

        self.discard();

        let stream = match self.camera.open() {
            Ok(stream) => stream,
            Err(err) => {
                error!("Error accessing media devices: {}", err);
                self.phase = SessionPhase::Failed;
                return Err(err);
            }
        };
        self.stream = Some(stream);

        self.phase = SessionPhase::Countdown {
            remaining: self.config.countdown_secs,
        };
        self.timers
            .schedule(now, COUNTDOWN_TICK_MILLIS, SessionTimer::CountdownTick);
        let starts_in = self.config.countdown_secs.saturating_add(1);
        info!("Camera ready; recording in {}s", starts_in);
        Ok(true)
    }

    /// Fire everything due at or before `now`.
    ///
    /// On failure, whatever was emitted before the error is kept for
    /// [`Session::take_undelivered`].
    pub fn advance(
        &mut self,
        now: Millis,
    ) -> Result<Vec<SessionEvent>, SessionError> {
        let mut events = Vec::new();
        match self.fire_due(now, &mut events) {
            Ok(()) => Ok(events),
            Err(err) => {
                self.undelivered = events;
                Err(err)
            }
        }
    }

    /// Events emitted by the `advance` call that failed.
    pub fn take_undelivered(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.undelivered)
    }

    fn fire_due(
        &mut self,
        now: Millis,
        events: &mut Vec<SessionEvent>,
    ) -> Result<(), SessionError> {
        loop {
            while let Some((deadline, timer)) = self.timers.pop_due(now) {
                self.on_timer(timer, deadline, now, events)?;
            }

            for event in self.recorder.advance(now, &mut self.grid) {
                match event {
                    RecorderEvent::Flashed(flash) => {
                        events.push(SessionEvent::Flashed(flash));
                    }
                    RecorderEvent::StopRequested => {
                        self.stop_recording(now, events)?;
                    }
                }
            }

            for event in self.replayer.advance(now, &mut self.grid) {
                events.push(match event {
                    ReplayEvent::Step { step, cell_index } => {
                        SessionEvent::ReplayStep { step, cell_index }
                    }
                    ReplayEvent::Completed => SessionEvent::ReplayCompleted,
                });
            }

            if !self.next_deadline().is_some_and(|deadline| deadline <= now) {
                break;
            }
        }

        Ok(())
    }

    /// The clip began playing; replay the captured pattern alongside it.
    pub fn playback_started(&mut self, now: Millis) -> ReplayStatus {
        if self.phase != SessionPhase::Ready {
            debug!("Playback started before media was ready; ignoring");
            return ReplayStatus::Ignored;
        }
        self.replayer.replay(self.recorder.pattern(), now)
    }

    fn on_timer(
        &mut self,
        timer: SessionTimer,
        deadline: Millis,
        now: Millis,
        events: &mut Vec<SessionEvent>,
    ) -> Result<(), SessionError> {
        match (timer, self.phase) {
            (
                SessionTimer::CountdownTick,
                SessionPhase::Countdown { remaining },
            ) => {
                events.push(SessionEvent::CountdownTick(remaining));
                if remaining == 0 {
                    self.begin_recording(now, events)?;
                } else {
                    self.phase = SessionPhase::Countdown {
                        remaining: remaining - 1,
                    };
                    // Fixed period, like an interval timer.
                    self.timers.schedule(
                        deadline,
                        COUNTDOWN_TICK_MILLIS,
                        SessionTimer::CountdownTick,
                    );
                }
            }
            (SessionTimer::MediaSettled, SessionPhase::Settling) => {
                self.phase = SessionPhase::Ready;
                info!("Recording ready for playback");
                events.push(SessionEvent::MediaReady);
            }
            (timer, phase) => {
                debug!("Dropping stale {:?} timer in phase {:?}", timer, phase);
            }
        }
        Ok(())
    }

    fn begin_recording(
        &mut self,
        now: Millis,
        events: &mut Vec<SessionEvent>,
    ) -> Result<(), SessionError> {
        let started = match self.stream.as_ref() {
            Some(stream) => self.sink.start(stream),
            None => Err(SessionError::CameraUnavailable(
                "camera stream was released before recording".to_string(),
            )),
        };
        if let Err(err) = started {
            return Err(self.fail(err));
        }

        self.recorder.start(now);
        self.phase = SessionPhase::Recording;
        info!("Recording started");
        events.push(SessionEvent::RecordingStarted);
        Ok(())
    }

    fn stop_recording(
        &mut self,
        now: Millis,
        events: &mut Vec<SessionEvent>,
    ) -> Result<(), SessionError> {
        let flashes = self.recorder.pattern().len();
        self.recorder.cancel(&mut self.grid);

        let media = match self.sink.stop() {
            Ok(media) => media,
            Err(err) => return Err(self.fail(err)),
        };
        self.media = Some(media);
        self.release_camera();

        self.phase = SessionPhase::Settling;
        self.timers.schedule(
            now,
            self.config.media_settle_millis,
            SessionTimer::MediaSettled,
        );
        info!("Recording stopped after {} flashes", flashes);
        events.push(SessionEvent::RecordingStopped { flashes });
        Ok(())
    }

    fn fail(&mut self, err: SessionError) -> SessionError {
        error!("Session failed: {}", err);
        self.timers.clear();
        self.recorder.cancel(&mut self.grid);
        self.release_camera();
        self.phase = SessionPhase::Failed;
        err
    }

    fn release_camera(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.camera.release(stream);
        }
    }

    /// Drop everything left over from a previous run.
    fn discard(&mut self) {
        self.timers.clear();
        self.recorder.cancel(&mut self.grid);
        self.replayer = PatternReplayer::new(self.config.replay_config());
        self.release_camera();
        self.media = None;
        self.undelivered.clear();
        self.phase = SessionPhase::Created;
    }

    fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Countdown { .. }
                | SessionPhase::Recording
                | SessionPhase::Settling
        )
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        [
            self.timers.next_deadline(),
            self.recorder.next_deadline(),
            self.replayer.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Nothing is scheduled; the session will not change until poked.
    pub fn is_idle(&self) -> bool {
        self.next_deadline().is_none()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn recorder_state(&self) -> RecorderState {
        self.recorder.state()
    }

    pub fn is_replaying(&self) -> bool {
        self.replayer.is_replaying()
    }

    pub fn pattern(&self) -> &Pattern {
        self.recorder.pattern()
    }

    pub fn media(&self) -> Option<&S::Media> {
        self.media.as_ref()
    }

    pub fn grid(&self) -> &Grid<R> {
        &self.grid
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
