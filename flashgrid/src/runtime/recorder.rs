//! Captures a flash pattern while the camera is recording.
//!
//! Timer chaining is modelled as a small state machine over a
//! [`TimerQueue`]: at most one flash is pending at a time, and once the last
//! flash has been shown only the trailing stop timer remains.

use log::{debug, info, warn};

use crate::render::grid::{CellRenderer, Grid};
use crate::runtime::pattern::{FlashEvent, Pattern};
use crate::time::clock::Millis;
use crate::time::intervals::FlashIntervals;
use crate::time::timer_queue::{TimerId, TimerQueue};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RecorderConfig {
    pub max_flashes: usize,
    pub flash_millis: Millis,
    pub stop_delay_millis: Millis,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            max_flashes: 10,
            flash_millis: 500,
            stop_delay_millis: 3_000,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RecorderState {
    #[default]
    Idle,
    /// A flash is pending.
    Scheduled,
    /// Every flash has been shown; waiting out the trailing delay.
    Draining,
    Complete,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecorderEvent {
    Flashed(FlashEvent),
    /// Emitted once per recording, `stop_delay_millis` after the last flash.
    StopRequested,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum RecorderTimer {
    Flash,
    Release(usize),
    Stop,
}

#[derive(Debug)]
pub struct PatternRecorder {
    config: RecorderConfig,
    intervals: FlashIntervals,
    timers: TimerQueue<RecorderTimer>,
    state: RecorderState,
    flash_count: usize,
    pattern: Pattern,
    pending_flash: Option<TimerId>,
    pending_release: Option<TimerId>,
}

impl PatternRecorder {
    pub fn new(config: RecorderConfig, intervals: FlashIntervals) -> Self {
        Self {
            config,
            intervals,
            timers: TimerQueue::new(),
            state: RecorderState::Idle,
            flash_count: 0,
            pattern: Pattern::new(),
            pending_flash: None,
            pending_release: None,
        }
    }

    /// Begin a new recording. Returns `false` without touching anything if
    /// one is already running.
    pub fn start(&mut self, now: Millis) -> bool {
        if self.is_recording() {
            warn!("Pattern recording already in progress; ignoring start");
            return false;
        }

        self.timers.clear();
        self.flash_count = 0;
        self.pattern.clear();
        self.pending_release = None;

        let delay = self.intervals.first_delay();
        self.pending_flash =
            Some(self.timers.schedule(now, delay, RecorderTimer::Flash));
        self.state = RecorderState::Scheduled;

        info!("Pattern recording started; first flash in {}ms", delay);
        true
    }

    pub fn advance<R: CellRenderer>(
        &mut self,
        now: Millis,
        grid: &mut Grid<R>,
    ) -> Vec<RecorderEvent> {
        let mut events = Vec::new();

        while let Some((deadline, timer)) = self.timers.pop_due(now) {
            match timer {
                RecorderTimer::Flash => {
                    self.pending_flash = None;
                    let event = self.flash(now, grid);
                    events.push(RecorderEvent::Flashed(event));
                }
                RecorderTimer::Release(index) => {
                    self.pending_release = None;
                    grid.release(index);
                }
                RecorderTimer::Stop => {
                    if let Some(id) = self.pending_flash.take() {
                        self.timers.cancel(id);
                    }
                    self.state = RecorderState::Complete;
                    debug!(
                        "Stop timer fired (due at {}, now {})",
                        deadline, now
                    );
                    info!(
                        "Pattern recording complete with {} flashes",
                        self.pattern.len()
                    );
                    events.push(RecorderEvent::StopRequested);
                }
            }
        }

        events
    }

    fn flash<R: CellRenderer>(
        &mut self,
        now: Millis,
        grid: &mut Grid<R>,
    ) -> FlashEvent {
        if let Some(id) = self.pending_release.take() {
            self.timers.cancel(id);
        }

        let cell_index = self.intervals.cell(grid.len());
        grid.flash(cell_index);
        let event = self.pattern.push(FlashEvent::new(cell_index, now));
        self.flash_count += 1;

        self.pending_release = Some(self.timers.schedule(
            now,
            self.config.flash_millis,
            RecorderTimer::Release(cell_index),
        ));

        if self.flash_count >= self.config.max_flashes {
            self.state = RecorderState::Draining;
            self.timers.schedule(
                now,
                self.config.stop_delay_millis,
                RecorderTimer::Stop,
            );
            debug!(
                "Flash {}/{} on cell {}; stopping in {}ms",
                self.flash_count,
                self.config.max_flashes,
                cell_index,
                self.config.stop_delay_millis
            );
        } else {
            let delay = self.intervals.next_delay();
            self.pending_flash =
                Some(self.timers.schedule(now, delay, RecorderTimer::Flash));
            debug!(
                "Flash {}/{} on cell {}; next in {}ms",
                self.flash_count, self.config.max_flashes, cell_index, delay
            );
        }

        event
    }

    /// Abandon whatever is pending and return every cell to idle.
    pub fn cancel<R: CellRenderer>(&mut self, grid: &mut Grid<R>) {
        self.timers.clear();
        self.pending_flash = None;
        self.pending_release = None;
        grid.reset_all();
        if self.is_recording() {
            self.state = RecorderState::Complete;
        }
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        matches!(
            self.state,
            RecorderState::Scheduled | RecorderState::Draining
        )
    }

    pub fn flash_count(&self) -> usize {
        self.flash_count
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}
