//! Plays a recorded [`Pattern`] back with its recorded spacing.
//!
//! Each step gets exactly one deadline, `delay[i]` after the deadline of the
//! step before it. Anchoring on deadlines rather than on the time a step was
//! actually applied keeps the animation aligned with the clip it accompanies,
//! even when the driver only wakes on frame boundaries.

use log::{debug, info};

use crate::render::grid::{CellRenderer, Grid};
use crate::runtime::pattern::Pattern;
use crate::time::clock::Millis;
use crate::time::timer_queue::{TimerId, TimerQueue};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReplayConfig {
    pub initial_delay_millis: Millis,
    pub flash_millis: Millis,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            initial_delay_millis: 500,
            flash_millis: 250,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReplayStatus {
    Started,
    /// A replay was already running; nothing changed.
    Ignored,
    /// The pattern was empty, so the replay completed on the spot.
    Finished,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReplayEvent {
    Step { step: usize, cell_index: usize },
    Completed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ReplayTimer {
    Step,
    Release(usize),
}

#[derive(Debug, Default)]
pub struct PatternReplayer {
    config: ReplayConfig,
    timers: TimerQueue<ReplayTimer>,
    cells: Vec<usize>,
    delays: Vec<Millis>,
    current_step: usize,
    replaying: bool,
    pending_release: Option<TimerId>,
}

impl PatternReplayer {
    pub fn new(config: ReplayConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn replay(&mut self, pattern: &Pattern, now: Millis) -> ReplayStatus {
        if self.replaying {
            debug!(
                "Replay already running at step {}/{}; ignoring",
                self.current_step,
                self.cells.len()
            );
            return ReplayStatus::Ignored;
        }

        self.cells = pattern.cell_indices();
        self.delays = pattern.replay_delays(self.config.initial_delay_millis);
        self.current_step = 0;

        let Some(&first_delay) = self.delays.first() else {
            info!("Nothing to replay");
            return ReplayStatus::Finished;
        };

        self.replaying = true;
        self.timers.schedule(now, first_delay, ReplayTimer::Step);
        info!("Replaying {} flashes", self.cells.len());
        ReplayStatus::Started
    }

    pub fn advance<R: CellRenderer>(
        &mut self,
        now: Millis,
        grid: &mut Grid<R>,
    ) -> Vec<ReplayEvent> {
        let mut events = Vec::new();

        while let Some((deadline, timer)) = self.timers.pop_due(now) {
            match timer {
                ReplayTimer::Step => {
                    self.step(deadline, now, grid, &mut events)
                }
                ReplayTimer::Release(index) => {
                    self.pending_release = None;
                    grid.release(index);
                }
            }
        }

        events
    }

    fn step<R: CellRenderer>(
        &mut self,
        deadline: Millis,
        now: Millis,
        grid: &mut Grid<R>,
        events: &mut Vec<ReplayEvent>,
    ) {
        let Some(&cell_index) = self.cells.get(self.current_step) else {
            self.finish(events);
            return;
        };

        if let Some(id) = self.pending_release.take() {
            self.timers.cancel(id);
        }
        grid.flash(cell_index);
        self.pending_release = Some(self.timers.schedule(
            now,
            self.config.flash_millis,
            ReplayTimer::Release(cell_index),
        ));

        debug!(
            "Replay step {} on cell {} ({}ms late)",
            self.current_step,
            cell_index,
            now - deadline
        );
        events.push(ReplayEvent::Step {
            step: self.current_step,
            cell_index,
        });
        self.current_step += 1;

        match self.delays.get(self.current_step) {
            Some(&delay) => {
                self.timers.schedule(deadline, delay, ReplayTimer::Step);
            }
            None => self.finish(events),
        }
    }

    fn finish(&mut self, events: &mut Vec<ReplayEvent>) {
        self.replaying = false;
        info!("Replay complete");
        events.push(ReplayEvent::Completed);
    }

    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers.next_deadline()
    }
}
