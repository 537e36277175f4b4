use super::clock::Millis;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TickResult {
    pub should_render: bool,
    pub frames_advanced: u32,
}

/// Fixed-rate frame pacer over millisecond timestamps. Replay steps driven
/// through this clock only become visible on frame boundaries, like an
/// animation-frame loop in a browser.
#[derive(Debug)]
pub struct FrameClock {
    fps: u32,
    frame_count: u64,
    start: Millis,
}

impl FrameClock {
    pub fn with_start(fps: u32, now: Millis) -> Self {
        Self {
            fps: fps.max(1),
            frame_count: 0,
            start: now,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frame boundaries are derived from the start instant rather than
    /// accumulated, so rates that do not divide 1000 never drift.
    pub fn next_deadline(&self) -> Millis {
        let next_frame = self.frame_count + 1;
        self.start + (next_frame * 1_000).div_ceil(self.fps as u64)
    }

    pub fn tick(&mut self, now: Millis) -> TickResult {
        let elapsed = now.saturating_sub(self.start);
        let target = elapsed * self.fps as u64 / 1_000;

        if target <= self.frame_count {
            return TickResult::default();
        }

        let advanced = (target - self.frame_count) as u32;
        self.frame_count = target;

        TickResult {
            should_render: true,
            frames_advanced: advanced,
        }
    }
}
