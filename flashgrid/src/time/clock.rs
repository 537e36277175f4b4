use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use chrono::Utc;

/// Milliseconds. Used for wall-clock timestamps, deadlines and delays alike.
pub type Millis = u64;

pub trait Clock {
    fn now(&self) -> Millis;

    /// Block (or, for virtual clocks, jump) until `deadline` has been reached.
    fn sleep_until(&self, deadline: Millis);
}

/// Wall clock in milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        Utc::now().timestamp_millis().max(0) as Millis
    }

    fn sleep_until(&self, deadline: Millis) {
        let now = self.now();
        if deadline > now {
            thread::sleep(Duration::from_millis(deadline - now));
        }
    }
}

/// Virtual clock that only moves when told to. Clones share the same time so
/// collaborators (e.g. a simulated sink) observe what the driver observes.
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Arc<AtomicU64>);

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self(Arc::new(AtomicU64::new(start)))
    }

    pub fn set(&self, now: Millis) {
        self.0.store(now, Ordering::Release);
    }

    pub fn advance(&self, delta: Millis) -> Millis {
        self.0.fetch_add(delta, Ordering::AcqRel) + delta
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        self.0.load(Ordering::Acquire)
    }

    fn sleep_until(&self, deadline: Millis) {
        self.0.fetch_max(deadline, Ordering::AcqRel);
    }
}
