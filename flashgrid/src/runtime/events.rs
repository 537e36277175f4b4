use std::sync::mpsc;
use std::sync::mpsc::{Receiver, Sender};

use crate::runtime::pattern::FlashEvent;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionEvent {
    /// Number shown on the countdown overlay; the last tick shows 0.
    CountdownTick(u32),
    RecordingStarted,
    Flashed(FlashEvent),
    RecordingStopped { flashes: usize },
    MediaReady,
    ReplayStep { step: usize, cell_index: usize },
    ReplayCompleted,
}

pub type SessionEventSender = Sender<SessionEvent>;
pub type SessionEventReceiver = Receiver<SessionEvent>;

pub fn event_channel() -> (SessionEventSender, SessionEventReceiver) {
    mpsc::channel()
}
