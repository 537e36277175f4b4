use serde::{Deserialize, Serialize};

use crate::time::clock::Millis;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FlashEvent {
    pub cell_index: usize,
    /// Wall-clock time at which the flash was shown.
    pub timestamp_millis: Millis,
}

impl FlashEvent {
    pub fn new(cell_index: usize, timestamp_millis: Millis) -> Self {
        Self {
            cell_index,
            timestamp_millis,
        }
    }
}

/// The flashes of one recording, oldest first.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "Vec<FlashEvent>", into = "Vec<FlashEvent>")]
pub struct Pattern {
    events: Vec<FlashEvent>,
}

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `event` and returns it as stored. A timestamp earlier than
    /// the last one is raised to it so the sequence stays chronological even
    /// if the wall clock steps back.
    pub fn push(&mut self, mut event: FlashEvent) -> FlashEvent {
        if let Some(last) = self.events.last() {
            event.timestamp_millis =
                event.timestamp_millis.max(last.timestamp_millis);
        }
        self.events.push(event);
        event
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlashEvent> {
        self.events.iter()
    }

    pub fn events(&self) -> &[FlashEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn cell_indices(&self) -> Vec<usize> {
        self.events.iter().map(|e| e.cell_index).collect()
    }

    /// Delay before each replay step: `initial` for the first, then the gap
    /// that separated consecutive flashes while recording.
    pub fn replay_delays(&self, initial: Millis) -> Vec<Millis> {
        self.events
            .iter()
            .enumerate()
            .map(|(i, event)| match i {
                0 => initial,
                _ => event
                    .timestamp_millis
                    .saturating_sub(self.events[i - 1].timestamp_millis),
            })
            .collect()
    }
}

impl From<Vec<FlashEvent>> for Pattern {
    fn from(events: Vec<FlashEvent>) -> Self {
        let mut pattern = Self::new();
        for event in events {
            pattern.push(event);
        }
        pattern
    }
}

impl From<Pattern> for Vec<FlashEvent> {
    fn from(pattern: Pattern) -> Self {
        pattern.events
    }
}

impl<'a> IntoIterator for &'a Pattern {
    type Item = &'a FlashEvent;
    type IntoIter = std::slice::Iter<'a, FlashEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
