//! In-process stand-ins for the camera and recorder, used by the CLI and by
//! tests.

use log::debug;

use crate::core::error::SessionError;
use crate::runtime::collaborators::{CameraSource, MediaFormat, RecordingSink};
use crate::time::clock::{Clock, Millis};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SimulatedStream {
    pub id: u32,
    pub device: String,
}

#[derive(Debug, Default)]
pub struct SimulatedCamera {
    device: String,
    deny_reason: Option<String>,
    opened: u32,
    released: u32,
}

impl SimulatedCamera {
    pub fn new(device: &str) -> Self {
        Self {
            device: device.to_string(),
            ..Self::default()
        }
    }

    /// A camera whose every `open` fails with `reason`.
    pub fn denied(reason: &str) -> Self {
        Self {
            deny_reason: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn opened(&self) -> u32 {
        self.opened
    }

    pub fn released(&self) -> u32 {
        self.released
    }

    pub fn live_streams(&self) -> u32 {
        self.opened - self.released
    }
}

impl CameraSource for SimulatedCamera {
    type Stream = SimulatedStream;

    fn open(&mut self) -> Result<SimulatedStream, SessionError> {
        if let Some(reason) = &self.deny_reason {
            return Err(SessionError::CameraUnavailable(reason.clone()));
        }
        self.opened += 1;
        debug!("Opened stream {} on {}", self.opened, self.device);
        Ok(SimulatedStream {
            id: self.opened,
            device: self.device.clone(),
        })
    }

    fn release(&mut self, stream: SimulatedStream) {
        debug!("Released stream {} on {}", stream.id, stream.device);
        self.released += 1;
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Clip {
    pub format: MediaFormat,
    pub stream_id: u32,
    pub started_at: Millis,
    pub stopped_at: Millis,
}

impl Clip {
    pub fn duration_millis(&self) -> Millis {
        self.stopped_at.saturating_sub(self.started_at)
    }

    pub fn file_name(&self, prefix: &str) -> String {
        format!("{}-{}.{}", prefix, self.started_at, self.format.extension())
    }
}

/// Sink that only notes when recording started and stopped.
#[derive(Debug)]
pub struct ClipSink<K> {
    clock: K,
    format: MediaFormat,
    active: Option<(u32, Millis)>,
    starts: u32,
    stops: u32,
    fail_on_start: bool,
    fail_on_stop: bool,
}

impl<K: Clock> ClipSink<K> {
    pub fn new(clock: K, format: MediaFormat) -> Self {
        Self {
            clock,
            format,
            active: None,
            starts: 0,
            stops: 0,
            fail_on_start: false,
            fail_on_stop: false,
        }
    }

    pub fn failing(clock: K, format: MediaFormat) -> Self {
        Self {
            fail_on_start: true,
            ..Self::new(clock, format)
        }
    }

    /// Records fine but cannot finalize the clip.
    pub fn failing_on_stop(clock: K, format: MediaFormat) -> Self {
        Self {
            fail_on_stop: true,
            ..Self::new(clock, format)
        }
    }

    pub fn starts(&self) -> u32 {
        self.starts
    }

    pub fn stops(&self) -> u32 {
        self.stops
    }
}

impl<K: Clock> RecordingSink<SimulatedStream> for ClipSink<K> {
    type Media = Clip;

    fn start(&mut self, stream: &SimulatedStream) -> Result<(), SessionError> {
        if self.fail_on_start {
            return Err(SessionError::Sink(format!(
                "{} is not supported",
                self.format.mime_type()
            )));
        }
        if self.active.is_some() {
            return Err(SessionError::Sink("already recording".to_string()));
        }
        self.active = Some((stream.id, self.clock.now()));
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<Clip, SessionError> {
        let (stream_id, started_at) = self
            .active
            .take()
            .ok_or_else(|| SessionError::Sink("not recording".to_string()))?;
        if self.fail_on_stop {
            return Err(SessionError::Sink(format!(
                "could not finalize {} clip",
                self.format.mime_type()
            )));
        }
        self.stops += 1;
        Ok(Clip {
            format: self.format,
            stream_id,
            started_at,
            stopped_at: self.clock.now(),
        })
    }
}
