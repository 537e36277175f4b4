//! The outside world a session depends on: a camera and something that turns
//! its stream into a clip.

use serde::{Deserialize, Serialize};

use crate::core::error::SessionError;

pub trait CameraSource {
    type Stream;

    /// Acquire a live stream. Failure here means the session never starts.
    fn open(&mut self) -> Result<Self::Stream, SessionError>;

    /// Stop every track of `stream`.
    fn release(&mut self, stream: Self::Stream);
}

pub trait RecordingSink<S> {
    type Media;

    fn start(&mut self, stream: &S) -> Result<(), SessionError>;

    /// Finish the clip. The returned media is not shown until the session's
    /// settle delay has passed.
    fn stop(&mut self) -> Result<Self::Media, SessionError>;
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum MediaFormat {
    /// VP8 in WebM.
    WebM,
    Mp4,
}

impl MediaFormat {
    /// iOS browsers cannot record WebM, so they get MP4.
    pub fn for_platform(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if ["iphone", "ipad", "ipod"].iter().any(|d| ua.contains(d)) {
            Self::Mp4
        } else {
            Self::WebM
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::WebM => "video/webm; codecs=vp8",
            Self::Mp4 => "video/mp4",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::WebM => "webm",
            Self::Mp4 => "mp4",
        }
    }
}
