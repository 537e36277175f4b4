use std::fmt;
use std::io;

#[derive(Debug)]
pub enum SessionError {
    /// The camera could not be opened (missing device, permission denied).
    CameraUnavailable(String),
    /// The recording sink refused to start or failed to finalize the clip.
    Sink(String),
    InvalidConfig(String),
    Io(io::Error),
    Config(serde_yml::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CameraUnavailable(reason) => write!(
                f,
                "There was an error accessing your camera: {}",
                reason
            ),
            Self::Sink(reason) => write!(f, "Recording sink error: {}", reason),
            Self::InvalidConfig(reason) => {
                write!(f, "Invalid configuration: {}", reason)
            }
            Self::Io(err) => write!(f, "I/O error: {}", err),
            Self::Config(err) => write!(f, "Failed to parse config: {}", err),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SessionError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yml::Error> for SessionError {
    fn from(err: serde_yml::Error) -> Self {
        Self::Config(err)
    }
}
