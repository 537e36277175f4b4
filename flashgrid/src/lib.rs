//! Flash a random grid cell at unpredictable intervals while a camera clip is
//! recorded, then replay the captured flash pattern against playback.

pub mod core;
pub mod render;
pub mod runtime;
pub mod time;

pub mod prelude {
    pub use crate::core::prelude::*;
}
