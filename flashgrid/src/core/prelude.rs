pub use crate::core::config::Config;
pub use crate::core::error::SessionError;
pub use crate::core::logging::*;
pub use crate::render::grid::{CellRenderer, CellState, Grid};
pub use crate::runtime::events::SessionEvent;
pub use crate::runtime::pattern::{FlashEvent, Pattern};
pub use crate::runtime::recorder::{PatternRecorder, RecorderEvent};
pub use crate::runtime::replayer::{PatternReplayer, ReplayEvent, ReplayStatus};
pub use crate::runtime::session::{Session, SessionPhase};
pub use crate::time::clock::{Clock, ManualClock, Millis, SystemClock};
