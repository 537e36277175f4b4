pub mod collaborators;
pub mod events;
pub mod pattern;
pub mod recorder;
pub mod replayer;
pub mod runner;
pub mod session;
pub mod simulated;
