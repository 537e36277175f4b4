pub mod clock;
pub mod frame_clock;
pub mod intervals;
pub mod timer_queue;
