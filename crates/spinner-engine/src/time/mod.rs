//! Time subsystem.
//!
//! - [`FrameClock`] samples the monotonic clock once per presented frame
//! - [`AnimationClock`] turns those timestamps into rotation angles

mod animation;
mod frame_clock;

pub use animation::{AnimationClock, AnimationState, CUBE_DEGREES_PER_SECOND, PYRAMID_DEGREES_PER_SECOND};
pub use frame_clock::{FrameClock, FrameTime};
