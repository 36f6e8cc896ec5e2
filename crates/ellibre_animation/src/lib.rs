//! ellibre animation
//!
//! Eased tweens of a single object property, paced by a frame driver.
//!
//! # Features
//!
//! - **Easing**: `pop`, `softPop` and `peek` curves shaped by a power exponent
//! - **Frame Drivers**: a host-pumped driver and a fixed 16ms timer fallback
//! - **Tweens**: interpolate values such as `"12px"` or `"translateX(4px)"`,
//!   keeping the text around the number

pub mod easing;
pub mod error;
pub mod scheduler;
pub mod tween;

pub use easing::Easing;
pub use error::AnimateError;
pub use scheduler::{
    FrameCallback, FrameDriver, FrameId, ManualFrameDriver, TimerFrameDriver, FRAME_INTERVAL,
};
pub use tween::{animate, Animatable, CompletionCallback, Tween};
