//! Animation engine for the reviewer roulette.

pub mod easing;
pub mod roulette;
pub mod scheduler;

pub use easing::EasingFunction;
pub use roulette::{Roulette, RouletteConfig, SpinError, StackView};
pub use scheduler::{
    drive, drive_request, Animate, AnimationScheduler, DriveOutcome, FnAnimation, FrameOutcome,
    FrameRequest,
};
