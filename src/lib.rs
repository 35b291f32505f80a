#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`AbsOrRelValue`**: A target value, absolute or relative to the channel's current value
//! - **`RampTimeOrSpeed`**: How fast a transition moves (total time or rate)
//! - **`Animation`**: One unit of work on a channel (set-and-stay, transition, circular hue, blink)
//! - **`AnimationQueue`**: Fixed-capacity queue of animations waiting to run
//! - **`AnimatedChannel`**: One logical value driven by its queue, advanced once per tick
//! - **`QueuePolicy`**: How a new animation preempts the queued and running ones
//! - **`RgbwwController`**: Drives an RGBWW LED from HSV or raw channel animations
//! - **`LedOutput`**: Trait to implement for your PWM output stage
//! - **`FinishObserver`**: Trait to implement to be told when animations finish
//! - **`ChannelAction`**: Commands that can be sent to control channels
//!
//! All values are integers in fixed ranges (see [`config`]). The engine has no notion of
//! wall-clock time: every call to `show()` / `process()` is one tick of
//! [`TICK_PERIOD_MS`](config::TICK_PERIOD_MS).

pub mod animation;
pub mod channel;
pub mod colors;
pub mod command;
pub mod config;
pub mod controller;
pub mod queue;
pub mod types;

pub use animation::{Animation, AnimationKind, AnimationType, ValueSource};
pub use channel::{AnimatedChannel, FinishObserver, PushError, PushRejected};
pub use colors::{ChannelOutput, Hsvct};
pub use command::{ChannelAction, ChannelCommand};
pub use controller::{ChannelRequest, ColorMode, HsvctRequest, LedOutput, RequestOptions, RgbwwController};
pub use queue::AnimationQueue;
pub use types::{
    AbsOrRelValue, CtrlChannel, HueDirection, QueuePolicy, RampTimeOrSpeed, Unit, ValueError, ValueMode,
};
