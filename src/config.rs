//! Compile-time configuration of the animation engine.
//!
//! All numeric ranges and the tick period are fixed at build time; nothing here is
//! negotiated at runtime.

/// How often the host calls `process()` / `show()`, in Hz.
pub const UPDATE_FREQUENCY: u32 = 50;

/// Length of one tick in milliseconds.
pub const TICK_PERIOD_MS: u32 = 1000 / UPDATE_FREQUENCY;

/// Bit depth of the internal value range.
pub const CALC_DEPTH: u32 = 10;

/// Largest value of a raw, saturation or brightness channel.
pub const MAX_VALUE: i32 = (1 << CALC_DEPTH) - 1;

/// Width of the hue wheel. Hue values live in `[0, HUE_WHEEL_MAX)`.
pub const HUE_WHEEL_MAX: i32 = MAX_VALUE * 6;

/// Largest color temperature (Kelvin) a value can carry.
pub const COLOR_TEMP_MAX: i32 = 10_000;

/// Default number of animations a single channel can hold in its queue.
pub const ANIMATION_QUEUE_SIZE: usize = 100;

/// Maximum length in bytes of an animation's display name. Longer names are truncated.
pub const ANIMATION_NAME_LEN: usize = 32;

/// Converts a duration in milliseconds into whole ticks (rounded down).
#[inline]
pub const fn ms_to_ticks(ms: u32) -> u32 {
    ms / TICK_PERIOD_MS
}
