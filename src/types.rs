//! Value specification types: what value to reach, how fast, and on which channel.

use crate::config::{COLOR_TEMP_MAX, HUE_WHEEL_MAX, MAX_VALUE, TICK_PERIOD_MS, ms_to_ticks};

/// A logical channel driven by one animated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CtrlChannel {
    Hue,
    Sat,
    Val,
    ColorTemp,

    Red,
    Green,
    Blue,
    WarmWhite,
    ColdWhite,
}

impl CtrlChannel {
    /// The four channels making up an HSV + color temperature color.
    pub const HSV: [CtrlChannel; 4] = [
        CtrlChannel::Hue,
        CtrlChannel::Sat,
        CtrlChannel::Val,
        CtrlChannel::ColorTemp,
    ];

    /// The five raw PWM output channels.
    pub const RAW: [CtrlChannel; 5] = [
        CtrlChannel::Red,
        CtrlChannel::Green,
        CtrlChannel::Blue,
        CtrlChannel::WarmWhite,
        CtrlChannel::ColdWhite,
    ];

    /// Returns true for hue, saturation, value and color temperature.
    pub const fn is_hsv(self) -> bool {
        matches!(
            self,
            CtrlChannel::Hue | CtrlChannel::Sat | CtrlChannel::Val | CtrlChannel::ColorTemp
        )
    }

    /// Position of this channel inside [`CtrlChannel::HSV`] or [`CtrlChannel::RAW`].
    pub const fn index(self) -> usize {
        match self {
            CtrlChannel::Hue | CtrlChannel::Red => 0,
            CtrlChannel::Sat | CtrlChannel::Green => 1,
            CtrlChannel::Val | CtrlChannel::Blue => 2,
            CtrlChannel::ColorTemp | CtrlChannel::WarmWhite => 3,
            CtrlChannel::ColdWhite => 4,
        }
    }

    /// The internal unit values on this channel are stored in.
    pub const fn unit(self) -> Unit {
        match self {
            CtrlChannel::Hue => Unit::Hue,
            CtrlChannel::ColorTemp => Unit::ColorTemp,
            _ => Unit::Raw,
        }
    }
}

/// Whether a value replaces the channel value or is added to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValueMode {
    Absolute,
    Relative,
}

/// The unit a value was given in, which also fixes its legal range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Unit {
    /// Raw channel intensity, `0..=MAX_VALUE`.
    Raw,

    /// Hue given in degrees, stored on the wheel `0..HUE_WHEEL_MAX`. Wraps around.
    Hue,

    /// Percentage `0..=100`, stored as `0..=MAX_VALUE`.
    Percent,

    /// Color temperature in Kelvin, `0..=COLOR_TEMP_MAX`.
    ColorTemp,
}

impl Unit {
    /// Full width of the internal range of this unit.
    pub const fn span(self) -> i32 {
        match self {
            Unit::Raw | Unit::Percent => MAX_VALUE,
            Unit::Hue => HUE_WHEEL_MAX,
            Unit::ColorTemp => COLOR_TEMP_MAX,
        }
    }

    /// Brings an internal value into the legal range: hue wraps, everything else clamps.
    pub fn normalize(self, value: i32) -> i32 {
        match self {
            Unit::Hue => value.rem_euclid(HUE_WHEEL_MAX),
            _ => value.clamp(0, self.span()),
        }
    }

    /// Converts a typed amount (percent, degrees, ...) into internal units.
    fn to_internal(self, amount: f32) -> i32 {
        let scaled = match self {
            Unit::Percent => amount * MAX_VALUE as f32 / 100.0,
            Unit::Hue => amount * HUE_WHEEL_MAX as f32 / 360.0,
            Unit::Raw | Unit::ColorTemp => amount,
        };
        round(scaled)
    }

    /// Speed ramps are given in degrees per minute for hue, percent per minute otherwise.
    const fn speed_scale(self) -> u64 {
        match self {
            Unit::Hue => 360,
            _ => 100,
        }
    }
}

// `f32::round` is not available in core.
fn round(value: f32) -> i32 {
    if value >= 0.0 {
        (value + 0.5) as i32
    } else {
        (value - 0.5) as i32
    }
}

/// Errors parsing a textual value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValueError {
    /// The text was empty.
    Empty,

    /// The text was not a finite number.
    InvalidNumber,
}

impl core::fmt::Display for ValueError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ValueError::Empty => write!(f, "value is empty"),
            ValueError::InvalidNumber => write!(f, "value is not a valid number"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ValueError {}

/// A target value that is either absolute or relative to the channel's current value.
///
/// The value is stored in internal units: percentages and hue degrees are converted
/// once when the value is created, never per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AbsOrRelValue {
    mode: ValueMode,
    unit: Unit,
    value: i32,
}

impl AbsOrRelValue {
    /// Creates a value from an amount already in internal units.
    ///
    /// Absolute values are brought into the unit's range right away.
    pub fn new(mode: ValueMode, unit: Unit, value: i32) -> Self {
        let value = match mode {
            ValueMode::Absolute => unit.normalize(value),
            ValueMode::Relative => value,
        };
        Self { mode, unit, value }
    }

    /// Absolute value in internal units.
    #[inline]
    pub fn absolute(unit: Unit, value: i32) -> Self {
        Self::new(ValueMode::Absolute, unit, value)
    }

    /// Relative offset in internal units.
    #[inline]
    pub fn relative(unit: Unit, delta: i32) -> Self {
        Self::new(ValueMode::Relative, unit, delta)
    }

    /// Creates a value from a typed amount: percent for [`Unit::Percent`], degrees for
    /// [`Unit::Hue`], Kelvin for [`Unit::ColorTemp`] and raw counts for [`Unit::Raw`].
    pub fn from_typed(mode: ValueMode, unit: Unit, amount: f32) -> Self {
        Self::new(mode, unit, unit.to_internal(amount))
    }

    /// Parses the textual form. A leading `+` or `-` makes the value relative.
    ///
    /// # Errors
    /// * `Empty` - Nothing but whitespace was given
    /// * `InvalidNumber` - The remaining text is not a finite number
    pub fn parse(text: &str, unit: Unit) -> Result<Self, ValueError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValueError::Empty);
        }

        let (mode, sign, number) = if let Some(rest) = text.strip_prefix('+') {
            (ValueMode::Relative, 1.0, rest)
        } else if let Some(rest) = text.strip_prefix('-') {
            (ValueMode::Relative, -1.0, rest)
        } else {
            (ValueMode::Absolute, 1.0, text)
        };

        if number.starts_with(['+', '-']) {
            return Err(ValueError::InvalidNumber);
        }

        let amount: f32 = number.trim().parse().map_err(|_| ValueError::InvalidNumber)?;
        if !amount.is_finite() {
            return Err(ValueError::InvalidNumber);
        }

        Ok(Self::from_typed(mode, unit, sign * amount))
    }

    pub fn mode(&self) -> ValueMode {
        self.mode
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// The stored amount in internal units.
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Resolves this value against `base`, the channel's current value.
    ///
    /// The result is always within the unit's legal range.
    pub fn get_final_value(&self, base: i32) -> i32 {
        self.resolve_in(base, self.unit)
    }

    /// Resolves this value against `base` and brings the result into the range of
    /// `range`, the unit of the channel it is applied to.
    ///
    /// Hue channels wrap even when the value was given as a raw amount.
    pub fn resolve_in(&self, base: i32, range: Unit) -> i32 {
        match self.mode {
            ValueMode::Absolute => range.normalize(self.value),
            ValueMode::Relative => range.normalize(base.saturating_add(self.value)),
        }
    }
}

/// How fast a transition moves: a fixed duration, or a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampTimeOrSpeed {
    /// Total ramp duration in milliseconds.
    Time(u32),

    /// Percent per minute (degrees per minute for hue).
    Speed(u32),
}

impl RampTimeOrSpeed {
    /// Returns true if this ramp is shorter than a single tick.
    pub fn is_instant(&self) -> bool {
        matches!(*self, RampTimeOrSpeed::Time(ms) if ms < TICK_PERIOD_MS)
    }

    /// Number of ticks needed to cover `distance` internal units of `unit`.
    ///
    /// Never returns 0. A speed of 0 is treated as the slowest speed, 1 per minute.
    pub fn total_steps(&self, distance: u32, unit: Unit) -> u32 {
        let steps = match *self {
            RampTimeOrSpeed::Time(ms) => ms_to_ticks(ms),
            RampTimeOrSpeed::Speed(speed) => {
                let speed = u64::from(speed.max(1));
                let numerator = u64::from(distance) * unit.speed_scale() * 60_000;
                let denominator = unit.span() as u64 * speed * u64::from(TICK_PERIOD_MS);
                let steps = (numerator + denominator / 2) / denominator;
                steps.min(u64::from(u32::MAX)) as u32
            }
        };
        steps.max(1)
    }
}

/// Which way around the hue wheel a circular hue transition travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HueDirection {
    /// Take the shorter arc.
    #[default]
    Shortest,

    /// Take the longer arc.
    Longest,
}

/// Preemption rule applied when an animation is pushed onto a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueuePolicy {
    /// Push to the front; the interrupted animation restarts from the beginning afterwards.
    FrontReset,

    /// Push to the front; the interrupted animation continues where it stopped afterwards.
    Front,

    /// Append to the back of the queue.
    Back,

    /// Drop everything queued and running, then run only this animation.
    #[default]
    Single,
}
