//! Fixed-point color containers and conversion helpers.
//!
//! The engine itself only works on [`Hsvct`] and [`ChannelOutput`]. The helpers at the
//! bottom convert to `palette` float types for [`LedOutput`](crate::LedOutput)
//! implementations that want to do their color math there. White balance and
//! brightness correction are left to the output implementation.

use crate::config::{COLOR_TEMP_MAX, HUE_WHEEL_MAX, MAX_VALUE};
use crate::types::CtrlChannel;
use palette::{FromColor, Hsv, Srgb};

/// HSV color plus color temperature, in internal units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hsvct {
    /// Hue on the wheel, `0..HUE_WHEEL_MAX`.
    pub hue: i32,
    /// Saturation, `0..=MAX_VALUE`.
    pub sat: i32,
    /// Brightness, `0..=MAX_VALUE`.
    pub val: i32,
    /// Color temperature in Kelvin.
    pub ct: i32,
}

impl Hsvct {
    pub const fn new(hue: i32, sat: i32, val: i32, ct: i32) -> Self {
        Self { hue, sat, val, ct }
    }

    /// Builds a color from hue in degrees, saturation and value in percent.
    ///
    /// Out-of-range inputs are clamped.
    pub fn from_float(hue: f32, sat: f32, val: f32, ct: i32) -> Self {
        let hue = hue.clamp(0.0, 360.0) / 360.0 * HUE_WHEEL_MAX as f32;
        let sat = sat.clamp(0.0, 100.0) / 100.0 * MAX_VALUE as f32;
        let val = val.clamp(0.0, 100.0) / 100.0 * MAX_VALUE as f32;
        Self {
            hue: (hue as i32).rem_euclid(HUE_WHEEL_MAX),
            sat: sat as i32,
            val: val as i32,
            ct: ct.clamp(0, COLOR_TEMP_MAX),
        }
    }

    /// Value of one of the HSV channels. Raw channels read as 0.
    pub fn get(&self, channel: CtrlChannel) -> i32 {
        match channel {
            CtrlChannel::Hue => self.hue,
            CtrlChannel::Sat => self.sat,
            CtrlChannel::Val => self.val,
            CtrlChannel::ColorTemp => self.ct,
            _ => 0,
        }
    }
}

/// Intensity of each PWM output channel, `0..=MAX_VALUE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelOutput {
    pub red: i32,
    pub green: i32,
    pub blue: i32,
    pub warm_white: i32,
    pub cold_white: i32,
}

impl ChannelOutput {
    pub const fn new(red: i32, green: i32, blue: i32, warm_white: i32, cold_white: i32) -> Self {
        Self {
            red,
            green,
            blue,
            warm_white,
            cold_white,
        }
    }

    /// Value of one of the raw channels. HSV channels read as 0.
    pub fn get(&self, channel: CtrlChannel) -> i32 {
        match channel {
            CtrlChannel::Red => self.red,
            CtrlChannel::Green => self.green,
            CtrlChannel::Blue => self.blue,
            CtrlChannel::WarmWhite => self.warm_white,
            CtrlChannel::ColdWhite => self.cold_white,
            _ => 0,
        }
    }
}

/// Converts a fixed-point color into a `palette` HSV color (hue in degrees).
#[inline]
pub fn to_hsv(color: Hsvct) -> Hsv {
    Hsv::new(
        color.hue as f32 * 360.0 / HUE_WHEEL_MAX as f32,
        color.sat as f32 / MAX_VALUE as f32,
        color.val as f32 / MAX_VALUE as f32,
    )
}

/// Converts a fixed-point color into RGB, ignoring color temperature.
#[inline]
pub fn to_srgb(color: Hsvct) -> Srgb {
    Srgb::from_color(to_hsv(color))
}

/// Scales an RGB color into channel output. White channels stay off.
pub fn srgb_to_output(rgb: Srgb) -> ChannelOutput {
    let scale = |c: f32| (c.clamp(0.0, 1.0) * MAX_VALUE as f32 + 0.5) as i32;
    ChannelOutput::new(scale(rgb.red), scale(rgb.green), scale(rgb.blue), 0, 0)
}
