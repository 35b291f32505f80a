//! Multi-channel controller for a single RGBWW LED.
//!
//! Provides [`RgbwwController`], which owns one [`AnimatedChannel`] per logical channel,
//! fans color requests out to them and composes their values into the output written
//! to an [`LedOutput`] once per tick. Also defines the request and option types used
//! by its API.

use crate::animation::{Animation, ValueSource};
use crate::channel::{AnimatedChannel, FinishObserver, PushError};
use crate::colors::{ChannelOutput, Hsvct};
use crate::command::{ChannelAction, ChannelCommand};
use crate::config::ANIMATION_QUEUE_SIZE;
use crate::types::{AbsOrRelValue, CtrlChannel, HueDirection, QueuePolicy, RampTimeOrSpeed, Unit};

/// Trait for abstracting the LED output stage.
///
/// Implement this for your PWM hardware. Color conversion, white balance and
/// brightness correction all happen behind this trait.
pub trait LedOutput {
    /// Shows an HSV + color temperature color.
    ///
    /// Returns the per-channel output that was actually written, so raw animations
    /// started later can continue from it.
    fn write_hsv(&mut self, color: Hsvct) -> ChannelOutput;

    /// Writes raw channel intensities.
    fn write_raw(&mut self, output: ChannelOutput);
}

/// Which group of channels currently drives the LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorMode {
    /// Hue, saturation, value and color temperature.
    #[default]
    Hsv,
    /// Red, green, blue, warm white and cold white.
    Raw,
}

/// Last composed color and the channel output it produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct OutputState {
    color: Hsvct,
    output: ChannelOutput,
}

impl ValueSource for OutputState {
    fn current_value(&self, channel: CtrlChannel) -> i32 {
        if channel.is_hsv() {
            self.color.get(channel)
        } else {
            self.output.get(channel)
        }
    }
}

/// Per-channel targets for an HSV request. `None` leaves a channel untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HsvctRequest {
    pub hue: Option<AbsOrRelValue>,
    pub sat: Option<AbsOrRelValue>,
    pub val: Option<AbsOrRelValue>,
    pub ct: Option<AbsOrRelValue>,
}

impl HsvctRequest {
    pub const fn new() -> Self {
        Self {
            hue: None,
            sat: None,
            val: None,
            ct: None,
        }
    }

    pub fn hue(mut self, value: AbsOrRelValue) -> Self {
        self.hue = Some(value);
        self
    }

    pub fn sat(mut self, value: AbsOrRelValue) -> Self {
        self.sat = Some(value);
        self
    }

    pub fn val(mut self, value: AbsOrRelValue) -> Self {
        self.val = Some(value);
        self
    }

    pub fn ct(mut self, value: AbsOrRelValue) -> Self {
        self.ct = Some(value);
        self
    }

    pub fn get(&self, channel: CtrlChannel) -> Option<AbsOrRelValue> {
        match channel {
            CtrlChannel::Hue => self.hue,
            CtrlChannel::Sat => self.sat,
            CtrlChannel::Val => self.val,
            CtrlChannel::ColorTemp => self.ct,
            _ => None,
        }
    }
}

/// Requests every channel absolutely.
impl From<Hsvct> for HsvctRequest {
    fn from(color: Hsvct) -> Self {
        Self::new()
            .hue(AbsOrRelValue::absolute(Unit::Hue, color.hue))
            .sat(AbsOrRelValue::absolute(Unit::Raw, color.sat))
            .val(AbsOrRelValue::absolute(Unit::Raw, color.val))
            .ct(AbsOrRelValue::absolute(Unit::ColorTemp, color.ct))
    }
}

/// Per-channel targets for a raw request. `None` leaves a channel untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelRequest {
    pub red: Option<AbsOrRelValue>,
    pub green: Option<AbsOrRelValue>,
    pub blue: Option<AbsOrRelValue>,
    pub warm_white: Option<AbsOrRelValue>,
    pub cold_white: Option<AbsOrRelValue>,
}

impl ChannelRequest {
    pub const fn new() -> Self {
        Self {
            red: None,
            green: None,
            blue: None,
            warm_white: None,
            cold_white: None,
        }
    }

    pub fn red(mut self, value: AbsOrRelValue) -> Self {
        self.red = Some(value);
        self
    }

    pub fn green(mut self, value: AbsOrRelValue) -> Self {
        self.green = Some(value);
        self
    }

    pub fn blue(mut self, value: AbsOrRelValue) -> Self {
        self.blue = Some(value);
        self
    }

    pub fn warm_white(mut self, value: AbsOrRelValue) -> Self {
        self.warm_white = Some(value);
        self
    }

    pub fn cold_white(mut self, value: AbsOrRelValue) -> Self {
        self.cold_white = Some(value);
        self
    }

    pub fn get(&self, channel: CtrlChannel) -> Option<AbsOrRelValue> {
        match channel {
            CtrlChannel::Red => self.red,
            CtrlChannel::Green => self.green,
            CtrlChannel::Blue => self.blue,
            CtrlChannel::WarmWhite => self.warm_white,
            CtrlChannel::ColdWhite => self.cold_white,
            _ => None,
        }
    }
}

/// Requests every channel absolutely.
impl From<ChannelOutput> for ChannelRequest {
    fn from(output: ChannelOutput) -> Self {
        Self::new()
            .red(AbsOrRelValue::absolute(Unit::Raw, output.red))
            .green(AbsOrRelValue::absolute(Unit::Raw, output.green))
            .blue(AbsOrRelValue::absolute(Unit::Raw, output.blue))
            .warm_white(AbsOrRelValue::absolute(Unit::Raw, output.warm_white))
            .cold_white(AbsOrRelValue::absolute(Unit::Raw, output.cold_white))
    }
}

/// Queueing options shared by all channels of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions<'a> {
    pub policy: QueuePolicy,
    pub requeue: bool,
    pub name: &'a str,
}

impl<'a> RequestOptions<'a> {
    /// `Single` policy, no requeue, no name.
    pub const fn new() -> Self {
        Self {
            policy: QueuePolicy::Single,
            requeue: false,
            name: "",
        }
    }

    pub fn policy(mut self, policy: QueuePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn requeue(mut self, requeue: bool) -> Self {
        self.requeue = requeue;
        self
    }

    pub fn named(mut self, name: &'a str) -> Self {
        self.name = name;
        self
    }
}

/// Drives one RGBWW LED from per-channel animation queues.
///
/// Call [`show`](Self::show) once every [`TICK_PERIOD_MS`](crate::config::TICK_PERIOD_MS).
/// Requests for HSV channels switch the controller into [`ColorMode::Hsv`], requests for
/// raw channels into [`ColorMode::Raw`]; only the channels of the active mode are advanced.
///
/// # Type Parameters
/// * `L` - LED output implementation type
/// * `F` - Observer notified when animations finish
/// * `Q` - Queue capacity of each channel
pub struct RgbwwController<L: LedOutput, F: FinishObserver = (), const Q: usize = ANIMATION_QUEUE_SIZE> {
    led: L,
    observer: F,
    mode: ColorMode,
    hsv: [AnimatedChannel<Q>; 4],
    raw: [AnimatedChannel<Q>; 5],
    state: OutputState,
    force_write: bool,
}

impl<L: LedOutput, const Q: usize> RgbwwController<L, (), Q> {
    /// Creates a controller in HSV mode with the LED turned off.
    pub fn new(led: L) -> Self {
        Self::with_observer(led, ())
    }
}

impl<L: LedOutput, F: FinishObserver, const Q: usize> RgbwwController<L, F, Q> {
    /// Creates a controller in HSV mode with the LED turned off, reporting finished
    /// animations to `observer`.
    pub fn with_observer(mut led: L, observer: F) -> Self {
        let color = Hsvct::default();
        let output = led.write_hsv(color);

        Self {
            led,
            observer,
            mode: ColorMode::Hsv,
            hsv: core::array::from_fn(|_| AnimatedChannel::new()),
            raw: core::array::from_fn(|_| AnimatedChannel::new()),
            state: OutputState { color, output },
            force_write: false,
        }
    }

    /// Advances every channel of the active mode by one tick and writes the composed
    /// result to the LED if it changed.
    ///
    /// Returns true if any channel's animation finished on this tick.
    pub fn show(&mut self) -> bool {
        let channels: &mut [AnimatedChannel<Q>] = match self.mode {
            ColorMode::Hsv => &mut self.hsv,
            ColorMode::Raw => &mut self.raw,
        };

        // All channels run against the same snapshot; it is only updated below.
        let mut finished = false;
        for channel in channels.iter_mut() {
            finished |= channel.process(&self.state, &mut self.observer);
        }

        match self.mode {
            ColorMode::Hsv => {
                let color = Hsvct::new(
                    self.hsv[0].value(),
                    self.hsv[1].value(),
                    self.hsv[2].value(),
                    self.hsv[3].value(),
                );
                if self.force_write || color != self.state.color {
                    self.write_color(color);
                }
            }
            ColorMode::Raw => {
                let output = ChannelOutput::new(
                    self.raw[0].value(),
                    self.raw[1].value(),
                    self.raw[2].value(),
                    self.raw[3].value(),
                    self.raw[4].value(),
                );
                if self.force_write || output != self.state.output {
                    self.write_output(output);
                }
            }
        }

        finished
    }

    /// Writes the current color (or raw output) to the LED again.
    pub fn refresh(&mut self) {
        match self.mode {
            ColorMode::Hsv => self.write_color(self.state.color),
            ColorMode::Raw => self.write_output(self.state.output),
        }
    }

    fn write_color(&mut self, color: Hsvct) {
        self.state.output = self.led.write_hsv(color);
        self.state.color = color;
        self.force_write = false;
    }

    fn write_output(&mut self, output: ChannelOutput) {
        self.led.write_raw(output);
        self.state.output = output;
        self.force_write = false;
    }

    fn switch_mode(&mut self, mode: ColorMode) {
        if self.mode == mode {
            return;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("color mode {} -> {}", self.mode, mode);

        if mode == ColorMode::Raw {
            for ch in CtrlChannel::RAW {
                let value = AbsOrRelValue::absolute(Unit::Raw, self.state.output.get(ch));
                self.raw[ch.index()].set_value(value);
            }
        }

        self.mode = mode;
        self.force_write = true;
    }

    /// Sets the requested HSV channels and holds them for `hold_ms`.
    ///
    /// # Errors
    /// The first rejection among the channels; the other channels are still pushed.
    pub fn set_hsv(
        &mut self,
        request: HsvctRequest,
        hold_ms: u32,
        options: RequestOptions<'_>,
    ) -> Result<(), PushError> {
        self.switch_mode(ColorMode::Hsv);
        self.fan_out(&CtrlChannel::HSV, options, |ch| {
            request
                .get(ch)
                .map(|target| Animation::set_and_stay(target, hold_ms, ch))
        })
    }

    /// Fades the requested HSV channels from their current values. Hue travels around
    /// the wheel in `direction`.
    ///
    /// A time ramp shorter than one tick sets the values instead.
    ///
    /// # Errors
    /// The first rejection among the channels; the other channels are still pushed.
    pub fn fade_hsv(
        &mut self,
        request: HsvctRequest,
        ramp: RampTimeOrSpeed,
        direction: HueDirection,
        options: RequestOptions<'_>,
    ) -> Result<(), PushError> {
        self.fade_hsv_from(HsvctRequest::new(), request, ramp, direction, options)
    }

    /// Like [`fade_hsv`](Self::fade_hsv), starting each channel at `from` where given.
    ///
    /// # Errors
    /// The first rejection among the channels; the other channels are still pushed.
    pub fn fade_hsv_from(
        &mut self,
        from: HsvctRequest,
        to: HsvctRequest,
        ramp: RampTimeOrSpeed,
        direction: HueDirection,
        options: RequestOptions<'_>,
    ) -> Result<(), PushError> {
        self.switch_mode(ColorMode::Hsv);
        self.fan_out(&CtrlChannel::HSV, options, |ch| {
            let target = to.get(ch)?;
            let animation = match (ramp.is_instant(), ch) {
                (true, _) => return Some(Animation::set_and_stay(target, 0, ch)),
                (false, CtrlChannel::Hue) => Animation::circular_hue(target, ramp, direction),
                (false, _) => Animation::transition(target, ramp, ch),
            };
            Some(match from.get(ch) {
                Some(start) => animation.starting_at(start),
                None => animation,
            })
        })
    }

    /// Sets the requested raw channels and holds them for `hold_ms`.
    ///
    /// # Errors
    /// The first rejection among the channels; the other channels are still pushed.
    pub fn set_raw(
        &mut self,
        request: ChannelRequest,
        hold_ms: u32,
        options: RequestOptions<'_>,
    ) -> Result<(), PushError> {
        self.switch_mode(ColorMode::Raw);
        self.fan_out(&CtrlChannel::RAW, options, |ch| {
            request
                .get(ch)
                .map(|target| Animation::set_and_stay(target, hold_ms, ch))
        })
    }

    /// Fades the requested raw channels from their current values.
    ///
    /// # Errors
    /// The first rejection among the channels; the other channels are still pushed.
    pub fn fade_raw(
        &mut self,
        request: ChannelRequest,
        ramp: RampTimeOrSpeed,
        options: RequestOptions<'_>,
    ) -> Result<(), PushError> {
        self.fade_raw_from(ChannelRequest::new(), request, ramp, options)
    }

    /// Like [`fade_raw`](Self::fade_raw), starting each channel at `from` where given.
    ///
    /// # Errors
    /// The first rejection among the channels; the other channels are still pushed.
    pub fn fade_raw_from(
        &mut self,
        from: ChannelRequest,
        to: ChannelRequest,
        ramp: RampTimeOrSpeed,
        options: RequestOptions<'_>,
    ) -> Result<(), PushError> {
        self.switch_mode(ColorMode::Raw);
        self.fan_out(&CtrlChannel::RAW, options, |ch| {
            let target = to.get(ch)?;
            if ramp.is_instant() {
                return Some(Animation::set_and_stay(target, 0, ch));
            }
            let animation = Animation::transition(target, ramp, ch);
            Some(match from.get(ch) {
                Some(start) => animation.starting_at(start),
                None => animation,
            })
        })
    }

    /// Blinks the given channels of the active mode for `duration_ms`.
    ///
    /// Channels belonging to the other mode are ignored.
    ///
    /// # Errors
    /// The first rejection among the channels; the other channels are still pushed.
    pub fn blink(
        &mut self,
        channels: &[CtrlChannel],
        duration_ms: u32,
        options: RequestOptions<'_>,
    ) -> Result<(), PushError> {
        let hsv_mode = self.mode == ColorMode::Hsv;
        self.fan_out(channels, options, |ch| {
            (ch.is_hsv() == hsv_mode).then(|| Animation::blink(duration_ms, ch))
        })
    }

    fn fan_out(
        &mut self,
        channels: &[CtrlChannel],
        options: RequestOptions<'_>,
        mut build: impl FnMut(CtrlChannel) -> Option<Animation>,
    ) -> Result<(), PushError> {
        let mut first_error = None;

        for &ch in channels {
            let Some(animation) = build(ch) else {
                continue;
            };
            let animation = animation.requeue(options.requeue).named(options.name);

            let channel = if ch.is_hsv() {
                &mut self.hsv[ch.index()]
            } else {
                &mut self.raw[ch.index()]
            };

            if let Err(rejected) = channel.push_animation_with(animation, options.policy, &mut self.observer) {
                #[cfg(feature = "defmt")]
                defmt::warn!("{}: dropped '{}': {}", ch, rejected.animation.name(), rejected.reason);

                if first_error.is_none() {
                    first_error = Some(rejected.reason);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Routes a command to its channel.
    ///
    /// Does not switch the color mode; a command for a channel of the inactive mode
    /// takes effect once that mode is active again.
    ///
    /// # Errors
    /// The reason a pushed animation was rejected. The animation is dropped.
    pub fn handle_command(&mut self, command: ChannelCommand) -> Result<(), PushError> {
        let range = command.channel.unit();
        let channel = self.channel_mut(command.channel);
        match command.action {
            ChannelAction::SetValue(value) => {
                channel.set_value_in(value, range);
                Ok(())
            }
            action => channel.handle_action(action).map_err(|rejected| rejected.reason),
        }
    }

    /// Drops the running animation of every channel.
    pub fn skip_animation(&mut self) {
        self.for_each_channel(AnimatedChannel::skip_animation);
    }

    /// Drops the queued animations of every channel.
    pub fn clear_animation_queue(&mut self) {
        self.for_each_channel(AnimatedChannel::clear_animation_queue);
    }

    pub fn pause_animation(&mut self) {
        self.for_each_channel(AnimatedChannel::pause_animation);
    }

    pub fn continue_animation(&mut self) {
        self.for_each_channel(AnimatedChannel::continue_animation);
    }

    fn for_each_channel(&mut self, f: impl Fn(&mut AnimatedChannel<Q>)) {
        self.hsv.iter_mut().chain(self.raw.iter_mut()).for_each(f);
    }

    pub fn channel(&self, channel: CtrlChannel) -> &AnimatedChannel<Q> {
        if channel.is_hsv() {
            &self.hsv[channel.index()]
        } else {
            &self.raw[channel.index()]
        }
    }

    pub fn channel_mut(&mut self, channel: CtrlChannel) -> &mut AnimatedChannel<Q> {
        if channel.is_hsv() {
            &mut self.hsv[channel.index()]
        } else {
            &mut self.raw[channel.index()]
        }
    }

    /// True if any channel of the active mode is running an animation.
    pub fn is_animation_active(&self) -> bool {
        match self.mode {
            ColorMode::Hsv => self.hsv.iter().any(AnimatedChannel::is_animation_active),
            ColorMode::Raw => self.raw.iter().any(AnimatedChannel::is_animation_active),
        }
    }

    /// The last color written in HSV mode.
    pub fn current_color(&self) -> Hsvct {
        self.state.color
    }

    /// The last channel output written to the LED.
    pub fn current_output(&self) -> ChannelOutput {
        self.state.output
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn led(&self) -> &L {
        &self.led
    }

    pub fn observer(&self) -> &F {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut F {
        &mut self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullLed;

    impl LedOutput for NullLed {
        fn write_hsv(&mut self, _color: Hsvct) -> ChannelOutput {
            ChannelOutput::default()
        }

        fn write_raw(&mut self, _output: ChannelOutput) {}
    }

    #[test]
    fn output_state_reads_both_groups() {
        let state = OutputState {
            color: Hsvct::new(1, 2, 3, 4),
            output: ChannelOutput::new(5, 6, 7, 8, 9),
        };
        assert_eq!(state.current_value(CtrlChannel::Hue), 1);
        assert_eq!(state.current_value(CtrlChannel::ColorTemp), 4);
        assert_eq!(state.current_value(CtrlChannel::Red), 5);
        assert_eq!(state.current_value(CtrlChannel::ColdWhite), 9);
    }

    #[test]
    fn request_from_color_is_absolute() {
        let request = HsvctRequest::from(Hsvct::new(100, 200, 300, 2700));
        assert_eq!(request.get(CtrlChannel::Sat).map(|v| v.value()), Some(200));
        assert_eq!(request.get(CtrlChannel::Red), None);
    }

    #[test]
    fn switching_to_raw_seeds_raw_channels() {
        let mut controller: RgbwwController<NullLed, (), 4> = RgbwwController::new(NullLed);
        controller.state.output = ChannelOutput::new(10, 20, 30, 40, 50);

        controller.switch_mode(ColorMode::Raw);
        assert_eq!(controller.channel(CtrlChannel::Blue).value(), 30);
        assert_eq!(controller.channel(CtrlChannel::ColdWhite).value(), 50);
    }

    #[test]
    fn blink_ignores_channels_of_inactive_mode() {
        let mut controller: RgbwwController<NullLed, (), 4> = RgbwwController::new(NullLed);
        controller
            .blink(&[CtrlChannel::Val, CtrlChannel::Red], 500, RequestOptions::new())
            .unwrap();
        assert_eq!(controller.channel(CtrlChannel::Val).queue().len(), 1);
        assert!(controller.channel(CtrlChannel::Red).queue().is_empty());
    }
}
