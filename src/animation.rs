//! Per-channel animation state machines.
//!
//! An [`Animation`] drives a single [`CtrlChannel`]. Each call to [`Animation::run`]
//! advances it by one tick and yields the channel's new value plus a finished flag.
//! The starting point of every animation is resolved lazily on its first tick by
//! asking a [`ValueSource`] for the channel's current output, so an animation that
//! waited in a queue starts from wherever the channel actually is when its turn comes.
//!
//! All stepping is integer only. Transitions distribute the change over their ticks
//! with a Bresenham line walk in 8.8 fixed point and always land exactly on the final
//! value on their last fade tick.

use crate::colors::{ChannelOutput, Hsvct};
use crate::config::{ANIMATION_NAME_LEN, HUE_WHEEL_MAX, MAX_VALUE, ms_to_ticks};
use crate::types::{AbsOrRelValue, CtrlChannel, HueDirection, RampTimeOrSpeed, Unit};
use heapless::String;

/// Display name attached to an animation for finish notifications and diagnostics.
pub type AnimationName = String<ANIMATION_NAME_LEN>;

/// Read-only access to the current composed output of each logical channel.
pub trait ValueSource {
    /// Returns the last composed output of `channel`.
    fn current_value(&self, channel: CtrlChannel) -> i32;
}

impl ValueSource for Hsvct {
    fn current_value(&self, channel: CtrlChannel) -> i32 {
        self.get(channel)
    }
}

impl ValueSource for ChannelOutput {
    fn current_value(&self, channel: CtrlChannel) -> i32 {
        self.get(channel)
    }
}

/// Coarse classification of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnimationType {
    SetAndStay,
    Transition,
    Blink,
}

/// Incremental line walk from `base` towards `base + delta * direction`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Bresenham {
    delta: i64,
    error: i64,
    count: i64,
    step: i64,
}

impl Bresenham {
    fn new(delta: i32, steps: u32, direction: i32) -> Self {
        let delta = i64::from(delta);
        let steps = i64::from(steps);
        let step = if delta < steps {
            1 << 8
        } else {
            (delta << 8) / steps
        };

        Self {
            delta,
            error: -steps,
            count: 0,
            step: step * i64::from(direction),
        }
    }

    /// Emits a new value whenever the accumulated error crosses zero, otherwise keeps `current`.
    fn next(&mut self, steps: u32, base: i32, current: i32) -> i32 {
        self.error += 2 * self.delta;
        if self.error > 0 {
            self.count += 1;
            self.error -= 2 * i64::from(steps);
            return (i64::from(base) + ((self.count * self.step) >> 8)) as i32;
        }
        current
    }
}

/// Fade state shared by the linear and the circular hue transition.
#[derive(Debug, Clone)]
pub struct Transition {
    target: AbsOrRelValue,
    start: Option<AbsOrRelValue>,
    ramp: RampTimeOrSpeed,
    stay_steps: u32,

    base: i32,
    final_value: i32,
    steps: u32,
    line: Bresenham,
}

impl Transition {
    fn new(target: AbsOrRelValue, ramp: RampTimeOrSpeed) -> Self {
        Self {
            target,
            start: None,
            ramp,
            stay_steps: 0,
            base: 0,
            final_value: 0,
            steps: 0,
            line: Bresenham::default(),
        }
    }

    fn resolve_endpoints(&mut self, current: i32, range: Unit) {
        self.final_value = self.target.resolve_in(current, range);
        self.base = match self.start {
            Some(start) => start.resolve_in(current, range),
            None => range.normalize(current),
        };
    }

    fn init_linear(&mut self, current: i32, range: Unit) -> i32 {
        self.resolve_endpoints(current, range);

        let delta = (self.final_value - self.base).abs();
        self.steps = self.ramp.total_steps(delta as u32, range);
        let direction = if self.base > self.final_value { -1 } else { 1 };
        self.line = Bresenham::new(delta, self.steps, direction);

        self.base
    }

    fn init_circular(&mut self, current: i32, direction: HueDirection) -> i32 {
        self.resolve_endpoints(current, Unit::Hue);

        let left = (self.base + HUE_WHEEL_MAX - self.final_value) % HUE_WHEEL_MAX;
        let right = (self.final_value + HUE_WHEEL_MAX - self.base) % HUE_WHEEL_MAX;

        let shortest = if left < right { -1 } else { 1 };
        let turn = match direction {
            HueDirection::Shortest => shortest,
            HueDirection::Longest => -shortest,
        };
        let delta = if turn == -1 { left } else { right };

        self.steps = self.ramp.total_steps(delta as u32, Unit::Hue);
        self.line = Bresenham::new(delta, self.steps, turn);

        self.base
    }

    /// Value for tick `step` (1-based). Snaps to the final value once the fade is over.
    fn advance(&mut self, step: u32, current: i32) -> i32 {
        if step >= self.steps {
            self.final_value
        } else {
            self.line.next(self.steps, self.base, current)
        }
    }

    fn total_steps(&self) -> u32 {
        self.steps.saturating_add(self.stay_steps)
    }
}

/// The closed set of animation behaviors.
#[derive(Debug, Clone)]
pub enum AnimationKind {
    /// Jump to a value and hold it for a number of ticks.
    SetAndStay {
        target: AbsOrRelValue,
        hold_steps: u32,
    },

    /// Linear fade, optionally holding the final value afterwards.
    Transition(Transition),

    /// Fade around the hue wheel, wrapping at `HUE_WHEEL_MAX`.
    TransitionCircularHue {
        transition: Transition,
        direction: HueDirection,
    },

    /// Flip to an alternate value, then restore the captured one.
    Blink { hold_steps: u32, previous: i32 },
}

/// A single unit of animation work for one channel.
///
/// Construct with one of the variant constructors and refine with the builder methods:
///
/// ```
/// use rgbww_animator::{AbsOrRelValue, Animation, CtrlChannel, RampTimeOrSpeed, Unit};
///
/// let fade = Animation::transition(
///     AbsOrRelValue::absolute(Unit::Raw, 800),
///     RampTimeOrSpeed::Time(1000),
///     CtrlChannel::Val,
/// )
/// .staying_for(500)
/// .requeue(true)
/// .named("pulse");
/// assert_eq!(fade.name(), "pulse");
/// ```
#[derive(Debug, Clone)]
pub struct Animation {
    channel: CtrlChannel,
    requeue: bool,
    name: AnimationName,
    value: i32,
    current_step: u32,
    kind: AnimationKind,
}

impl Animation {
    fn with_kind(channel: CtrlChannel, kind: AnimationKind) -> Self {
        Self {
            channel,
            requeue: false,
            name: AnimationName::new(),
            value: 0,
            current_step: 0,
            kind,
        }
    }

    /// Sets `target` immediately and holds it for `hold_ms`.
    pub fn set_and_stay(target: AbsOrRelValue, hold_ms: u32, channel: CtrlChannel) -> Self {
        Self::with_kind(
            channel,
            AnimationKind::SetAndStay {
                target,
                hold_steps: ms_to_ticks(hold_ms),
            },
        )
    }

    /// Fades from the channel's current value to `target`.
    pub fn transition(target: AbsOrRelValue, ramp: RampTimeOrSpeed, channel: CtrlChannel) -> Self {
        Self::with_kind(channel, AnimationKind::Transition(Transition::new(target, ramp)))
    }

    /// Fades the hue channel around the wheel to `target`.
    pub fn circular_hue(target: AbsOrRelValue, ramp: RampTimeOrSpeed, direction: HueDirection) -> Self {
        Self::with_kind(
            CtrlChannel::Hue,
            AnimationKind::TransitionCircularHue {
                transition: Transition::new(target, ramp),
                direction,
            },
        )
    }

    /// Flips the channel to its alternate value for `duration_ms`, then restores it.
    pub fn blink(duration_ms: u32, channel: CtrlChannel) -> Self {
        Self::with_kind(
            channel,
            AnimationKind::Blink {
                hold_steps: ms_to_ticks(duration_ms),
                previous: 0,
            },
        )
    }

    /// Starts a transition from `start` instead of the channel's current value.
    ///
    /// Has no effect on non-transition animations.
    pub fn starting_at(mut self, start: AbsOrRelValue) -> Self {
        if let Some(transition) = self.transition_mut() {
            transition.start = Some(start);
        }
        self
    }

    /// Keeps a transition's final value for `stay_ms` before it finishes.
    ///
    /// Has no effect on non-transition animations.
    pub fn staying_for(mut self, stay_ms: u32) -> Self {
        if let Some(transition) = self.transition_mut() {
            transition.stay_steps = ms_to_ticks(stay_ms);
        }
        self
    }

    /// Marks the animation to be put back at the end of its queue when it finishes.
    pub fn requeue(mut self, requeue: bool) -> Self {
        self.requeue = requeue;
        self
    }

    /// Sets the display name, truncated to [`ANIMATION_NAME_LEN`] bytes.
    pub fn named(mut self, name: &str) -> Self {
        self.name.clear();
        for c in name.chars() {
            if self.name.push(c).is_err() {
                break;
            }
        }
        self
    }

    fn transition_mut(&mut self) -> Option<&mut Transition> {
        match &mut self.kind {
            AnimationKind::Transition(transition)
            | AnimationKind::TransitionCircularHue { transition, .. } => Some(transition),
            _ => None,
        }
    }

    /// Advances the animation by one tick.
    ///
    /// Returns the channel value for this tick and whether the animation is finished.
    pub fn run<S: ValueSource + ?Sized>(&mut self, source: &S) -> (i32, bool) {
        if self.current_step == 0 {
            let current = source.current_value(self.channel);
            let range = self.channel.unit();
            self.value = match &mut self.kind {
                AnimationKind::SetAndStay { target, .. } => target.resolve_in(current, range),
                AnimationKind::Transition(transition) => transition.init_linear(current, range),
                AnimationKind::TransitionCircularHue {
                    transition,
                    direction,
                } => transition.init_circular(current, *direction),
                AnimationKind::Blink { previous, .. } => {
                    *previous = current;
                    blink_alternate(self.channel, current)
                }
            };

            #[cfg(feature = "defmt")]
            defmt::trace!(
                "anim '{}' on {}: start {} -> {}",
                self.name.as_str(),
                self.channel,
                current,
                self.value
            );
        }

        self.current_step = self.current_step.saturating_add(1);
        let step = self.current_step;

        let finished = match &mut self.kind {
            AnimationKind::SetAndStay { hold_steps, .. } => step >= *hold_steps,
            AnimationKind::Transition(transition) => {
                self.value = transition.advance(step, self.value);
                step >= transition.total_steps()
            }
            AnimationKind::TransitionCircularHue { transition, .. } => {
                self.value = Unit::Hue.normalize(transition.advance(step, self.value));
                step >= transition.total_steps()
            }
            AnimationKind::Blink {
                hold_steps,
                previous,
            } => {
                let done = step >= *hold_steps;
                if done {
                    self.value = *previous;
                }
                done
            }
        };

        (self.value, finished)
    }

    /// Rewinds the animation so its next tick starts it over.
    pub fn reset(&mut self) {
        self.current_step = 0;
    }

    pub fn channel(&self) -> CtrlChannel {
        self.channel
    }

    pub fn animation_type(&self) -> AnimationType {
        match self.kind {
            AnimationKind::SetAndStay { .. } => AnimationType::SetAndStay,
            AnimationKind::Transition(_) | AnimationKind::TransitionCircularHue { .. } => {
                AnimationType::Transition
            }
            AnimationKind::Blink { .. } => AnimationType::Blink,
        }
    }

    pub fn kind(&self) -> &AnimationKind {
        &self.kind
    }

    pub fn should_requeue(&self) -> bool {
        self.requeue
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The value produced by the most recent tick.
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Ticks run since the animation (re)started. 0 means not started.
    pub fn current_step(&self) -> u32 {
        self.current_step
    }

    /// Ticks until the animation finishes.
    ///
    /// Transitions only know this after their first tick and report 0 before.
    pub fn total_steps(&self) -> u32 {
        match &self.kind {
            AnimationKind::SetAndStay { hold_steps, .. } | AnimationKind::Blink { hold_steps, .. } => {
                (*hold_steps).max(1)
            }
            AnimationKind::Transition(transition)
            | AnimationKind::TransitionCircularHue { transition, .. } => transition.total_steps(),
        }
    }
}

fn blink_alternate(channel: CtrlChannel, base: i32) -> i32 {
    match channel {
        CtrlChannel::Hue => Unit::Hue.normalize(base + HUE_WHEEL_MAX / 2),
        _ => {
            if base > MAX_VALUE / 2 {
                0
            } else {
                MAX_VALUE
            }
        }
    }
}
