//! A single animated value with its queue of pending animations.
//!
//! Provides [`AnimatedChannel`], which owns the running animation and the queue behind
//! it, resolves queue policies on push and advances the running animation once per tick.
//! Also defines the [`FinishObserver`] notification sink.

use crate::animation::{Animation, AnimationType, ValueSource};
use crate::command::ChannelAction;
use crate::config::ANIMATION_QUEUE_SIZE;
use crate::queue::AnimationQueue;
use crate::types::{AbsOrRelValue, QueuePolicy, Unit};

/// Receives a notification whenever an animation leaves a channel.
///
/// `requeued` is true when the animation was put back at the end of its queue and will
/// run again. Implementations cannot influence scheduling.
pub trait FinishObserver {
    fn animation_finished(&mut self, name: &str, requeued: bool);
}

/// Ignores all notifications.
impl FinishObserver for () {
    fn animation_finished(&mut self, _name: &str, _requeued: bool) {}
}

impl<O: FinishObserver + ?Sized> FinishObserver for &mut O {
    fn animation_finished(&mut self, name: &str, requeued: bool) {
        (**self).animation_finished(name, requeued);
    }
}

/// Reasons a push onto a channel can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PushError {
    /// The queue has no room for the animation.
    QueueFull,

    /// A blink was pushed while another blink is running.
    BlinkInProgress,
}

impl core::fmt::Display for PushError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PushError::QueueFull => write!(f, "animation queue is full"),
            PushError::BlinkInProgress => write!(f, "a blink is already running"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PushError {}

/// A rejected push. Hands the animation back to the caller.
#[derive(Debug)]
pub struct PushRejected {
    pub reason: PushError,
    pub animation: Animation,
}

impl core::fmt::Display for PushRejected {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "animation '{}' rejected: {}", self.animation.name(), self.reason)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PushRejected {}

/// One logical scalar (hue, a raw channel, ...) driven by a queue of animations.
///
/// At most one animation runs at a time. When it finishes the channel keeps its last
/// value until the next animation starts.
///
/// # Type Parameters
/// * `Q` - Capacity of the animation queue
#[derive(Debug)]
pub struct AnimatedChannel<const Q: usize = ANIMATION_QUEUE_SIZE> {
    value: i32,
    current: Option<Animation>,
    queue: AnimationQueue<Q>,
    paused: bool,
    cancel_requested: bool,
    clear_requested: bool,
}

impl<const Q: usize> AnimatedChannel<Q> {
    /// Creates an idle channel holding 0.
    pub const fn new() -> Self {
        Self::with_value(0)
    }

    /// Creates an idle channel holding `value`.
    pub const fn with_value(value: i32) -> Self {
        Self {
            value,
            current: None,
            queue: AnimationQueue::new(),
            paused: false,
            cancel_requested: false,
            clear_requested: false,
        }
    }

    /// Handles a channel action by dispatching to the appropriate method.
    ///
    /// # Errors
    /// Only `Push` can fail, see [`push_animation`](Self::push_animation).
    pub fn handle_action(&mut self, action: ChannelAction) -> Result<(), PushRejected> {
        match action {
            ChannelAction::Push(animation, policy) => self.push_animation(animation, policy)?,
            ChannelAction::SetValue(value) => self.set_value(value),
            ChannelAction::Skip => self.skip_animation(),
            ChannelAction::ClearQueue => self.clear_animation_queue(),
            ChannelAction::Pause => self.pause_animation(),
            ChannelAction::Continue => self.continue_animation(),
        }
        Ok(())
    }

    /// Queues `animation` according to `policy`.
    ///
    /// An animation dropped by [`QueuePolicy::Single`] is not reported to any observer;
    /// use [`push_animation_with`](Self::push_animation_with) for that.
    ///
    /// # Errors
    /// * `BlinkInProgress` - Both `animation` and the running animation are blinks
    /// * `QueueFull` - Not enough free slots; nothing was changed
    pub fn push_animation(&mut self, animation: Animation, policy: QueuePolicy) -> Result<(), PushRejected> {
        self.push_animation_with(animation, policy, &mut ())
    }

    /// Like [`push_animation`](Self::push_animation), reporting an animation dropped by
    /// [`QueuePolicy::Single`] to `observer`.
    ///
    /// # Errors
    /// * `BlinkInProgress` - Both `animation` and the running animation are blinks
    /// * `QueueFull` - Not enough free slots; nothing was changed
    pub fn push_animation_with<O: FinishObserver + ?Sized>(
        &mut self,
        animation: Animation,
        policy: QueuePolicy,
        observer: &mut O,
    ) -> Result<(), PushRejected> {
        if animation.animation_type() == AnimationType::Blink
            && self
                .current
                .as_ref()
                .is_some_and(|running| running.animation_type() == AnimationType::Blink)
        {
            #[cfg(feature = "defmt")]
            defmt::warn!("ignoring blink '{}', already blinking", animation.name());

            return Err(PushRejected {
                reason: PushError::BlinkInProgress,
                animation,
            });
        }

        let needed = match policy {
            QueuePolicy::Single => 0,
            QueuePolicy::Back => 1,
            QueuePolicy::Front | QueuePolicy::FrontReset => 1 + usize::from(self.current.is_some()),
        };
        let free = if self.clear_requested && policy != QueuePolicy::Back {
            self.queue.capacity()
        } else {
            self.queue.remaining()
        };
        if free < needed {
            #[cfg(feature = "defmt")]
            defmt::warn!("queue full, dropping '{}'", animation.name());

            return Err(PushRejected {
                reason: PushError::QueueFull,
                animation,
            });
        }

        if policy != QueuePolicy::Back {
            self.continue_animation();
        }

        // Free slots were checked above, so none of the pushes below can fail.
        let pushed = match policy {
            QueuePolicy::Back => self.queue.push(animation),
            QueuePolicy::Single => {
                self.queue.clear();
                self.clear_requested = false;
                self.drop_current(observer);
                self.queue.push(animation)
            }
            QueuePolicy::Front | QueuePolicy::FrontReset => {
                // A pending clear only covers what was queued before this push.
                if self.clear_requested {
                    self.queue.clear();
                    self.clear_requested = false;
                }

                let suspended = match self.current.take() {
                    Some(mut running) => {
                        if policy == QueuePolicy::FrontReset {
                            running.reset();
                        }
                        self.queue.push_front(running)
                    }
                    None => Ok(()),
                };
                self.cancel_requested = false;
                suspended.and_then(|()| self.queue.push_front(animation))
            }
        };

        pushed.map_err(|animation| PushRejected {
            reason: PushError::QueueFull,
            animation,
        })
    }

    /// Advances the channel by one tick.
    ///
    /// Returns true if the running animation finished on this tick. Paused and idle
    /// channels return false.
    pub fn process<S, O>(&mut self, source: &S, observer: &mut O) -> bool
    where
        S: ValueSource + ?Sized,
        O: FinishObserver + ?Sized,
    {
        if self.paused {
            return false;
        }

        if self.cancel_requested {
            self.drop_current(observer);
        }

        if self.clear_requested {
            self.queue.clear();
            self.clear_requested = false;
        }

        if self.current.is_none() {
            self.current = self.queue.pop();
        }

        let Some(animation) = self.current.as_mut() else {
            return false;
        };

        let (value, finished) = animation.run(source);
        self.value = value;

        if finished {
            if animation.should_requeue() {
                self.requeue_current(observer);
            } else {
                self.drop_current(observer);
            }
        }

        finished
    }

    fn drop_current<O: FinishObserver + ?Sized>(&mut self, observer: &mut O) {
        self.cancel_requested = false;
        if let Some(animation) = self.current.take() {
            observer.animation_finished(animation.name(), false);
        }
    }

    fn requeue_current<O: FinishObserver + ?Sized>(&mut self, observer: &mut O) {
        self.cancel_requested = false;
        let Some(mut animation) = self.current.take() else {
            return;
        };

        animation.reset();
        match self.queue.push(animation) {
            Ok(()) => {
                if let Some(requeued) = self.queue.back() {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("requeuing '{}'", requeued.name());

                    observer.animation_finished(requeued.name(), true);
                }
            }
            Err(animation) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("queue full, cannot requeue '{}'", animation.name());

                observer.animation_finished(animation.name(), false);
            }
        }
    }

    /// The most recently computed value.
    pub fn value(&self) -> i32 {
        self.value
    }

    /// Overrides the value directly, without animating.
    ///
    /// A running animation overwrites it again on its next tick.
    pub fn set_value(&mut self, value: AbsOrRelValue) {
        self.value = value.get_final_value(self.value);
    }

    /// Like [`set_value`](Self::set_value), but keeps the result within `range`,
    /// the unit of the logical channel this state drives.
    pub fn set_value_in(&mut self, value: AbsOrRelValue, range: Unit) {
        self.value = value.resolve_in(self.value, range);
    }

    /// Freezes the channel: `process()` does nothing until continued.
    pub fn pause_animation(&mut self) {
        self.paused = true;
    }

    pub fn continue_animation(&mut self) {
        self.paused = false;
    }

    /// Drops the running animation on the next `process()`. No-op when idle.
    pub fn skip_animation(&mut self) {
        if self.current.is_some() {
            self.cancel_requested = true;
        }
    }

    /// Empties the queue on the next `process()`. The running animation is kept.
    pub fn clear_animation_queue(&mut self) {
        self.clear_requested = true;
    }

    pub fn is_animation_q_full(&self) -> bool {
        self.queue.is_full()
    }

    pub fn is_animation_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Animations waiting to run, next first.
    pub fn queue(&self) -> &AnimationQueue<Q> {
        &self.queue
    }

    pub fn current_animation(&self) -> Option<&Animation> {
        self.current.as_ref()
    }
}

impl<const Q: usize> Default for AnimatedChannel<Q> {
    fn default() -> Self {
        Self::new()
    }
}
