//! Command-based control for animated channels.

use crate::animation::Animation;
use crate::types::{AbsOrRelValue, CtrlChannel, QueuePolicy};

/// Actions for controlling a single channel.
#[derive(Debug, Clone)]
pub enum ChannelAction {
    /// Queue an animation.
    Push(Animation, QueuePolicy),
    /// Set the value directly.
    SetValue(AbsOrRelValue),
    /// Drop the running animation.
    Skip,
    /// Drop all queued animations.
    ClearQueue,
    /// Pause processing.
    Pause,
    /// Resume processing.
    Continue,
}

/// Command targeting a specific channel.
#[derive(Debug, Clone)]
pub struct ChannelCommand {
    pub channel: CtrlChannel,
    pub action: ChannelAction,
}

impl ChannelCommand {
    /// Creates command.
    pub fn new(channel: CtrlChannel, action: ChannelAction) -> Self {
        Self { channel, action }
    }
}
