//! Shared test infrastructure for rgbww-animator integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use core::cell::Cell;
use rgbww_animator::{
    AnimatedChannel, ChannelOutput, CtrlChannel, FinishObserver, Hsvct, LedOutput, ValueSource,
};

// ============================================================================
// Mock Value Source
// ============================================================================

/// Value source returning one controllable value for every channel
pub struct MockSource {
    value: Cell<i32>,
}

impl MockSource {
    pub fn new(value: i32) -> Self {
        Self {
            value: Cell::new(value),
        }
    }

    pub fn set(&self, value: i32) {
        self.value.set(value);
    }
}

impl ValueSource for MockSource {
    fn current_value(&self, _channel: CtrlChannel) -> i32 {
        self.value.get()
    }
}

// ============================================================================
// Recording Observer
// ============================================================================

pub type Notification = (heapless::String<32>, bool);

/// Observer that records every finish notification
pub struct RecordingObserver {
    events: heapless::Vec<Notification, 64>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self {
            events: heapless::Vec::new(),
        }
    }

    pub fn events(&self) -> &[Notification] {
        &self.events
    }

    /// True if `name` was reported with the given requeue flag
    pub fn saw(&self, name: &str, requeued: bool) -> bool {
        self.events
            .iter()
            .any(|(n, r)| n.as_str() == name && *r == requeued)
    }
}

impl FinishObserver for RecordingObserver {
    fn animation_finished(&mut self, name: &str, requeued: bool) {
        let mut stored = heapless::String::new();
        let _ = stored.push_str(name);
        let _ = self.events.push((stored, requeued));
    }
}

// ============================================================================
// Mock LED
// ============================================================================

/// Mock output stage that records what was written
pub struct MockLed {
    last_color: Hsvct,
    last_raw: ChannelOutput,
    hsv_writes: usize,
    raw_writes: usize,
}

impl MockLed {
    pub fn new() -> Self {
        Self {
            last_color: Hsvct::default(),
            last_raw: ChannelOutput::default(),
            hsv_writes: 0,
            raw_writes: 0,
        }
    }

    pub fn last_color(&self) -> Hsvct {
        self.last_color
    }

    pub fn last_raw(&self) -> ChannelOutput {
        self.last_raw
    }

    pub fn hsv_writes(&self) -> usize {
        self.hsv_writes
    }

    pub fn raw_writes(&self) -> usize {
        self.raw_writes
    }
}

impl LedOutput for MockLed {
    /// Reports the value as all five channels, so raw animations have a known base
    fn write_hsv(&mut self, color: Hsvct) -> ChannelOutput {
        self.last_color = color;
        self.hsv_writes += 1;
        ChannelOutput::new(color.val, color.val, color.val, color.val, color.val)
    }

    fn write_raw(&mut self, output: ChannelOutput) {
        self.last_raw = output;
        self.raw_writes += 1;
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Calls `process()` `ticks` times and returns the finished flag of each call
pub fn run_ticks<const Q: usize, const N: usize>(
    channel: &mut AnimatedChannel<Q>,
    source: &MockSource,
    observer: &mut RecordingObserver,
) -> [bool; N] {
    core::array::from_fn(|_| channel.process(source, &mut *observer))
}

/// Distance between two hue values along the wheel, taking the shorter way
pub fn wheel_distance(a: i32, b: i32) -> i32 {
    let d = (a - b).rem_euclid(rgbww_animator::config::HUE_WHEEL_MAX);
    d.min(rgbww_animator::config::HUE_WHEEL_MAX - d)
}
