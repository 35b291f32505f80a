//! Fixed-capacity FIFO of pending animations.

use crate::animation::Animation;
use heapless::Deque;

/// Bounded double-ended queue of animations waiting to run on a channel.
///
/// Push operations hand the animation back when the queue is full.
#[derive(Debug)]
pub struct AnimationQueue<const N: usize> {
    items: Deque<Animation, N>,
}

impl<const N: usize> AnimationQueue<N> {
    pub const fn new() -> Self {
        Self {
            items: Deque::new(),
        }
    }

    /// Appends to the back.
    ///
    /// # Errors
    /// Returns the animation if the queue is full.
    pub fn push(&mut self, animation: Animation) -> Result<(), Animation> {
        self.items.push_back(animation)
    }

    /// Inserts at the front, so it is the next to be popped.
    ///
    /// # Errors
    /// Returns the animation if the queue is full.
    pub fn push_front(&mut self, animation: Animation) -> Result<(), Animation> {
        self.items.push_front(animation)
    }

    pub fn pop(&mut self) -> Option<Animation> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&Animation> {
        self.items.front()
    }

    /// The most recently pushed animation at the back.
    pub fn back(&self) -> Option<&Animation> {
        self.items.back()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.is_full()
    }

    /// Free slots left.
    pub fn remaining(&self) -> usize {
        N - self.items.len()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Iterates front to back.
    pub fn iter(&self) -> impl Iterator<Item = &Animation> {
        self.items.iter()
    }
}

impl<const N: usize> Default for AnimationQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
