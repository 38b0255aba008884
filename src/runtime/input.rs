use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use super::clock::{Clock, ManualClock};

/// User input understood by the presenter.
///
/// JSON form: `"up"`, `"down"`, `"confirm"`, `{"scroll": -3}`,
/// `{"resize": {"width": 640, "height": 480}}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    Up,
    Down,
    #[serde(alias = "enter")]
    Confirm,
    /// Scroll the dialog text by whole lines; negative scrolls back.
    Scroll(i32),
    Resize { width: u32, height: u32 },
}

/// Result of waiting on an input source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputPoll {
    Event(InputEvent),
    /// Nothing arrived before the timeout.
    Timeout,
    /// No more input will ever arrive.
    Closed,
}

/// Source of input events for an [`super::EventLoop`].
pub trait InputSource {
    /// Wait up to `timeout` for the next event.
    fn poll(&mut self, timeout: Duration) -> InputPoll;
}

/// Events fired at fixed times on a [`ManualClock`].
///
/// Polling moves the clock: to the event's time when one is due within the timeout, otherwise
/// to the end of the timeout. Once the queue is empty the source reports `Closed`.
#[derive(Debug)]
pub struct ScriptedInput {
    clock: ManualClock,
    events: VecDeque<(Duration, InputEvent)>,
}

impl ScriptedInput {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            events: VecDeque::new(),
        }
    }

    /// Queue `event` at absolute clock time `at`. Events sharing a time keep insertion order.
    pub fn push_at(&mut self, at: Duration, event: InputEvent) -> &mut Self {
        let idx = self.events.partition_point(|(t, _)| *t <= at);
        self.events.insert(idx, (at, event));
        self
    }

    /// Queue `event` `delay` after the last queued event (or after the current time).
    pub fn push_after(&mut self, delay: Duration, event: InputEvent) -> &mut Self {
        let base = self
            .events
            .back()
            .map(|(t, _)| *t)
            .unwrap_or_else(|| self.clock.now())
            .max(self.clock.now());
        self.push_at(base + delay, event)
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, timeout: Duration) -> InputPoll {
        let Some(&(at, event)) = self.events.front() else {
            return InputPoll::Closed;
        };
        let deadline = self.clock.now() + timeout;
        if at <= deadline {
            self.events.pop_front();
            self.clock.set(at);
            InputPoll::Event(event)
        } else {
            self.clock.set(deadline);
            InputPoll::Timeout
        }
    }
}

/// Events pushed from another thread (typically a window's event handler).
#[derive(Debug)]
pub struct ChannelInput {
    rx: Receiver<InputEvent>,
}

impl ChannelInput {
    pub fn new(rx: Receiver<InputEvent>) -> Self {
        Self { rx }
    }

    /// Create a connected sender and input source.
    pub fn channel() -> (Sender<InputEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }
}

impl InputSource for ChannelInput {
    fn poll(&mut self, timeout: Duration) -> InputPoll {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => InputPoll::Event(event),
            Err(RecvTimeoutError::Timeout) => InputPoll::Timeout,
            Err(RecvTimeoutError::Disconnected) => InputPoll::Closed,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/input.rs"]
mod tests;
