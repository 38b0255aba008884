use std::time::Duration;

use crate::foundation::error::{StoryError, StoryResult};
use crate::present::menu::{ChoiceResult, ChoiceTicket, OptionRequest};
use crate::present::presenter::Presenter;

use super::clock::Clock;
use super::input::{InputPoll, InputSource};

/// Longest single wait on the input source when no timer is pending.
pub const IDLE_POLL: Duration = Duration::from_millis(100);

/// Drives a [`Presenter`] from a clock and an input source.
///
/// Each step fires the presenter's due timers, waits for input no longer than the next timer,
/// and applies whatever arrived. Timers keep running while a caller waits on a choice.
#[derive(Debug)]
pub struct EventLoop<C, I> {
    clock: C,
    input: I,
    last: Duration,
}

impl<C: Clock, I: InputSource> EventLoop<C, I> {
    pub fn new(clock: C, input: I) -> Self {
        let last = clock.now();
        Self { clock, input, last }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn into_parts(self) -> (C, I) {
        (self.clock, self.input)
    }

    /// Bring the presenter's virtual time up to the clock.
    fn sync(&mut self, presenter: &mut Presenter) {
        let now = self.clock.now();
        if now > self.last {
            presenter.advance(now - self.last);
            self.last = now;
        }
    }

    /// One loop iteration, waiting at most `max_wait` for input.
    ///
    /// Returns `Ok(false)` once the input source is closed.
    pub fn pump(&mut self, presenter: &mut Presenter, max_wait: Duration) -> StoryResult<bool> {
        self.sync(presenter);
        let wait = match presenter.next_due() {
            Some(due) => max_wait.min(due.saturating_sub(presenter.now())),
            None => max_wait,
        };
        match self.input.poll(wait) {
            InputPoll::Event(event) => {
                self.sync(presenter);
                tracing::trace!(?event, "input");
                presenter.handle_input(event)?;
                Ok(true)
            }
            InputPoll::Timeout => {
                self.sync(presenter);
                Ok(true)
            }
            InputPoll::Closed => Ok(false),
        }
    }

    /// Run timers and input for `duration` of clock time.
    pub fn run_for(&mut self, presenter: &mut Presenter, duration: Duration) -> StoryResult<()> {
        let end = self.clock.now() + duration;
        loop {
            let now = self.clock.now();
            if now >= end {
                break;
            }
            if !self.pump(presenter, end - now)? {
                // No more input: only timers are left to run.
                self.clock.sleep_until(end);
                break;
            }
        }
        self.sync(presenter);
        Ok(())
    }

    /// Keep the loop running until the menu behind `ticket` resolves.
    ///
    /// Fails with [`StoryError::InputClosed`] if input ends first, and with
    /// [`StoryError::InvalidInput`] for a ticket that is neither open nor resolved.
    pub fn wait_for_choice(
        &mut self,
        presenter: &mut Presenter,
        ticket: ChoiceTicket,
    ) -> StoryResult<ChoiceResult> {
        loop {
            if let Some(result) = presenter.take_choice(ticket) {
                return result;
            }
            if !presenter.is_awaiting(ticket) {
                return Err(StoryError::invalid_input(format!(
                    "no option menu is pending for ticket {}",
                    ticket.0
                )));
            }
            if !self.pump(presenter, IDLE_POLL)? {
                tracing::warn!(ticket = ticket.0, "input closed while waiting for a choice");
                return Err(StoryError::InputClosed);
            }
        }
    }

    /// Show an option menu and wait for its resolution.
    pub fn choose(
        &mut self,
        presenter: &mut Presenter,
        request: OptionRequest,
    ) -> StoryResult<ChoiceResult> {
        let ticket = presenter.show_options(request)?;
        self.wait_for_choice(presenter, ticket)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/event_loop.rs"]
mod tests;
