//! Virtual-time scheduling, clocks, input sources and the loop that ties them to a presenter.

pub mod clock;
pub mod event_loop;
pub mod input;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use event_loop::EventLoop;
pub use input::{ChannelInput, InputEvent, InputPoll, InputSource, ScriptedInput};
pub use scheduler::{Scheduler, TimerId};
