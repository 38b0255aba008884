#![forbid(unsafe_code)]
//! Headless presentation toolkit for image games and light novels.
//!
//! A [`Presenter`] owns the background pipeline (color temperature and animated grain), a dialog
//! box with character-by-character reveal, an option menu whose confirmed choices can be
//! persisted through a [`ChoiceStore`], and image, animation, audio and video layers.
//! Timers run on virtual time; an [`EventLoop`] connects a presenter to a clock and an input
//! source and suspends story flow while an option menu waits for a choice.

pub mod assets;
pub mod effects;
pub mod foundation;
pub mod overlay;
pub mod present;
pub mod runtime;
pub mod script;
pub mod store;

pub use assets::color::parse_color;
pub use assets::media::{AudioPcm, BufferedFrames, FrameSource};
pub use effects::noise::{NoiseConfig, NoisePattern, apply_noise};
pub use effects::warmth::apply_warmth;
pub use foundation::core::{IRect, Point, Rgb8, SurfaceSize};
pub use foundation::error::{StoryError, StoryResult};
pub use foundation::rng::Rng64;
pub use overlay::{
    AudioOutput, AudioSettings, AudioTrack, ImageSettings, LayerId, LayerKind, LayerView,
    ResourceOverlay, SilentOutput, VideoSettings,
};
pub use present::config::PresenterConfig;
pub use present::dialog::{DialogPosition, DialogStyle, DialogView};
pub use present::menu::{ChoiceResult, ChoiceTicket, MenuView, OptionRequest, SaveMode};
pub use present::presenter::{DEFAULT_WARMTH_DELAY, NOISE_REFRESH_INTERVAL, Presenter};
pub use runtime::{
    ChannelInput, Clock, EventLoop, InputEvent, InputPoll, InputSource, ManualClock, ScriptedInput,
    SystemClock,
};
pub use script::{Script, ScriptReport};
pub use store::choice::{ChoiceRecord, ChoiceStore, MenuChoice, StoryChoice};
