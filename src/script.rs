//! JSON story scripts run headlessly against a [`Presenter`] on virtual time.
//!
//! ```json
//! {
//!   "config": {"width": 640, "height": 480, "store_path": "gamedata.json"},
//!   "steps": [
//!     {"dialog": {"text": "Where to?", "speed_ms": 30}},
//!     {"wait_ms": 500},
//!     {"options": {"options": ["Left", "Right"], "save": true, "keys": ["down", "enter"]}},
//!     {"snapshot": "out/choice.png"}
//!   ]
//! }
//! ```
//!
//! Relative paths resolve against the script's directory.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::effects::noise::NoiseConfig;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{StoryError, StoryResult};
use crate::overlay::{AudioSettings, ImageSettings, VideoSettings};
use crate::present::config::PresenterConfig;
use crate::present::dialog::{DEFAULT_REVEAL_SPEED, DialogPosition, DialogStyle};
use crate::present::menu::{ChoiceResult, OptionRequest};
use crate::present::presenter::{DEFAULT_WARMTH_DELAY, Presenter};
use crate::runtime::{EventLoop, InputEvent, ManualClock, ScriptedInput};

const DEFAULT_KEY_INTERVAL_MS: u64 = 100;

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default)]
    pub config: PresenterConfig,
    pub steps: Vec<ScriptStep>,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    Dialog(DialogStep),
    CloseDialog,
    Options(OptionsStep),
    /// Let timers run for this many milliseconds.
    WaitMs(u64),
    BackgroundColor(Rgb8),
    BackgroundImage(PathBuf),
    Warmth(WarmthStep),
    /// `null` removes the effect.
    Noise(Option<NoiseConfig>),
    Image(ResourceStep),
    AnimatedImage(ResourceStep),
    Audio(ResourceStep),
    Video(ResourceStep),
    Resize { width: u32, height: u32 },
    /// Write the current frame as a PNG.
    Snapshot(PathBuf),
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialogStep {
    pub text: String,
    pub text_color: Option<Rgb8>,
    pub speed_ms: Option<u64>,
    pub position: Option<DialogPosition>,
    pub box_color: Option<Rgb8>,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsStep {
    pub options: Vec<String>,
    pub box_color: Option<Rgb8>,
    pub text_color: Option<Rgb8>,
    #[serde(default)]
    pub save: bool,
    pub id: Option<String>,
    /// Keys pressed once the menu is up, one every `key_interval_ms`.
    #[serde(default)]
    pub keys: Vec<InputEvent>,
    pub key_interval_ms: Option<u64>,
}

#[derive(Clone, Copy, Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WarmthStep {
    pub target: i32,
    #[serde(default = "default_warmth_step")]
    pub step: i32,
    pub delay_ms: Option<u64>,
}

fn default_warmth_step() -> i32 {
    1
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceStep {
    pub path: PathBuf,
    /// Shape depends on the resource kind; see [`ImageSettings::from_json`] and friends.
    pub settings: serde_json::Value,
}

/// What a script run produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptReport {
    pub choices: Vec<ChoiceResult>,
    pub snapshots: Vec<PathBuf>,
    /// Virtual time at the end of the run.
    pub elapsed: Duration,
}

impl Script {
    pub fn from_reader<R: std::io::Read>(r: R) -> StoryResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| StoryError::invalid_input(format!("parse story script JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> StoryResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StoryError::invalid_input(format!("open story script '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Run every step in order. Relative paths resolve against `base_dir`.
    #[tracing::instrument(skip(self), fields(steps = self.steps.len()))]
    pub fn run(&self, base_dir: &Path) -> StoryResult<ScriptReport> {
        let mut config = self.config.clone();
        config.store_path = resolve(base_dir, &config.store_path);
        config.background_image = config
            .background_image
            .as_deref()
            .map(|p| resolve(base_dir, p));

        let mut presenter = Presenter::new(config)?;
        let clock = ManualClock::new();
        let mut el = EventLoop::new(clock.clone(), ScriptedInput::new(clock));
        let mut report = ScriptReport::default();

        for (index, step) in self.steps.iter().enumerate() {
            tracing::debug!(index, "script step");
            run_step(step, base_dir, &mut presenter, &mut el, &mut report)?;
        }
        report.elapsed = presenter.now();
        Ok(report)
    }
}

fn run_step(
    step: &ScriptStep,
    base_dir: &Path,
    presenter: &mut Presenter,
    el: &mut EventLoop<ManualClock, ScriptedInput>,
    report: &mut ScriptReport,
) -> StoryResult<()> {
    match step {
        ScriptStep::Dialog(d) => {
            let defaults = DialogStyle::default();
            let style = DialogStyle {
                text_color: d.text_color.unwrap_or(defaults.text_color),
                speed: d
                    .speed_ms
                    .map(Duration::from_millis)
                    .unwrap_or(DEFAULT_REVEAL_SPEED),
                position: d.position.unwrap_or(defaults.position),
                box_color: d.box_color.unwrap_or(defaults.box_color),
            };
            presenter.show_dialog(&d.text, style);
        }
        ScriptStep::CloseDialog => presenter.close_dialog(),
        ScriptStep::Options(o) => {
            let mut request = OptionRequest::new(o.options.iter().cloned()).colors(
                o.box_color.unwrap_or(Rgb8::BLACK),
                o.text_color.unwrap_or(Rgb8::WHITE),
            );
            if o.save {
                request = match &o.id {
                    Some(id) => request.persist_as(id.clone()),
                    None => request.persist(),
                };
            }
            let interval =
                Duration::from_millis(o.key_interval_ms.unwrap_or(DEFAULT_KEY_INTERVAL_MS));
            let ticket = presenter.show_options(request)?;
            for key in &o.keys {
                el.input_mut().push_after(interval, *key);
            }
            let result = el.wait_for_choice(presenter, ticket)?;
            report.choices.push(result);
        }
        ScriptStep::WaitMs(ms) => el.run_for(presenter, Duration::from_millis(*ms))?,
        ScriptStep::BackgroundColor(c) => presenter.set_background_color(*c)?,
        ScriptStep::BackgroundImage(p) => presenter.set_background_path(resolve(base_dir, p))?,
        ScriptStep::Warmth(w) => presenter.set_warmth(
            w.target,
            w.step,
            w.delay_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_WARMTH_DELAY),
        )?,
        ScriptStep::Noise(cfg) => presenter.set_noise_effect(*cfg)?,
        ScriptStep::Image(r) => {
            let settings = ImageSettings::from_json(&r.settings)?;
            presenter.load_image(resolve(base_dir, &r.path), settings)?;
        }
        ScriptStep::AnimatedImage(r) => {
            let settings = ImageSettings::from_json(&r.settings)?;
            presenter.load_animated_image(resolve(base_dir, &r.path), settings)?;
        }
        ScriptStep::Audio(r) => {
            let settings = AudioSettings::from_json(&r.settings)?;
            presenter.load_audio(resolve(base_dir, &r.path), settings)?;
        }
        ScriptStep::Video(r) => {
            let settings = VideoSettings::from_json(&r.settings)?;
            presenter.load_video(resolve(base_dir, &r.path), settings)?;
        }
        ScriptStep::Resize { width, height } => {
            presenter.handle_input(InputEvent::Resize {
                width: *width,
                height: *height,
            })?;
        }
        ScriptStep::Snapshot(p) => {
            let out = resolve(base_dir, p);
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            presenter
                .render()
                .save_with_format(&out, image::ImageFormat::Png)
                .map_err(|e| {
                    StoryError::Other(anyhow::anyhow!("write png '{}': {e}", out.display()))
                })?;
            report.snapshots.push(out);
        }
    }
    Ok(())
}

fn resolve(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

#[cfg(test)]
#[path = "../tests/unit/script.rs"]
mod tests;
