use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use image::RgbImage;

use crate::assets::decode;
use crate::assets::media::{AudioPcm, FrameSource};
use crate::effects::composite::{fill_rect, outline_rect, stipple_rect};
use crate::effects::noise::NoiseConfig;
use crate::effects::warmth::{WARMTH_MAX, WARMTH_MIN};
use crate::foundation::core::{Rgb8, SurfaceSize};
use crate::foundation::error::{StoryError, StoryResult};
use crate::foundation::rng::Rng64;
use crate::overlay::{
    AudioOutput, AudioSettings, ImageSettings, LayerId, ResourceOverlay, VideoSettings,
};
use crate::runtime::input::InputEvent;
use crate::runtime::scheduler::{Scheduler, TimerId};
use crate::store::choice::ChoiceStore;

use super::background::Background;
use super::config::PresenterConfig;
use super::dialog::{DialogBox, DialogStyle, DialogView};
use super::menu::{
    ChoiceResult, ChoiceTicket, HIGHLIGHT_WIDTH, MenuView, OptionMenu, OptionRequest, SaveMode,
};

/// Period of the background grain refresh.
pub const NOISE_REFRESH_INTERVAL: Duration = Duration::from_millis(200);
/// Default delay between warmth animation steps.
pub const DEFAULT_WARMTH_DELAY: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerTask {
    DialogReveal,
    Warmth { target: i32, step: i32 },
    NoiseRefresh,
    LayerFrame(LayerId),
}

/// Presentation state machine: background pipeline, dialog, option menu and resource layers,
/// driven by a virtual clock.
///
/// Time only moves through [`Presenter::advance`]; every timer due within the window runs to
/// completion in due order.
#[derive(Debug)]
pub struct Presenter {
    size: SurfaceSize,
    background: Background,
    dialog: Option<DialogBox>,
    menu: Option<OptionMenu>,
    overlay: ResourceOverlay,
    store: ChoiceStore,
    scheduler: Scheduler<TimerTask>,
    warmth_timer: Option<TimerId>,
    noise_timer: Option<TimerId>,
    resolved: HashMap<ChoiceTicket, StoryResult<ChoiceResult>>,
    next_ticket: u64,
    rng: Rng64,
    now: Duration,
}

impl Presenter {
    /// Build a presenter from its configuration.
    ///
    /// A background image that cannot be opened is an [`StoryError::InvalidInput`].
    pub fn new(config: PresenterConfig) -> StoryResult<Self> {
        config.validate()?;
        let size = config.size()?;
        let mut rng = config.seed.map(Rng64::new).unwrap_or_else(Rng64::from_entropy);
        let base = match &config.background_image {
            Some(path) => decode::open_background(path)?,
            None => Background::solid(config.background_color, size),
        };
        let background = Background::new(base, size, config.warmth, config.noise, &mut rng)?;

        let mut presenter = Self {
            size,
            background,
            dialog: None,
            menu: None,
            overlay: ResourceOverlay::default(),
            store: ChoiceStore::new(config.store_path),
            scheduler: Scheduler::new(),
            warmth_timer: None,
            noise_timer: None,
            resolved: HashMap::new(),
            next_ticket: 0,
            rng,
            now: Duration::ZERO,
        };
        if presenter.background.noise().is_some() {
            presenter.start_noise_timer();
        }
        tracing::debug!(width = size.width, height = size.height, "presenter ready");
        Ok(presenter)
    }

    /// Replace the audio sink used by audio and video resources.
    pub fn with_audio_output(mut self, audio: Box<dyn AudioOutput>) -> Self {
        self.overlay.set_audio_output(audio);
        self
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Virtual time elapsed since construction.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn store(&self) -> &ChoiceStore {
        &self.store
    }

    pub fn overlay(&self) -> &ResourceOverlay {
        &self.overlay
    }

    // ---- dialog ----

    /// Show a dialog box, replacing any current one. Characters appear one per `style.speed`.
    pub fn show_dialog(&mut self, text: &str, style: DialogStyle) {
        self.close_dialog();
        let mut dialog = DialogBox::new(text, style, self.size);
        if !dialog.is_complete() {
            dialog.timer = Some(self.scheduler.schedule_every(
                self.now,
                style.speed,
                TimerTask::DialogReveal,
            ));
        }
        tracing::info!(
            chars = text.chars().count(),
            position = ?style.position,
            "dialog shown"
        );
        self.dialog = Some(dialog);
    }

    /// Remove the dialog box and stop its reveal. Does nothing when no dialog is open.
    pub fn close_dialog(&mut self) {
        if let Some(dialog) = self.dialog.take() {
            if let Some(id) = dialog.timer {
                self.scheduler.cancel(id);
            }
            tracing::debug!("dialog closed");
        }
    }

    pub fn dialog_view(&self) -> Option<DialogView> {
        self.dialog.as_ref().map(DialogBox::view)
    }

    pub fn has_dialog(&self) -> bool {
        self.dialog.is_some()
    }

    // ---- option menu ----

    /// Open an option menu and return the ticket its resolution will be filed under.
    ///
    /// Fails with [`StoryError::EmptyOptions`] before anything is shown, and with
    /// [`StoryError::InvalidInput`] while another menu is still open.
    pub fn show_options(&mut self, mut request: OptionRequest) -> StoryResult<ChoiceTicket> {
        if request.options.is_empty() {
            return Err(StoryError::EmptyOptions);
        }
        if let Some(menu) = &self.menu {
            return Err(StoryError::invalid_input(format!(
                "an option menu is already open (ticket {})",
                menu.ticket.0
            )));
        }
        if request.story_id.as_deref() == Some("") {
            request.story_id = None;
        }
        let ticket = ChoiceTicket(self.next_ticket);
        self.next_ticket += 1;
        let count = request.options.len();
        self.menu = Some(OptionMenu::new(ticket, request, self.size)?);
        tracing::info!(ticket = ticket.0, options = count, "option menu shown");
        Ok(ticket)
    }

    pub fn menu_view(&self) -> Option<MenuView> {
        self.menu.as_ref().map(OptionMenu::view)
    }

    pub fn has_menu(&self) -> bool {
        self.menu.is_some()
    }

    /// Take the resolution of a menu. Yields `Some` exactly once per ticket.
    pub fn take_choice(&mut self, ticket: ChoiceTicket) -> Option<StoryResult<ChoiceResult>> {
        self.resolved.remove(&ticket)
    }

    /// `true` once the menu for `ticket` has been confirmed or dismissed and not yet taken.
    pub fn is_resolved(&self, ticket: ChoiceTicket) -> bool {
        self.resolved.contains_key(&ticket)
    }

    /// `true` while the menu for `ticket` is open and waiting for input.
    pub fn is_awaiting(&self, ticket: ChoiceTicket) -> bool {
        self.menu.as_ref().is_some_and(|m| m.ticket == ticket)
    }

    /// Read back a persisted choice: `None` or `""` is the last menu choice, anything else a
    /// story id.
    pub fn return_options(&self, id: Option<&str>) -> Option<String> {
        self.store.lookup(id)
    }

    fn confirm(&mut self) {
        let Some(menu) = self.menu.take() else {
            return;
        };
        let result = menu.result();
        let request = menu.request();
        let outcome = match request.save_mode {
            SaveMode::None => Ok(result),
            SaveMode::Persist => {
                let saved = match &request.story_id {
                    None => self.store.record_menu_choice(&result.options, &result.choice),
                    Some(id) => self.store.record_story_choice(id, &result.choice),
                };
                match saved {
                    Ok(()) => Ok(result),
                    Err(e) => {
                        tracing::error!(error = %e, "failed to persist choice");
                        Err(e)
                    }
                }
            }
        };
        if let Ok(r) = &outcome {
            tracing::info!(ticket = menu.ticket.0, choice = %r.choice, index = r.index, "option confirmed");
        }
        self.resolved.insert(menu.ticket, outcome);
    }

    fn dismiss_menu(&mut self) {
        if let Some(menu) = self.menu.take() {
            tracing::info!(ticket = menu.ticket.0, "option menu dismissed");
            self.resolved.insert(menu.ticket, Err(StoryError::MenuDismissed));
        }
    }

    // ---- input ----

    /// Apply one input event.
    ///
    /// An open menu takes Up, Down and Confirm; Scroll moves the dialog text when no menu is
    /// open. Resize rescales the background and closes both dialog and menu.
    pub fn handle_input(&mut self, event: InputEvent) -> StoryResult<()> {
        match event {
            InputEvent::Up => {
                if let Some(menu) = &mut self.menu {
                    menu.up();
                }
            }
            InputEvent::Down => {
                if let Some(menu) = &mut self.menu {
                    menu.down();
                }
            }
            InputEvent::Confirm => self.confirm(),
            InputEvent::Scroll(lines) => {
                if self.menu.is_none()
                    && let Some(dialog) = &mut self.dialog
                {
                    dialog.scroll(lines);
                }
            }
            InputEvent::Resize { width, height } => self.resize(width, height)?,
        }
        Ok(())
    }

    /// Resize the surface. Background is rescaled through the warmth and noise pipeline; the
    /// dialog and option menu are closed because their geometry no longer applies.
    pub fn resize(&mut self, width: u32, height: u32) -> StoryResult<()> {
        let size = SurfaceSize::new(width, height)?;
        self.size = size;
        self.background.resize(size, &mut self.rng)?;
        self.close_dialog();
        self.dismiss_menu();
        tracing::debug!(width, height, "surface resized");
        Ok(())
    }

    // ---- background ----

    /// Load a background image from disk.
    pub fn set_background_path(&mut self, path: impl AsRef<Path>) -> StoryResult<()> {
        let img = decode::open_background(path.as_ref())?;
        self.set_background_image(img)
    }

    /// Replace the background; it is scaled to the surface.
    pub fn set_background_image(&mut self, image: RgbImage) -> StoryResult<()> {
        if image.width() == 0 || image.height() == 0 {
            return Err(StoryError::invalid_input("background image is empty"));
        }
        self.background.set_base(image, &mut self.rng)
    }

    /// Replace the background with a solid color.
    pub fn set_background_color(&mut self, color: Rgb8) -> StoryResult<()> {
        let solid = Background::solid(color, self.size);
        self.background.set_base(solid, &mut self.rng)
    }

    pub fn warmth(&self) -> i32 {
        self.background.warmth()
    }

    /// Animate warmth toward `target` by `step`. The first step applies immediately and each
    /// later one after another `delay`, so `0 -> 50` by 10 lands at `4 * delay`. The last step
    /// lands exactly on `target`. A new call replaces a running animation.
    pub fn set_warmth(&mut self, target: i32, step: i32, delay: Duration) -> StoryResult<()> {
        if !(WARMTH_MIN..=WARMTH_MAX).contains(&target) {
            return Err(StoryError::invalid_input(format!(
                "warmth must be between {WARMTH_MIN} and {WARMTH_MAX}, got {target}"
            )));
        }
        if step <= 0 {
            return Err(StoryError::invalid_input(format!(
                "warmth step must be positive, got {step}"
            )));
        }
        if let Some(id) = self.warmth_timer.take() {
            self.scheduler.cancel(id);
        }
        if self.warmth() == target {
            return Ok(());
        }
        if self.step_warmth(target, step) == target {
            return Ok(());
        }
        self.warmth_timer = Some(self.scheduler.schedule_every(
            self.now,
            delay,
            TimerTask::Warmth { target, step },
        ));
        Ok(())
    }

    /// Move warmth one `step` toward `target`, clamped onto it. Returns the new value.
    fn step_warmth(&mut self, target: i32, step: i32) -> i32 {
        let current = self.warmth();
        let next = if current < target {
            (current + step).min(target)
        } else {
            (current - step).max(target)
        };
        if let Err(e) = self.background.set_warmth(next, &mut self.rng) {
            tracing::warn!(error = %e, "warmth step failed");
        }
        next
    }

    /// `true` while a warmth animation is running.
    pub fn warmth_animating(&self) -> bool {
        self.warmth_timer.is_some()
    }

    /// Replace the grain effect. `None` removes it and stops the refresh timer.
    pub fn set_noise_effect(&mut self, config: Option<NoiseConfig>) -> StoryResult<()> {
        let enabled = config.is_some();
        self.background.set_noise(config, &mut self.rng)?;
        match (enabled, self.noise_timer) {
            (true, None) => self.start_noise_timer(),
            (false, Some(id)) => {
                self.scheduler.cancel(id);
                self.noise_timer = None;
            }
            _ => {}
        }
        Ok(())
    }

    pub fn noise_effect(&self) -> Option<NoiseConfig> {
        self.background.noise().copied()
    }

    fn start_noise_timer(&mut self) {
        self.noise_timer = Some(self.scheduler.schedule_every(
            self.now,
            NOISE_REFRESH_INTERVAL,
            TimerTask::NoiseRefresh,
        ));
    }

    /// Background frame as it would appear without dialog, menu or layers.
    pub fn background_frame(&self) -> &RgbImage {
        self.background.frame()
    }

    // ---- resources ----

    pub fn load_image(&mut self, path: impl AsRef<Path>, settings: ImageSettings) -> StoryResult<LayerId> {
        self.overlay.load_image(path.as_ref(), settings)
    }

    /// Load an animated image; frames advance every 100ms.
    pub fn load_animated_image(
        &mut self,
        path: impl AsRef<Path>,
        settings: ImageSettings,
    ) -> StoryResult<LayerId> {
        let id = self.overlay.load_animated_image(path.as_ref(), settings)?;
        self.start_layer_timer(id);
        Ok(id)
    }

    pub fn load_audio(&mut self, path: impl AsRef<Path>, settings: AudioSettings) -> StoryResult<()> {
        self.overlay.load_audio(path.as_ref(), settings)
    }

    /// Play samples decoded elsewhere.
    pub fn play_audio(
        &mut self,
        source: impl AsRef<Path>,
        pcm: AudioPcm,
        settings: AudioSettings,
    ) -> StoryResult<()> {
        self.overlay.play_audio(source.as_ref(), pcm, settings)
    }

    /// Load a video; frames advance every 30ms until the stream ends.
    pub fn load_video(&mut self, path: impl AsRef<Path>, settings: VideoSettings) -> StoryResult<LayerId> {
        let id = self.overlay.load_video(path.as_ref(), settings)?;
        self.start_layer_timer(id);
        Ok(id)
    }

    /// Add a video layer fed by a custom frame source.
    pub fn load_video_source(
        &mut self,
        frames: Box<dyn FrameSource>,
        settings: ImageSettings,
    ) -> StoryResult<LayerId> {
        let id = self.overlay.add_video_source(None, frames, settings)?;
        self.start_layer_timer(id);
        Ok(id)
    }

    /// Remove a resource layer and stop its refresh.
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        self.overlay.remove(id)
    }

    fn start_layer_timer(&mut self, id: LayerId) {
        let Some(view) = self.overlay.layer(id) else {
            return;
        };
        if view.finished {
            return;
        }
        if let Some(interval) = view.kind.refresh_interval() {
            self.scheduler
                .schedule_every(self.now, interval, TimerTask::LayerFrame(id));
        }
    }

    // ---- time ----

    /// Earliest pending timer, as an absolute virtual time.
    pub fn next_due(&mut self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// Move virtual time forward by `dt`, firing every timer due on the way.
    pub fn advance(&mut self, dt: Duration) {
        self.advance_to(self.now + dt);
    }

    /// Move virtual time forward to `t`. Earlier times are ignored.
    pub fn advance_to(&mut self, t: Duration) {
        while let Some((due, id, task)) = self.scheduler.pop_due(t) {
            self.now = self.now.max(due);
            self.fire(id, task);
        }
        self.now = self.now.max(t);
    }

    fn fire(&mut self, id: TimerId, task: TimerTask) {
        match task {
            TimerTask::DialogReveal => {
                let done = match &mut self.dialog {
                    Some(dialog) if dialog.timer == Some(id) => {
                        let done = dialog.reveal_next();
                        if done {
                            dialog.timer = None;
                        }
                        done
                    }
                    _ => true,
                };
                if done {
                    self.scheduler.cancel(id);
                }
            }
            TimerTask::Warmth { target, step } => {
                if self.step_warmth(target, step) == target {
                    self.scheduler.cancel(id);
                    self.warmth_timer = None;
                    tracing::debug!(warmth = target, "warmth animation finished");
                }
            }
            TimerTask::NoiseRefresh => {
                if let Err(e) = self.background.refresh_noise(&mut self.rng) {
                    tracing::warn!(error = %e, "noise refresh failed");
                }
            }
            TimerTask::LayerFrame(layer) => match self.overlay.advance_layer(layer) {
                Ok(true) => {}
                Ok(false) => {
                    self.scheduler.cancel(id);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "layer frame failed; stopping its refresh");
                    self.scheduler.cancel(id);
                }
            },
        }
    }

    // ---- rendering ----

    /// Rasterize the current frame.
    ///
    /// Layers from bottom to top: background, resource layers in load order, dialog box, option
    /// box with its highlight. Text is not drawn; see [`Presenter::dialog_view`] and
    /// [`Presenter::menu_view`].
    pub fn render(&self) -> RgbImage {
        let mut frame = self.background.frame().clone();
        self.overlay.draw(&mut frame);
        if let Some(dialog) = &self.dialog {
            let color = dialog.style().box_color;
            stipple_rect(&mut frame, dialog.rect(), color);
            fill_rect(&mut frame, dialog.widget_rect(), color);
        }
        if let Some(menu) = &self.menu {
            stipple_rect(&mut frame, menu.rect(), menu.box_color());
            outline_rect(&mut frame, menu.highlight(), Rgb8::YELLOW, HIGHLIGHT_WIDTH);
        }
        frame
    }
}

#[cfg(test)]
#[path = "../../tests/unit/present/presenter.rs"]
mod tests;
