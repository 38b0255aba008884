//! Auxiliary image, animation, audio and video layers drawn above the background.
//!
//! The overlay owns layer content only. Frame refresh timing belongs to the presenter's
//! scheduler, which calls [`ResourceOverlay::advance_layer`] on every tick.

pub mod audio;
pub mod settings;

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::{RgbImage, RgbaImage};

use crate::assets::decode;
use crate::assets::media::{self, FrameSource};
use crate::effects::composite::draw_rgba;
use crate::foundation::core::Point;
use crate::foundation::error::StoryResult;

pub use audio::{AudioOutput, AudioTrack, SilentOutput};
pub use settings::{AudioSettings, ImageSettings, VideoSettings};

/// Period between animated-image frames.
pub const GIF_FRAME_INTERVAL: Duration = Duration::from_millis(100);
/// Period between video frames.
pub const VIDEO_FRAME_INTERVAL: Duration = Duration::from_millis(30);

/// Handle of a loaded layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    Still,
    Animated,
    Video,
}

impl LayerKind {
    /// Refresh period, `None` for still images.
    pub fn refresh_interval(self) -> Option<Duration> {
        match self {
            Self::Still => None,
            Self::Animated => Some(GIF_FRAME_INTERVAL),
            Self::Video => Some(VIDEO_FRAME_INTERVAL),
        }
    }
}

/// Read-only snapshot of a layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerView {
    pub id: LayerId,
    pub kind: LayerKind,
    pub source: Option<PathBuf>,
    pub position: Point,
    pub width: u32,
    pub height: u32,
    /// Frames shown so far minus one; always 0 for still images.
    pub frame_index: usize,
    /// `true` once a video stream has ended.
    pub finished: bool,
}

enum Content {
    Still(RgbaImage),
    Animated {
        frames: Vec<RgbaImage>,
        index: usize,
    },
    Video {
        frames: Box<dyn FrameSource>,
        current: Option<RgbaImage>,
        shown: usize,
        finished: bool,
    },
}

struct Layer {
    id: LayerId,
    source: Option<PathBuf>,
    settings: ImageSettings,
    content: Content,
}

impl Layer {
    fn kind(&self) -> LayerKind {
        match self.content {
            Content::Still(_) => LayerKind::Still,
            Content::Animated { .. } => LayerKind::Animated,
            Content::Video { .. } => LayerKind::Video,
        }
    }

    fn frame(&self) -> Option<&RgbaImage> {
        match &self.content {
            Content::Still(img) => Some(img),
            Content::Animated { frames, index } => frames.get(*index),
            Content::Video { current, .. } => current.as_ref(),
        }
    }

    fn view(&self) -> LayerView {
        let (frame_index, finished) = match &self.content {
            Content::Still(_) => (0, false),
            Content::Animated { index, .. } => (*index, false),
            Content::Video {
                shown, finished, ..
            } => (shown.saturating_sub(1), *finished),
        };
        LayerView {
            id: self.id,
            kind: self.kind(),
            source: self.source.clone(),
            position: self.settings.position,
            width: self.settings.width,
            height: self.settings.height,
            frame_index,
            finished,
        }
    }
}

/// Stack of resource layers plus the audio sink.
pub struct ResourceOverlay {
    layers: Vec<Layer>,
    next_id: u64,
    audio: Box<dyn AudioOutput>,
}

impl Default for ResourceOverlay {
    fn default() -> Self {
        Self::new(Box::new(SilentOutput::default()))
    }
}

impl ResourceOverlay {
    pub fn new(audio: Box<dyn AudioOutput>) -> Self {
        Self {
            layers: Vec::new(),
            next_id: 0,
            audio,
        }
    }

    /// Swap the audio sink. Tracks already handed to the previous sink stay there.
    pub fn set_audio_output(&mut self, audio: Box<dyn AudioOutput>) {
        self.audio = audio;
    }

    /// Load a PNG or JPEG, scaled to the requested size.
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub fn load_image(&mut self, path: &Path, settings: ImageSettings) -> StoryResult<LayerId> {
        let img = decode::open_still(path)?;
        let img = decode::scale_rgba(img, settings.width, settings.height);
        let id = self.push(Some(path.to_path_buf()), settings, Content::Still(img));
        tracing::info!(layer = id.0, "image layer loaded");
        Ok(id)
    }

    /// Load every frame of an animated image, scaled to the requested size.
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub fn load_animated_image(
        &mut self,
        path: &Path,
        settings: ImageSettings,
    ) -> StoryResult<LayerId> {
        let frames: Vec<_> = decode::open_animation(path)?
            .into_iter()
            .map(|f| decode::scale_rgba(f, settings.width, settings.height))
            .collect();
        let count = frames.len();
        let id = self.push(
            Some(path.to_path_buf()),
            settings,
            Content::Animated { frames, index: 0 },
        );
        tracing::info!(layer = id.0, frames = count, "animated layer loaded");
        Ok(id)
    }

    /// Decode an audio file and hand it to the audio sink.
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub fn load_audio(&mut self, path: &Path, settings: AudioSettings) -> StoryResult<()> {
        let track = AudioTrack::decode(path, settings)?;
        self.start_track(track)
    }

    /// Hand already-decoded samples to the audio sink.
    pub fn play_audio(
        &mut self,
        source: &Path,
        pcm: media::AudioPcm,
        settings: AudioSettings,
    ) -> StoryResult<()> {
        self.start_track(AudioTrack::new(source, pcm, settings))
    }

    fn start_track(&mut self, track: AudioTrack) -> StoryResult<()> {
        let (source, gain, looping) = (track.source.clone(), track.gain, track.looping);
        self.audio.play(track)?;
        tracing::info!(source = %source.display(), gain, looping, "audio playing");
        Ok(())
    }

    /// Open a video stream and its soundtrack.
    ///
    /// The first frame is pulled immediately; later frames arrive through
    /// [`ResourceOverlay::advance_layer`].
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub fn load_video(&mut self, path: &Path, settings: VideoSettings) -> StoryResult<LayerId> {
        let info = media::probe_video(path)?;
        let frames = media::open_video_frames(&info, settings.image.width, settings.image.height)?;
        let track = if info.has_audio {
            let audio = AudioSettings::new(i64::from(settings.volume()), false)?;
            Some(AudioTrack::decode(path, audio)?)
        } else {
            None
        };
        let id = self.add_video_source(Some(path.to_path_buf()), frames, settings.image)?;
        if let Some(track) = track
            && let Err(e) = self.start_track(track)
        {
            self.remove(id);
            return Err(e);
        }
        tracing::debug!(has_audio = info.has_audio, "video stream opened");
        Ok(id)
    }

    /// Add a video layer fed by any frame source. Frames of a different size are rescaled.
    pub fn add_video_source(
        &mut self,
        source: Option<PathBuf>,
        mut frames: Box<dyn FrameSource>,
        settings: ImageSettings,
    ) -> StoryResult<LayerId> {
        let first = frames
            .next_frame()?
            .map(|f| decode::scale_rgba(f, settings.width, settings.height));
        let finished = first.is_none();
        let shown = usize::from(!finished);
        let id = self.push(
            source,
            settings,
            Content::Video {
                frames,
                current: first,
                shown,
                finished,
            },
        );
        tracing::info!(layer = id.0, "video layer loaded");
        Ok(id)
    }

    /// Move a layer to its next frame.
    ///
    /// Returns `Ok(false)` once the layer has nothing more to show (unknown id, still image,
    /// or a video at end of stream); the caller should stop refreshing it.
    pub fn advance_layer(&mut self, id: LayerId) -> StoryResult<bool> {
        let Some(layer) = self.layers.iter_mut().find(|l| l.id == id) else {
            return Ok(false);
        };
        let settings = layer.settings;
        match &mut layer.content {
            Content::Still(_) => Ok(false),
            Content::Animated { frames, index } => {
                if frames.len() > 1 {
                    *index = (*index + 1) % frames.len();
                }
                Ok(true)
            }
            Content::Video {
                frames,
                current,
                shown,
                finished,
            } => {
                if *finished {
                    return Ok(false);
                }
                match frames.next_frame()? {
                    Some(f) => {
                        *current = Some(decode::scale_rgba(f, settings.width, settings.height));
                        *shown += 1;
                        Ok(true)
                    }
                    None => {
                        *finished = true;
                        tracing::debug!(layer = id.0, frames = *shown, "video stream ended");
                        Ok(false)
                    }
                }
            }
        }
    }

    /// Drop a layer. Returns `false` when the id is unknown.
    pub fn remove(&mut self, id: LayerId) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| l.id != id);
        self.layers.len() != before
    }

    /// Layers in draw order.
    pub fn layers(&self) -> Vec<LayerView> {
        self.layers.iter().map(Layer::view).collect()
    }

    pub fn layer(&self, id: LayerId) -> Option<LayerView> {
        self.layers.iter().find(|l| l.id == id).map(Layer::view)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Draw every layer in load order.
    pub fn draw(&self, dst: &mut RgbImage) {
        for layer in &self.layers {
            if let Some(frame) = layer.frame() {
                draw_rgba(dst, frame, layer.settings.position.x, layer.settings.position.y);
            }
        }
    }

    fn push(&mut self, source: Option<PathBuf>, settings: ImageSettings, content: Content) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.push(Layer {
            id,
            source,
            settings,
            content,
        });
        id
    }
}

impl std::fmt::Debug for ResourceOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceOverlay")
            .field("layers", &self.layers())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/overlay.rs"]
mod tests;
