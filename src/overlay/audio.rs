use std::path::{Path, PathBuf};

use crate::assets::media::{self, AudioPcm};
use crate::foundation::error::StoryResult;
use crate::overlay::settings::AudioSettings;

/// A decoded track ready for playback.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioTrack {
    /// File the samples came from.
    pub source: PathBuf,
    pub pcm: AudioPcm,
    /// Linear gain in `[0, 1]`.
    pub gain: f32,
    pub looping: bool,
}

impl AudioTrack {
    /// Wrap decoded samples; `settings.volume()` in `[0, 100]` becomes the gain.
    pub fn new(source: impl Into<PathBuf>, pcm: AudioPcm, settings: AudioSettings) -> Self {
        Self {
            source: source.into(),
            pcm,
            gain: f32::from(settings.volume()) / 100.0,
            looping: settings.looping,
        }
    }

    /// Decode the sound of `path` (an audio file or a video's sound track).
    pub fn decode(path: &Path, settings: AudioSettings) -> StoryResult<Self> {
        let pcm = media::decode_audio(path)?;
        Ok(Self::new(path, pcm, settings))
    }
}

/// Sink for decoded audio. Hosts plug in their mixer or device here.
pub trait AudioOutput {
    fn play(&mut self, track: AudioTrack) -> StoryResult<()>;
}

/// Output that discards sound but keeps every track it was handed.
#[derive(Debug, Default)]
pub struct SilentOutput {
    tracks: Vec<AudioTrack>,
}

impl SilentOutput {
    pub fn tracks(&self) -> &[AudioTrack] {
        &self.tracks
    }
}

impl AudioOutput for SilentOutput {
    fn play(&mut self, track: AudioTrack) -> StoryResult<()> {
        tracing::debug!(
            source = %track.source.display(),
            gain = track.gain,
            looping = track.looping,
            seconds = track.pcm.duration_sec(),
            "audio track dropped by silent output"
        );
        self.tracks.push(track);
        Ok(())
    }
}
