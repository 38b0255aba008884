use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::foundation::error::{StoryError, StoryResult};

/// Sample rate audio is decoded at before being handed to an [`crate::AudioOutput`].
pub const PLAYBACK_SAMPLE_RATE: u32 = 48_000;

/// What a video overlay needs to know before it starts streaming.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    /// The container also carries a sound track to play alongside the frames.
    pub has_audio: bool,
}

/// Decoded interleaved PCM.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Length in seconds.
    pub fn duration_sec(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.interleaved_f32.len() as f64 / f64::from(self.channels) / f64::from(self.sample_rate)
    }
}

/// Sequential supplier of video frames for an overlay layer.
///
/// `Ok(None)` marks the end of the stream; the layer stops refreshing and keeps its last frame.
pub trait FrameSource {
    fn next_frame(&mut self) -> StoryResult<Option<RgbaImage>>;
}

/// Frames held in memory. Handy for hosts that decode video themselves.
#[derive(Debug, Default)]
pub struct BufferedFrames {
    frames: std::collections::VecDeque<RgbaImage>,
}

impl BufferedFrames {
    pub fn new(frames: impl IntoIterator<Item = RgbaImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl FrameSource for BufferedFrames {
    fn next_frame(&mut self) -> StoryResult<Option<RgbaImage>> {
        Ok(self.frames.pop_front())
    }
}

const FEATURE_MISSING: &str = "video/audio resources require the 'media-ffmpeg' feature";

/// Check that `source_path` holds a video stream and whether it also has sound.
#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> StoryResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct Stream {
        codec_type: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct Streams {
        #[serde(default)]
        streams: Vec<Stream>,
    }

    let out = std::process::Command::new("ffprobe")
        .args(["-v", "error", "-show_entries", "stream=codec_type", "-of", "json"])
        .arg(source_path)
        .output()
        .map_err(|e| StoryError::resource_load(format!("run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(StoryError::resource_load(format!(
            "ffprobe '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    let parsed: Streams = serde_json::from_slice(&out.stdout)
        .map_err(|e| StoryError::resource_load(format!("parse ffprobe output: {e}")))?;
    let has = |kind: &str| {
        parsed
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some(kind))
    };
    if !has("video") {
        return Err(StoryError::resource_load(format!(
            "'{}' has no video stream",
            source_path.display()
        )));
    }
    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        has_audio: has("audio"),
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_video(_source_path: &Path) -> StoryResult<VideoSourceInfo> {
    Err(StoryError::resource_load(FEATURE_MISSING))
}

/// Video frames streamed from an `ffmpeg` child, already scaled to the overlay size.
#[cfg(feature = "media-ffmpeg")]
pub struct FfmpegFrames {
    child: std::process::Child,
    stdout: std::process::ChildStdout,
    width: u32,
    height: u32,
    finished: bool,
}

#[cfg(feature = "media-ffmpeg")]
impl FfmpegFrames {
    pub fn open(path: &Path, width: u32, height: u32) -> StoryResult<Self> {
        if width == 0 || height == 0 {
            return Err(StoryError::resource_settings("video scale must be non-zero"));
        }
        let mut child = std::process::Command::new("ffmpeg")
            .args(["-v", "error", "-i"])
            .arg(path)
            .args(["-an", "-vf", &format!("scale={width}:{height}")])
            .args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| StoryError::resource_load(format!("run ffmpeg for video: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| StoryError::resource_load("ffmpeg stdout not captured"))?;
        Ok(Self {
            child,
            stdout,
            width,
            height,
            finished: false,
        })
    }
}

#[cfg(feature = "media-ffmpeg")]
impl FrameSource for FfmpegFrames {
    fn next_frame(&mut self) -> StoryResult<Option<RgbaImage>> {
        use std::io::Read;

        if self.finished {
            return Ok(None);
        }
        let mut buf = vec![0u8; self.width as usize * self.height as usize * 4];
        match self.stdout.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.finished = true;
                let _ = self.child.wait();
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }
        RgbaImage::from_raw(self.width, self.height, buf)
            .map(Some)
            .ok_or_else(|| StoryError::resource_load("decoded video frame has invalid size"))
    }
}

#[cfg(feature = "media-ffmpeg")]
impl Drop for FfmpegFrames {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Open a streaming decoder for `source`, scaled to `width`x`height`.
#[cfg(feature = "media-ffmpeg")]
pub fn open_video_frames(
    source: &VideoSourceInfo,
    width: u32,
    height: u32,
) -> StoryResult<Box<dyn FrameSource>> {
    Ok(Box::new(FfmpegFrames::open(&source.source_path, width, height)?))
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn open_video_frames(
    _source: &VideoSourceInfo,
    _width: u32,
    _height: u32,
) -> StoryResult<Box<dyn FrameSource>> {
    Err(StoryError::resource_load(FEATURE_MISSING))
}

/// Decode the sound of `path` to interleaved stereo at [`PLAYBACK_SAMPLE_RATE`].
#[cfg(feature = "media-ffmpeg")]
pub fn decode_audio(path: &Path) -> StoryResult<AudioPcm> {
    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args(["-vn", "-ac", "2", "-ar", &PLAYBACK_SAMPLE_RATE.to_string()])
        .args(["-f", "f32le", "pipe:1"])
        .stdin(std::process::Stdio::null())
        .output()
        .map_err(|e| StoryError::resource_load(format!("run ffmpeg for audio: {e}")))?;
    if !out.status.success() {
        return Err(StoryError::resource_load(format!(
            "decode audio '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    pcm_from_f32le(&out.stdout, PLAYBACK_SAMPLE_RATE, 2)
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_audio(_path: &Path) -> StoryResult<AudioPcm> {
    Err(StoryError::resource_load(FEATURE_MISSING))
}

#[cfg_attr(not(any(test, feature = "media-ffmpeg")), allow(dead_code))]
fn pcm_from_f32le(bytes: &[u8], sample_rate: u32, channels: u16) -> StoryResult<AudioPcm> {
    let frame = 4 * usize::from(channels);
    if frame == 0 || !bytes.len().is_multiple_of(frame) {
        return Err(StoryError::resource_load(format!(
            "{} bytes of audio do not split into whole {channels}-channel frames",
            bytes.len()
        )));
    }
    let interleaved_f32 = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok(AudioPcm {
        sample_rate,
        channels,
        interleaved_f32,
    })
}
