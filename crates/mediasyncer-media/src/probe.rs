//! Media file probing to get metadata without full decode.

use mediasyncer_core::{FrameRate, Result, SyncError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

/// Information about a media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaProbe {
    /// File path
    pub path: String,
    /// Duration in seconds (0 when the container does not say)
    pub duration: f64,
    /// Video streams
    pub video_streams: Vec<VideoStreamInfo>,
    /// Audio streams
    pub audio_streams: Vec<AudioStreamInfo>,
    /// Container format
    pub format: String,
}

/// Information about a video stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoStreamInfo {
    pub index: usize,
    pub codec: String,
    pub width: u32,
    pub height: u32,
    pub frame_rate: FrameRate,
    pub pixel_format: String,
}

/// Information about an audio stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioStreamInfo {
    pub index: usize,
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u16,
}

// Raw ffprobe JSON shapes. Numbers come back as strings.

#[derive(Deserialize)]
struct RawProbe {
    #[serde(default)]
    streams: Vec<RawStream>,
    format: Option<RawFormat>,
}

#[derive(Deserialize)]
struct RawStream {
    #[serde(default)]
    index: usize,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    pix_fmt: Option<String>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u16>,
    duration: Option<String>,
}

#[derive(Deserialize)]
struct RawFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

impl MediaProbe {
    /// Probe a media file with `ffprobe`.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy().to_string();

        if !path.exists() {
            return Err(SyncError::NotFound(format!("File not found: {}", path_str)));
        }

        let output = Command::new(ffmpeg_sidecar::ffprobe::ffprobe_path())
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .map_err(|e| SyncError::Probe(format!("failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(SyncError::Probe(format!(
                "ffprobe exited with {} for {}",
                output.status, path_str
            )));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        Self::from_json(&path_str, &json)
    }

    /// Build probe info from `ffprobe -print_format json` output.
    pub fn from_json(path: &str, json: &str) -> Result<Self> {
        let raw: RawProbe = serde_json::from_str(json)
            .map_err(|e| SyncError::Probe(format!("invalid ffprobe output: {}", e)))?;

        let mut video_streams = Vec::new();
        let mut audio_streams = Vec::new();
        let mut stream_duration = 0.0_f64;

        for stream in raw.streams {
            if let Some(d) = stream.duration.as_deref().and_then(parse_seconds) {
                stream_duration = stream_duration.max(d);
            }
            match stream.codec_type.as_deref() {
                Some("video") => {
                    let (Some(width), Some(height)) = (stream.width, stream.height) else {
                        continue;
                    };
                    let fps = stream
                        .avg_frame_rate
                        .as_deref()
                        .and_then(parse_ratio)
                        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_ratio))
                        .unwrap_or(30.0);
                    video_streams.push(VideoStreamInfo {
                        index: stream.index,
                        codec: stream.codec_name.unwrap_or_default(),
                        width,
                        height,
                        frame_rate: FrameRate::from_fps_f64(fps),
                        pixel_format: stream.pix_fmt.unwrap_or_default(),
                    });
                }
                Some("audio") => audio_streams.push(AudioStreamInfo {
                    index: stream.index,
                    codec: stream.codec_name.unwrap_or_default(),
                    sample_rate: stream
                        .sample_rate
                        .as_deref()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(48_000),
                    channels: stream.channels.unwrap_or(2),
                }),
                _ => {}
            }
        }

        let (format, format_duration) = match raw.format {
            Some(f) => (
                f.format_name.unwrap_or_default(),
                f.duration.as_deref().and_then(parse_seconds),
            ),
            None => (String::new(), None),
        };

        Ok(Self {
            path: path.to_string(),
            duration: format_duration.unwrap_or(stream_duration),
            video_streams,
            audio_streams,
            format,
        })
    }

    /// Check if the file has video.
    pub fn has_video(&self) -> bool {
        !self.video_streams.is_empty()
    }

    /// Check if the file has audio.
    pub fn has_audio(&self) -> bool {
        !self.audio_streams.is_empty()
    }

    /// Get the primary video stream info.
    pub fn primary_video(&self) -> Option<&VideoStreamInfo> {
        self.video_streams.first()
    }

    /// Get the primary audio stream info.
    pub fn primary_audio(&self) -> Option<&AudioStreamInfo> {
        self.audio_streams.first()
    }
}

fn parse_seconds(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|d| d.is_finite() && *d >= 0.0)
}

/// Parse `"30000/1001"` style rates. `"0/0"` is treated as unknown.
fn parse_ratio(s: &str) -> Option<f64> {
    let (num, den) = match s.split_once('/') {
        Some((n, d)) => (n.trim().parse::<f64>().ok()?, d.trim().parse::<f64>().ok()?),
        None => (s.trim().parse::<f64>().ok()?, 1.0),
    };
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "h264",
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "pix_fmt": "yuv420p",
                "r_frame_rate": "30000/1001",
                "avg_frame_rate": "30000/1001",
                "duration": "9.976633"
            },
            {
                "index": 1,
                "codec_name": "aac",
                "codec_type": "audio",
                "sample_rate": "44100",
                "channels": 2,
                "duration": "10.000000"
            }
        ],
        "format": {
            "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
            "duration": "10.010000"
        }
    }"#;

    #[test]
    fn test_parse_ffprobe_json() {
        let probe = MediaProbe::from_json("clip.mp4", SAMPLE).unwrap();
        assert!((probe.duration - 10.01).abs() < 1e-9);
        let video = probe.primary_video().unwrap();
        assert_eq!((video.width, video.height), (1920, 1080));
        assert_eq!(video.frame_rate, FrameRate::from_fps_f64(30000.0 / 1001.0));
        let audio = probe.primary_audio().unwrap();
        assert_eq!(audio.sample_rate, 44_100);
        assert_eq!(audio.channels, 2);
    }

    #[test]
    fn test_duration_falls_back_to_streams() {
        let json = r#"{ "streams": [ { "index": 0, "codec_type": "video",
            "width": 640, "height": 360, "avg_frame_rate": "0/0",
            "r_frame_rate": "25/1", "duration": "4.0" } ] }"#;
        let probe = MediaProbe::from_json("a.webm", json).unwrap();
        assert_eq!(probe.duration, 4.0);
        assert_eq!(probe.primary_video().unwrap().frame_rate, FrameRate::FPS_25);
        assert!(!probe.has_audio());
    }

    #[test]
    fn test_invalid_json_is_probe_error() {
        let err = MediaProbe::from_json("x", "not json").unwrap_err();
        assert!(matches!(err, SyncError::Probe(_)));
    }

    #[test]
    fn test_parse_ratio() {
        assert_eq!(parse_ratio("25/1"), Some(25.0));
        assert_eq!(parse_ratio("0/0"), None);
        assert_eq!(parse_ratio("24"), Some(24.0));
    }
}
