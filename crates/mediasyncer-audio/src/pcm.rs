//! PCM feeder: decodes a source's audio with ffmpeg into the output ring.

use ffmpeg_sidecar::command::FfmpegCommand;
use mediasyncer_core::{Result, SyncError};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, warn};

use crate::ring_buffer::RingBuffer;

/// Bytes read from ffmpeg per chunk (f32 samples).
const READ_CHUNK: usize = 4096 * 4;

/// Build the `atempo` filter chain for `rate`.
///
/// A single atempo stage only accepts factors in `[0.5, 2.0]`, so larger
/// changes are split into several stages. `None` means no filter is needed.
pub fn atempo_chain(rate: f64) -> Option<String> {
    if !rate.is_finite() || rate <= 0.0 || (rate - 1.0).abs() < 1e-6 {
        return None;
    }
    let mut stages = Vec::new();
    let mut remaining = rate;
    while remaining < 0.5 {
        stages.push(0.5);
        remaining /= 0.5;
    }
    while remaining > 2.0 {
        stages.push(2.0);
        remaining /= 2.0;
    }
    stages.push(remaining);
    Some(
        stages
            .iter()
            .map(|s| format!("atempo={:.6}", s))
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Where and how a feeder decodes.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedRequest {
    pub path: PathBuf,
    pub start: f64,
    pub rate: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

/// A running ffmpeg process pushing interleaved f32 samples into a ring.
pub struct PcmFeeder {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PcmFeeder {
    /// Start decoding `request` into `ring`.
    pub fn start(request: FeedRequest, ring: Arc<RingBuffer>) -> Result<Self> {
        let mut command = build_command(&request.path, &request);
        let mut child = command
            .spawn()
            .map_err(|e| SyncError::Audio(format!("failed to spawn ffmpeg: {}", e)))?;
        let mut stdout = child
            .take_stdout()
            .ok_or_else(|| SyncError::Audio("ffmpeg stdout unavailable".into()))?;

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        debug!(
            "Audio feed for {} from {:.3}s at {}x",
            request.path.display(),
            request.start,
            request.rate
        );

        let handle = std::thread::Builder::new()
            .name("mediasyncer-pcm".into())
            .spawn(move || {
                let mut bytes = vec![0u8; READ_CHUNK];
                let mut carry: Vec<u8> = Vec::with_capacity(4);
                let mut samples: Vec<f32> = Vec::with_capacity(READ_CHUNK / 4 + 1);
                'feed: while !thread_stop.load(Ordering::Relaxed) {
                    let n = match stdout.read(&mut bytes) {
                        Ok(0) => break,
                        Ok(n) => n,
                        Err(e) => {
                            warn!("Audio feed read failed: {}", e);
                            break;
                        }
                    };
                    samples.clear();
                    decode_f32le(&mut carry, &bytes[..n], &mut samples);

                    let mut offset = 0;
                    while offset < samples.len() {
                        if thread_stop.load(Ordering::Relaxed) {
                            break 'feed;
                        }
                        let pushed = ring.push_slice(&samples[offset..]);
                        offset += pushed;
                        if pushed == 0 {
                            std::thread::sleep(Duration::from_millis(5));
                        }
                    }
                }
                let _ = child.kill();
                let _ = child.wait();
            })
            .map_err(|e| SyncError::Audio(format!("failed to spawn feeder thread: {}", e)))?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Ask the feeder to stop and wait for it.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PcmFeeder {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn build_command(path: &Path, request: &FeedRequest) -> FfmpegCommand {
    let mut command = FfmpegCommand::new();
    // Nothing drains stderr here, so keep ffmpeg quiet.
    command
        .hide_banner()
        .args(["-loglevel", "error", "-nostats"])
        .seek(format!("{:.3}", request.start.max(0.0)))
        .input(path.to_string_lossy())
        .arg("-vn");
    if let Some(filter) = atempo_chain(request.rate) {
        command.arg("-af").arg(filter);
    }
    command
        .arg("-ac")
        .arg(request.channels.to_string())
        .arg("-ar")
        .arg(request.sample_rate.to_string())
        .format("f32le")
        .output("-");
    command
}

/// Decode little-endian f32 bytes, carrying a partial sample across reads.
fn decode_f32le(carry: &mut Vec<u8>, bytes: &[u8], out: &mut Vec<f32>) {
    let mut input = bytes;
    if !carry.is_empty() {
        let need = 4 - carry.len();
        let take = need.min(input.len());
        carry.extend_from_slice(&input[..take]);
        input = &input[take..];
        if carry.len() == 4 {
            out.push(f32::from_le_bytes([carry[0], carry[1], carry[2], carry[3]]));
            carry.clear();
        }
    }
    let mut chunks = input.chunks_exact(4);
    for c in chunks.by_ref() {
        out.push(f32::from_le_bytes([c[0], c[1], c[2], c[3]]));
    }
    carry.extend_from_slice(chunks.remainder());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atempo_identity() {
        assert_eq!(atempo_chain(1.0), None);
        assert_eq!(atempo_chain(0.0), None);
    }

    #[test]
    fn test_atempo_single_stage() {
        assert_eq!(atempo_chain(1.5).unwrap(), "atempo=1.500000");
        assert_eq!(atempo_chain(0.5).unwrap(), "atempo=0.500000");
    }

    #[test]
    fn test_atempo_splits_slow_rates() {
        let chain = atempo_chain(0.1).unwrap();
        let stages: Vec<f64> = chain
            .split(',')
            .map(|s| s.trim_start_matches("atempo=").parse().unwrap())
            .collect();
        assert!(stages.iter().all(|s| (0.5..=2.0).contains(s)));
        let product: f64 = stages.iter().product();
        assert!((product - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_decode_carries_partial_samples() {
        let bytes: Vec<u8> = [1.0f32, -0.5, 0.25]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let mut carry = Vec::new();
        let mut out = Vec::new();
        decode_f32le(&mut carry, &bytes[..5], &mut out);
        assert_eq!(out, vec![1.0]);
        decode_f32le(&mut carry, &bytes[5..], &mut out);
        assert_eq!(out, vec![1.0, -0.5, 0.25]);
        assert!(carry.is_empty());
    }
}
