//! Background video decoding using FFmpeg via ffmpeg-sidecar.
//!
//! Each video owns one worker thread. The worker probes the file, then keeps
//! a single ffmpeg process streaming RGB frames from the last requested
//! position. Every seek bumps an epoch; frames are tagged with the epoch
//! they were decoded for so the consumer can drop stale ones.

use crossbeam_channel::{bounded, unbounded, Receiver, SendTimeoutError, Sender};
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use ffmpeg_sidecar::iter::FfmpegIterator;
use mediasyncer_core::{FrameBuffer, SharedFrameBuffer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, warn};

use crate::probe::MediaProbe;

/// Frames buffered between the worker and the element.
const FRAME_QUEUE_DEPTH: usize = 4;

/// How long a blocked frame hand-off waits before checking for commands.
const HANDOFF_POLL: Duration = Duration::from_millis(15);

/// Decode settings shared by all workers.
#[derive(Debug, Clone, Copy)]
pub struct DecodeSettings {
    /// Frames wider than this are scaled down (aspect kept).
    pub max_width: u32,
}

impl Default for DecodeSettings {
    fn default() -> Self {
        Self { max_width: 960 }
    }
}

/// Output size for a source of `width × height` under `max_width`.
/// Both sides are kept even, which the scaler requires for rgb24 output.
pub fn output_size(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    let target_w = width.min(max_width.max(2));
    let target_h = (height as f64 * target_w as f64 / width as f64).round() as u32;
    let even = |v: u32| (v.max(2) / 2) * 2;
    (even(target_w), even(target_h))
}

/// A decoded video frame with metadata.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// Seek epoch this frame belongs to
    pub epoch: u64,
    /// Presentation timestamp in seconds
    pub pts: f64,
    /// Frame data in RGBA8 format
    pub buffer: SharedFrameBuffer,
}

/// Commands sent to the worker.
#[derive(Debug, Clone, Copy)]
pub enum DecodeCommand {
    Seek { epoch: u64, time: f64 },
    Shutdown,
}

/// Messages sent back by the worker.
#[derive(Debug, Clone)]
pub enum DecodeMessage {
    Probed(Box<MediaProbe>),
    Frame(DecodedFrame),
    EndOfStream { epoch: u64 },
    Error(String),
}

/// Handle to a decode worker thread.
pub struct DecodeWorker {
    commands: Sender<DecodeCommand>,
    messages: Receiver<DecodeMessage>,
    handle: Option<JoinHandle<()>>,
}

impl DecodeWorker {
    /// Spawn a worker for `path`. Probing starts immediately; decoding
    /// starts at 0 with epoch 0 once the probe succeeds.
    pub fn spawn(path: PathBuf, settings: DecodeSettings) -> Self {
        let (cmd_tx, cmd_rx) = unbounded();
        let (msg_tx, msg_rx) = bounded(FRAME_QUEUE_DEPTH);
        let handle = std::thread::Builder::new()
            .name("mediasyncer-decode".into())
            .spawn(move || worker_main(path, settings, cmd_rx, msg_tx))
            .map_err(|e| warn!("Failed to spawn decode thread: {}", e))
            .ok();
        Self {
            commands: cmd_tx,
            messages: msg_rx,
            handle,
        }
    }

    /// Restart decoding at `time` under a new epoch.
    pub fn seek(&self, epoch: u64, time: f64) {
        let _ = self.commands.send(DecodeCommand::Seek { epoch, time });
    }

    /// Non-blocking receive of the next worker message.
    pub fn try_recv(&self) -> Option<DecodeMessage> {
        self.messages.try_recv().ok()
    }
}

impl Drop for DecodeWorker {
    fn drop(&mut self) {
        let _ = self.commands.send(DecodeCommand::Shutdown);
        // The worker may be blocked on ffmpeg output; it exits on its own
        // once it sees the command or the closed channel.
        self.handle.take();
    }
}

/// A running ffmpeg process streaming frames from `start`.
struct FrameStream {
    epoch: u64,
    start: f64,
    child: FfmpegChild,
    events: FfmpegIterator,
}

impl FrameStream {
    fn open(
        path: &Path,
        epoch: u64,
        start: f64,
        size: (u32, u32),
    ) -> std::result::Result<Self, String> {
        let mut command = FfmpegCommand::new();
        command
            .hide_banner()
            .seek(format!("{:.3}", start.max(0.0)))
            .input(path.to_string_lossy())
            .no_audio()
            .arg("-vf")
            .arg(format!("scale={}:{}", size.0, size.1))
            .rawvideo();
        let mut child = command
            .spawn()
            .map_err(|e| format!("failed to spawn ffmpeg: {}", e))?;
        let events = child
            .iter()
            .map_err(|e| format!("failed to read ffmpeg output: {}", e))?;
        debug!("Decode stream epoch {} opened at {:.3}s", epoch, start);
        Ok(Self {
            epoch,
            start,
            child,
            events,
        })
    }

    /// Block until the next frame; `Ok(None)` at end of stream.
    fn next_frame(&mut self) -> std::result::Result<Option<DecodedFrame>, String> {
        for event in self.events.by_ref() {
            match event {
                FfmpegEvent::OutputFrame(frame) => {
                    let Some(buffer) = FrameBuffer::from_rgb24(frame.width, frame.height, &frame.data)
                    else {
                        return Err(format!(
                            "unexpected frame size {} for {}x{}",
                            frame.data.len(),
                            frame.width,
                            frame.height
                        ));
                    };
                    return Ok(Some(DecodedFrame {
                        epoch: self.epoch,
                        pts: self.start + frame.timestamp as f64,
                        buffer: Arc::new(buffer),
                    }));
                }
                FfmpegEvent::Error(message) => {
                    // ffmpeg reports recoverable stream glitches here too
                    debug!("ffmpeg: {}", message);
                }
                FfmpegEvent::Done => break,
                _ => {}
            }
        }
        Ok(None)
    }

    fn stop(mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn worker_main(
    path: PathBuf,
    settings: DecodeSettings,
    commands: Receiver<DecodeCommand>,
    messages: Sender<DecodeMessage>,
) {
    let probe = match MediaProbe::probe(&path) {
        Ok(probe) => probe,
        Err(e) => {
            warn!("Failed to probe {:?}: {}", path, e);
            let _ = messages.send(DecodeMessage::Error(e.to_string()));
            return;
        }
    };
    let Some(video) = probe.primary_video().cloned() else {
        let _ = messages.send(DecodeMessage::Error(format!(
            "{} has no video stream",
            probe.path
        )));
        return;
    };
    let size = output_size(video.width, video.height, settings.max_width);
    if messages.send(DecodeMessage::Probed(Box::new(probe))).is_err() {
        return;
    }

    let mut stream: Option<FrameStream> = None;
    let mut pending = Some(DecodeCommand::Seek {
        epoch: 0,
        time: 0.0,
    });

    loop {
        let command = match pending.take() {
            Some(cmd) => Some(cmd),
            None if stream.is_some() => commands.try_recv().ok(),
            None => match commands.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => break,
            },
        };

        match command {
            Some(DecodeCommand::Shutdown) => break,
            Some(DecodeCommand::Seek { epoch, time }) => {
                // Collapse a burst of seeks to the newest one.
                let Some((epoch, time)) = latest_seek(&commands, epoch, time) else {
                    break;
                };
                if let Some(old) = stream.take() {
                    old.stop();
                }
                match FrameStream::open(&path, epoch, time, size) {
                    Ok(s) => stream = Some(s),
                    Err(e) => {
                        warn!("Decode failed for {:?}: {}", path, e);
                        let _ = messages.send(DecodeMessage::Error(e));
                        break;
                    }
                }
            }
            None => {}
        }

        let Some(active) = stream.as_mut() else {
            continue;
        };
        let message = match active.next_frame() {
            Ok(Some(frame)) => DecodeMessage::Frame(frame),
            Ok(None) => {
                let epoch = active.epoch;
                if let Some(done) = stream.take() {
                    done.stop();
                }
                DecodeMessage::EndOfStream { epoch }
            }
            Err(e) => {
                warn!("Decode failed for {:?}: {}", path, e);
                let _ = messages.send(DecodeMessage::Error(e));
                break;
            }
        };

        if let HandOff::Closed = hand_off(&messages, &commands, message) {
            break;
        }
    }

    if let Some(s) = stream.take() {
        s.stop();
    }
    debug!("Decode worker for {:?} exiting", path);
}

/// Newest queued seek, or `None` if a shutdown is queued behind it.
fn latest_seek(
    commands: &Receiver<DecodeCommand>,
    mut epoch: u64,
    mut time: f64,
) -> Option<(u64, f64)> {
    while let Ok(next) = commands.try_recv() {
        match next {
            DecodeCommand::Seek { epoch: e, time: t } => {
                epoch = e;
                time = t;
            }
            DecodeCommand::Shutdown => return None,
        }
    }
    Some((epoch, time))
}

enum HandOff {
    Delivered,
    Preempted,
    Closed,
}

/// Push a message to the element, giving up early when a command arrives
/// so a seek never waits behind a full queue.
fn hand_off(
    messages: &Sender<DecodeMessage>,
    commands: &Receiver<DecodeCommand>,
    mut message: DecodeMessage,
) -> HandOff {
    loop {
        match messages.send_timeout(message, HANDOFF_POLL) {
            Ok(()) => return HandOff::Delivered,
            Err(SendTimeoutError::Disconnected(_)) => return HandOff::Closed,
            Err(SendTimeoutError::Timeout(returned)) => {
                if !commands.is_empty() {
                    return HandOff::Preempted;
                }
                message = returned;
            }
        }
    }
}
