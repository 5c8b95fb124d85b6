//! MediaSyncer Audio - single-source audio routing and playback
//!
//! Architecture:
//! - `AudioRouting`: decides which one video is audible and at what level
//! - `RingBuffer`: lock-free SPSC buffer between the PCM feeder and the callback
//! - `PcmFeeder`: ffmpeg process decoding the active source into the ring
//! - `AudioOutput`: cpal stream draining the ring at the routed gain
//! - `AudioEngine`: follows the routed source across ticks

pub mod output;
pub mod pcm;
pub mod ring_buffer;
pub mod router;

pub use output::AudioOutput;
pub use pcm::{atempo_chain, FeedRequest, PcmFeeder};
pub use ring_buffer::RingBuffer;
pub use router::AudioRouting;

use mediasyncer_core::{MediaId, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Source time drift (seconds) that forces the feeder to restart.
pub const RESYNC_THRESHOLD: f64 = 0.25;

/// What the engine wants to hear this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTarget {
    pub id: MediaId,
    pub path: PathBuf,
    /// Source position in seconds
    pub time: f64,
    pub rate: f64,
    pub gain: f32,
    pub playing: bool,
}

/// Feeder decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedAction {
    /// (Re)start decoding at `from` seconds with `rate`.
    Start { from: f64, rate: f64 },
    Stop,
    Keep,
}

#[derive(Debug, Clone, Copy)]
struct Feeding {
    id: MediaId,
    origin: f64,
    started: Instant,
    rate: f64,
}

/// Tracks what the feeder is doing and when it must restart.
#[derive(Debug, Default)]
pub struct AudioFollower {
    feeding: Option<Feeding>,
}

impl AudioFollower {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_feeding(&self) -> bool {
        self.feeding.is_some()
    }

    /// Decide whether the feeder should start, stop or keep running.
    pub fn decide(&mut self, target: Option<&AudioTarget>, now: Instant) -> FeedAction {
        let Some(target) = target.filter(|t| t.playing) else {
            return match self.feeding.take() {
                Some(_) => FeedAction::Stop,
                None => FeedAction::Keep,
            };
        };

        let restart = match self.feeding {
            None => true,
            Some(f) if f.id != target.id => true,
            Some(f) if (f.rate - target.rate).abs() > 1e-6 => true,
            Some(f) => {
                let expected =
                    f.origin + now.saturating_duration_since(f.started).as_secs_f64() * f.rate;
                (target.time - expected).abs() > RESYNC_THRESHOLD
            }
        };

        if !restart {
            return FeedAction::Keep;
        }
        self.feeding = Some(Feeding {
            id: target.id,
            origin: target.time,
            started: now,
            rate: target.rate,
        });
        FeedAction::Start {
            from: target.time,
            rate: target.rate,
        }
    }
}

/// Plays the routed source through the default output device.
pub struct AudioEngine {
    output: AudioOutput,
    follower: AudioFollower,
    feeder: Option<PcmFeeder>,
}

impl AudioEngine {
    /// Open the default output device.
    pub fn new() -> Result<Self> {
        info!("Initializing audio engine");
        let output = AudioOutput::open_default()?;
        Ok(Self {
            output,
            follower: AudioFollower::new(),
            feeder: None,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.output.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.output.channels
    }

    /// Called once per tick with the routed source (or none).
    pub fn follow(&mut self, target: Option<&AudioTarget>) {
        self.output.set_gain(target.map_or(0.0, |t| t.gain));

        match self.follower.decide(target, Instant::now()) {
            FeedAction::Keep => {}
            FeedAction::Stop => self.stop_feed(),
            FeedAction::Start { from, rate } => {
                self.stop_feed();
                let Some(target) = target else {
                    return;
                };
                let ring = self.output.new_ring();
                let request = FeedRequest {
                    path: target.path.clone(),
                    start: from,
                    rate,
                    sample_rate: self.output.sample_rate,
                    channels: self.output.channels,
                };
                match PcmFeeder::start(request, ring.clone()) {
                    Ok(feeder) => {
                        self.output.attach(Some(ring));
                        self.feeder = Some(feeder);
                    }
                    // The follower still records the attempt, so a broken
                    // source is not retried every tick.
                    Err(e) => warn!("Audio feed for {} failed: {}", target.path.display(), e),
                }
            }
        }
    }

    fn stop_feed(&mut self) {
        self.output.attach(None);
        if let Some(feeder) = self.feeder.take() {
            feeder.stop();
        }
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.stop_feed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn target(id: MediaId, time: f64) -> AudioTarget {
        AudioTarget {
            id,
            path: PathBuf::from("clip.mp4"),
            time,
            rate: 1.0,
            gain: 1.0,
            playing: true,
        }
    }

    #[test]
    fn test_starts_when_playing() {
        let mut follower = AudioFollower::new();
        let id = MediaId::new();
        let now = Instant::now();
        assert_eq!(
            follower.decide(Some(&target(id, 2.0)), now),
            FeedAction::Start {
                from: 2.0,
                rate: 1.0
            }
        );
        assert!(follower.is_feeding());
    }

    #[test]
    fn test_keeps_while_on_track() {
        let mut follower = AudioFollower::new();
        let id = MediaId::new();
        let t0 = Instant::now();
        follower.decide(Some(&target(id, 2.0)), t0);
        let t1 = t0 + Duration::from_millis(500);
        assert_eq!(follower.decide(Some(&target(id, 2.5)), t1), FeedAction::Keep);
    }

    #[test]
    fn test_restarts_on_jump() {
        let mut follower = AudioFollower::new();
        let id = MediaId::new();
        let t0 = Instant::now();
        follower.decide(Some(&target(id, 7.9)), t0);
        let t1 = t0 + Duration::from_millis(100);
        assert!(matches!(
            follower.decide(Some(&target(id, 2.0)), t1),
            FeedAction::Start { from, .. } if from == 2.0
        ));
    }

    #[test]
    fn test_restarts_on_source_change() {
        let mut follower = AudioFollower::new();
        let t0 = Instant::now();
        follower.decide(Some(&target(MediaId::new(), 1.0)), t0);
        assert!(matches!(
            follower.decide(Some(&target(MediaId::new(), 1.0)), t0),
            FeedAction::Start { .. }
        ));
    }

    #[test]
    fn test_restarts_on_rate_change() {
        let mut follower = AudioFollower::new();
        let id = MediaId::new();
        let t0 = Instant::now();
        follower.decide(Some(&target(id, 1.0)), t0);
        let mut slow = target(id, 1.0);
        slow.rate = 0.5;
        assert_eq!(
            follower.decide(Some(&slow), t0),
            FeedAction::Start {
                from: 1.0,
                rate: 0.5
            }
        );
    }

    #[test]
    fn test_stops_when_paused_or_gone() {
        let mut follower = AudioFollower::new();
        let id = MediaId::new();
        let t0 = Instant::now();
        follower.decide(Some(&target(id, 1.0)), t0);
        let mut paused = target(id, 1.0);
        paused.playing = false;
        assert_eq!(follower.decide(Some(&paused), t0), FeedAction::Stop);
        assert_eq!(follower.decide(None, t0), FeedAction::Keep);
        follower.decide(Some(&target(id, 1.0)), t0);
        assert_eq!(follower.decide(None, t0), FeedAction::Stop);
    }
}
