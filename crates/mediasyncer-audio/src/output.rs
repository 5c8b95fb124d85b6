//! CPAL-based realtime audio output.
//!
//! The callback drains whichever ring buffer is currently attached and
//! applies the routed gain. It never blocks: if the attachment is being
//! swapped it outputs silence for that period.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use mediasyncer_core::{Result, SyncError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::ring_buffer::RingBuffer;

/// Ring size in seconds of audio.
const RING_SECONDS: f32 = 0.5;

type Attachment = Arc<Mutex<Option<Arc<RingBuffer>>>>;

/// Audio output device backed by CPAL.
pub struct AudioOutput {
    /// Keeps the audio thread alive.
    _stream: Stream,
    attached: Attachment,
    /// Gain as f32 bits
    gain: Arc<AtomicU32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioOutput {
    /// Open the default output device with its default configuration.
    pub fn open_default() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| SyncError::Audio("No audio output device found".into()))?;
        info!(
            "Using audio output device: {}",
            device.name().unwrap_or_else(|_| "unknown".to_string())
        );

        let supported = device
            .default_output_config()
            .map_err(|e| SyncError::Audio(format!("no default output config: {}", e)))?;
        let format = supported.sample_format();
        let config: StreamConfig = supported.config();

        let attached: Attachment = Arc::new(Mutex::new(None));
        let gain = Arc::new(AtomicU32::new(0.0f32.to_bits()));

        let stream = match format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, &attached, &gain),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, &attached, &gain),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, &attached, &gain),
            SampleFormat::I32 => build_stream::<i32>(&device, &config, &attached, &gain),
            other => {
                return Err(SyncError::Audio(format!(
                    "unsupported sample format {:?}",
                    other
                )))
            }
        }?;
        stream
            .play()
            .map_err(|e| SyncError::Audio(format!("failed to start stream: {}", e)))?;

        debug!(
            "Audio output stream running: {} Hz, {} channels, {:?}",
            config.sample_rate.0, config.channels, format
        );

        Ok(Self {
            _stream: stream,
            attached,
            gain,
            sample_rate: config.sample_rate.0,
            channels: config.channels,
        })
    }

    /// A fresh ring sized for this device.
    pub fn new_ring(&self) -> Arc<RingBuffer> {
        let samples = (self.sample_rate as f32 * RING_SECONDS) as usize * self.channels as usize;
        Arc::new(RingBuffer::new(samples))
    }

    /// Route the callback to `ring`; `None` outputs silence.
    pub fn attach(&self, ring: Option<Arc<RingBuffer>>) {
        *self.attached.lock() = ring;
    }

    pub fn set_gain(&self, gain: f32) {
        self.gain
            .store(gain.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn gain(&self) -> f32 {
        f32::from_bits(self.gain.load(Ordering::Relaxed))
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    attached: &Attachment,
    gain: &Arc<AtomicU32>,
) -> Result<Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let attached = Arc::clone(attached);
    let gain = Arc::clone(gain);
    let mut scratch: Vec<f32> = Vec::with_capacity(8192);

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if scratch.len() < data.len() {
                    scratch.resize(data.len(), 0.0);
                }
                let buf = &mut scratch[..data.len()];
                let ring = attached.try_lock().and_then(|slot| slot.clone());
                match ring {
                    Some(ring) => {
                        ring.pop_into(buf);
                    }
                    None => buf.fill(0.0),
                }
                let g = f32::from_bits(gain.load(Ordering::Relaxed));
                for (out, sample) in data.iter_mut().zip(buf.iter()) {
                    *out = T::from_sample(sample * g);
                }
            },
            move |err| {
                error!("Audio output stream error: {}", err);
            },
            None,
        )
        .map_err(|e| SyncError::Audio(format!("failed to build stream: {}", e)))
}
