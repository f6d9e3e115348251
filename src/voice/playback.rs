//! Audio playback to speakers
//!
//! One playback may be active at a time; starting a new one preempts the
//! previous stream. Completion is observed through a `PlaybackHandle`
//! rather than device callbacks.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, Stream, StreamConfig};

use crate::{Error, Result};

/// Sample rate for playback (matches common TTS output)
const PLAYBACK_SAMPLE_RATE: u32 = 24000;

/// Completion signal for one playback
///
/// Resolves when the samples are exhausted, or early if the playback is
/// stopped. A timeout slightly past the clip duration guards against a
/// stalled output stream.
pub struct PlaybackHandle {
    finished: Arc<AtomicBool>,
    duration_ms: u64,
}

impl PlaybackHandle {
    /// Whether playback has ended (naturally or via stop)
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }

    /// Wait for playback to end
    pub async fn wait(self) {
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(self.duration_ms + 500);

        while !self.finished.load(Ordering::Relaxed) {
            if start.elapsed() > timeout {
                tracing::warn!("playback completion timed out");
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

/// The active output stream and its completion flag
struct ActivePlayback {
    #[allow(dead_code)]
    stream: Stream,
    finished: Arc<AtomicBool>,
}

/// Plays audio to the default output device
///
/// The single audio output is owned here; no other component touches the
/// output stream.
pub struct AudioPlayback {
    #[allow(dead_code)]
    device: Device,
    config: StreamConfig,
    active: Option<ActivePlayback>,
}

impl AudioPlayback {
    /// Create a new audio playback instance
    ///
    /// # Errors
    ///
    /// Returns `DeviceUnavailable` if no output device exists or no suitable
    /// config is supported
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::DeviceUnavailable("no output device available".to_string()))?;

        let supported_config = device
            .supported_output_configs()
            .map_err(|e| Error::DeviceUnavailable(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(PLAYBACK_SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(PLAYBACK_SAMPLE_RATE)
            })
            .or_else(|| {
                // Fallback: try stereo
                device.supported_output_configs().ok()?.find(|c| {
                    c.channels() == 2
                        && c.min_sample_rate() <= SampleRate(PLAYBACK_SAMPLE_RATE)
                        && c.max_sample_rate() >= SampleRate(PLAYBACK_SAMPLE_RATE)
                })
            })
            .ok_or_else(|| {
                Error::DeviceUnavailable("no suitable output config found".to_string())
            })?;

        let config = supported_config
            .with_sample_rate(SampleRate(PLAYBACK_SAMPLE_RATE))
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = PLAYBACK_SAMPLE_RATE,
            channels = config.channels,
            "audio playback initialized"
        );

        Ok(Self {
            device,
            config,
            active: None,
        })
    }

    /// Decode MP3 bytes and begin playback
    ///
    /// Any playback already active is stopped first.
    ///
    /// # Errors
    ///
    /// Returns `Playback` on decode failure, `DeviceUnavailable` if the
    /// output stream cannot be opened
    pub fn start_mp3(&mut self, mp3_data: &[u8]) -> Result<PlaybackHandle> {
        let samples = decode_mp3(mp3_data)?;
        self.start_samples(samples)
    }

    /// Begin playback of f32 samples
    ///
    /// # Errors
    ///
    /// Returns `DeviceUnavailable` if the output stream cannot be opened
    pub fn start_samples(&mut self, samples: Vec<f32>) -> Result<PlaybackHandle> {
        self.stop();

        let finished = Arc::new(AtomicBool::new(false));
        let duration_ms = (samples.len() as u64 * 1000) / u64::from(PLAYBACK_SAMPLE_RATE);

        if samples.is_empty() {
            finished.store(true, Ordering::Relaxed);
            return Ok(PlaybackHandle {
                finished,
                duration_ms,
            });
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::DeviceUnavailable("no output device".to_string()))?;

        let config = self.config.clone();
        let channels = config.channels as usize;

        let callback_finished = Arc::clone(&finished);
        let mut position = 0usize;

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let sample = if position < samples.len() {
                            let s = samples[position];
                            position += 1;
                            s
                        } else {
                            callback_finished.store(true, Ordering::Relaxed);
                            0.0
                        };

                        for out in frame.iter_mut() {
                            *out = sample;
                        }
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio playback error");
                },
                None,
            )
            .map_err(|e| Error::DeviceUnavailable(e.to_string()))?;

        stream
            .play()
            .map_err(|e| Error::DeviceUnavailable(e.to_string()))?;

        tracing::debug!(duration_ms, "playback started");

        self.active = Some(ActivePlayback {
            stream,
            finished: Arc::clone(&finished),
        });

        Ok(PlaybackHandle {
            finished,
            duration_ms,
        })
    }

    /// Decode MP3 bytes, play them, and wait for completion
    ///
    /// # Errors
    ///
    /// Returns error if decoding or playback fails
    pub async fn play_mp3(&mut self, mp3_data: &[u8]) -> Result<()> {
        let handle = self.start_mp3(mp3_data)?;
        handle.wait().await;
        self.stop();
        Ok(())
    }

    /// Stop playback and release the output stream
    ///
    /// Safe to call when nothing is playing.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.finished.store(true, Ordering::Relaxed);
            drop(active.stream);
            tracing::debug!("playback stopped");
        }
    }

    /// Whether a playback is currently active and unfinished
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| !a.finished.load(Ordering::Relaxed))
    }
}

/// Decode MP3 bytes to f32 samples
fn decode_mp3(mp3_data: &[u8]) -> Result<Vec<f32>> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut samples = Vec::new();

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                // Convert i16 samples to f32 and fold stereo to mono
                let frame_samples: Vec<f32> = if frame.channels == 2 {
                    frame
                        .data
                        .chunks(2)
                        .map(|chunk| {
                            let left = f32::from(chunk[0]) / 32768.0;
                            let right =
                                f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                            f32::midpoint(left, right)
                        })
                        .collect()
                } else {
                    frame.data.iter().map(|&s| f32::from(s) / 32768.0).collect()
                };

                samples.extend(frame_samples);
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Playback(format!("MP3 decode error: {e}"))),
        }
    }

    Ok(samples)
}
