use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use crossbeam_channel::Sender;
use log::{debug, error, info};
use std::thread;

use crate::dsp::PitchTracker;
use crate::microphone::Microphone;
use crate::types::InputEvent;

const CHUNK_SIZE: usize = 1024;

/// Live pitch capture via cpal.
///
/// Holds the cpal `Stream` alive. Drop this to stop capture.
/// Samples are mixed to mono f32, grouped into `CHUNK_SIZE` frames, and
/// each frame's pitch estimate is sent as `InputEvent::Pitch`.
pub struct AudioCapture {
    _stream: Stream,
}

impl AudioCapture {
    /// Open the default input device and start streaming.
    /// Returns immediately; estimates arrive from a background thread.
    pub fn start(tx: Sender<InputEvent>) -> Result<Self, String> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| "No default audio input device found".to_string())?;

        info!(
            "Audio input: {}",
            device.name().unwrap_or_else(|_| "unknown".into())
        );

        let supported = device
            .default_input_config()
            .map_err(|e| format!("No supported input config: {e}"))?;

        // Prefer 48kHz, which the analysis window is sized for.
        let preferred = cpal::SampleRate(48000);
        let config_48k = device.supported_input_configs().ok().and_then(|configs| {
            configs
                .filter(|c| {
                    c.channels() == supported.channels()
                        && c.min_sample_rate() <= preferred
                        && c.max_sample_rate() >= preferred
                })
                .max_by_key(|c| c.max_sample_rate())
                .map(|c| c.with_sample_rate(preferred))
        });

        let (config, sample_rate, format): (StreamConfig, u32, SampleFormat) =
            if let Some(cfg) = config_48k {
                let sr = cfg.sample_rate().0;
                let fmt = cfg.sample_format();
                (cfg.into(), sr, fmt)
            } else {
                let sr = supported.sample_rate().0;
                let fmt = supported.sample_format();
                (supported.into(), sr, fmt)
            };

        let channels = config.channels as usize;

        info!(
            "Capture config: {}Hz  {} ch  {:?}",
            sample_rate, channels, format
        );

        // Inner channel: realtime callback → analysis thread
        // try_send prevents blocking the audio callback on backpressure
        let (raw_tx, raw_rx) = crossbeam_channel::bounded::<Vec<f32>>(64);

        let err_fn = |e: cpal::StreamError| error!("Audio stream error: {e}");

        let stream = match format {
            SampleFormat::F32 => {
                let raw_tx = raw_tx.clone();
                device
                    .build_input_stream(
                        &config,
                        move |data: &[f32], _| {
                            let _ = raw_tx.try_send(mix_mono_f32(data, channels));
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|e| e.to_string())?
            }
            SampleFormat::I16 => {
                let raw_tx = raw_tx.clone();
                device
                    .build_input_stream(
                        &config,
                        move |data: &[i16], _| {
                            let _ = raw_tx.try_send(mix_mono_i16(data, channels));
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|e| e.to_string())?
            }
            fmt => {
                return Err(format!(
                    "Unsupported sample format {fmt:?}. Use an F32 or I16 device."
                ))
            }
        };
        drop(raw_tx);

        stream.play().map_err(|e| e.to_string())?;

        // Analysis thread: ends when the stream (and its sender) is dropped
        thread::Builder::new()
            .name("pitch-capture".into())
            .spawn(move || {
                let mut tracker = PitchTracker::new();
                let mut accum: Vec<f32> = Vec::with_capacity(CHUNK_SIZE * 4);
                for chunk in raw_rx {
                    accum.extend_from_slice(&chunk);
                    while accum.len() >= CHUNK_SIZE {
                        let frame: Vec<f32> = accum.drain(..CHUNK_SIZE).collect();
                        let estimate = tracker.push(&frame, sample_rate);
                        if tx.send(InputEvent::Pitch(estimate)).is_err() {
                            return; // Coordinator gone
                        }
                    }
                }
                debug!("pitch capture thread exiting");
            })
            .map_err(|e| e.to_string())?;

        Ok(Self { _stream: stream })
    }
}

/// [`Microphone`] over the default input device. Capture is opened on
/// `start` and released on `stop` by dropping the stream.
pub struct CpalMicrophone {
    tx: Sender<InputEvent>,
    capture: Option<AudioCapture>,
}

impl CpalMicrophone {
    pub fn new(tx: Sender<InputEvent>) -> Self {
        Self { tx, capture: None }
    }
}

impl Microphone for CpalMicrophone {
    fn start(&mut self) -> Result<(), String> {
        if self.capture.is_none() {
            self.capture = Some(AudioCapture::start(self.tx.clone())?);
        }
        Ok(())
    }

    fn stop(&mut self) {
        if self.capture.take().is_some() {
            info!("Audio input released");
        }
    }

    fn is_active(&self) -> bool {
        self.capture.is_some()
    }
}

// ─── Per-format mono mixdown helpers ─────────────────────────────────────────

fn mix_mono_f32(data: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return data.to_vec();
    }
    data.chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn mix_mono_i16(data: &[i16], channels: usize) -> Vec<f32> {
    const SCALE: f32 = i16::MAX as f32;
    if channels == 1 {
        return data.iter().map(|&s| s as f32 / SCALE).collect();
    }
    data.chunks(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            sum as f32 / (channels as f32 * SCALE)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixdown_averages_channels() {
        let mono = mix_mono_f32(&[0.2, 0.4, -1.0, 1.0], 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!(mono[1].abs() < 1e-6);
        assert_eq!(mix_mono_f32(&[0.5, -0.5], 1), vec![0.5, -0.5]);
        let mono = mix_mono_i16(&[i16::MAX, i16::MAX], 2);
        assert!((mono[0] - 1.0).abs() < 1e-6);
    }
}
