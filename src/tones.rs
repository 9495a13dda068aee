//! Countdown ticks and the success chime.

use log::debug;
use std::f32::consts::PI;

/// Plays short cue sounds. Fire and forget: failures are the player's own
/// business and never reach the session.
pub trait TonePlayer {
    fn play_tick(&mut self, high: bool);
    fn play_success_chime(&mut self);
}

/// Tone player for headless runs and tests: logs instead of playing.
#[derive(Debug, Default)]
pub struct LogTonePlayer;

impl TonePlayer for LogTonePlayer {
    fn play_tick(&mut self, high: bool) {
        debug!("tick ({})", if high { "high" } else { "low" });
    }

    fn play_success_chime(&mut self) {
        debug!("success chime");
    }
}

const TICK_SECS: f32 = 0.05;
const TICK_GAIN: f32 = 0.05;
/// Per-second tick
const TICK_HZ: f32 = 880.0;
/// Expiry tick sits an octave below the per-second tick.
const EXPIRY_TICK_HZ: f32 = 440.0;

/// C5, E5, G5
const CHIME_HZ: [f32; 3] = [523.25, 659.25, 783.99];
const CHIME_STAGGER_SECS: f32 = 0.05;
const CHIME_ATTACK_SECS: f32 = 0.05;
const CHIME_DECAY_END_SECS: f32 = 0.4;
const CHIME_NOTE_SECS: f32 = 0.5;
const CHIME_GAIN: f32 = 0.1;
const SILENCE_GAIN: f32 = 0.001;

/// Render one tick: a sine with an exponential fade.
pub fn render_tick(sample_rate: u32, high: bool) -> Vec<f32> {
    let freq = if high { EXPIRY_TICK_HZ } else { TICK_HZ };
    let sr = sample_rate as f32;
    let n = (TICK_SECS * sr) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / sr;
            let gain = exp_ramp(TICK_GAIN, SILENCE_GAIN, t / TICK_SECS);
            gain * (2.0 * PI * freq * t).sin()
        })
        .collect()
}

/// Render the success chime: a staggered major triad, each voice with a
/// short linear attack and an exponential decay.
pub fn render_chime(sample_rate: u32) -> Vec<f32> {
    let sr = sample_rate as f32;
    let total_secs = CHIME_STAGGER_SECS * (CHIME_HZ.len() - 1) as f32 + CHIME_NOTE_SECS;
    let mut out = vec![0.0f32; (total_secs * sr) as usize];

    for (voice, &freq) in CHIME_HZ.iter().enumerate() {
        let offset = (voice as f32 * CHIME_STAGGER_SECS * sr) as usize;
        let len = (CHIME_NOTE_SECS * sr) as usize;
        for i in 0..len {
            let Some(sample) = out.get_mut(offset + i) else {
                break;
            };
            let t = i as f32 / sr;
            let gain = if t < CHIME_ATTACK_SECS {
                CHIME_GAIN * t / CHIME_ATTACK_SECS
            } else if t < CHIME_DECAY_END_SECS {
                let x = (t - CHIME_ATTACK_SECS) / (CHIME_DECAY_END_SECS - CHIME_ATTACK_SECS);
                exp_ramp(CHIME_GAIN, SILENCE_GAIN, x)
            } else {
                SILENCE_GAIN
            };
            *sample += gain * (2.0 * PI * freq * t).sin();
        }
    }
    out
}

/// Exponential interpolation from `from` to `to` as `x` goes 0 → 1.
fn exp_ramp(from: f32, to: f32, x: f32) -> f32 {
    from * (to / from).powf(x.clamp(0.0, 1.0))
}

#[cfg(feature = "audio")]
pub use output::CpalTonePlayer;

#[cfg(feature = "audio")]
mod output {
    use super::{render_chime, render_tick, TonePlayer};
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{SampleFormat, Stream};
    use crossbeam_channel::{bounded, Receiver, Sender};
    use log::{error, info, warn};

    /// Plays cues on the default output device.
    ///
    /// Holds the cpal `Stream` alive; drop it to stop output. Rendered cues
    /// are queued to the audio callback and dropped if the queue is full.
    pub struct CpalTonePlayer {
        _stream: Stream,
        tx: Sender<Vec<f32>>,
        sample_rate: u32,
    }

    impl CpalTonePlayer {
        pub fn start() -> Result<Self, String> {
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or_else(|| "No default audio output device found".to_string())?;
            info!(
                "Audio output: {}",
                device.name().unwrap_or_else(|_| "unknown".into())
            );

            let supported = device
                .default_output_config()
                .map_err(|e| format!("No supported output config: {e}"))?;
            if supported.sample_format() != SampleFormat::F32 {
                return Err(format!(
                    "Unsupported output sample format {:?}. Use an F32 device.",
                    supported.sample_format()
                ));
            }
            let sample_rate = supported.sample_rate().0;
            let config: cpal::StreamConfig = supported.into();
            let channels = config.channels as usize;

            let (tx, rx) = bounded::<Vec<f32>>(8);
            let mut feed = Feed::new(rx);

            let stream = device
                .build_output_stream(
                    &config,
                    move |data: &mut [f32], _| {
                        for frame in data.chunks_mut(channels) {
                            let s = feed.next_sample();
                            frame.iter_mut().for_each(|out| *out = s);
                        }
                    },
                    |e| error!("Audio output error: {e}"),
                    None,
                )
                .map_err(|e| e.to_string())?;
            stream.play().map_err(|e| e.to_string())?;

            Ok(Self {
                _stream: stream,
                tx,
                sample_rate,
            })
        }

        fn queue(&self, samples: Vec<f32>) {
            if self.tx.try_send(samples).is_err() {
                warn!("Tone queue full, cue dropped");
            }
        }
    }

    impl TonePlayer for CpalTonePlayer {
        fn play_tick(&mut self, high: bool) {
            self.queue(render_tick(self.sample_rate, high));
        }

        fn play_success_chime(&mut self) {
            self.queue(render_chime(self.sample_rate));
        }
    }

    /// Callback-side cursor over queued cues.
    struct Feed {
        rx: Receiver<Vec<f32>>,
        current: Vec<f32>,
        pos: usize,
    }

    impl Feed {
        fn new(rx: Receiver<Vec<f32>>) -> Self {
            Self {
                rx,
                current: Vec::new(),
                pos: 0,
            }
        }

        fn next_sample(&mut self) -> f32 {
            if self.pos >= self.current.len() {
                match self.rx.try_recv() {
                    Ok(next) => {
                        self.current = next;
                        self.pos = 0;
                    }
                    Err(_) => return 0.0,
                }
            }
            let s = self.current.get(self.pos).copied().unwrap_or(0.0);
            self.pos += 1;
            s
        }
    }
}
