//! Audio frame analysis: RMS gate, fundamental-frequency estimation, and test signal generators.

use pitch_detection::detector::yin::YINDetector;
use pitch_detection::detector::PitchDetector;

/// Samples per analysis window. ~85ms at 48kHz, several periods of the low E string.
pub const ANALYSIS_WINDOW: usize = 4096;
/// RMS below this is treated as silence.
const SILENCE_RMS: f32 = 0.01;
/// Minimum YIN clarity for an estimate to count.
const CLARITY_THRESHOLD: f32 = 0.7;

/// Root mean square of an audio buffer.
pub fn compute_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// Turns a stream of audio chunks into one fundamental estimate per chunk.
///
/// Keeps the most recent `ANALYSIS_WINDOW` samples and runs YIN over them
/// each time a chunk arrives. Until the window has filled, and whenever the
/// window is quiet or unclear, the estimate is None.
pub struct PitchTracker {
    detector: YINDetector<f32>,
    buf: Vec<f32>,
    window: usize,
}

impl PitchTracker {
    pub fn new() -> Self {
        Self::with_window(ANALYSIS_WINDOW)
    }

    pub fn with_window(window: usize) -> Self {
        Self {
            detector: YINDetector::new(window, window / 2),
            buf: Vec::with_capacity(window * 2),
            window,
        }
    }

    /// Append samples and return this frame's estimate in Hz.
    pub fn push(&mut self, samples: &[f32], sample_rate: u32) -> Option<f32> {
        self.buf.extend_from_slice(samples);
        if self.buf.len() > self.window {
            let excess = self.buf.len() - self.window;
            self.buf.drain(..excess);
        }
        if self.buf.len() < self.window || compute_rms(&self.buf) < SILENCE_RMS {
            return None;
        }
        self.detector
            .get_pitch(&self.buf, sample_rate as usize, 0.0, CLARITY_THRESHOLD)
            .map(|p| p.frequency)
            .filter(|f| f.is_finite() && *f > 0.0)
    }

    pub fn reset(&mut self) {
        self.buf.clear();
    }
}

impl Default for PitchTracker {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::test_helpers::sine_wave;
    use super::*;
    use crate::stabilizer::note_from_frequency;

    #[test]
    fn test_rms_of_silence_and_sine() {
        assert_eq!(compute_rms(&[]), 0.0);
        assert_eq!(compute_rms(&[0.0; 64]), 0.0);
        let s = sine_wave(440.0, 1.0, 48000, 100);
        assert!((compute_rms(&s) - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.01);
    }

    #[test]
    fn test_needs_a_full_window() {
        let mut tracker = PitchTracker::new();
        let s = sine_wave(440.0, 0.5, 48000, 20);
        assert_eq!(tracker.push(&s, 48000), None);
    }

    #[test]
    fn test_tracks_a_sine() {
        let mut tracker = PitchTracker::new();
        let s = sine_wave(440.0, 0.5, 48000, 200);
        let hz = tracker.push(&s, 48000).expect("pitch of a clean sine");
        assert!((hz - 440.0).abs() < 5.0, "got {hz}");
        assert_eq!(note_from_frequency(hz), Some("A"));
    }

    #[test]
    fn test_low_e_string() {
        let mut tracker = PitchTracker::new();
        let s = sine_wave(82.41, 0.5, 48000, 200);
        let hz = tracker.push(&s, 48000).expect("pitch of low E");
        assert_eq!(note_from_frequency(hz), Some("E"));
    }

    #[test]
    fn test_silence_has_no_pitch() {
        let mut tracker = PitchTracker::new();
        let s = vec![0.0f32; 9600];
        assert_eq!(tracker.push(&s, 48000), None);
    }
}
