use crate::types::canonical_label;
use log::trace;
use serde::Serialize;
use std::collections::VecDeque;

/// Reference pitch for A4.
pub const MIDDLE_A_HZ: f32 = 440.0;
/// Estimates at or below this are treated as no signal (below the low E string).
pub const MIN_FREQUENCY_HZ: f32 = 50.0;
/// Estimates at or above this are treated as no signal.
pub const MAX_FREQUENCY_HZ: f32 = 1500.0;
/// Consecutive identical frames required before a note is trusted.
pub const STABILITY_FRAMES: usize = 5;

/// Result of feeding one analysis frame to the stabilizer.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Detection {
    /// Raw estimate for this frame
    pub frequency: Option<f32>,
    /// Sharp-spelled pitch class, None when the frame had no usable pitch
    pub note: Option<&'static str>,
    /// True when the last `STABILITY_FRAMES` frames all agree
    pub stable: bool,
}

impl Detection {
    pub fn silent() -> Self {
        Self {
            frequency: None,
            note: None,
            stable: false,
        }
    }

    /// The note, but only if it can be acted on.
    pub fn stable_note(&self) -> Option<&'static str> {
        if self.stable {
            self.note
        } else {
            None
        }
    }
}

/// Debounces a stream of per-frame pitch estimates into a confident note.
///
/// Each usable frame is reduced to a pitch class and pushed into a sliding
/// window of the last `STABILITY_FRAMES` classes. The detection is stable
/// only when the window is full and every entry equals the newest one. A
/// frame without a usable pitch empties the window: there is no partial
/// credit for a note that drops out.
pub struct PitchStabilizer {
    window: VecDeque<&'static str>,
    capacity: usize,
}

impl PitchStabilizer {
    pub fn new() -> Self {
        Self::with_capacity(STABILITY_FRAMES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity + 1),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, frequency: Option<f32>) -> Detection {
        let Some(note) = frequency.and_then(note_from_frequency) else {
            self.window.clear();
            return Detection {
                frequency,
                note: None,
                stable: false,
            };
        };

        self.window.push_back(note);
        if self.window.len() > self.capacity {
            self.window.pop_front();
        }

        let stable = self.window.len() == self.capacity && self.window.iter().all(|&n| n == note);
        trace!("pitch {:?} → {} (stable: {})", frequency, note, stable);

        Detection {
            frequency,
            note: Some(note),
            stable,
        }
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

impl Default for PitchStabilizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Nearest pitch class to `hz`, or None outside the guitar's useful range.
pub fn note_from_frequency(hz: f32) -> Option<&'static str> {
    if !(hz > MIN_FREQUENCY_HZ && hz < MAX_FREQUENCY_HZ) {
        return None;
    }
    let semitones = (12.0 * (hz / MIDDLE_A_HZ).log2()).round() as i32;
    Some(canonical_label(semitones.rem_euclid(12) as u8))
}

/// Display form of a sharp-spelled label with its flat twin, e.g. "A#/Bb".
/// Presentation only; matching always uses the sharp spelling.
pub fn display_label(note: &'static str) -> &'static str {
    match note {
        "A#" => "A#/Bb",
        "C#" => "C#/Db",
        "D#" => "D#/Eb",
        "F#" => "F#/Gb",
        "G#" => "G#/Ab",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_frequencies() {
        assert_eq!(note_from_frequency(440.0), Some("A"));
        assert_eq!(note_from_frequency(466.16), Some("A#"));
        assert_eq!(note_from_frequency(82.41), Some("E")); // low E string
        assert_eq!(note_from_frequency(261.63), Some("C"));
        assert_eq!(note_from_frequency(415.30), Some("G#"));
    }

    #[test]
    fn test_out_of_range_is_no_signal() {
        assert_eq!(note_from_frequency(40.0), None);
        assert_eq!(note_from_frequency(50.0), None);
        assert_eq!(note_from_frequency(1500.0), None);
        assert_eq!(note_from_frequency(2000.0), None);
        assert_eq!(note_from_frequency(f32::NAN), None);
    }

    #[test]
    fn test_stable_after_five_matching_frames() {
        let mut stab = PitchStabilizer::new();
        for i in 0..4 {
            let d = stab.push(Some(440.0));
            assert_eq!(d.note, Some("A"));
            assert!(!d.stable, "stable too early at frame {i}");
        }
        let d = stab.push(Some(441.0));
        assert!(d.stable);
        assert_eq!(d.stable_note(), Some("A"));
    }

    #[test]
    fn test_one_stray_frame_breaks_stability() {
        let mut stab = PitchStabilizer::new();
        for _ in 0..5 {
            stab.push(Some(440.0));
        }
        assert!(!stab.push(Some(466.16)).stable);
        // The stray frame stays in the window for four more frames
        for _ in 0..4 {
            assert!(!stab.push(Some(440.0)).stable);
        }
        assert!(stab.push(Some(440.0)).stable);
    }

    #[test]
    fn test_no_signal_clears_window() {
        let mut stab = PitchStabilizer::new();
        for _ in 0..4 {
            stab.push(Some(440.0));
        }
        let d = stab.push(None);
        assert_eq!(d, Detection::silent());
        assert!(stab.is_empty());

        for _ in 0..4 {
            stab.push(Some(440.0));
        }
        assert!(!stab.push(Some(2000.0)).stable);
        assert!(stab.is_empty(), "out-of-range frame clears the window too");
    }

    #[test]
    fn test_window_never_exceeds_capacity() {
        let mut stab = PitchStabilizer::new();
        for _ in 0..20 {
            stab.push(Some(330.0));
        }
        assert_eq!(stab.len(), STABILITY_FRAMES);
    }

    #[test]
    fn test_display_label_adds_flat_spelling() {
        assert_eq!(display_label("A#"), "A#/Bb");
        assert_eq!(display_label("G#"), "G#/Ab");
        assert_eq!(display_label("E"), "E");
    }
}
