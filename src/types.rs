use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

// ─── Settings ───────────────────────────────────────────────────────────────

/// Which spelling of the twelve pitch classes challenges are drawn from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoteMode {
    Sharp,
    Flat,
    #[default]
    Mixed,
}

impl NoteMode {
    /// The label pool for this mode. Mixed is the de-duplicated union.
    pub fn pool(self) -> &'static [&'static str] {
        match self {
            NoteMode::Sharp => &SHARPS,
            NoteMode::Flat => &FLATS,
            NoteMode::Mixed => &MIXED,
        }
    }
}

/// What a single challenge asks for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Single,
    Chords,
    Triads,
}

/// User-facing configuration. Read as a whole snapshot, replaced as a whole.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Seconds per challenge, 1–15
    pub duration: u32,
    pub note_mode: NoteMode,
    pub game_mode: GameMode,
    pub voice_enabled: bool,
    pub tick_enabled: bool,
    /// Pin single-note challenges to a guitar string
    pub string_mode: bool,
    /// Listen on the microphone and judge answers by pitch
    pub input_mode: bool,
}

pub const MIN_DURATION: u32 = 1;
pub const MAX_DURATION: u32 = 15;

impl Settings {
    /// Clamp out-of-range values coming from disk or the command line.
    pub fn sanitized(mut self) -> Self {
        self.duration = self.duration.clamp(MIN_DURATION, MAX_DURATION);
        self
    }

    /// Countdown length in deciseconds.
    pub fn duration_ds(&self) -> u32 {
        self.duration * 10
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            duration: 3,
            note_mode: NoteMode::Mixed,
            game_mode: GameMode::Single,
            voice_enabled: true,
            tick_enabled: true,
            string_mode: false,
            input_mode: false,
        }
    }
}

// ─── Challenge ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Inversion {
    Root,
    First,
    Second,
}

impl Inversion {
    pub const ALL: [Inversion; 3] = [Inversion::Root, Inversion::First, Inversion::Second];

    pub fn name(self) -> &'static str {
        match self {
            Inversion::Root => "Root Position",
            Inversion::First => "1st Inversion",
            Inversion::Second => "2nd Inversion",
        }
    }

    /// Abbreviation used on the display.
    pub fn short(self) -> &'static str {
        match self {
            Inversion::Root => "Root Pos.",
            Inversion::First => "1st Inv.",
            Inversion::Second => "2nd Inv.",
        }
    }
}

/// One round's target. Replaced wholesale on every advance.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Challenge {
    pub root: &'static str,
    pub quality: Option<&'static str>,
    pub inversion: Option<Inversion>,
    pub string: Option<&'static str>,
}

impl Challenge {
    pub fn note(root: &'static str) -> Self {
        Self {
            root,
            quality: None,
            inversion: None,
            string: None,
        }
    }

    /// Canonical sharp-spelled label of the root, used for matching.
    pub fn canonical_root(&self) -> Option<&'static str> {
        pitch_class(self.root).map(canonical_label)
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(inv) = self.inversion {
            write!(f, "{} ", inv.short())?;
        }
        write!(f, "{}", self.root)?;
        if let Some(q) = self.quality {
            write!(f, " {}", q)?;
        }
        Ok(())
    }
}

// ─── Inter-thread messages ──────────────────────────────────────────────────

/// A user action from the console (or any other input surface).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Toggle,
    SetDuration(u32),
    SetNoteMode(NoteMode),
    SetGameMode(GameMode),
    ToggleVoice,
    ToggleTick,
    ToggleStrings,
    ToggleInput,
    Quit,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    /// One analysis frame's fundamental estimate; None = no pitch found.
    Pitch(Option<f32>),
    Command(Command),
}

// ─── Time base ──────────────────────────────────────────────────────────────

/// Monotonic millisecond clock shared by all threads of one process.
#[derive(Clone)]
pub struct Epoch {
    start: Instant,
}

impl Epoch {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Epoch {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Constants ──────────────────────────────────────────────────────────────

pub const SHARPS: [&str; 12] = [
    "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#",
];
pub const FLATS: [&str; 12] = [
    "A", "Bb", "B", "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab",
];
/// Union of SHARPS and FLATS with naturals listed once.
pub const MIXED: [&str; 17] = [
    "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "Bb", "Db", "Eb", "Gb",
    "Ab",
];

pub const STRINGS: [&str; 6] = ["Low E", "A", "D", "G", "B", "High E"];

pub const CHORD_QUALITIES: [&str; 5] = ["Major", "Minor", "7", "m7", "maj7"];
pub const TRIAD_QUALITIES: [&str; 4] = ["Major", "Minor", "Diminished", "Augmented"];

/// Shown before the first session.
pub const IDLE_SENTINEL: &str = "🎸";
/// Shown after a session is stopped.
pub const PAUSED_SENTINEL: &str = "⏸";

/// Pitch-class index (A=0 … G#=11) of a sharp or flat label.
pub fn pitch_class(label: &str) -> Option<u8> {
    let idx = match label {
        "A" => 0,
        "A#" | "Bb" => 1,
        "B" | "Cb" => 2,
        "C" | "B#" => 3,
        "C#" | "Db" => 4,
        "D" => 5,
        "D#" | "Eb" => 6,
        "E" | "Fb" => 7,
        "F" | "E#" => 8,
        "F#" | "Gb" => 9,
        "G" => 10,
        "G#" | "Ab" => 11,
        _ => return None,
    };
    Some(idx)
}

/// Sharp-spelled label for a pitch-class index (taken mod 12).
pub fn canonical_label(index: u8) -> &'static str {
    SHARPS[(index % 12) as usize]
}

/// Circular semitone distance between two pitch classes: 0..=6.
pub fn semitone_distance(a: u8, b: u8) -> u8 {
    let diff = (a as i16 - b as i16).unsigned_abs() as u8 % 12;
    diff.min(12 - diff)
}
