//! Spoken form of a challenge, and the narrator that reads it out.

use crate::types::{Challenge, Inversion};
use log::{debug, info};

/// Reads challenges aloud. Best effort: implementations swallow their own
/// failures and never block the caller.
pub trait Narrator {
    fn speak(&mut self, text: &str, string: Option<&str>);
    /// Cut off anything still being spoken.
    fn cancel(&mut self);
}

/// Narrator for terminals without a speech engine: prints the line.
#[derive(Debug, Default)]
pub struct ConsoleNarrator;

impl Narrator for ConsoleNarrator {
    fn speak(&mut self, text: &str, _string: Option<&str>) {
        info!("🔊 {}", text);
    }

    fn cancel(&mut self) {
        debug!("narration cancelled");
    }
}

/// Expand a challenge into words a speech synthesizer reads correctly:
/// "1st Inv. Bb Minor" becomes "first inversion b flat minor triad".
pub fn challenge_text(challenge: &Challenge) -> String {
    let mut words = Vec::new();

    if let Some(inv) = challenge.inversion {
        words.push(match inv {
            Inversion::Root => "root position".to_string(),
            Inversion::First => "first inversion".to_string(),
            Inversion::Second => "second inversion".to_string(),
        });
    }

    words.push(spoken_note(challenge.root));

    if let Some(quality) = challenge.quality {
        words.push(spoken_quality(quality));
    }

    let mut text = words.join(" ");
    if challenge.inversion.is_some() {
        text.push_str(" triad");
    }
    if let Some(string) = challenge.string {
        text.push_str(&format!(", on {} string", spoken_string(string)));
    }
    text
}

/// "A" → "eigh", "C#" → "c sharp", "Bb" → "b flat".
fn spoken_note(note: &str) -> String {
    let mut chars = note.chars();
    let letter = match chars.next() {
        Some('A') => "eigh".to_string(),
        Some(c) => c.to_ascii_lowercase().to_string(),
        None => return String::new(),
    };
    match chars.as_str() {
        "#" => format!("{letter} sharp"),
        "b" => format!("{letter} flat"),
        _ => letter,
    }
}

fn spoken_quality(quality: &str) -> String {
    match quality {
        "m7" => "minor seven".to_string(),
        "maj7" => "major seven".to_string(),
        "7" => "dominant seven".to_string(),
        other => other.to_lowercase(),
    }
}

/// "Low E" → "low e", "A" → "eigh".
fn spoken_string(string: &str) -> String {
    string
        .split(' ')
        .map(|part| {
            if part.len() == 1 {
                spoken_note(part)
            } else {
                part.to_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
