//! Reaction-time and per-note accuracy tracking for one play session.

use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

/// Minimum spacing between two counted mistakes on the same target.
pub const MISTAKE_COOLDOWN_MS: u64 = 1000;

/// Number of recent reaction times kept in the summary trend.
const TREND_LEN: usize = 20;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct NoteStats {
    pub correct: u32,
    pub mistakes: u32,
    /// Sum of reaction times over correct answers
    pub total_time_ms: u64,
}

impl NoteStats {
    pub fn average_ms(&self) -> Option<f64> {
        (self.correct > 0).then(|| self.total_time_ms as f64 / self.correct as f64)
    }
}

/// Additive score record. Only [`reset`](Self::reset) removes anything.
#[derive(Debug, Clone, Default)]
pub struct ScoreBoard {
    reaction_times_ms: Vec<u64>,
    total_attempts: u32,
    notes: BTreeMap<&'static str, NoteStats>,
    /// Time of the last counted mistake, per target
    last_mistake_ms: BTreeMap<&'static str, u64>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.reaction_times_ms.clear();
        self.total_attempts = 0;
        self.notes.clear();
        self.last_mistake_ms.clear();
    }

    /// One challenge was completed, answered or not.
    pub fn record_attempt(&mut self) {
        self.total_attempts += 1;
    }

    pub fn record_correct(&mut self, note: &'static str, reaction_ms: u64) {
        self.reaction_times_ms.push(reaction_ms);
        let stats = self.notes.entry(note).or_default();
        stats.correct += 1;
        stats.total_time_ms += reaction_ms;
        debug!("Correct: {} in {}ms", note, reaction_ms);
    }

    /// Count a wrong answer against `target` unless one was already counted
    /// for it within the cooldown. Returns whether it was counted.
    pub fn record_mistake(&mut self, target: &'static str, now_ms: u64) -> bool {
        if let Some(&at) = self.last_mistake_ms.get(target) {
            if now_ms.saturating_sub(at) < MISTAKE_COOLDOWN_MS {
                return false;
            }
        }
        self.last_mistake_ms.insert(target, now_ms);
        self.notes.entry(target).or_default().mistakes += 1;
        debug!("Mistake on {}", target);
        true
    }

    pub fn reaction_times_ms(&self) -> &[u64] {
        &self.reaction_times_ms
    }

    pub fn total_attempts(&self) -> u32 {
        self.total_attempts
    }

    pub fn note_stats(&self) -> &BTreeMap<&'static str, NoteStats> {
        &self.notes
    }

    pub fn summary(&self) -> ScoreSummary {
        let correct = self.reaction_times_ms.len() as u32;
        let average_ms = (correct > 0)
            .then(|| self.reaction_times_ms.iter().sum::<u64>() / correct as u64);
        let fastest_ms = self.reaction_times_ms.iter().min().copied();

        let mut most_failed = None;
        let mut slowest_note: Option<(&'static str, f64)> = None;
        let mut fastest_note: Option<(&'static str, f64)> = None;
        for (&note, stats) in &self.notes {
            if stats.mistakes > most_failed.map_or(0, |(_, m)| m) {
                most_failed = Some((note, stats.mistakes));
            }
            if let Some(avg) = stats.average_ms() {
                if slowest_note.map_or(true, |(_, a)| avg > a) {
                    slowest_note = Some((note, avg));
                }
                if fastest_note.map_or(true, |(_, a)| avg < a) {
                    fastest_note = Some((note, avg));
                }
            }
        }

        let trend_start = self.reaction_times_ms.len().saturating_sub(TREND_LEN);
        ScoreSummary {
            correct,
            attempts: self.total_attempts,
            average_ms,
            fastest_ms,
            most_failed,
            slowest_note: slowest_note.map(|(n, _)| n),
            fastest_note: fastest_note.map(|(n, _)| n),
            recent_ms: self.reaction_times_ms[trend_start..].to_vec(),
        }
    }
}

/// Read-only digest of a [`ScoreBoard`] for display.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ScoreSummary {
    pub correct: u32,
    pub attempts: u32,
    pub average_ms: Option<u64>,
    pub fastest_ms: Option<u64>,
    /// Note with the most mistakes and its count
    pub most_failed: Option<(&'static str, u32)>,
    pub slowest_note: Option<&'static str>,
    pub fastest_note: Option<&'static str>,
    /// Last reaction times, oldest first
    pub recent_ms: Vec<u64>,
}
