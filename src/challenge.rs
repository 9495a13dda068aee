use crate::shuffle_bag::ShuffleBag;
use crate::types::*;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Builds the next challenge from the current settings.
///
/// Root notes come from a shuffle bag over the pool selected by the note
/// mode, so every note is asked once before any note is asked again. In
/// single-note mode a candidate within a semitone of the previous root is
/// put back at the bottom of the bag and one more candidate is drawn. The
/// second candidate is accepted even if it is also close: one retry only.
///
/// Chord qualities and inversions are drawn independently per challenge
/// and may repeat. Target strings (single-note mode with the string
/// constraint on) come from a second bag that never repeats across the
/// seam between two permutations.
pub struct ChallengeGenerator {
    note_bag: ShuffleBag<&'static str>,
    string_bag: ShuffleBag<&'static str>,
    last_string: Option<&'static str>,
    rng: StdRng,
}

impl ChallengeGenerator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic generator for tests and `--seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            note_bag: ShuffleBag::new(),
            string_bag: ShuffleBag::new(),
            last_string: None,
            rng,
        }
    }

    /// Draw the next challenge. `previous_root` is the root of the challenge
    /// being replaced, if any.
    pub fn next(&mut self, previous_root: Option<&str>, settings: &Settings) -> Challenge {
        let root = self.next_root(previous_root, settings);
        let mut challenge = Challenge::note(root);

        match settings.game_mode {
            GameMode::Single => {
                if settings.string_mode {
                    challenge.string = self.next_string();
                }
            }
            GameMode::Chords => {
                challenge.quality = CHORD_QUALITIES.choose(&mut self.rng).copied();
            }
            GameMode::Triads => {
                challenge.quality = TRIAD_QUALITIES.choose(&mut self.rng).copied();
                challenge.inversion = Inversion::ALL.choose(&mut self.rng).copied();
            }
        }

        debug!("Next challenge: {} (string: {:?})", challenge, challenge.string);
        challenge
    }

    /// Discard the note permutation so the next draw starts fresh.
    pub fn reset_notes(&mut self) {
        self.note_bag.clear();
    }

    fn next_root(&mut self, previous_root: Option<&str>, settings: &Settings) -> &'static str {
        let pool = settings.note_mode.pool();
        let mut candidate = self.draw_note(pool);

        if settings.game_mode != GameMode::Single || self.note_bag.remaining() == 0 {
            return candidate;
        }
        let Some(prev) = previous_root.and_then(pitch_class) else {
            return candidate;
        };
        let Some(cand) = pitch_class(candidate) else {
            return candidate;
        };

        if semitone_distance(prev, cand) <= 1 {
            trace!("{} too close to previous root, requeueing", candidate);
            self.note_bag.requeue(candidate);
            candidate = self.draw_note(pool);
        }
        candidate
    }

    fn draw_note(&mut self, pool: &'static [&'static str]) -> &'static str {
        // Pools are non-empty constants.
        self.note_bag.draw(pool, &mut self.rng).unwrap_or(pool[0])
    }

    fn next_string(&mut self) -> Option<&'static str> {
        let s = self
            .string_bag
            .draw_avoiding(&STRINGS, self.last_string, &mut self.rng)?;
        self.last_string = Some(s);
        Some(s)
    }
}

impl Default for ChallengeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
