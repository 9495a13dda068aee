use crate::challenge::ChallengeGenerator;
use crate::clock::SessionClock;
use crate::microphone::{Microphone, NoMicrophone};
use crate::scoring::{ScoreBoard, ScoreSummary};
use crate::speech::{challenge_text, ConsoleNarrator, Narrator};
use crate::stabilizer::{Detection, PitchStabilizer};
use crate::tones::{LogTonePlayer, TonePlayer};
use crate::types::*;
use log::{debug, info, warn};
use serde::Serialize;

/// Breather between an expired challenge and the next one.
pub const NEXT_CHALLENGE_DELAY_MS: u64 = 200;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Phase {
    /// Nothing played yet
    Idle,
    Playing,
    /// Played and stopped; the last score stays readable
    Stopped,
}

/// Side-effecting helpers the session drives. All calls are fire and forget.
pub struct Collaborators {
    pub tones: Box<dyn TonePlayer>,
    pub narrator: Box<dyn Narrator>,
    pub microphone: Box<dyn Microphone>,
}

impl Collaborators {
    /// Log-only collaborators with no audio input.
    pub fn headless() -> Self {
        Self {
            tones: Box::new(LogTonePlayer),
            narrator: Box::new(ConsoleNarrator),
            microphone: Box::new(NoMicrophone),
        }
    }
}

/// An expiry-triggered advance waiting out its pause.
#[derive(Debug, Clone, Copy)]
struct PendingAdvance {
    round: u64,
    due_ms: u64,
}

/// The play/pause/advance state machine.
///
/// Owns every piece of mutable game state: the challenge generator and its
/// bags, the countdown, the pitch stabilizer and the score. Time is always
/// passed in as milliseconds from a shared epoch; the session never reads a
/// clock itself, so the owner decides what "now" is.
///
/// # Advancing
///
/// Two sources can ask for the next challenge: the countdown expiring
/// (after a short pause) and a correct answer. Every draw bumps `round`,
/// and every advance request carries the round it was made in. A request
/// from an earlier round is dropped, so whichever trigger lands first wins
/// and the other becomes a no-op.
pub struct Session {
    settings: Settings,
    phase: Phase,
    generator: ChallengeGenerator,
    clock: SessionClock,
    stabilizer: PitchStabilizer,
    score: ScoreBoard,
    collab: Collaborators,
    challenge: Option<Challenge>,
    challenge_started_ms: u64,
    session_started_ms: u64,
    stopped_at_ms: Option<u64>,
    round: u64,
    pending: Option<PendingAdvance>,
    listening: bool,
    last_detection: Detection,
    /// Last collaborator failure worth showing the user
    notice: Option<String>,
}

impl Session {
    pub fn new(settings: Settings, generator: ChallengeGenerator, collab: Collaborators) -> Self {
        let settings = settings.sanitized();
        Self {
            settings,
            phase: Phase::Idle,
            generator,
            clock: SessionClock::new(settings.duration),
            stabilizer: PitchStabilizer::new(),
            score: ScoreBoard::new(),
            collab,
            challenge: None,
            challenge_started_ms: 0,
            session_started_ms: 0,
            stopped_at_ms: None,
            round: 0,
            pending: None,
            listening: false,
            last_detection: Detection::silent(),
            notice: None,
        }
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────

    pub fn start(&mut self, now_ms: u64) {
        if self.phase == Phase::Playing {
            return;
        }
        info!(
            "Session start: {}s per challenge, {:?} notes, {:?} mode",
            self.settings.duration, self.settings.note_mode, self.settings.game_mode
        );
        self.score.reset();
        self.session_started_ms = now_ms;
        self.stopped_at_ms = None;
        self.notice = None;
        self.phase = Phase::Playing;
        self.clock.start(self.settings.duration);
        self.draw_challenge(now_ms, false);
        if self.settings.input_mode {
            self.start_listening();
        }
    }

    pub fn stop(&mut self, now_ms: u64) {
        if self.phase != Phase::Playing {
            return;
        }
        self.phase = Phase::Stopped;
        self.stopped_at_ms = Some(now_ms);
        self.clock.stop();
        self.pending = None;
        // Invalidate anything still addressed to the last challenge
        self.round += 1;
        self.collab.narrator.cancel();
        self.challenge = None;
        self.stop_listening();

        let s = self.score.summary();
        info!(
            "Session stopped after {}s: {} / {} correct, avg {:?}ms, fastest {:?}ms",
            self.elapsed_secs(now_ms),
            s.correct,
            s.attempts,
            s.average_ms,
            s.fastest_ms
        );
        if let Some((note, n)) = s.most_failed {
            info!("Most missed: {} ({} mistakes)", note, n);
        }
    }

    pub fn toggle(&mut self, now_ms: u64) {
        if self.phase == Phase::Playing {
            self.stop(now_ms);
        } else {
            self.start(now_ms);
        }
    }

    // ─── Time ───────────────────────────────────────────────────────────

    /// One decisecond of countdown. Call every 100ms.
    pub fn tick(&mut self, now_ms: u64) {
        if self.phase != Phase::Playing {
            return;
        }
        let outcome = self.clock.tick(self.settings.tick_enabled);
        if let Some(cue) = outcome.cue {
            self.collab.tones.play_tick(cue.is_high());
        }
        if outcome.expired {
            debug!("Challenge {} expired", self.round);
            self.pending = Some(PendingAdvance {
                round: self.round,
                due_ms: now_ms + NEXT_CHALLENGE_DELAY_MS,
            });
        }
    }

    /// Fire a pending expiry advance whose pause has elapsed.
    pub fn poll(&mut self, now_ms: u64) {
        if let Some(p) = self.pending {
            if now_ms >= p.due_ms {
                self.pending = None;
                self.request_advance(p.round, now_ms);
            }
        }
    }

    /// When the pending expiry advance is due, if there is one.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.pending.map(|p| p.due_ms)
    }

    /// Advance to the next challenge if `round` is still the current one.
    /// Returns false for stale or out-of-session requests.
    pub fn request_advance(&mut self, round: u64, now_ms: u64) -> bool {
        if self.phase != Phase::Playing || round != self.round {
            debug!("Stale advance for round {} ignored (now {})", round, self.round);
            return false;
        }
        self.draw_challenge(now_ms, true);
        true
    }

    // ─── Pitch input ────────────────────────────────────────────────────

    /// Feed one analysis frame. Frames arriving while input is off are
    /// dropped without touching the stabilizer.
    pub fn on_pitch(&mut self, frequency: Option<f32>, now_ms: u64) -> Detection {
        if !self.listening {
            return Detection::silent();
        }
        let detection = self.stabilizer.push(frequency);
        self.last_detection = detection;

        let Some(heard) = detection.stable_note() else {
            return detection;
        };
        if self.phase != Phase::Playing {
            return detection;
        }
        let Some(target) = self.challenge.as_ref().and_then(Challenge::canonical_root) else {
            return detection;
        };

        if heard == target {
            let reaction = now_ms.saturating_sub(self.challenge_started_ms);
            self.score.record_correct(target, reaction);
            self.collab.tones.play_success_chime();
            self.request_advance(self.round, now_ms);
        } else if self.pending.is_none() {
            // Time is up for this target; a wrong note no longer counts
            self.score.record_mistake(target, now_ms);
        }
        detection
    }

    // ─── Settings ───────────────────────────────────────────────────────

    /// Replace the settings snapshot. A failed microphone start leaves
    /// input mode off and sets a notice; nothing else is affected.
    pub fn update_settings(&mut self, settings: Settings) {
        let new = settings.sanitized();
        let old = std::mem::replace(&mut self.settings, new);

        if new.note_mode != old.note_mode && self.phase != Phase::Playing {
            self.generator.reset_notes();
        }
        if new.duration != old.duration {
            self.clock.set_duration(new.duration);
        }
        if old.voice_enabled && !new.voice_enabled {
            self.collab.narrator.cancel();
        }
        if new.input_mode != old.input_mode && self.phase == Phase::Playing {
            if new.input_mode {
                self.start_listening();
            } else {
                self.stop_listening();
            }
        }
    }

    // ─── Internals ──────────────────────────────────────────────────────

    fn draw_challenge(&mut self, now_ms: u64, count_attempt: bool) {
        if count_attempt {
            self.score.record_attempt();
        }
        let previous_root = self.challenge.as_ref().map(|c| c.root);
        let challenge = self.generator.next(previous_root, &self.settings);
        self.challenge = Some(challenge);
        self.round += 1;
        self.pending = None;
        self.challenge_started_ms = now_ms;
        self.clock.restart();
        // A note held across the change must be heard afresh
        self.stabilizer.reset();

        if self.settings.voice_enabled {
            self.collab.narrator.cancel();
            self.collab
                .narrator
                .speak(&challenge_text(&challenge), challenge.string);
        }
    }

    fn start_listening(&mut self) {
        match self.collab.microphone.start() {
            Ok(()) => {
                self.listening = true;
                self.stabilizer.reset();
                info!("Listening for answers");
            }
            Err(e) => {
                warn!("Audio input unavailable: {}", e);
                self.settings.input_mode = false;
                self.notice = Some(e);
            }
        }
    }

    fn stop_listening(&mut self) {
        self.collab.microphone.stop();
        self.listening = false;
        self.stabilizer.reset();
        self.last_detection = Detection::silent();
    }

    // ─── Observers ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn time_left(&self) -> u32 {
        self.clock.time_left()
    }

    pub fn challenge_started_ms(&self) -> u64 {
        self.challenge_started_ms
    }

    pub fn score(&self) -> &ScoreBoard {
        &self.score
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Whole seconds since `start`, frozen at `stop`.
    pub fn elapsed_secs(&self, now_ms: u64) -> u64 {
        match self.phase {
            Phase::Idle => 0,
            _ => {
                let end = self.stopped_at_ms.unwrap_or(now_ms);
                end.saturating_sub(self.session_started_ms) / 1000
            }
        }
    }

    /// What the player sees right now.
    pub fn display(&self) -> String {
        match (self.phase, &self.challenge) {
            (Phase::Playing, Some(c)) => c.to_string(),
            (Phase::Idle, _) => IDLE_SENTINEL.to_string(),
            _ => PAUSED_SENTINEL.to_string(),
        }
    }

    pub fn snapshot(&self, now_ms: u64) -> SessionSnapshot {
        SessionSnapshot {
            timestamp_ms: now_ms,
            phase: self.phase,
            round: self.round,
            display: self.display(),
            string: self.challenge.and_then(|c| c.string),
            time_left: self.clock.time_left(),
            total_time: self.clock.duration_ds(),
            elapsed_secs: self.elapsed_secs(now_ms),
            listening: self.listening,
            detection: self.listening.then_some(self.last_detection),
            score: self.score.summary(),
            settings: self.settings,
            notice: self.notice.clone(),
        }
    }
}

/// Immutable view of the session for displays and loggers.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub timestamp_ms: u64,
    pub phase: Phase,
    pub round: u64,
    /// Challenge text or a sentinel
    pub display: String,
    pub string: Option<&'static str>,
    /// Deciseconds
    pub time_left: u32,
    pub total_time: u32,
    pub elapsed_secs: u64,
    pub listening: bool,
    pub detection: Option<Detection>,
    pub score: ScoreSummary,
    pub settings: Settings,
    pub notice: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Tick(bool),
        Chime,
        Speak(String),
        Cancel,
        MicStart,
        MicStop,
    }

    type Log = Arc<Mutex<Vec<Call>>>;

    struct Recorder {
        log: Log,
        mic_fails: bool,
        mic_on: bool,
    }

    impl TonePlayer for Recorder {
        fn play_tick(&mut self, high: bool) {
            self.log.lock().unwrap().push(Call::Tick(high));
        }
        fn play_success_chime(&mut self) {
            self.log.lock().unwrap().push(Call::Chime);
        }
    }

    impl Narrator for Recorder {
        fn speak(&mut self, text: &str, _string: Option<&str>) {
            self.log.lock().unwrap().push(Call::Speak(text.to_string()));
        }
        fn cancel(&mut self) {
            self.log.lock().unwrap().push(Call::Cancel);
        }
    }

    impl Microphone for Recorder {
        fn start(&mut self) -> Result<(), String> {
            if self.mic_fails {
                return Err("permission denied".into());
            }
            self.mic_on = true;
            self.log.lock().unwrap().push(Call::MicStart);
            Ok(())
        }
        fn stop(&mut self) {
            if self.mic_on {
                self.mic_on = false;
                self.log.lock().unwrap().push(Call::MicStop);
            }
        }
        fn is_active(&self) -> bool {
            self.mic_on
        }
    }

    fn recorder(log: &Log, mic_fails: bool) -> Box<Recorder> {
        Box::new(Recorder {
            log: log.clone(),
            mic_fails,
            mic_on: false,
        })
    }

    fn session_with(settings: Settings, mic_fails: bool) -> (Session, Log) {
        let log: Log = Arc::default();
        let collab = Collaborators {
            tones: recorder(&log, mic_fails),
            narrator: recorder(&log, mic_fails),
            microphone: recorder(&log, mic_fails),
        };
        (
            Session::new(settings, ChallengeGenerator::seeded(42), collab),
            log,
        )
    }

    fn count(log: &Log, pred: impl Fn(&Call) -> bool) -> usize {
        log.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    /// Frequency of the A4-octave pitch for a canonical label.
    fn hz_of(label: &str) -> f32 {
        let idx = pitch_class(label).unwrap() as f32;
        440.0 * 2f32.powf(idx / 12.0)
    }

    fn play(session: &mut Session, hz: f32, frames: usize, now_ms: u64) {
        for _ in 0..frames {
            session.on_pitch(Some(hz), now_ms);
        }
    }

    fn listening_settings() -> Settings {
        Settings {
            input_mode: true,
            voice_enabled: false,
            tick_enabled: false,
            ..Settings::default()
        }
    }

    #[test]
    fn test_idle_shows_sentinel() {
        let (s, _) = session_with(Settings::default(), false);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.display(), IDLE_SENTINEL);
        assert_eq!(s.time_left(), 30);
    }

    #[test]
    fn test_start_draws_without_counting_an_attempt() {
        let (mut s, log) = session_with(Settings::default(), false);
        s.start(0);
        assert!(s.is_playing());
        assert!(s.challenge().is_some());
        assert_eq!(s.score().total_attempts(), 0);
        assert_eq!(s.time_left(), 30);
        assert_eq!(count(&log, |c| matches!(c, Call::Speak(_))), 1);
    }

    #[test]
    fn test_expiry_advances_once_after_pause() {
        let settings = Settings {
            duration: 1,
            ..Settings::default()
        };
        let (mut s, log) = session_with(settings, false);
        s.start(0);
        let first_round = s.round();

        for i in 1..=10 {
            s.tick(i * 100);
            s.poll(i * 100);
        }
        assert_eq!(s.time_left(), 0);
        assert_eq!(s.next_deadline_ms(), Some(1200));
        assert_eq!(s.round(), first_round, "no advance before the pause");

        s.poll(1199);
        assert_eq!(s.round(), first_round);
        s.poll(1200);
        assert_eq!(s.round(), first_round + 1);
        assert_eq!(s.time_left(), 10);
        assert_eq!(s.score().total_attempts(), 1);

        // Re-polling does nothing more
        s.poll(1300);
        assert_eq!(s.round(), first_round + 1);
        assert_eq!(count(&log, |c| *c == Call::Tick(true)), 1);
    }

    #[test]
    fn test_stale_advance_is_a_no_op() {
        let (mut s, _) = session_with(Settings::default(), false);
        s.start(0);
        let r = s.round();
        assert!(s.request_advance(r, 10));
        assert!(!s.request_advance(r, 11), "second request for the same round");
        assert_eq!(s.score().total_attempts(), 1);
    }

    #[test]
    fn test_correct_answer_scores_and_advances() {
        let (mut s, log) = session_with(listening_settings(), false);
        s.start(1_000);
        assert!(s.is_listening());
        let target = s.challenge().unwrap().canonical_root().unwrap();
        let round = s.round();

        play(&mut s, hz_of(target), 5, 2_500);

        assert_eq!(s.score().reaction_times_ms(), &[1_500]);
        assert_eq!(s.score().note_stats()[target].correct, 1);
        assert_eq!(s.round(), round + 1);
        assert_eq!(s.score().total_attempts(), 1);
        assert_eq!(count(&log, |c| *c == Call::Chime), 1);
    }

    #[test]
    fn test_match_racing_expiry_advances_once() {
        let settings = Settings {
            duration: 1,
            ..listening_settings()
        };
        let (mut s, _) = session_with(settings, false);
        s.start(0);
        let round = s.round();
        for i in 1..=10 {
            s.tick(i * 100);
        }
        assert!(s.next_deadline_ms().is_some());

        // Answer lands inside the pause
        let target = s.challenge().unwrap().canonical_root().unwrap();
        play(&mut s, hz_of(target), 5, 1_050);
        assert_eq!(s.round(), round + 1);

        s.poll(1_300);
        assert_eq!(s.round(), round + 1, "expiry advance was superseded");
        assert_eq!(s.score().total_attempts(), 1);
    }

    #[test]
    fn test_held_wrong_note_counts_one_mistake_per_cooldown() {
        let (mut s, _) = session_with(listening_settings(), false);
        s.start(0);
        let target = s.challenge().unwrap().canonical_root().unwrap();
        let wrong = canonical_label(pitch_class(target).unwrap() + 6);

        play(&mut s, hz_of(wrong), 5, 100);
        play(&mut s, hz_of(wrong), 20, 600);
        assert_eq!(s.score().note_stats()[target].mistakes, 1);
        play(&mut s, hz_of(wrong), 1, 1_100);
        assert_eq!(s.score().note_stats()[target].mistakes, 2);
    }

    #[test]
    fn test_unstable_frames_do_not_judge() {
        let (mut s, _) = session_with(listening_settings(), false);
        s.start(0);
        let round = s.round();
        let target = s.challenge().unwrap().canonical_root().unwrap();
        play(&mut s, hz_of(target), 4, 100);
        s.on_pitch(None, 150);
        play(&mut s, hz_of(target), 4, 200);
        assert_eq!(s.round(), round);
        assert!(s.score().reaction_times_ms().is_empty());
    }

    #[test]
    fn test_stop_releases_everything() {
        let (mut s, log) = session_with(listening_settings(), false);
        s.start(0);
        for i in 1..=30 {
            s.tick(i * 100);
        }
        assert!(s.next_deadline_ms().is_some());
        s.stop(3_050);

        assert_eq!(s.phase(), Phase::Stopped);
        assert_eq!(s.display(), PAUSED_SENTINEL);
        assert_eq!(s.next_deadline_ms(), None);
        assert_eq!(s.time_left(), 30);
        assert!(!s.is_listening());
        assert_eq!(count(&log, |c| *c == Call::MicStop), 1);
        assert!(count(&log, |c| *c == Call::Cancel) >= 1);

        // Late frames and polls change nothing
        let round = s.round();
        s.poll(5_000);
        assert_eq!(s.on_pitch(Some(440.0), 5_000), Detection::silent());
        s.tick(5_100);
        assert_eq!(s.round(), round);
    }

    #[test]
    fn test_score_survives_stop_until_next_start() {
        let (mut s, _) = session_with(listening_settings(), false);
        s.start(0);
        let target = s.challenge().unwrap().canonical_root().unwrap();
        play(&mut s, hz_of(target), 5, 700);
        s.stop(1_000);
        assert_eq!(s.score().reaction_times_ms(), &[700]);
        assert_eq!(s.snapshot(1_000).score.correct, 1);

        s.start(2_000);
        assert!(s.score().reaction_times_ms().is_empty());
        assert_eq!(s.score().total_attempts(), 0);
        assert!(s.score().note_stats().is_empty());
    }

    #[test]
    fn test_microphone_failure_degrades_to_no_input() {
        let (mut s, _) = session_with(listening_settings(), true);
        s.start(0);
        assert!(s.is_playing(), "session carries on");
        assert!(!s.is_listening());
        assert!(!s.settings().input_mode);
        assert_eq!(s.notice(), Some("permission denied"));
    }

    #[test]
    fn test_toggling_input_while_playing() {
        let (mut s, log) = session_with(Settings::default(), false);
        s.start(0);
        assert!(!s.is_listening());
        s.update_settings(Settings {
            input_mode: true,
            ..*s.settings()
        });
        assert!(s.is_listening());
        s.update_settings(Settings {
            input_mode: false,
            ..*s.settings()
        });
        assert!(!s.is_listening());
        assert_eq!(count(&log, |c| *c == Call::MicStart), 1);
        assert_eq!(count(&log, |c| *c == Call::MicStop), 1);
    }

    #[test]
    fn test_duration_change_while_idle_shows_immediately() {
        let (mut s, _) = session_with(Settings::default(), false);
        s.update_settings(Settings {
            duration: 9,
            ..*s.settings()
        });
        assert_eq!(s.time_left(), 90);
    }

    #[test]
    fn test_note_mode_change_applies_to_next_draw() {
        let (mut s, _) = session_with(Settings::default(), false);
        s.start(0);
        s.update_settings(Settings {
            note_mode: NoteMode::Flat,
            ..*s.settings()
        });
        let r = s.round();
        s.request_advance(r, 100);
        assert!(FLATS.contains(&s.challenge().unwrap().root));
    }

    #[test]
    fn test_note_mode_round_trip_while_stopped_starts_fresh() {
        let settings = Settings {
            note_mode: NoteMode::Sharp,
            voice_enabled: false,
            ..Settings::default()
        };
        let (mut s, _) = session_with(settings, false);
        // Leave the sharp bag part-drawn
        s.start(0);
        for i in 1..5 {
            let r = s.round();
            s.request_advance(r, i * 100);
        }
        s.stop(1_000);

        for mode in [NoteMode::Flat, NoteMode::Sharp] {
            s.update_settings(Settings {
                note_mode: mode,
                ..*s.settings()
            });
        }

        s.start(2_000);
        let mut roots = vec![s.challenge().unwrap().root];
        for i in 1..12 {
            let r = s.round();
            s.request_advance(r, 2_000 + i * 100);
            roots.push(s.challenge().unwrap().root);
        }
        roots.sort_unstable();
        let mut pool = SHARPS.to_vec();
        pool.sort_unstable();
        assert_eq!(roots, pool, "next 12 draws are one full permutation");
    }

    #[test]
    fn test_wrong_note_during_pause_is_not_a_mistake() {
        let settings = Settings {
            duration: 1,
            ..listening_settings()
        };
        let (mut s, _) = session_with(settings, false);
        s.start(0);
        let target = s.challenge().unwrap().canonical_root().unwrap();
        let wrong = canonical_label(pitch_class(target).unwrap() + 6);
        for i in 1..=10 {
            s.tick(i * 100);
        }
        assert!(s.next_deadline_ms().is_some());

        play(&mut s, hz_of(wrong), 5, 1_050);
        assert!(s.score().note_stats().get(target).is_none());

        // The next challenge judges again
        s.poll(1_200);
        let next = s.challenge().unwrap().canonical_root().unwrap();
        let wrong = canonical_label(pitch_class(next).unwrap() + 6);
        play(&mut s, hz_of(wrong), 5, 1_300);
        assert_eq!(s.score().note_stats()[next].mistakes, 1);
    }

    #[test]
    fn test_voice_off_is_silent() {
        let settings = Settings {
            voice_enabled: false,
            ..Settings::default()
        };
        let (mut s, log) = session_with(settings, false);
        s.start(0);
        let r = s.round();
        s.request_advance(r, 10);
        assert_eq!(count(&log, |c| matches!(c, Call::Speak(_))), 0);
    }

    #[test]
    fn test_elapsed_time_freezes_on_stop() {
        let (mut s, _) = session_with(Settings::default(), false);
        assert_eq!(s.elapsed_secs(10_000), 0);
        s.start(10_000);
        assert_eq!(s.elapsed_secs(75_500), 65);
        s.stop(80_000);
        assert_eq!(s.elapsed_secs(999_000), 70);
    }
}
