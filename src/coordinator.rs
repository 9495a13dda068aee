use crate::session::{Session, SessionSnapshot};
use crate::settings::SettingsStore;
use crate::types::*;
use crossbeam_channel::{after, never, select, tick, Receiver, Sender};
use log::{debug, info, trace, warn};
use std::time::Duration;

/// Countdown resolution: one decisecond.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// The coordinator owns the [`Session`] and is the only thread that
/// touches it. It receives InputEvents (pitch frames and user commands),
/// drives the countdown from a decisecond ticker (restarted with every new
/// challenge), and publishes a
/// [`SessionSnapshot`] to every consumer after each event.
///
/// Consumers get bounded channels; a slow consumer misses snapshots
/// rather than stalling the game.
pub struct Coordinator {
    input_rx: Receiver<InputEvent>,
    snapshot_txs: Vec<Sender<SessionSnapshot>>,
    session: Session,
    store: Option<SettingsStore>,
    epoch: Epoch,
    tick_interval: Duration,
}

impl Coordinator {
    pub fn new(
        input_rx: Receiver<InputEvent>,
        snapshot_txs: Vec<Sender<SessionSnapshot>>,
        session: Session,
        epoch: Epoch,
    ) -> Self {
        Self {
            input_rx,
            snapshot_txs,
            session,
            store: None,
            epoch,
            tick_interval: TICK_INTERVAL,
        }
    }

    /// Persist settings here whenever a command changes them.
    pub fn with_store(mut self, store: SettingsStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the ticker period. Tests run the countdown fast with this.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run until `Quit` arrives or every input sender is gone. Stops the
    /// session on the way out, releasing the microphone.
    pub fn run(&mut self) {
        info!("Coordinator running ({:?} ticks)", self.tick_interval);
        let mut ticker = tick(self.tick_interval);
        let mut ticker_round = self.session.round();
        let input_rx = self.input_rx.clone();
        let mut events: u64 = 0;

        loop {
            // Each countdown's first decisecond starts when its challenge does
            if self.session.round() != ticker_round {
                ticker = tick(self.tick_interval);
                ticker_round = self.session.round();
            }

            let now = self.epoch.now_ms();
            let deadline = match self.session.next_deadline_ms() {
                Some(due) => after(Duration::from_millis(due.saturating_sub(now))),
                None => never(),
            };

            select! {
                recv(input_rx) -> msg => match msg {
                    Ok(event) => {
                        events += 1;
                        if !self.handle(event) {
                            break;
                        }
                    }
                    Err(_) => {
                        debug!("Input channel closed");
                        break;
                    }
                },
                recv(ticker) -> _ => {
                    self.session.tick(self.epoch.now_ms());
                }
                recv(deadline) -> _ => {}
            }

            let now = self.epoch.now_ms();
            self.session.poll(now);
            self.publish(now);
        }

        let now = self.epoch.now_ms();
        self.session.stop(now);
        self.publish(now);
        info!("Coordinator shutting down after {} events", events);
    }

    /// Apply one event. Returns false when the coordinator should exit.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        let now = self.epoch.now_ms();
        match event {
            InputEvent::Pitch(freq) => {
                let d = self.session.on_pitch(freq, now);
                trace!("pitch {:?} -> {:?}", freq, d.note);
            }
            InputEvent::Command(Command::Quit) => {
                info!("Quit requested");
                return false;
            }
            InputEvent::Command(Command::Toggle) => self.session.toggle(now),
            InputEvent::Command(cmd) => {
                let updated = apply_command(*self.session.settings(), cmd);
                self.session.update_settings(updated);
                self.persist();
            }
        }
        true
    }

    fn persist(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(self.session.settings()) {
                warn!("Failed to save settings to {:?}: {}", store.path(), e);
            }
        }
    }

    fn publish(&self, now_ms: u64) {
        if self.snapshot_txs.is_empty() {
            return;
        }
        let snapshot = self.session.snapshot(now_ms);
        for tx in &self.snapshot_txs {
            let _ = tx.try_send(snapshot.clone());
        }
    }
}

/// The settings a settings-changing command produces. Toggle and Quit
/// leave settings untouched.
pub fn apply_command(mut settings: Settings, cmd: Command) -> Settings {
    match cmd {
        Command::SetDuration(secs) => settings.duration = secs,
        Command::SetNoteMode(m) => settings.note_mode = m,
        Command::SetGameMode(m) => settings.game_mode = m,
        Command::ToggleVoice => settings.voice_enabled = !settings.voice_enabled,
        Command::ToggleTick => settings.tick_enabled = !settings.tick_enabled,
        Command::ToggleStrings => settings.string_mode = !settings.string_mode,
        Command::ToggleInput => settings.input_mode = !settings.input_mode,
        Command::Toggle | Command::Quit => {}
    }
    settings.sanitized()
}
