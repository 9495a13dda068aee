use fret_drill::challenge::ChallengeGenerator;
use fret_drill::console_display;
use fret_drill::console_input::{self, parse_game_mode, parse_note_mode};
use fret_drill::coordinator;
use fret_drill::microphone::Microphone;
use fret_drill::session::{Collaborators, Session, SessionSnapshot};
use fret_drill::settings::SettingsStore;
use fret_drill::speech::ConsoleNarrator;
use fret_drill::tones::{LogTonePlayer, TonePlayer};
use fret_drill::types::*;
use fret_drill::wav_player::WavPlayer;

use clap::Parser;
use crossbeam_channel::{bounded, Sender};
use log::{info, warn};
use std::path::PathBuf;
use std::thread;

#[derive(Parser)]
#[command(name = "fret-drill")]
#[command(about = "Fretboard note-finding drill with spoken prompts and pitch-detected answers")]
struct Cli {
    /// Settings file (created on first change)
    #[arg(long, default_value = "fret-drill.json")]
    settings: PathBuf,

    /// Seconds per challenge (1-15)
    #[arg(long)]
    duration: Option<u32>,

    /// Note spelling: sharp, flat or mixed
    #[arg(long, value_parser = parse_note_mode)]
    notes: Option<NoteMode>,

    /// Challenge type: single, chords or triads
    #[arg(long, value_parser = parse_game_mode)]
    game: Option<GameMode>,

    /// Don't read challenges aloud
    #[arg(long)]
    no_voice: bool,

    /// Don't play countdown ticks
    #[arg(long)]
    no_tick: bool,

    /// Pin single notes to a guitar string
    #[arg(long)]
    strings: bool,

    /// Judge answers by listening to the instrument
    #[arg(long)]
    listen: bool,

    /// Listen to a WAV file instead of the microphone (loops)
    #[arg(long)]
    audio_file: Option<PathBuf>,

    /// Enable console dashboard (clears the terminal on each redraw)
    #[arg(long)]
    console: bool,

    /// Console dashboard refresh rate (Hz)
    #[arg(long, default_value_t = 10)]
    display_hz: u32,

    /// Seed the challenge generator for a repeatable sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Start playing immediately
    #[arg(long)]
    autostart: bool,
}

impl Cli {
    /// Layer command-line overrides on top of the stored settings.
    fn apply(&self, mut s: Settings) -> Settings {
        if let Some(d) = self.duration {
            s.duration = d;
        }
        if let Some(m) = self.notes {
            s.note_mode = m;
        }
        if let Some(m) = self.game {
            s.game_mode = m;
        }
        if self.no_voice {
            s.voice_enabled = false;
        }
        if self.no_tick {
            s.tick_enabled = false;
        }
        if self.strings {
            s.string_mode = true;
        }
        if self.listen || self.audio_file.is_some() {
            s.input_mode = true;
        }
        s.sanitized()
    }
}

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .init();

    let cli = Cli::parse();
    let store = SettingsStore::new(&cli.settings);
    let stored = store.load();
    let settings = cli.apply(stored);
    if settings != stored {
        if let Err(e) = store.save(&settings) {
            warn!("Failed to save settings to {:?}: {}", store.path(), e);
        }
    }

    info!("═══════════════════════════════════════════════");
    info!("  FRET DRILL v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "  {}s per challenge | {:?} notes | {:?}",
        settings.duration, settings.note_mode, settings.game_mode
    );
    match &cli.audio_file {
        Some(p) => info!("  Input: WAV file {:?}", p),
        None if settings.input_mode => info!("  Input: microphone"),
        None => info!("  Input: none (self-paced)"),
    }
    if cli.console { info!("  UI: Console dashboard"); }
    info!("═══════════════════════════════════════════════");

    // Channel: pitch sources + console → coordinator
    let (input_tx, input_rx) = bounded::<InputEvent>(1024);

    // Channels: coordinator → consumers
    let mut snapshot_txs: Vec<Sender<SessionSnapshot>> = Vec::new();

    let mut handles = Vec::new();

    // ─── Console display (opt-in) ───────────────────────────────────
    if cli.console {
        let (tx, rx) = bounded::<SessionSnapshot>(64);
        snapshot_txs.push(tx);
        let hz = cli.display_hz;
        handles.push(thread::Builder::new().name("display".into()).spawn(move || {
            console_display::ConsoleDisplay::new(rx, hz).run();
        }).expect("spawn display thread"));
    }

    // ─── Coordinator ────────────────────────────────────────────────
    // Audio streams are not Send, so collaborators are built on the
    // coordinator's own thread.
    let audio_file = cli.audio_file.clone();
    let mic_tx = input_tx.clone();
    let seed = cli.seed;
    handles.push(thread::Builder::new().name("coordinator".into()).spawn(move || {
        let generator = match seed {
            Some(s) => ChallengeGenerator::seeded(s),
            None => ChallengeGenerator::new(),
        };
        let collab = build_collaborators(audio_file, mic_tx);
        let session = Session::new(settings, generator, collab);
        coordinator::Coordinator::new(input_rx, snapshot_txs, session, Epoch::new())
            .with_store(store)
            .run();
    }).expect("spawn coordinator thread"));

    if cli.autostart {
        let _ = input_tx.send(InputEvent::Command(Command::Toggle));
    }

    // ─── Console input ──────────────────────────────────────────────
    // Detached: it blocks on stdin and dies with the process.
    thread::Builder::new().name("stdin".into()).spawn(move || {
        let stdin = std::io::stdin();
        console_input::CommandReader::new(stdin.lock(), input_tx).run();
    }).expect("spawn stdin thread");

    for h in handles {
        let _ = h.join();
    }
}

fn build_collaborators(audio_file: Option<PathBuf>, tx: Sender<InputEvent>) -> Collaborators {
    let microphone: Box<dyn Microphone> = match audio_file {
        Some(path) => Box::new(WavPlayer::new(path, tx)),
        None => default_microphone(tx),
    };
    Collaborators {
        tones: tone_player(),
        narrator: Box::new(ConsoleNarrator),
        microphone,
    }
}

#[cfg(feature = "audio")]
fn tone_player() -> Box<dyn TonePlayer> {
    match fret_drill::tones::CpalTonePlayer::start() {
        Ok(p) => Box::new(p),
        Err(e) => {
            warn!("No audio output ({}), cues will be logged", e);
            Box::new(LogTonePlayer)
        }
    }
}

#[cfg(not(feature = "audio"))]
fn tone_player() -> Box<dyn TonePlayer> {
    Box::new(LogTonePlayer)
}

#[cfg(feature = "audio")]
fn default_microphone(tx: Sender<InputEvent>) -> Box<dyn Microphone> {
    Box::new(fret_drill::audio_input::CpalMicrophone::new(tx))
}

#[cfg(not(feature = "audio"))]
fn default_microphone(_tx: Sender<InputEvent>) -> Box<dyn Microphone> {
    Box::new(fret_drill::microphone::NoMicrophone)
}
