pub mod challenge;
pub mod clock;
pub mod console_display;
pub mod console_input;
pub mod coordinator;
pub mod dsp;
pub mod microphone;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod shuffle_bag;
pub mod speech;
pub mod stabilizer;
pub mod tones;
pub mod types;
pub mod wav_player;

#[cfg(feature = "audio")]
pub mod audio_input;
