use crate::dsp::PitchTracker;
use crate::microphone::Microphone;
use crate::types::*;
use crossbeam_channel::{Sender, TrySendError};
use hound::{SampleFormat, WavReader};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Samples per analysis frame. ~21ms at 48kHz.
const CHUNK_SIZE: usize = 1024;

/// Replays a WAV file through the pitch tracker at real-time pace, as a
/// stand-in for the microphone.
///
/// Typical use: `--listen --audio-file my_playing.wav`. The file loops
/// until the source is stopped, so a short recording can answer several
/// challenges in a row.
pub struct WavPlayer {
    path: PathBuf,
    tx: Sender<InputEvent>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl WavPlayer {
    pub fn new(path: PathBuf, tx: Sender<InputEvent>) -> Self {
        Self {
            path,
            tx,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }
}

impl Microphone for WavPlayer {
    fn start(&mut self) -> Result<(), String> {
        if self.handle.is_some() {
            return Ok(());
        }
        let (mono, sample_rate) = read_mono(&self.path)?;
        if mono.is_empty() {
            return Err(format!("WAV file {:?} has no samples", self.path));
        }

        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();
        let tx = self.tx.clone();
        let handle = thread::Builder::new()
            .name("wav-player".into())
            .spawn(move || stream(&mono, sample_rate, &tx, &running))
            .map_err(|e| e.to_string())?;
        self.handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            info!("WAV playback stopped");
        }
    }

    fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for WavPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn stream(mono: &[f32], sample_rate: u32, tx: &Sender<InputEvent>, running: &AtomicBool) {
    let mut tracker = PitchTracker::new();
    let chunk_dur = Duration::from_secs_f64(CHUNK_SIZE as f64 / sample_rate as f64);
    let start = Instant::now();
    let mut sent: u32 = 0;

    'outer: while running.load(Ordering::SeqCst) {
        for chunk in mono.chunks(CHUNK_SIZE) {
            if !running.load(Ordering::SeqCst) {
                break 'outer;
            }
            // Pace to real time: wait until this chunk's expected send time
            let target = chunk_dur * sent;
            let elapsed = start.elapsed();
            if elapsed < target {
                thread::sleep(target - elapsed);
            }
            sent += 1;

            // Never block: the coordinator may be joining this thread
            let estimate = tracker.push(chunk, sample_rate);
            if let Err(TrySendError::Disconnected(_)) = tx.try_send(InputEvent::Pitch(estimate)) {
                break 'outer; // Coordinator shut down
            }
        }
        tracker.reset();
    }
}

/// Read a WAV file and mix it down to mono f32.
pub fn read_mono(path: &Path) -> Result<(Vec<f32>, u32), String> {
    let reader = WavReader::open(path).map_err(|e| {
        error!("Failed to open WAV file {:?}: {}", path, e);
        format!("Failed to open WAV file {path:?}: {e}")
    })?;

    let spec = reader.spec();
    let sample_rate = spec.sample_rate;
    let channels = spec.channels as usize;

    info!(
        "WAV: {:?}  {} Hz  {} ch  {:?}  {} bit",
        path.file_name().unwrap_or_default(),
        sample_rate,
        channels,
        spec.sample_format,
        spec.bits_per_sample,
    );
    if sample_rate != 48000 {
        warn!(
            "WAV sample rate is {} Hz; the analysis window is sized for 48000 Hz",
            sample_rate
        );
    }

    let samples_f32: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .filter_map(|s| s.ok())
            .collect(),
        SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .filter_map(|s| s.ok())
                .map(|s| s as f32 / max)
                .collect()
        }
    };

    let mono: Vec<f32> = if channels == 1 {
        samples_f32
    } else {
        samples_f32
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };
    Ok((mono, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::test_helpers::sine_wave;
    use crate::stabilizer::note_from_frequency;
    use crossbeam_channel::unbounded;
    use hound::{WavSpec, WavWriter};

    fn write_wav(path: &Path, samples: &[f32], channels: u16) {
        let spec = WavSpec {
            channels,
            sample_rate: 48000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut w = WavWriter::create(path, spec).unwrap();
        for &s in samples {
            for _ in 0..channels {
                w.write_sample((s * i16::MAX as f32) as i16).unwrap();
            }
        }
        w.finalize().unwrap();
    }

    #[test]
    fn test_read_mono_mixes_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let tone = sine_wave(440.0, 0.5, 48000, 50);
        write_wav(&path, &tone, 2);

        let (mono, sr) = read_mono(&path).unwrap();
        assert_eq!(sr, 48000);
        assert_eq!(mono.len(), tone.len());
        assert!((mono[100] - tone[100]).abs() < 1e-3);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut player = WavPlayer::new(PathBuf::from("/nonexistent/take.wav"), unbounded().0);
        assert!(player.start().is_err());
        assert!(!player.is_active());
    }

    #[test]
    fn test_streams_pitch_until_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a4.wav");
        write_wav(&path, &sine_wave(440.0, 0.5, 48000, 300), 1);

        let (tx, rx) = unbounded();
        let mut player = WavPlayer::new(path, tx);
        player.start().unwrap();
        assert!(player.is_active());

        let mut notes = Vec::new();
        while notes.len() < 3 {
            match rx.recv_timeout(Duration::from_secs(2)) {
                Ok(InputEvent::Pitch(Some(hz))) => notes.push(note_from_frequency(hz)),
                Ok(_) => {}
                Err(e) => panic!("no pitch frames: {e}"),
            }
        }
        player.stop();
        assert!(!player.is_active());
        assert!(notes.iter().all(|n| *n == Some("A")), "{notes:?}");

        // Nothing arrives once stop has returned
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(100));
        assert!(rx.try_recv().is_err());
    }
}
