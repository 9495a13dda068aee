//! Pitch sources the session can switch on and off.

/// A source of per-frame pitch estimates (`InputEvent::Pitch`).
///
/// `stop` must release the underlying device before returning and must be
/// safe to call when already stopped.
pub trait Microphone {
    fn start(&mut self) -> Result<(), String>;
    fn stop(&mut self);
    fn is_active(&self) -> bool;
}

/// Stand-in when no audio input is available in this build.
#[derive(Debug, Default)]
pub struct NoMicrophone;

impl Microphone for NoMicrophone {
    fn start(&mut self) -> Result<(), String> {
        Err("audio input is not available (built without the `audio` feature)".to_string())
    }

    fn stop(&mut self) {}

    fn is_active(&self) -> bool {
        false
    }
}
