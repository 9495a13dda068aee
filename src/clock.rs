//! Per-challenge countdown, advanced one decisecond per tick.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
}

/// Sound cue requested by a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickCue {
    /// Whole-second boundary
    Low,
    /// Countdown reached zero
    High,
}

impl TickCue {
    pub fn is_high(self) -> bool {
        matches!(self, TickCue::High)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub cue: Option<TickCue>,
    /// True on exactly one tick per countdown: the one that reaches zero.
    pub expired: bool,
}

/// Countdown in deciseconds. The owner calls [`tick`](Self::tick) every
/// 100 ms of wall time; the clock itself never reads the time.
///
/// A duration change while running is held until the next
/// [`restart`](Self::restart). While stopped it shows immediately.
#[derive(Debug, Clone)]
pub struct SessionClock {
    state: ClockState,
    /// Duration to use for the next countdown
    duration_ds: u32,
    time_left: u32,
}

impl SessionClock {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            state: ClockState::Stopped,
            duration_ds: duration_secs * 10,
            time_left: duration_secs * 10,
        }
    }

    pub fn start(&mut self, duration_secs: u32) {
        self.duration_ds = duration_secs * 10;
        self.restart();
    }

    /// Begin a new countdown from the configured duration.
    pub fn restart(&mut self) {
        self.time_left = self.duration_ds;
        self.state = ClockState::Running;
    }

    /// Halt without expiring; the display goes back to the full duration.
    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.time_left = self.duration_ds;
    }

    pub fn set_duration(&mut self, duration_secs: u32) {
        self.duration_ds = duration_secs * 10;
        if self.state == ClockState::Stopped {
            self.time_left = self.duration_ds;
        }
    }

    pub fn tick(&mut self, tick_enabled: bool) -> TickOutcome {
        if self.state != ClockState::Running || self.time_left == 0 {
            return TickOutcome::default();
        }
        self.time_left -= 1;

        if self.time_left == 0 {
            return TickOutcome {
                cue: tick_enabled.then_some(TickCue::High),
                expired: true,
            };
        }
        let cue = (tick_enabled && self.time_left % 10 == 0).then_some(TickCue::Low);
        TickOutcome {
            cue,
            expired: false,
        }
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn duration_ds(&self) -> u32 {
        self.duration_ds
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(clock: &mut SessionClock, ticks: usize, tick_enabled: bool) -> Vec<TickOutcome> {
        (0..ticks).map(|_| clock.tick(tick_enabled)).collect()
    }

    #[test]
    fn test_counts_down_and_expires_once() {
        let mut clock = SessionClock::new(3);
        clock.start(3);
        assert_eq!(clock.time_left(), 30);

        let out = run(&mut clock, 40, true);
        assert_eq!(clock.time_left(), 0);
        assert_eq!(out.iter().filter(|o| o.expired).count(), 1);
        assert!(out[29].expired);
        assert_eq!(out[29].cue, Some(TickCue::High));
        // Nothing after expiry
        assert!(out[30..].iter().all(|o| *o == TickOutcome::default()));
    }

    #[test]
    fn test_low_cue_on_whole_seconds_only() {
        let mut clock = SessionClock::new(3);
        clock.start(3);
        let out = run(&mut clock, 30, true);
        let lows: Vec<usize> = out
            .iter()
            .enumerate()
            .filter(|(_, o)| o.cue == Some(TickCue::Low))
            .map(|(i, _)| i)
            .collect();
        // time_left 20 and 10
        assert_eq!(lows, vec![9, 19]);
    }

    #[test]
    fn test_no_cues_when_ticks_disabled() {
        let mut clock = SessionClock::new(2);
        clock.start(2);
        let out = run(&mut clock, 20, false);
        assert!(out.iter().all(|o| o.cue.is_none()));
        assert!(out[19].expired, "expiry does not depend on the tick sound");
    }

    #[test]
    fn test_stop_resets_without_expiring() {
        let mut clock = SessionClock::new(2);
        clock.start(2);
        run(&mut clock, 5, true);
        clock.stop();
        assert_eq!(clock.time_left(), 20);
        assert_eq!(clock.tick(true), TickOutcome::default());
    }

    #[test]
    fn test_duration_change_while_stopped_shows_immediately() {
        let mut clock = SessionClock::new(3);
        clock.set_duration(7);
        assert_eq!(clock.time_left(), 70);
    }

    #[test]
    fn test_duration_change_while_running_waits_for_restart() {
        let mut clock = SessionClock::new(3);
        clock.start(3);
        clock.tick(false);
        clock.set_duration(5);
        assert_eq!(clock.time_left(), 29);
        clock.restart();
        assert_eq!(clock.time_left(), 50);
    }
}
