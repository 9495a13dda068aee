use crate::session::{Phase, SessionSnapshot};
use crate::stabilizer::display_label;
use crossbeam_channel::Receiver;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Renders a live ASCII dashboard of the session.
pub struct ConsoleDisplay {
    rx: Receiver<SessionSnapshot>,
    update_hz: u32,
}

impl ConsoleDisplay {
    pub fn new(rx: Receiver<SessionSnapshot>, update_hz: u32) -> Self {
        Self { rx, update_hz }
    }

    pub fn run(&self) {
        let period = Duration::from_millis(1000 / self.update_hz.max(1) as u64);
        let mut last_draw: Option<Instant> = None;
        let mut last_phase = None;
        let mut stdout = io::stdout();

        for snap in self.rx.iter() {
            // Always draw phase changes so the final state is never skipped
            let due = last_draw.map_or(true, |t| t.elapsed() >= period);
            if !due && last_phase == Some(snap.phase) {
                continue;
            }
            last_draw = Some(Instant::now());
            last_phase = Some(snap.phase);

            // Clear screen and move cursor home
            print!("\x1b[2J\x1b[H");
            print!("{}", render(&snap));
            let _ = stdout.flush();
        }
    }
}

/// Content columns inside the box.
const WIDTH: usize = 56;

/// The full dashboard for one snapshot.
pub fn render(snap: &SessionSnapshot) -> String {
    let mut out = String::new();
    let mut line = |s: String| {
        out.push_str(&s);
        out.push('\n');
    };

    line(format!("╔{}╗", "═".repeat(WIDTH + 2)));
    line(format!("║  {}", pad("FRET DRILL", WIDTH)));
    line(format!("╠{}╣", "═".repeat(WIDTH + 2)));
    line(format!("║  {}", pad("", WIDTH)));
    line(format!("║  {}", pad(&format!("      {}", snap.display), WIDTH)));
    match snap.string {
        Some(s) => line(format!("║  {}", pad(&format!("      on the {} string", s), WIDTH))),
        None => line(format!("║  {}", pad("", WIDTH))),
    }
    line(format!("║  {}", pad("", WIDTH)));

    let frac = if snap.total_time == 0 {
        0.0
    } else {
        snap.time_left as f32 / snap.total_time as f32
    };
    line(format!(
        "║  {}",
        pad(
            &format!("{} {:>4.1}s", make_bar(frac, 30), snap.time_left as f32 / 10.0),
            WIDTH
        )
    ));
    line(format!(
        "║  {}",
        pad(&format!("Elapsed: {}", format_elapsed(snap.elapsed_secs)), WIDTH)
    ));

    line(format!("║  {}", pad("", WIDTH)));
    line(format!("║  {}", pad(&detection_line(snap), WIDTH)));

    let s = &snap.score;
    line(format!("║  {}", pad("", WIDTH)));
    line(format!(
        "║  {}",
        pad(&format!("Score: {} / {}", s.correct, s.attempts), WIDTH)
    ));
    line(format!(
        "║  {}",
        pad(
            &format!(
                "Avg: {:<10} Fastest: {}",
                format_ms(s.average_ms),
                format_ms(s.fastest_ms)
            ),
            WIDTH
        )
    ));
    if let Some((note, n)) = s.most_failed {
        line(format!("║  {}", pad(&format!("Most missed: {note} ({n})"), WIDTH)));
    }
    if let (Some(slow), Some(fast)) = (s.slowest_note, s.fastest_note) {
        line(format!(
            "║  {}",
            pad(&format!("Slowest note: {slow}   Quickest note: {fast}"), WIDTH)
        ));
    }
    if !s.recent_ms.is_empty() {
        line(format!("║  {}", pad(&format!("Trend: {}", sparkline(&s.recent_ms)), WIDTH)));
    }

    let st = &snap.settings;
    line(format!("║  {}", pad("", WIDTH)));
    line(format!(
        "║  {}",
        pad(
            &format!(
                "{}s | {:?} | {:?} | voice {} | tick {} | strings {}",
                st.duration,
                st.note_mode,
                st.game_mode,
                on_off(st.voice_enabled),
                on_off(st.tick_enabled),
                on_off(st.string_mode)
            ),
            WIDTH
        )
    ));
    if let Some(n) = &snap.notice {
        line(format!("║  {}", pad(&format!("! {n}"), WIDTH)));
    }
    if snap.phase != Phase::Playing {
        line(format!("║  {}", pad("press <enter> to start", WIDTH)));
    }
    line(format!("╚{}╝", "═".repeat(WIDTH + 2)));
    out
}

fn detection_line(snap: &SessionSnapshot) -> String {
    if !snap.listening {
        return "Mic: off".to_string();
    }
    match snap.detection.and_then(|d| d.note.map(|n| (d, n))) {
        Some((d, note)) => format!(
            "Mic: {:<5} {:>7.1} Hz  {}",
            display_label(note),
            d.frequency.unwrap_or(0.0),
            if d.stable { "●" } else { "○" }
        ),
        None => "Mic: ---".to_string(),
    }
}

/// Whole seconds as `MM:SS`.
pub fn format_elapsed(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn format_ms(ms: Option<u64>) -> String {
    match ms {
        Some(ms) => format!("{:.2}s", ms as f64 / 1000.0),
        None => "--".to_string(),
    }
}

fn on_off(b: bool) -> &'static str {
    if b {
        "on"
    } else {
        "off"
    }
}

fn make_bar(val: f32, width: usize) -> String {
    let filled = (val.clamp(0.0, 1.0) * width as f32).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// One block character per reaction time, scaled to the slowest.
fn sparkline(values: &[u64]) -> String {
    const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    let max = values.iter().copied().max().unwrap_or(0).max(1);
    values
        .iter()
        .map(|&v| LEVELS[((v * 7) / max) as usize])
        .collect()
}

/// Pad to `width` chars (not bytes) and close the box.
fn pad(s: &str, width: usize) -> String {
    let mut out: String = s.chars().take(width).collect();
    let n = out.chars().count();
    out.push_str(&" ".repeat(width - n));
    out.push('║');
    out
}
