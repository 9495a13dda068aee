//! Line commands from a terminal, turned into `InputEvent::Command`s.
//!
//! Works with any `BufRead`, so tests feed it an in-memory buffer.

use crate::types::*;
use crossbeam_channel::Sender;
use log::{info, warn};
use std::io::BufRead;

pub const HELP: &str = "commands: <enter>/space start-stop | d <1-15> | n sharp|flat|mixed | \
g single|chords|triads | voice | tick | strings | listen | q";

/// Parse one input line. Blank lines toggle play, like the space key.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Toggle);
    };
    let arg = words.next();
    let cmd = match (head.to_ascii_lowercase().as_str(), arg) {
        ("space" | "s" | "start" | "stop", None) => Command::Toggle,
        ("d" | "duration", Some(n)) => {
            let secs: u32 = n.parse().map_err(|_| format!("not a number: {n}"))?;
            if !(MIN_DURATION..=MAX_DURATION).contains(&secs) {
                return Err(format!("duration must be {MIN_DURATION}-{MAX_DURATION}"));
            }
            Command::SetDuration(secs)
        }
        ("n" | "notes", Some(m)) => Command::SetNoteMode(parse_note_mode(m)?),
        ("g" | "game", Some(m)) => Command::SetGameMode(parse_game_mode(m)?),
        ("voice", None) => Command::ToggleVoice,
        ("tick", None) => Command::ToggleTick,
        ("strings", None) => Command::ToggleStrings,
        ("listen" | "mic", None) => Command::ToggleInput,
        ("q" | "quit" | "exit", None) => Command::Quit,
        _ => return Err(format!("unknown command: {}", line.trim())),
    };
    Ok(cmd)
}

pub fn parse_note_mode(s: &str) -> Result<NoteMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "sharp" | "sharps" => Ok(NoteMode::Sharp),
        "flat" | "flats" => Ok(NoteMode::Flat),
        "mixed" => Ok(NoteMode::Mixed),
        other => Err(format!("unknown note mode: {other}")),
    }
}

pub fn parse_game_mode(s: &str) -> Result<GameMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "single" => Ok(GameMode::Single),
        "chords" => Ok(GameMode::Chords),
        "triads" => Ok(GameMode::Triads),
        other => Err(format!("unknown game mode: {other}")),
    }
}

/// Reads lines until EOF or `q`, forwarding each parsed command.
pub struct CommandReader<R: BufRead> {
    reader: R,
    tx: Sender<InputEvent>,
}

impl<R: BufRead> CommandReader<R> {
    pub fn new(reader: R, tx: Sender<InputEvent>) -> Self {
        Self { reader, tx }
    }

    pub fn run(self) {
        info!("{}", HELP);
        for line in self.reader.lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Ok(cmd) => {
                    if self.tx.send(InputEvent::Command(cmd)).is_err() || cmd == Command::Quit {
                        return;
                    }
                }
                Err(e) => warn!("{e}. {HELP}"),
            }
        }
        // EOF: nobody is left to type, shut down cleanly
        let _ = self.tx.send(InputEvent::Command(Command::Quit));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::io::Cursor;

    #[test]
    fn test_toggle_forms() {
        assert_eq!(parse_command(""), Ok(Command::Toggle));
        assert_eq!(parse_command("   "), Ok(Command::Toggle));
        assert_eq!(parse_command("space"), Ok(Command::Toggle));
    }

    #[test]
    fn test_settings_commands() {
        assert_eq!(parse_command("d 7"), Ok(Command::SetDuration(7)));
        assert_eq!(parse_command("n flat"), Ok(Command::SetNoteMode(NoteMode::Flat)));
        assert_eq!(parse_command("G Triads"), Ok(Command::SetGameMode(GameMode::Triads)));
        assert_eq!(parse_command("voice"), Ok(Command::ToggleVoice));
        assert_eq!(parse_command("tick"), Ok(Command::ToggleTick));
        assert_eq!(parse_command("strings"), Ok(Command::ToggleStrings));
        assert_eq!(parse_command("listen"), Ok(Command::ToggleInput));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse_command("d 0").is_err());
        assert!(parse_command("d 16").is_err());
        assert!(parse_command("d five").is_err());
        assert!(parse_command("n natural").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn test_reader_forwards_until_quit() {
        let (tx, rx) = unbounded();
        let input = Cursor::new("\nd 5\nbogus\nq\nvoice\n");
        CommandReader::new(input, tx).run();
        let cmds: Vec<_> = rx
            .try_iter()
            .map(|e| match e {
                InputEvent::Command(c) => c,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            cmds,
            vec![Command::Toggle, Command::SetDuration(5), Command::Quit]
        );
    }

    #[test]
    fn test_reader_quits_at_eof() {
        let (tx, rx) = unbounded();
        CommandReader::new(Cursor::new("tick\n"), tx).run();
        let last = rx.try_iter().last();
        assert!(matches!(last, Some(InputEvent::Command(Command::Quit))));
    }
}
