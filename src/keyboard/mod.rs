//! Keyboard command dispatcher
//!
//! Maps key events to workspace commands. Resolution is a pure function of
//! the key, its modifiers and the input context the event came from;
//! execution runs against the [`PlaybackAdapter`] and only when it reports
//! a usable duration.

use std::fmt;

use tracing::debug;

use crate::playback::PlaybackAdapter;

/// Seconds moved by the seek keys
pub const SEEK_STEP: f64 = 10.0;

/// Seconds moved by the frame-step keys
pub const FRAME_STEP: f64 = 0.1;

/// Physical key, named after DOM `KeyboardEvent.code` values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyCode {
    Space,
    Enter,
    ArrowLeft,
    ArrowRight,
    Comma,
    Period,
    /// `KeyA`..`KeyZ`, stored uppercase
    Letter(char),
    /// `Digit0`..`Digit9`
    Digit(u8),
    Other(String),
}

impl KeyCode {
    /// Parse a DOM code name such as `KeyK`, `Digit5` or `ArrowLeft`
    pub fn from_code(code: &str) -> Self {
        match code {
            "Space" => return KeyCode::Space,
            "Enter" | "NumpadEnter" => return KeyCode::Enter,
            "ArrowLeft" => return KeyCode::ArrowLeft,
            "ArrowRight" => return KeyCode::ArrowRight,
            "Comma" => return KeyCode::Comma,
            "Period" => return KeyCode::Period,
            _ => {}
        }

        if let Some(letter) = code.strip_prefix("Key") {
            let mut chars = letter.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                if c.is_ascii_alphabetic() {
                    return KeyCode::Letter(c.to_ascii_uppercase());
                }
            }
        }

        if let Some(digit) = code.strip_prefix("Digit") {
            if let Ok(value) = digit.parse::<u8>() {
                if value <= 9 {
                    return KeyCode::Digit(value);
                }
            }
        }

        KeyCode::Other(code.to_string())
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Space => write!(f, "Space"),
            KeyCode::Enter => write!(f, "Enter"),
            KeyCode::ArrowLeft => write!(f, "ArrowLeft"),
            KeyCode::ArrowRight => write!(f, "ArrowRight"),
            KeyCode::Comma => write!(f, "Comma"),
            KeyCode::Period => write!(f, "Period"),
            KeyCode::Letter(c) => write!(f, "Key{}", c),
            KeyCode::Digit(d) => write!(f, "Digit{}", d),
            KeyCode::Other(code) => write!(f, "{}", code),
        }
    }
}

/// A key press with its modifier state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(code: KeyCode) -> Self {
        Self { code, shift: false }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Shorthand for `KeyEvent::new(KeyCode::from_code(code))`
    pub fn code(code: &str) -> Self {
        Self::new(KeyCode::from_code(code))
    }
}

/// Where keyboard focus was when the event fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputContext {
    /// Focus outside any text field
    Document,
    /// Focus inside a text input
    TextInput,
}

/// Workspace commands reachable from the keyboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    TogglePlay,
    /// Seek relative to the current time, clamped to the video
    Seek { delta: f64 },
    /// Pause, then step relative to the current time, clamped to the video
    Step { delta: f64 },
    MarkIn,
    MarkOut,
    AddSegment,
    ToggleMute,
    ToggleFullscreen,
    /// Seek to `digit / 10` of the duration
    JumpToTenth { digit: u8 },
}

/// What an executed command asks of the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandEffect {
    None,
    /// Visual seek pulse in the given direction (seconds)
    SeekPulse { direction: f64 },
    /// Fill the pending start field with this time
    MarkIn { seconds: f64 },
    /// Fill the pending end field with this time
    MarkOut { seconds: f64 },
    /// Add a segment from the pending fields
    AddSegment,
}

/// Result of a handled key event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommandOutcome {
    pub command: Command,
    pub effect: CommandEffect,
}

/// Key-to-command dispatcher
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyboardDispatcher;

impl KeyboardDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a key event to a command
    ///
    /// Inside a text input only Enter is a command; every other key belongs
    /// to text entry.
    pub fn resolve(event: &KeyEvent, context: InputContext) -> Option<Command> {
        if context == InputContext::TextInput {
            return match event.code {
                KeyCode::Enter => Some(Command::AddSegment),
                _ => None,
            };
        }

        match &event.code {
            KeyCode::Space | KeyCode::Letter('K') => Some(Command::TogglePlay),
            KeyCode::ArrowLeft | KeyCode::Letter('J') => Some(Command::Seek { delta: -SEEK_STEP }),
            KeyCode::ArrowRight | KeyCode::Letter('L') => Some(Command::Seek { delta: SEEK_STEP }),
            KeyCode::Comma => Some(Command::Step { delta: -FRAME_STEP }),
            KeyCode::Period => Some(Command::Step { delta: FRAME_STEP }),
            KeyCode::Letter('I') => Some(Command::MarkIn),
            KeyCode::Letter('O') => Some(Command::MarkOut),
            KeyCode::Letter('M') => Some(Command::ToggleMute),
            KeyCode::Letter('F') => Some(Command::ToggleFullscreen),
            KeyCode::Digit(digit) if !event.shift => Some(Command::JumpToTenth { digit: *digit }),
            _ => None,
        }
    }

    /// Resolve and execute a key event
    ///
    /// Returns `None` when the key maps to nothing or the player is not ready;
    /// the caller should then let the event through untouched.
    pub fn dispatch(
        &self,
        event: &KeyEvent,
        context: InputContext,
        playback: &PlaybackAdapter,
    ) -> Option<CommandOutcome> {
        let command = Self::resolve(event, context)?;

        if !playback.is_ready() {
            debug!(key = %event.code, "Video not ready yet");
            return None;
        }

        let effect = self.execute(command, playback);
        debug!(key = %event.code, ?command, ?effect, "Keyboard command executed");
        Some(CommandOutcome { command, effect })
    }

    /// Execute a resolved command; the caller has checked readiness
    pub fn execute(&self, command: Command, playback: &PlaybackAdapter) -> CommandEffect {
        let duration = playback.duration();

        match command {
            Command::TogglePlay => {
                playback.toggle_play();
                CommandEffect::None
            }
            Command::Seek { delta } => {
                let target = clamp_time(playback.current_time() + delta, duration);
                playback.seek_to(target);
                CommandEffect::SeekPulse { direction: delta }
            }
            Command::Step { delta } => {
                playback.pause();
                let target = clamp_time(playback.current_time() + delta, duration);
                playback.seek_to(target);
                CommandEffect::None
            }
            Command::MarkIn => CommandEffect::MarkIn {
                seconds: playback.current_time(),
            },
            Command::MarkOut => CommandEffect::MarkOut {
                seconds: playback.current_time(),
            },
            Command::AddSegment => CommandEffect::AddSegment,
            Command::ToggleMute => {
                playback.toggle_muted();
                CommandEffect::None
            }
            Command::ToggleFullscreen => {
                playback.toggle_fullscreen();
                CommandEffect::None
            }
            Command::JumpToTenth { digit } => {
                playback.seek_to(duration * f64::from(digit) / 10.0);
                CommandEffect::None
            }
        }
    }
}

/// Clamp a time to `[0, duration]`
pub fn clamp_time(seconds: f64, duration: f64) -> f64 {
    seconds.max(0.0).min(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::headless_player::HeadlessPlayer;
    use crate::domain::model::{PlayerOptions, VideoDescriptor};
    use crate::ports::PlayerPort;
    use std::sync::Arc;

    fn ready_playback(duration: f64) -> (Arc<HeadlessPlayer>, PlaybackAdapter) {
        let player = Arc::new(HeadlessPlayer::new());
        let playback = PlaybackAdapter::new(
            Arc::clone(&player) as Arc<dyn PlayerPort>,
            PlayerOptions::default(),
        );
        playback
            .load(&VideoDescriptor::new("clip.mp4", "/api/stream/uploads/clip.mp4", duration))
            .unwrap();
        player.finish_loading(duration);
        (player, playback)
    }

    fn press(playback: &PlaybackAdapter, code: &str) -> Option<CommandOutcome> {
        KeyboardDispatcher::new().dispatch(&KeyEvent::code(code), InputContext::Document, playback)
    }

    #[test]
    fn test_key_code_parsing() {
        assert_eq!(KeyCode::from_code("KeyK"), KeyCode::Letter('K'));
        assert_eq!(KeyCode::from_code("Digit7"), KeyCode::Digit(7));
        assert_eq!(KeyCode::from_code("ArrowLeft"), KeyCode::ArrowLeft);
        assert_eq!(KeyCode::from_code("Digit10"), KeyCode::Other("Digit10".to_string()));
        assert_eq!(KeyCode::from_code("Tab"), KeyCode::Other("Tab".to_string()));
        assert_eq!(KeyCode::Letter('K').to_string(), "KeyK");
    }

    #[test]
    fn test_command_table() {
        let doc = InputContext::Document;
        let cases = [
            ("Space", Some(Command::TogglePlay)),
            ("KeyK", Some(Command::TogglePlay)),
            ("ArrowLeft", Some(Command::Seek { delta: -10.0 })),
            ("KeyJ", Some(Command::Seek { delta: -10.0 })),
            ("ArrowRight", Some(Command::Seek { delta: 10.0 })),
            ("KeyL", Some(Command::Seek { delta: 10.0 })),
            ("Comma", Some(Command::Step { delta: -0.1 })),
            ("Period", Some(Command::Step { delta: 0.1 })),
            ("KeyI", Some(Command::MarkIn)),
            ("KeyO", Some(Command::MarkOut)),
            ("KeyM", Some(Command::ToggleMute)),
            ("KeyF", Some(Command::ToggleFullscreen)),
            ("Digit3", Some(Command::JumpToTenth { digit: 3 })),
            ("Enter", None),
            ("KeyQ", None),
        ];

        for (code, expected) in cases {
            assert_eq!(KeyboardDispatcher::resolve(&KeyEvent::code(code), doc), expected, "{}", code);
        }
    }

    #[test]
    fn test_text_input_only_honours_enter() {
        let ctx = InputContext::TextInput;
        assert_eq!(
            KeyboardDispatcher::resolve(&KeyEvent::code("Enter"), ctx),
            Some(Command::AddSegment)
        );
        for code in ["Space", "KeyK", "ArrowLeft", "KeyI", "Digit5", "Period", "KeyF"] {
            assert_eq!(KeyboardDispatcher::resolve(&KeyEvent::code(code), ctx), None, "{}", code);
        }
    }

    #[test]
    fn test_shifted_digit_is_ignored() {
        let event = KeyEvent::code("Digit5").with_shift();
        assert_eq!(KeyboardDispatcher::resolve(&event, InputContext::Document), None);
    }

    #[test]
    fn test_not_ready_is_noop() {
        let player = Arc::new(HeadlessPlayer::new());
        let playback = PlaybackAdapter::new(
            Arc::clone(&player) as Arc<dyn PlayerPort>,
            PlayerOptions::default(),
        );
        playback
            .load(&VideoDescriptor::new("clip.mp4", "/api/stream/uploads/clip.mp4", 60.0))
            .unwrap();

        assert!(press(&playback, "KeyL").is_none());
        assert_eq!(player.current_time(), 0.0);
    }

    #[test]
    fn test_seek_backward_clamps_to_zero() {
        let (player, playback) = ready_playback(120.0);
        playback.seek_to(5.0);

        let outcome = press(&playback, "ArrowLeft").unwrap();
        assert_eq!(player.current_time(), 0.0);
        assert_eq!(outcome.effect, CommandEffect::SeekPulse { direction: -10.0 });
    }

    #[test]
    fn test_seek_forward_clamps_to_duration() {
        let (player, playback) = ready_playback(120.0);
        playback.seek_to(115.0);

        let outcome = press(&playback, "KeyL").unwrap();
        assert_eq!(player.current_time(), 120.0);
        assert_eq!(outcome.effect, CommandEffect::SeekPulse { direction: 10.0 });
    }

    #[test]
    fn test_frame_step_pauses_and_clamps() {
        let (player, playback) = ready_playback(30.0);
        player.play().unwrap();
        playback.seek_to(0.05);

        press(&playback, "Comma").unwrap();
        assert!(player.is_paused());
        assert_eq!(player.current_time(), 0.0);

        playback.seek_to(29.95);
        press(&playback, "Period").unwrap();
        assert_eq!(player.current_time(), 30.0);
    }

    #[test]
    fn test_digit_jumps_to_fraction() {
        let (player, playback) = ready_playback(200.0);
        press(&playback, "Digit5").unwrap();
        assert_eq!(player.current_time(), 100.0);
        press(&playback, "Digit0").unwrap();
        assert_eq!(player.current_time(), 0.0);
    }

    #[test]
    fn test_mark_in_and_out_report_current_time() {
        let (_player, playback) = ready_playback(60.0);
        playback.seek_to(12.34);

        let outcome = press(&playback, "KeyI").unwrap();
        assert_eq!(outcome.effect, CommandEffect::MarkIn { seconds: 12.34 });

        playback.seek_to(20.0);
        let outcome = press(&playback, "KeyO").unwrap();
        assert_eq!(outcome.effect, CommandEffect::MarkOut { seconds: 20.0 });
    }

    #[test]
    fn test_toggle_commands() {
        let (player, playback) = ready_playback(60.0);

        press(&playback, "Space").unwrap();
        assert!(!player.is_paused());
        press(&playback, "KeyM").unwrap();
        assert!(player.is_muted());
        press(&playback, "KeyF").unwrap();
        assert!(player.is_fullscreen());
    }

    #[test]
    fn test_clamp_time() {
        assert_eq!(clamp_time(-4.0, 10.0), 0.0);
        assert_eq!(clamp_time(14.0, 10.0), 10.0);
        assert_eq!(clamp_time(4.0, 10.0), 4.0);
    }
}
