//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::error::{StudioError, StudioResult};
use crate::keyboard::{InputContext, KeyCode, KeyEvent};
use crate::utils::time::parse_time;

/// Output format for printed results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Arguments for the videos command
#[derive(Args, Debug)]
pub struct VideosArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the upload command
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Video file to upload
    #[arg(short, long)]
    pub input: PathBuf,

    /// Declared media type (default: none, the extension decides)
    #[arg(long)]
    pub media_type: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Video file to upload
    #[arg(short, long)]
    pub input: PathBuf,

    /// Declared media type (default: none, the extension decides)
    #[arg(long)]
    pub media_type: Option<String>,

    /// Segment to keep, START-END (seconds, MM:SS or HH:MM:SS); repeatable
    #[arg(short = 's', long = "segment", value_name = "START-END")]
    pub segments: Vec<String>,

    /// Keyboard script run against the loaded video,
    /// e.g. "Digit1 KeyI Space wait:5 KeyO input:Enter"
    #[arg(long)]
    pub keys: Option<String>,

    /// Save the output into the download directory
    #[arg(long)]
    pub download: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the delete commands
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// File name on the backend
    pub filename: String,
}

/// One step of a key script
#[derive(Debug, Clone, PartialEq)]
pub enum KeyStep {
    Press {
        event: KeyEvent,
        context: InputContext,
    },
    /// Let playback run for this many seconds
    Wait(f64),
}

/// Parse a `START-END` segment argument into seconds
pub fn parse_segment_spec(spec: &str) -> StudioResult<(f64, f64)> {
    let invalid = || StudioError::InvalidSegmentSpec {
        spec: spec.to_string(),
    };

    let (start, end) = spec.split_once('-').ok_or_else(invalid)?;
    let start = parse_time(start).map_err(|_| invalid())?;
    let end = parse_time(end).map_err(|_| invalid())?;
    Ok((start, end))
}

/// Parse a key script
///
/// Tokens are separated by whitespace or commas. A token is a DOM key code
/// (`KeyI`, `Digit5`, `ArrowLeft`, `Space`, ...) or a single letter or digit,
/// optionally prefixed with `Shift+` and/or `input:` (the key is pressed
/// while a text field has focus). `wait:SECONDS` advances playback.
pub fn parse_key_script(script: &str) -> StudioResult<Vec<KeyStep>> {
    script
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(parse_key_token)
        .collect()
}

fn parse_key_token(token: &str) -> StudioResult<KeyStep> {
    let invalid = |reason: &str| StudioError::InvalidKeyToken {
        token: token.to_string(),
        reason: reason.to_string(),
    };

    if let Some(seconds) = token.strip_prefix("wait:") {
        let seconds: f64 = seconds
            .parse()
            .map_err(|_| invalid("wait needs a number of seconds"))?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(invalid("wait must be a non-negative number"));
        }
        return Ok(KeyStep::Wait(seconds));
    }

    let (context, rest) = match token.strip_prefix("input:") {
        Some(rest) => (InputContext::TextInput, rest),
        None => (InputContext::Document, token),
    };
    let (shift, code) = match rest.strip_prefix("Shift+") {
        Some(code) => (true, code),
        None => (false, rest),
    };

    let code = match code.chars().collect::<Vec<_>>().as_slice() {
        [c] if c.is_ascii_alphabetic() => KeyCode::Letter(c.to_ascii_uppercase()),
        [c] if c.is_ascii_digit() => KeyCode::Digit(*c as u8 - b'0'),
        _ => KeyCode::from_code(code),
    };
    if matches!(code, KeyCode::Other(_)) {
        return Err(invalid("unknown key code"));
    }

    let mut event = KeyEvent::new(code);
    if shift {
        event = event.with_shift();
    }
    Ok(KeyStep::Press { event, context })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segment_spec() {
        assert_eq!(parse_segment_spec("10-20").unwrap(), (10.0, 20.0));
        assert_eq!(parse_segment_spec("0:50-1:10").unwrap(), (50.0, 70.0));
        assert_eq!(parse_segment_spec(" 1.5 - 3 ").unwrap(), (1.5, 3.0));
        assert!(parse_segment_spec("10").is_err());
        assert!(parse_segment_spec("a-b").is_err());
    }

    #[test]
    fn test_parse_key_script() {
        let steps = parse_key_script("Digit1 KeyI, Space wait:5 o Shift+Digit5 input:Enter").unwrap();
        assert_eq!(
            steps,
            vec![
                KeyStep::Press {
                    event: KeyEvent::code("Digit1"),
                    context: InputContext::Document
                },
                KeyStep::Press {
                    event: KeyEvent::code("KeyI"),
                    context: InputContext::Document
                },
                KeyStep::Press {
                    event: KeyEvent::code("Space"),
                    context: InputContext::Document
                },
                KeyStep::Wait(5.0),
                KeyStep::Press {
                    event: KeyEvent::new(KeyCode::Letter('O')),
                    context: InputContext::Document
                },
                KeyStep::Press {
                    event: KeyEvent::new(KeyCode::Digit(5)).with_shift(),
                    context: InputContext::Document
                },
                KeyStep::Press {
                    event: KeyEvent::code("Enter"),
                    context: InputContext::TextInput
                },
            ]
        );
    }

    #[test]
    fn test_rejects_bad_tokens() {
        assert!(parse_key_script("Escape").is_err());
        assert!(parse_key_script("wait:soon").is_err());
        assert!(parse_key_script("wait:-1").is_err());
        assert!(parse_key_script("").unwrap().is_empty());
    }
}
