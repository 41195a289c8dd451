//! Time and size formatting for the workspace, plus time parsing for CLI input

use crate::domain::errors::DomainError;

const BYTE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Format seconds as `M:SS`
///
/// Minutes are not wrapped into hours, so 4500 seconds renders as `75:00`.
/// Non-finite input renders as `0:00` and negative input is treated as zero.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "0:00".to_string();
    }

    let whole = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// Format a byte count with the largest unit keeping the value below 1024
///
/// Values are rounded to two decimals with trailing zeros dropped
/// (`1536 -> "1.5 KB"`, `1048576 -> "1 MB"`). GB is the largest unit, so
/// terabyte-sized counts stay in GB.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{} {}", trim_decimals(value), BYTE_UNITS[unit])
}

fn trim_decimals(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Parse a time given as seconds, `MM:SS(.ms)` or `HH:MM:SS(.ms)`
pub fn parse_time(time_str: &str) -> Result<f64, DomainError> {
    let trimmed = time_str.trim();
    let invalid = || {
        DomainError::Validation(format!(
            "Invalid time '{}'. Expected seconds, MM:SS.ms or HH:MM:SS.ms",
            trimmed
        ))
    };

    let parts: Vec<&str> = trimmed.split(':').collect();
    let seconds = match parts.as_slice() {
        [secs] => secs.parse::<f64>().map_err(|_| invalid())?,
        [mins, secs] => {
            let minutes = mins.parse::<u32>().map_err(|_| invalid())?;
            let seconds = secs.parse::<f64>().map_err(|_| invalid())?;
            if seconds >= 60.0 {
                return Err(invalid());
            }
            minutes as f64 * 60.0 + seconds
        }
        [hours, mins, secs] => {
            let hours = hours.parse::<u32>().map_err(|_| invalid())?;
            let minutes = mins.parse::<u32>().map_err(|_| invalid())?;
            let seconds = secs.parse::<f64>().map_err(|_| invalid())?;
            if minutes >= 60 || seconds >= 60.0 {
                return Err(invalid());
            }
            hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds
        }
        _ => return Err(invalid()),
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid());
    }

    Ok(seconds)
}
