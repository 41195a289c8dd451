// Tracing log adapter - Structured logging using tracing crate

use crate::ports::*;
use async_trait::async_trait;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins over `level` when set. Returns `false` when a subscriber
/// was already installed (tests, embedding applications).
pub fn init_tracing(level: LogLevel, json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "trimx_studio={level},studio={level}",
            level = level.as_str()
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}

/// Tracing log adapter
pub struct TracingLogAdapter {
    current_level: LogLevel,
}

impl TracingLogAdapter {
    /// Create a log adapter filtering below `level`
    pub fn new(level: LogLevel) -> Self {
        Self {
            current_level: level,
        }
    }

    /// Check if log level should be logged
    fn should_log(&self, level: &LogLevel) -> bool {
        level >= &self.current_level
    }

    /// Render context fields in a stable order
    fn render_context(event: &LogEvent) -> String {
        let mut fields: Vec<_> = event.context.iter().collect();
        fields.sort();
        fields
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TracingLogAdapter {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

#[async_trait]
impl LogPort for TracingLogAdapter {
    async fn info(&self, message: &str) {
        if self.should_log(&LogLevel::Info) {
            info!("{}", message);
        }
    }

    async fn log_event(&self, event: &LogEvent) {
        if !self.should_log(&event.level) {
            return;
        }

        let context = Self::render_context(event);
        let kind = event.context.get("kind").map(String::as_str).unwrap_or("-");
        let timestamp = event.timestamp.to_rfc3339();

        match event.level {
            LogLevel::Error => {
                tracing::error!(message = %event.message, kind, %timestamp, %context);
            }
            LogLevel::Warn => {
                tracing::warn!(message = %event.message, kind, %timestamp, %context);
            }
            LogLevel::Info => {
                tracing::info!(message = %event.message, kind, %timestamp, %context);
            }
            LogLevel::Debug => {
                tracing::debug!(message = %event.message, kind, %timestamp, %context);
            }
            LogLevel::Trace => {
                tracing::trace!(message = %event.message, kind, %timestamp, %context);
            }
        }
    }
}
