// Ports - Interface definitions (contracts)

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Events pushed by the playback engine
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Source metadata is available, duration included
    MetadataLoaded { duration: f64 },
    /// Playback position changed
    TimeUpdate { current_time: f64 },
    /// Playback engine failure; `None` when the engine gives no message
    Error { message: Option<String> },
}

/// Callback the player invokes for every event of the loaded source
pub type PlayerEventSink = Arc<dyn Fn(PlayerEvent) + Send + Sync>;

/// Port for the external playback engine
///
/// Queries and commands are synchronous; the engine reports asynchronous
/// changes through the sink given to `load`.
pub trait PlayerPort: Send + Sync {
    /// Load a source; events for it go to `sink`
    fn load(
        &self,
        source: &MediaSource,
        options: &PlayerOptions,
        sink: PlayerEventSink,
    ) -> Result<(), DomainError>;

    /// Release the current source
    fn dispose(&self);

    /// Current position in seconds
    fn current_time(&self) -> f64;

    /// Seek to an absolute position in seconds
    fn set_current_time(&self, seconds: f64);

    /// Duration in seconds, NaN while unknown
    fn duration(&self) -> f64;

    fn is_paused(&self) -> bool;

    /// Start playback; engines may refuse (autoplay policies and the like)
    fn play(&self) -> Result<(), DomainError>;

    fn pause(&self);

    fn is_muted(&self) -> bool;

    fn set_muted(&self, muted: bool);

    fn is_fullscreen(&self) -> bool;

    fn request_fullscreen(&self);

    fn exit_fullscreen(&self);
}

/// Port for the trimming backend service
#[async_trait]
pub trait BackendPort: Send + Sync {
    /// Query backend capabilities
    async fn health(&self) -> Result<HealthReport, DomainError>;

    /// Store a video and return its descriptor
    async fn upload(&self, file: &UploadFile) -> Result<VideoDescriptor, DomainError>;

    /// Extract and concatenate segments into one output
    async fn trim(&self, request: &TrimRequest) -> Result<OutputDescriptor, DomainError>;

    /// List stored uploads
    async fn list_videos(&self) -> Result<Vec<VideoDescriptor>, DomainError>;

    /// Delete a stored upload
    async fn delete_video(&self, filename: &str) -> Result<DeleteReport, DomainError>;

    /// Delete a produced output
    async fn delete_output(&self, filename: &str) -> Result<DeleteReport, DomainError>;
}

/// Where a saved download ended up
#[derive(Debug, Clone, PartialEq)]
pub struct SavedDownload {
    pub url: String,
    pub filename: String,
    /// Local path or other location description
    pub location: String,
    pub bytes: u64,
}

/// Port for the "save this URL" action
#[async_trait]
pub trait SavePort: Send + Sync {
    /// Save the resource at `url` under `filename`
    async fn save(&self, url: &str, filename: &str) -> Result<SavedDownload, DomainError>;
}

/// Port for configuration management
#[async_trait]
pub trait ConfigPort: Send + Sync {
    /// Get configuration value
    async fn get_config(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Set configuration value
    async fn set_config(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Load configuration from file
    async fn load_config(&self, file_path: &str) -> Result<(), DomainError>;

    /// Validate configuration
    async fn validate_config(&self) -> Result<(), DomainError>;

    /// Path of the loaded configuration file, if any
    async fn get_config_file_path(&self) -> Result<Option<String>, DomainError>;
}

/// Port for logging and observability
#[async_trait]
pub trait LogPort: Send + Sync {
    async fn info(&self, message: &str);

    /// Log structured event
    async fn log_event(&self, event: &LogEvent);
}

/// Log event with structured data
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub context: HashMap<String, String>,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: chrono::Utc::now(),
            context: HashMap::new(),
        }
    }

    /// Attach a context field
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::Config(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
