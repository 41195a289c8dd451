// Domain errors - Error taxonomy for the workspace session

use std::fmt;

/// Network-bound phase an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Health,
    Upload,
    Process,
    Library,
    Download,
}

impl RequestPhase {
    /// Generic message used when the backend gives no detail
    pub fn fallback_message(&self) -> &'static str {
        match self {
            RequestPhase::Health => "Health check failed",
            RequestPhase::Upload => "Upload failed",
            RequestPhase::Process => "Processing failed",
            RequestPhase::Library => "Request failed",
            RequestPhase::Download => "Download failed",
        }
    }
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestPhase::Health => "health",
            RequestPhase::Upload => "upload",
            RequestPhase::Process => "process",
            RequestPhase::Library => "library",
            RequestPhase::Download => "download",
        };
        write!(f, "{}", name)
    }
}

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Local validation failure, never reaches the network
    Validation(String),
    /// Backend answered with a non-2xx status
    Backend {
        phase: RequestPhase,
        status: u16,
        message: String,
    },
    /// No response at all (connection refused, broken body, ...)
    Transport { phase: RequestPhase, message: String },
    /// Asynchronous failure reported by the player
    Player(String),
    /// Operation not allowed in the current session phase
    InvalidPhase(String),
    /// Configuration problem
    Config(String),
    /// Local I/O failure
    Io(String),
}

impl DomainError {
    /// Message shown to the user for this error
    ///
    /// Backend and transport failures read the same way; the distinction only
    /// matters for diagnostics.
    pub fn user_message(&self) -> String {
        match self {
            DomainError::Backend { phase, message, .. }
            | DomainError::Transport { phase, message } => {
                format!("{}: {}", phase.fallback_message(), message)
            }
            DomainError::Player(msg) => format!("Error loading video: {}", msg),
            DomainError::Validation(msg)
            | DomainError::InvalidPhase(msg)
            | DomainError::Config(msg)
            | DomainError::Io(msg) => msg.clone(),
        }
    }

    /// Short category name used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation",
            DomainError::Backend { .. } => "backend",
            DomainError::Transport { .. } => "transport",
            DomainError::Player(_) => "player",
            DomainError::InvalidPhase(_) => "invalid_phase",
            DomainError::Config(_) => "config",
            DomainError::Io(_) => "io",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            DomainError::Backend {
                phase,
                status,
                message,
            } => write!(f, "Backend error during {} (HTTP {}): {}", phase, status, message),
            DomainError::Transport { phase, message } => {
                write!(f, "Transport error during {}: {}", phase, message)
            }
            DomainError::Player(msg) => write!(f, "Player error: {}", msg),
            DomainError::InvalidPhase(msg) => write!(f, "Invalid phase: {}", msg),
            DomainError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DomainError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
