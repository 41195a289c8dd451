// Domain models - Core types and data structures

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Stable identifier handed out by the segment store
pub type SegmentId = u64;

/// Uploaded video as described by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDescriptor {
    pub filename: String,
    /// Playable (streaming) source URL
    pub url: String,
    /// Duration in seconds
    pub duration: f64,
    /// Stored size in bytes, when the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl VideoDescriptor {
    pub fn new(filename: impl Into<String>, url: impl Into<String>, duration: f64) -> Self {
        Self {
            filename: filename.into(),
            url: url.into(),
            duration,
            size: None,
        }
    }

    /// A descriptor without a finite, non-negative duration blocks every
    /// duration-dependent command until a new video is loaded.
    pub fn has_usable_duration(&self) -> bool {
        self.duration.is_finite() && self.duration >= 0.0
    }
}

/// One in/out interval of the source video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,
    pub start: f64,
    pub end: f64,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn bounds(&self) -> SegmentBounds {
        SegmentBounds {
            start: self.start,
            end: self.end,
        }
    }
}

/// Wire form of a segment inside a trim request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentBounds {
    pub start: f64,
    pub end: f64,
}

/// Display row for one segment of the sorted view
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRow {
    pub id: SegmentId,
    /// 1-based position in the sorted view
    pub number: usize,
    pub start_label: String,
    pub end_label: String,
    pub duration_label: String,
}

impl fmt::Display for SegmentRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Segment {}  {} → {}  ({})",
            self.number, self.start_label, self.end_label, self.duration_label
        )
    }
}

/// Result of a successful trim request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDescriptor {
    pub output_filename: String,
    /// Output size in bytes
    pub output_size: u64,
    /// Streaming URL of the output
    pub output_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments_count: Option<usize>,
}

/// Body of `POST /api/trim`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimRequest {
    pub video_filename: String,
    pub segments: Vec<SegmentBounds>,
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ffmpeg_available: bool,
}

/// Body of the delete endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteReport {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// File handed to the session for upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    /// Declared media type, if the source provided one
    pub media_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, media_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            media_type,
            data,
        }
    }

    /// Lowercased extension without the dot
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Session workflow phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No video loaded
    Idle,
    Uploading,
    /// Video loaded, editing segments
    Ready,
    Processing,
    /// Output ready for download
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Uploading => "uploading",
            Phase::Ready => "ready",
            Phase::Processing => "processing",
            Phase::Complete => "complete",
        };
        write!(f, "{}", name)
    }
}

/// Text of the pending start/end fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRange {
    pub start: String,
    pub end: String,
}

impl PendingRange {
    /// Field text for a time value, one decimal place
    pub fn field_text(seconds: f64) -> String {
        format!("{:.1}", seconds)
    }

    /// Parse both fields as seconds
    pub fn parse(&self) -> Result<(f64, f64), DomainError> {
        let start = Self::parse_field(&self.start);
        let end = Self::parse_field(&self.end);
        match (start, end) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(DomainError::Validation(
                "Please enter valid start and end times".to_string(),
            )),
        }
    }

    pub fn clear(&mut self) {
        self.start.clear();
        self.end.clear();
    }

    fn parse_field(text: &str) -> Option<f64> {
        text.trim().parse::<f64>().ok().filter(|value| !value.is_nan())
    }
}

/// Source handed to the player
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    pub url: String,
    pub media_type: String,
}

/// How much of the source the player fetches before playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preload {
    None,
    Metadata,
    Auto,
}

/// Player construction options
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerOptions {
    pub controls: bool,
    pub autoplay: bool,
    pub preload: Preload,
    pub playback_rates: Vec<f64>,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            controls: true,
            autoplay: false,
            preload: Preload::Metadata,
            playback_rates: vec![0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0],
        }
    }
}
