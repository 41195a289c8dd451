// Domain rules - Business logic and policies

use crate::domain::errors::*;
use crate::domain::model::*;

/// Declared media types accepted for upload
pub const ACCEPTED_MEDIA_TYPES: &[&str] = &[
    "video/mp4",
    "video/x-matroska",
    "video/avi",
    "video/quicktime",
    "video/webm",
    "video/x-flv",
];

/// Filename extensions accepted for upload
pub const ACCEPTED_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "webm", "flv"];

/// Path segment of the streaming endpoint for outputs
pub const STREAM_OUTPUT_PATH: &str = "/api/stream/output/";

/// Path segment of the direct download endpoint for outputs
pub const DOWNLOAD_OUTPUT_PATH: &str = "/api/output/";

/// Client-side checks applied before a file is sent to the backend
pub struct UploadPolicy;

impl UploadPolicy {
    /// A file passes when either its declared media type or its extension is accepted
    pub fn validate(file: &UploadFile) -> Result<(), DomainError> {
        if Self::media_type_accepted(file.media_type.as_deref())
            || Self::extension_accepted(&file.filename)
        {
            return Ok(());
        }

        Err(DomainError::Validation(
            "Invalid file type. Please upload a valid video file.".to_string(),
        ))
    }

    fn media_type_accepted(media_type: Option<&str>) -> bool {
        media_type
            .map(|declared| {
                let declared = declared.trim().to_ascii_lowercase();
                ACCEPTED_MEDIA_TYPES.contains(&declared.as_str())
            })
            .unwrap_or(false)
    }

    fn extension_accepted(filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => {
                let ext = ext.to_ascii_lowercase();
                ACCEPTED_EXTENSIONS.contains(&ext.as_str())
            }
            None => false,
        }
    }
}

/// Media type the player should be told for a stored filename
pub fn media_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp4" => "video/mp4",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "flv" => "video/x-flv",
        _ => "video/mp4",
    }
}

/// Direct-download URL for an output streaming URL
///
/// Plain substitution of the streaming path segment; a URL without it is
/// returned unchanged.
pub fn download_url_for(output_url: &str) -> String {
    output_url.replace(STREAM_OUTPUT_PATH, DOWNLOAD_OUTPUT_PATH)
}

/// Build the trim request for a video and its serialized segments
pub fn build_trim_request(
    video: &VideoDescriptor,
    segments: Vec<SegmentBounds>,
) -> Result<TrimRequest, DomainError> {
    if segments.is_empty() {
        return Err(DomainError::Validation(
            "Please add at least one segment".to_string(),
        ));
    }

    Ok(TrimRequest {
        video_filename: video.filename.clone(),
        segments,
    })
}

/// Warning to surface for a health report, if any
pub fn health_warning(report: &HealthReport) -> Option<String> {
    if report.ffmpeg_available {
        None
    } else {
        Some("Warning: FFmpeg is not available. Video processing will not work.".to_string())
    }
}

#[cfg(test)]
mod tests;
