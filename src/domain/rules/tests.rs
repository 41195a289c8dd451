// Unit tests for business rules

#[cfg(test)]
mod tests {
    use crate::domain::errors::*;
    use crate::domain::model::*;
    use crate::domain::rules::*;

    fn upload(filename: &str, media_type: Option<&str>) -> UploadFile {
        UploadFile::new(filename, media_type.map(str::to_string), vec![0u8; 16])
    }

    #[test]
    fn test_upload_policy_accepts_by_extension() {
        for name in ["a.mp4", "b.MKV", "c.avi", "d.Mov", "e.webm", "f.flv"] {
            assert!(UploadPolicy::validate(&upload(name, None)).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_upload_policy_accepts_by_media_type() {
        let file = upload("capture", Some("video/quicktime"));
        assert!(UploadPolicy::validate(&file).is_ok());

        let file = upload("capture.bin", Some("VIDEO/WEBM"));
        assert!(UploadPolicy::validate(&file).is_ok());
    }

    #[test]
    fn test_upload_policy_rejects_when_both_fail() {
        let file = upload("notes.txt", Some("text/plain"));
        let err = UploadPolicy::validate(&file).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        assert!(UploadPolicy::validate(&upload("movie.mp4.txt", None)).is_err());
        assert!(UploadPolicy::validate(&upload("mp4", None)).is_err());
    }

    #[test]
    fn test_media_type_for_filename() {
        assert_eq!(media_type_for("clip.mkv"), "video/x-matroska");
        assert_eq!(media_type_for("clip.AVI"), "video/x-msvideo");
        assert_eq!(media_type_for("clip.mov"), "video/quicktime");
        assert_eq!(media_type_for("clip.unknown"), "video/mp4");
        assert_eq!(media_type_for("clip"), "video/mp4");
    }

    #[test]
    fn test_download_url_substitution() {
        assert_eq!(
            download_url_for("/api/stream/output/out.mp4"),
            "/api/output/out.mp4"
        );
        assert_eq!(
            download_url_for("http://host:8000/api/stream/output/a_trimmed.mp4"),
            "http://host:8000/api/output/a_trimmed.mp4"
        );
        assert_eq!(download_url_for("/files/out.mp4"), "/files/out.mp4");
    }

    #[test]
    fn test_build_trim_request_requires_segments() {
        let video = VideoDescriptor::new("clip.mp4", "/api/stream/uploads/clip.mp4", 60.0);
        assert!(build_trim_request(&video, Vec::new()).is_err());

        let request =
            build_trim_request(&video, vec![SegmentBounds { start: 1.0, end: 2.0 }]).unwrap();
        assert_eq!(request.video_filename, "clip.mp4");
        assert_eq!(request.segments.len(), 1);
    }

    #[test]
    fn test_health_warning() {
        let healthy = HealthReport {
            status: Some("healthy".to_string()),
            ffmpeg_available: true,
        };
        assert!(health_warning(&healthy).is_none());

        let degraded = HealthReport {
            status: Some("healthy".to_string()),
            ffmpeg_available: false,
        };
        assert!(health_warning(&degraded).unwrap().contains("FFmpeg"));
    }
}
