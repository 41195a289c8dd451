// Session interactor - Orchestrates the upload / edit / process / download workflow

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::domain::segments::SegmentStore;
use crate::keyboard::{CommandEffect, CommandOutcome, InputContext, KeyEvent, KeyboardDispatcher};
use crate::playback::{PlaybackAdapter, PlaybackNotification};
use crate::ports::*;
use crate::utils::time::format_bytes;

const EVENT_CAPACITY: usize = 256;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// State changes published for renderers
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PhaseChanged { from: Phase, to: Phase },
    VideoLoaded { video: VideoDescriptor },
    SegmentsChanged { rows: Vec<SegmentRow> },
    SegmentAdded { id: SegmentId },
    PendingChanged { pending: PendingRange },
    /// Transient pulse after a keyboard seek, direction in seconds
    SeekPulse { direction: f64 },
    OutputReady { output: OutputDescriptor, size_label: String },
    DownloadStarted { download: SavedDownload },
    Notice { level: NoticeLevel, message: String },
}

/// Interactor for one editing session
///
/// Owns the loaded video, its segments, the pending in/out fields and the
/// latest output. Operations that change the workflow phase take `&mut self`,
/// so one session never has two uploads or two process requests in flight.
pub struct SessionInteractor {
    backend: Arc<dyn BackendPort>,
    save_port: Arc<dyn SavePort>,
    log_port: Arc<dyn LogPort>,
    playback: PlaybackAdapter,
    dispatcher: KeyboardDispatcher,
    events: broadcast::Sender<SessionEvent>,
    phase: Phase,
    video: Option<VideoDescriptor>,
    segments: SegmentStore,
    pending: PendingRange,
    output: Option<OutputDescriptor>,
}

impl SessionInteractor {
    /// Create an idle session with injected ports
    pub fn new(
        backend: Arc<dyn BackendPort>,
        save_port: Arc<dyn SavePort>,
        player: Arc<dyn PlayerPort>,
        log_port: Arc<dyn LogPort>,
        player_options: PlayerOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        // player failures are non-fatal: one error notice, phase untouched
        let playback = PlaybackAdapter::new(player, player_options);
        let notices = events.clone();
        playback.on_player_error(Arc::new(move |message: &str| {
            let error = DomainError::Player(message.to_string());
            let _ = notices.send(SessionEvent::Notice {
                level: NoticeLevel::Error,
                message: error.user_message(),
            });
        }));

        Self {
            backend,
            save_port,
            log_port,
            playback,
            dispatcher: KeyboardDispatcher::new(),
            events,
            phase: Phase::Idle,
            video: None,
            segments: SegmentStore::new(f64::NAN),
            pending: PendingRange::default(),
            output: None,
        }
    }

    /// Receive session state changes
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Receive player notifications (metadata, time, errors)
    pub fn subscribe_playback(&self) -> broadcast::Receiver<PlaybackNotification> {
        self.playback.subscribe()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn video(&self) -> Option<&VideoDescriptor> {
        self.video.as_ref()
    }

    pub fn segments(&self) -> &SegmentStore {
        &self.segments
    }

    pub fn pending(&self) -> &PendingRange {
        &self.pending
    }

    pub fn output(&self) -> Option<&OutputDescriptor> {
        self.output.as_ref()
    }

    pub fn playback(&self) -> &PlaybackAdapter {
        &self.playback
    }

    /// Start the one-off backend health probe
    pub fn spawn_health_probe(&self) -> JoinHandle<Option<HealthReport>> {
        spawn_health_probe(Arc::clone(&self.backend), self.events.clone())
    }

    /// Upload a file and make it the session's video
    ///
    /// Type checks happen locally first. On failure the session goes back to
    /// the phase it had before the upload started.
    pub async fn upload(&mut self, file: UploadFile) -> Result<VideoDescriptor, DomainError> {
        if matches!(self.phase, Phase::Uploading | Phase::Processing) {
            let error = DomainError::InvalidPhase(format!("Cannot upload while {}", self.phase));
            return Err(self.report(error).await);
        }
        if let Err(error) = UploadPolicy::validate(&file) {
            return Err(self.report(error).await);
        }

        self.log_port
            .info(&format!(
                "Uploading {} ({})",
                file.filename,
                format_bytes(file.size())
            ))
            .await;

        let previous = self.phase;
        self.set_phase(Phase::Uploading);

        match self.backend.upload(&file).await {
            Ok(video) => {
                self.install_video(video.clone());
                self.log_port
                    .info(&format!(
                        "Upload complete: {} ({:.2}s)",
                        video.filename, video.duration
                    ))
                    .await;
                Ok(video)
            }
            Err(error) => {
                self.set_phase(previous);
                Err(self.report(error).await)
            }
        }
    }

    /// Send the sorted segments to the backend for trimming
    ///
    /// An empty segment list fails locally and leaves the phase untouched.
    /// A backend failure returns to `Ready` with video and segments intact.
    pub async fn process(&mut self) -> Result<OutputDescriptor, DomainError> {
        if !matches!(self.phase, Phase::Ready | Phase::Complete) {
            let error = DomainError::InvalidPhase(format!("Cannot process while {}", self.phase));
            return Err(self.report(error).await);
        }
        let video = match self.video.clone() {
            Some(video) => video,
            None => {
                let error = DomainError::InvalidPhase("No video loaded".to_string());
                return Err(self.report(error).await);
            }
        };
        let request = match build_trim_request(&video, self.segments.serialize()) {
            Ok(request) => request,
            Err(error) => return Err(self.report(error).await),
        };

        self.log_port
            .info(&format!(
                "Processing {} with {} segment(s)",
                request.video_filename,
                request.segments.len()
            ))
            .await;

        if self.output.take().is_some() {
            debug!("Previous output superseded");
        }
        self.set_phase(Phase::Processing);

        match self.backend.trim(&request).await {
            Ok(output) => {
                let size_label = format_bytes(output.output_size);
                self.log_port
                    .info(&format!(
                        "Video processed successfully: {} ({})",
                        output.output_filename, size_label
                    ))
                    .await;
                self.output = Some(output.clone());
                self.publish(SessionEvent::OutputReady {
                    output: output.clone(),
                    size_label,
                });
                self.set_phase(Phase::Complete);
                Ok(output)
            }
            Err(error) => {
                self.set_phase(Phase::Ready);
                Err(self.report(error).await)
            }
        }
    }

    /// Save the current output through the download endpoint
    ///
    /// Returns `Ok(None)` without doing anything unless an output is ready.
    pub async fn download(&mut self) -> Result<Option<SavedDownload>, DomainError> {
        if self.phase != Phase::Complete {
            return Ok(None);
        }
        let output = match self.output.clone() {
            Some(output) => output,
            None => return Ok(None),
        };

        let url = download_url_for(&output.output_url);
        self.log_port
            .info(&format!("Downloading: {} from {}", output.output_filename, url))
            .await;

        match self.save_port.save(&url, &output.output_filename).await {
            Ok(saved) => {
                self.publish(SessionEvent::DownloadStarted {
                    download: saved.clone(),
                });
                self.notice(
                    NoticeLevel::Info,
                    format!("Download started! Saving to {}", saved.location),
                );
                Ok(Some(saved))
            }
            Err(error) => Err(self.report(error).await),
        }
    }

    /// Add a segment from explicit bounds
    pub fn add_segment(&mut self, start: f64, end: f64) -> Result<SegmentId, DomainError> {
        if let Err(error) = self.require_video() {
            return Err(self.surface(error));
        }

        match self.segments.add(start, end) {
            Ok(id) => {
                self.publish_segments();
                self.publish(SessionEvent::SegmentAdded { id });
                Ok(id)
            }
            Err(error) => Err(self.surface(error)),
        }
    }

    /// Add a segment from the pending start/end fields, clearing them on success
    pub fn add_segment_from_pending(&mut self) -> Result<SegmentId, DomainError> {
        let (start, end) = match self.pending.parse() {
            Ok(bounds) => bounds,
            Err(error) => return Err(self.surface(error)),
        };

        let id = self.add_segment(start, end)?;
        self.pending.clear();
        self.publish_pending();
        Ok(id)
    }

    pub fn set_pending_start(&mut self, text: impl Into<String>) {
        self.pending.start = text.into();
        self.publish_pending();
    }

    pub fn set_pending_end(&mut self, text: impl Into<String>) {
        self.pending.end = text.into();
        self.publish_pending();
    }

    /// Remove a segment by id
    pub fn remove_segment(&mut self, id: SegmentId) -> Option<Segment> {
        let removed = self.segments.remove(id);
        if removed.is_some() {
            self.publish_segments();
        }
        removed
    }

    /// Remove the segment at a position of the last rendered (sorted) view
    pub fn remove_segment_at(&mut self, index: usize) -> Option<Segment> {
        let removed = self.segments.remove_at(index);
        if removed.is_some() {
            self.publish_segments();
        }
        removed
    }

    /// Drop every segment; confirming with the user is the caller's job
    pub fn clear_segments(&mut self) -> usize {
        let count = self.segments.len();
        if count == 0 {
            return 0;
        }
        self.segments.clear();
        self.publish_segments();
        count
    }

    /// Handle a key event from the given input context
    ///
    /// Returns the executed command, or `None` when the event should be left
    /// to its default handling.
    pub fn handle_key(&mut self, event: &KeyEvent, context: InputContext) -> Option<CommandOutcome> {
        if self.video.is_none() {
            return None;
        }

        let outcome = self.dispatcher.dispatch(event, context, &self.playback)?;
        match outcome.effect {
            CommandEffect::None => {}
            CommandEffect::SeekPulse { direction } => {
                self.publish(SessionEvent::SeekPulse { direction });
            }
            CommandEffect::MarkIn { seconds } => {
                self.set_pending_start(PendingRange::field_text(seconds));
            }
            CommandEffect::MarkOut { seconds } => {
                self.set_pending_end(PendingRange::field_text(seconds));
            }
            CommandEffect::AddSegment => {
                // failures are already surfaced as notices
                let _ = self.add_segment_from_pending();
            }
        }
        Some(outcome)
    }

    /// List stored uploads
    pub async fn list_videos(&self) -> Result<Vec<VideoDescriptor>, DomainError> {
        match self.backend.list_videos().await {
            Ok(videos) => Ok(videos),
            Err(error) => Err(self.report(error).await),
        }
    }

    /// Delete a stored upload
    pub async fn delete_video(&self, filename: &str) -> Result<DeleteReport, DomainError> {
        match self.backend.delete_video(filename).await {
            Ok(report) => Ok(report),
            Err(error) => Err(self.report(error).await),
        }
    }

    /// Delete a produced output
    pub async fn delete_output(&self, filename: &str) -> Result<DeleteReport, DomainError> {
        match self.backend.delete_output(filename).await {
            Ok(report) => Ok(report),
            Err(error) => Err(self.report(error).await),
        }
    }

    /// Release the player and return to an empty, idle session
    pub fn dispose(&mut self) {
        self.playback.dispose();
        self.video = None;
        self.segments = SegmentStore::new(f64::NAN);
        self.pending.clear();
        self.output = None;
        self.set_phase(Phase::Idle);
        info!("Session disposed");
    }

    fn install_video(&mut self, video: VideoDescriptor) {
        if !video.has_usable_duration() {
            warn!(filename = %video.filename, duration = video.duration, "Video has no usable duration");
        }

        self.segments = SegmentStore::new(video.duration);
        self.pending.clear();
        self.output = None;
        self.video = Some(video.clone());

        if let Err(error) = self.playback.load(&video) {
            // player trouble is not fatal to the session
            self.surface(error);
        }

        self.publish(SessionEvent::VideoLoaded { video });
        self.publish_segments();
        self.publish_pending();
        self.set_phase(Phase::Ready);
    }

    fn require_video(&self) -> Result<&VideoDescriptor, DomainError> {
        self.video
            .as_ref()
            .ok_or_else(|| DomainError::InvalidPhase("No video loaded".to_string()))
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        debug!(%from, %to, "Session phase changed");
        self.publish(SessionEvent::PhaseChanged { from, to });
    }

    fn publish(&self, event: SessionEvent) {
        // nobody listening is fine
        let _ = self.events.send(event);
    }

    fn publish_segments(&self) {
        self.publish(SessionEvent::SegmentsChanged {
            rows: self.segments.rows(),
        });
    }

    fn publish_pending(&self) {
        self.publish(SessionEvent::PendingChanged {
            pending: self.pending.clone(),
        });
    }

    fn notice(&self, level: NoticeLevel, message: String) {
        self.publish(SessionEvent::Notice { level, message });
    }

    /// Publish a local error as a notice and hand it back
    fn surface(&self, error: DomainError) -> DomainError {
        warn!(kind = error.kind(), "{}", error);
        self.notice(NoticeLevel::Error, error.user_message());
        error
    }

    /// Log an error through the log port, publish it as a notice and hand it back
    async fn report(&self, error: DomainError) -> DomainError {
        let level = if error.is_validation() {
            LogLevel::Warn
        } else {
            LogLevel::Error
        };
        let mut event = LogEvent::new(level, error.to_string())
            .with("kind", error.kind())
            .with("phase", self.phase);
        if let DomainError::Backend { status, .. } = &error {
            event = event.with("status", status);
        }
        self.log_port.log_event(&event).await;

        self.notice(NoticeLevel::Error, error.user_message());
        error
    }
}

/// Query backend health once in the background
///
/// Only ever produces a warning notice; probe failures are logged and
/// otherwise ignored.
pub fn spawn_health_probe(
    backend: Arc<dyn BackendPort>,
    events: broadcast::Sender<SessionEvent>,
) -> JoinHandle<Option<HealthReport>> {
    tokio::spawn(async move {
        match backend.health().await {
            Ok(report) => {
                if let Some(message) = health_warning(&report) {
                    warn!("{}", message);
                    let _ = events.send(SessionEvent::Notice {
                        level: NoticeLevel::Warning,
                        message,
                    });
                } else {
                    debug!(status = ?report.status, "Backend healthy");
                }
                Some(report)
            }
            Err(error) => {
                warn!(kind = error.kind(), "Health check failed: {}", error);
                None
            }
        }
    })
}
