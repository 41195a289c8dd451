//! Playback adapter
//!
//! Thin layer over the external [`PlayerPort`]: it answers the queries the
//! workspace needs, forwards commands, gates duration-dependent work on the
//! player having a usable duration, and turns raw player events into
//! [`PlaybackNotification`]s on a broadcast channel.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::domain::errors::DomainError;
use crate::domain::model::{MediaSource, PlayerOptions, VideoDescriptor};
use crate::domain::rules::media_type_for;
use crate::ports::{PlayerEvent, PlayerEventSink, PlayerPort};
use crate::utils::time::format_time;

const NOTIFICATION_CAPACITY: usize = 64;

/// Notifications derived from player events
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackNotification {
    /// Fired once per loaded source
    MetadataReady { duration: f64 },
    /// Fired on every time update, with the display label
    TimeUpdated { seconds: f64, label: String },
    /// Non-fatal player failure
    PlayerError { message: String },
}

/// Callback run synchronously for every player error of the current source
pub type PlayerErrorHook = Arc<dyn Fn(&str) + Send + Sync>;

struct PlaybackShared {
    generation: AtomicU64,
    metadata_ready: AtomicBool,
    notifications: broadcast::Sender<PlaybackNotification>,
    error_hook: Mutex<Option<PlayerErrorHook>>,
}

impl PlaybackShared {
    fn handle(&self, generation: u64, event: PlayerEvent) {
        if generation != self.generation.load(Ordering::SeqCst) {
            debug!(generation, "Dropping event from a disposed source");
            return;
        }

        let notification = match event {
            PlayerEvent::MetadataLoaded { duration } => {
                if self.metadata_ready.swap(true, Ordering::SeqCst) {
                    return;
                }
                info!(duration, "Video metadata loaded");
                PlaybackNotification::MetadataReady { duration }
            }
            PlayerEvent::TimeUpdate { current_time } => PlaybackNotification::TimeUpdated {
                seconds: current_time,
                label: format_time(current_time),
            },
            PlayerEvent::Error { message } => {
                let message = message.unwrap_or_else(|| "Unknown error".to_string());
                error!(%message, "Video player error");
                let hook = self.error_hook.lock().ok().and_then(|hook| hook.clone());
                if let Some(hook) = hook {
                    hook(&message);
                }
                PlaybackNotification::PlayerError { message }
            }
        };

        // no subscribers is fine
        let _ = self.notifications.send(notification);
    }
}

/// Adapter between the workspace and the playback engine
pub struct PlaybackAdapter {
    player: Arc<dyn PlayerPort>,
    options: PlayerOptions,
    shared: Arc<PlaybackShared>,
    loaded: AtomicBool,
}

impl PlaybackAdapter {
    pub fn new(player: Arc<dyn PlayerPort>, options: PlayerOptions) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            player,
            options,
            shared: Arc::new(PlaybackShared {
                generation: AtomicU64::new(0),
                metadata_ready: AtomicBool::new(false),
                notifications,
                error_hook: Mutex::new(None),
            }),
            loaded: AtomicBool::new(false),
        }
    }

    /// Receive metadata, time and error notifications
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackNotification> {
        self.shared.notifications.subscribe()
    }

    /// Install the callback for player errors, replacing any previous one
    pub fn on_player_error(&self, hook: PlayerErrorHook) {
        match self.shared.error_hook.lock() {
            Ok(mut slot) => *slot = Some(hook),
            Err(_) => warn!("Player error hook lock poisoned"),
        }
    }

    /// Load a video, replacing whatever source was loaded before
    pub fn load(&self, video: &VideoDescriptor) -> Result<(), DomainError> {
        self.dispose();

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.metadata_ready.store(false, Ordering::SeqCst);

        let source = MediaSource {
            url: video.url.clone(),
            media_type: media_type_for(&video.filename).to_string(),
        };
        let shared = Arc::clone(&self.shared);
        let sink: PlayerEventSink = Arc::new(move |event| shared.handle(generation, event));

        info!(url = %source.url, media_type = %source.media_type, "Loading video into player");
        self.player.load(&source, &self.options, sink)?;
        self.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Release the loaded source; events still in flight for it are dropped
    pub fn dispose(&self) {
        if self.loaded.swap(false, Ordering::SeqCst) {
            self.shared.generation.fetch_add(1, Ordering::SeqCst);
            self.shared.metadata_ready.store(false, Ordering::SeqCst);
            self.player.dispose();
            debug!("Player disposed");
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Whether the one-shot metadata notification has fired for this source
    pub fn is_metadata_ready(&self) -> bool {
        self.shared.metadata_ready.load(Ordering::SeqCst)
    }

    /// True when the player reports a finite, positive duration
    pub fn is_ready(&self) -> bool {
        if !self.is_loaded() {
            return false;
        }
        let duration = self.player.duration();
        duration.is_finite() && duration > 0.0
    }

    pub fn current_time(&self) -> f64 {
        self.player.current_time()
    }

    pub fn duration(&self) -> f64 {
        self.player.duration()
    }

    pub fn is_paused(&self) -> bool {
        self.player.is_paused()
    }

    pub fn play(&self) -> Result<(), DomainError> {
        self.player.play()
    }

    pub fn pause(&self) {
        self.player.pause();
    }

    /// Seek without clamping; callers clamp to `[0, duration]`
    pub fn seek_to(&self, seconds: f64) {
        self.player.set_current_time(seconds);
    }

    pub fn is_muted(&self) -> bool {
        self.player.is_muted()
    }

    pub fn set_muted(&self, muted: bool) {
        self.player.set_muted(muted);
    }

    pub fn is_fullscreen(&self) -> bool {
        self.player.is_fullscreen()
    }

    pub fn request_fullscreen(&self) {
        self.player.request_fullscreen();
    }

    pub fn exit_fullscreen(&self) {
        self.player.exit_fullscreen();
    }

    /// Play when paused, pause when playing
    pub fn toggle_play(&self) {
        if self.is_paused() {
            if let Err(e) = self.play() {
                warn!("Play error: {}", e);
            }
        } else {
            self.pause();
        }
    }

    pub fn toggle_muted(&self) {
        self.set_muted(!self.is_muted());
    }

    pub fn toggle_fullscreen(&self) {
        if self.is_fullscreen() {
            self.exit_fullscreen();
        } else {
            self.request_fullscreen();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::headless_player::HeadlessPlayer;

    fn adapter() -> (Arc<HeadlessPlayer>, PlaybackAdapter) {
        let player = Arc::new(HeadlessPlayer::new());
        let adapter = PlaybackAdapter::new(
            Arc::clone(&player) as Arc<dyn PlayerPort>,
            PlayerOptions::default(),
        );
        (player, adapter)
    }

    fn video() -> VideoDescriptor {
        VideoDescriptor::new("clip.mkv", "/api/stream/uploads/clip.mkv", 120.0)
    }

    #[test]
    fn test_not_ready_until_metadata() {
        let (player, adapter) = adapter();
        assert!(!adapter.is_ready());

        adapter.load(&video()).unwrap();
        assert!(!adapter.is_ready());
        assert_eq!(player.source().unwrap().media_type, "video/x-matroska");

        player.finish_loading(120.0);
        assert!(adapter.is_ready());
        assert!(adapter.is_metadata_ready());
    }

    #[test]
    fn test_zero_duration_is_not_ready() {
        let (player, adapter) = adapter();
        adapter.load(&video()).unwrap();
        player.finish_loading(0.0);
        assert!(!adapter.is_ready());
    }

    #[test]
    fn test_metadata_ready_fires_once() {
        let (player, adapter) = adapter();
        let mut rx = adapter.subscribe();
        adapter.load(&video()).unwrap();

        player.finish_loading(120.0);
        player.finish_loading(120.0);

        assert_eq!(
            rx.try_recv().unwrap(),
            PlaybackNotification::MetadataReady { duration: 120.0 }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_time_update_carries_label() {
        let (player, adapter) = adapter();
        adapter.load(&video()).unwrap();
        player.finish_loading(120.0);
        let mut rx = adapter.subscribe();

        adapter.seek_to(65.4);
        assert_eq!(
            rx.try_recv().unwrap(),
            PlaybackNotification::TimeUpdated {
                seconds: 65.4,
                label: "1:05".to_string()
            }
        );
    }

    #[test]
    fn test_player_error_defaults_message() {
        let (player, adapter) = adapter();
        let mut rx = adapter.subscribe();
        adapter.load(&video()).unwrap();

        player.fail(None);
        assert_eq!(
            rx.try_recv().unwrap(),
            PlaybackNotification::PlayerError {
                message: "Unknown error".to_string()
            }
        );
    }

    #[test]
    fn test_error_hook_sees_current_source_only() {
        let (player, adapter) = adapter();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&seen);
        adapter.on_player_error(Arc::new(move |message: &str| {
            captured.lock().unwrap().push(message.to_string());
        }));

        adapter.load(&video()).unwrap();
        let stale_sink = player.sink().unwrap();
        adapter.load(&video()).unwrap();

        stale_sink(PlayerEvent::Error {
            message: Some("stale".to_string()),
        });
        player.fail(Some("MEDIA_ERR_DECODE"));

        assert_eq!(seen.lock().unwrap().as_slice(), &["MEDIA_ERR_DECODE".to_string()]);
    }

    #[test]
    fn test_events_from_previous_source_are_dropped() {
        let (player, adapter) = adapter();
        adapter.load(&video()).unwrap();
        let stale_sink = player.sink().unwrap();

        adapter.load(&video()).unwrap();
        let mut rx = adapter.subscribe();
        stale_sink(PlayerEvent::MetadataLoaded { duration: 10.0 });

        assert!(rx.try_recv().is_err());
        assert!(!adapter.is_metadata_ready());
        assert_eq!(player.load_count(), 2);
    }

    #[test]
    fn test_toggles() {
        let (player, adapter) = adapter();
        adapter.load(&video()).unwrap();
        player.finish_loading(120.0);

        assert!(adapter.is_paused());
        adapter.toggle_play();
        assert!(!adapter.is_paused());
        adapter.toggle_play();
        assert!(adapter.is_paused());

        adapter.toggle_muted();
        assert!(adapter.is_muted());

        adapter.toggle_fullscreen();
        assert!(adapter.is_fullscreen());
        adapter.toggle_fullscreen();
        assert!(!adapter.is_fullscreen());
    }

    #[test]
    fn test_dispose_unloads() {
        let (player, adapter) = adapter();
        adapter.load(&video()).unwrap();
        player.finish_loading(120.0);

        adapter.dispose();
        assert!(!adapter.is_loaded());
        assert!(!adapter.is_ready());
        assert!(player.source().is_none());
    }
}
