//! Headless player adapter
//!
//! In-memory playback engine without decoding. It keeps the state a real
//! player would expose (position, pause, mute, fullscreen) and emits the same
//! events, driven explicitly through [`HeadlessPlayer::finish_loading`],
//! [`HeadlessPlayer::advance`] and [`HeadlessPlayer::fail`]. The CLI uses it to
//! run a session without a browser.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::{MediaSource, PlayerOptions};
use crate::ports::{PlayerEvent, PlayerEventSink, PlayerPort};

struct PlayerState {
    source: Option<MediaSource>,
    options: Option<PlayerOptions>,
    sink: Option<PlayerEventSink>,
    current_time: f64,
    duration: f64,
    paused: bool,
    muted: bool,
    fullscreen: bool,
    load_count: usize,
    refuse_play: bool,
}

impl PlayerState {
    fn empty(load_count: usize, refuse_play: bool) -> Self {
        Self {
            source: None,
            options: None,
            sink: None,
            current_time: 0.0,
            duration: f64::NAN,
            paused: true,
            muted: false,
            fullscreen: false,
            load_count,
            refuse_play,
        }
    }
}

/// Headless playback engine
pub struct HeadlessPlayer {
    state: Mutex<PlayerState>,
}

impl HeadlessPlayer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PlayerState::empty(0, false)),
        }
    }

    fn state(&self) -> MutexGuard<'_, PlayerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Invoke the sink outside the state lock
    fn emit(&self, event: PlayerEvent) {
        let sink = self.state().sink.clone();
        if let Some(sink) = sink {
            sink(event);
        }
    }

    /// Simulate metadata arriving for the loaded source
    pub fn finish_loading(&self, duration: f64) {
        {
            let mut state = self.state();
            if state.source.is_none() {
                return;
            }
            state.duration = duration;
        }
        self.emit(PlayerEvent::MetadataLoaded { duration });
    }

    /// Advance the clock by `seconds` while playing; stops at the end
    pub fn advance(&self, seconds: f64) {
        let current_time = {
            let mut state = self.state();
            if state.paused || !state.duration.is_finite() {
                return;
            }
            state.current_time = (state.current_time + seconds).min(state.duration);
            if state.current_time >= state.duration {
                state.paused = true;
            }
            state.current_time
        };
        self.emit(PlayerEvent::TimeUpdate { current_time });
    }

    /// Simulate a playback failure
    pub fn fail(&self, message: Option<&str>) {
        self.emit(PlayerEvent::Error {
            message: message.map(str::to_string),
        });
    }

    /// Make `play` fail, as a browser blocking autoplay would
    pub fn set_refuse_play(&self, refuse: bool) {
        self.state().refuse_play = refuse;
    }

    pub fn source(&self) -> Option<MediaSource> {
        self.state().source.clone()
    }

    pub fn options(&self) -> Option<PlayerOptions> {
        self.state().options.clone()
    }

    pub fn sink(&self) -> Option<PlayerEventSink> {
        self.state().sink.clone()
    }

    pub fn load_count(&self) -> usize {
        self.state().load_count
    }
}

impl Default for HeadlessPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerPort for HeadlessPlayer {
    fn load(
        &self,
        source: &MediaSource,
        options: &PlayerOptions,
        sink: PlayerEventSink,
    ) -> Result<(), DomainError> {
        if source.url.trim().is_empty() {
            return Err(DomainError::Player("Empty source URL".to_string()));
        }

        let mut state = self.state();
        let load_count = state.load_count + 1;
        let refuse_play = state.refuse_play;
        *state = PlayerState::empty(load_count, refuse_play);
        state.source = Some(source.clone());
        state.options = Some(options.clone());
        state.sink = Some(sink);
        state.paused = !options.autoplay;

        debug!(url = %source.url, load_count, "Headless player loaded source");
        Ok(())
    }

    fn dispose(&self) {
        let mut state = self.state();
        let load_count = state.load_count;
        let refuse_play = state.refuse_play;
        *state = PlayerState::empty(load_count, refuse_play);
    }

    fn current_time(&self) -> f64 {
        self.state().current_time
    }

    fn set_current_time(&self, seconds: f64) {
        let current_time = {
            let mut state = self.state();
            if state.source.is_none() {
                return;
            }
            state.current_time = seconds;
            seconds
        };
        self.emit(PlayerEvent::TimeUpdate { current_time });
    }

    fn duration(&self) -> f64 {
        self.state().duration
    }

    fn is_paused(&self) -> bool {
        self.state().paused
    }

    fn play(&self) -> Result<(), DomainError> {
        let mut state = self.state();
        if state.refuse_play {
            return Err(DomainError::Player("Playback was refused".to_string()));
        }
        if state.source.is_none() {
            return Err(DomainError::Player("No source loaded".to_string()));
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&self) {
        self.state().paused = true;
    }

    fn is_muted(&self) -> bool {
        self.state().muted
    }

    fn set_muted(&self, muted: bool) {
        self.state().muted = muted;
    }

    fn is_fullscreen(&self) -> bool {
        self.state().fullscreen
    }

    fn request_fullscreen(&self) {
        self.state().fullscreen = true;
    }

    fn exit_fullscreen(&self) {
        self.state().fullscreen = false;
    }
}
