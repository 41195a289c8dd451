use std::sync::Arc;

use crate::adapters::{HeadlessPlayer, HttpBackendAdapter, HttpDownloadAdapter, TracingLogAdapter};
use crate::app::session_interactor::SessionInteractor;
use crate::config_initialization::StudioSettings;
use crate::domain::errors::DomainError;
use crate::domain::model::PlayerOptions;
use crate::ports::{BackendPort, LogPort, PlayerPort, SavePort};

pub trait AppContainer: Send + Sync {
    /// A fresh, idle session over the container's adapters
    fn session_interactor(&self) -> SessionInteractor;
    fn backend(&self) -> Arc<dyn BackendPort>;
}

pub struct DefaultAppContainer {
    backend: Arc<HttpBackendAdapter>,
    save_port: Arc<HttpDownloadAdapter>,
    player: Arc<HeadlessPlayer>,
    log_port: Arc<TracingLogAdapter>,
}

impl DefaultAppContainer {
    pub fn new(settings: &StudioSettings) -> Result<Self, DomainError> {
        let backend = Arc::new(HttpBackendAdapter::new(&settings.backend_url)?);
        let save_port = Arc::new(HttpDownloadAdapter::new(
            &settings.backend_url,
            settings.download_dir.clone(),
        )?);
        let player = Arc::new(HeadlessPlayer::new());
        let log_port = Arc::new(TracingLogAdapter::new(settings.log_level));

        Ok(Self {
            backend,
            save_port,
            player,
            log_port,
        })
    }

    /// The concrete player, for driving playback from the command line
    pub fn player(&self) -> Arc<HeadlessPlayer> {
        Arc::clone(&self.player)
    }
}

impl AppContainer for DefaultAppContainer {
    fn session_interactor(&self) -> SessionInteractor {
        SessionInteractor::new(
            Arc::clone(&self.backend) as Arc<dyn BackendPort>,
            Arc::clone(&self.save_port) as Arc<dyn SavePort>,
            Arc::clone(&self.player) as Arc<dyn PlayerPort>,
            Arc::clone(&self.log_port) as Arc<dyn LogPort>,
            PlayerOptions::default(),
        )
    }

    fn backend(&self) -> Arc<dyn BackendPort> {
        Arc::clone(&self.backend) as Arc<dyn BackendPort>
    }
}
