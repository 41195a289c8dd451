// Adapters - External system implementations

pub mod headless_player;
pub mod http_backend;
pub mod http_download;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use headless_player::HeadlessPlayer;
pub use http_backend::HttpBackendAdapter;
pub use http_download::HttpDownloadAdapter;
pub use toml_config::TomlConfigAdapter;
pub use tracing_log::TracingLogAdapter;
