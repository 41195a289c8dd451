//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::adapters::toml_config::{
    KEY_BACKEND_URL, KEY_DOWNLOAD_DIR, KEY_LOG_FORMAT, KEY_LOG_LEVEL,
};
use crate::cli::Cli;
use crate::error::{StudioError, StudioResult};
use crate::ports::{ConfigPort, LogLevel};

/// Config files probed when `--config` is not given, first match wins
pub const CONFIG_CANDIDATES: &[&str] = &["studio_config.toml", "config/studio.toml"];

/// Resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct StudioSettings {
    pub backend_url: String,
    pub download_dir: PathBuf,
    pub log_level: LogLevel,
    pub log_json: bool,
    /// Config file that was loaded, if any
    pub config_file: Option<String>,
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
///
/// Environment variables reach this function through the `Cli` fields, which
/// clap fills from `STUDIO_*` when the flag is absent.
pub async fn initialize_configuration_hierarchy(
    config: &dyn ConfigPort,
    cli: &Cli,
) -> StudioResult<StudioSettings> {
    debug!("Initializing configuration hierarchy");

    // Step 1: defaults are seeded by the adapter
    // Step 2: config file
    if let Some(path) = select_config_file(cli.config.as_deref())? {
        config
            .load_config(&path.to_string_lossy())
            .await
            .map_err(StudioError::from)?;
    }

    // Step 3: CLI and environment overrides
    let overrides = apply_cli_configuration_overrides(config, cli).await?;
    if overrides > 0 {
        debug!("Applied {} CLI/environment overrides", overrides);
    }

    config.validate_config().await?;
    let settings = read_settings(config).await?;
    info!(
        backend = %settings.backend_url,
        download_dir = %settings.download_dir.display(),
        "Configuration resolved"
    );
    Ok(settings)
}

/// Pick the config file to load
///
/// An explicit path must exist; the implicit candidates are optional.
fn select_config_file(explicit: Option<&str>) -> StudioResult<Option<PathBuf>> {
    if let Some(path) = explicit {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(StudioError::Config {
                message: format!("Config file does not exist: {}", path.display()),
            });
        }
        return Ok(Some(path));
    }

    Ok(CONFIG_CANDIDATES
        .iter()
        .map(Path::new)
        .find(|path| path.exists())
        .map(Path::to_path_buf))
}

/// Apply CLI argument overrides to configuration
async fn apply_cli_configuration_overrides(
    config: &dyn ConfigPort,
    cli: &Cli,
) -> StudioResult<usize> {
    let overrides = [
        (KEY_BACKEND_URL, cli.backend_url.as_deref()),
        (KEY_DOWNLOAD_DIR, cli.download_dir.as_deref()),
        (KEY_LOG_LEVEL, cli.log_level.as_deref()),
        (KEY_LOG_FORMAT, cli.log_format.as_deref()),
    ];

    let mut applied = 0;
    for (key, value) in overrides {
        if let Some(value) = value {
            config.set_config(key, value).await?;
            applied += 1;
        }
    }
    Ok(applied)
}

async fn read_settings(config: &dyn ConfigPort) -> StudioResult<StudioSettings> {
    let backend_url = required(config, KEY_BACKEND_URL).await?;
    let download_dir = PathBuf::from(required(config, KEY_DOWNLOAD_DIR).await?);
    let log_level = LogLevel::parse(&required(config, KEY_LOG_LEVEL).await?)?;
    let log_json = required(config, KEY_LOG_FORMAT).await? == "json";

    Ok(StudioSettings {
        backend_url,
        download_dir,
        log_level,
        log_json,
        config_file: config.get_config_file_path().await?,
    })
}

async fn required(config: &dyn ConfigPort, key: &str) -> StudioResult<String> {
    config
        .get_config(key)
        .await?
        .ok_or_else(|| StudioError::Config {
            message: format!("Missing configuration key: {}", key),
        })
}
