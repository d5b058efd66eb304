use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::models::AppConfig;

const DATA_DIR: &str = ".tmdb_proxy";
const CONFIG_FILE: &str = "config.json";

/// Get data directory path (`$TMDB_PROXY_DATA_DIR` or `~/.tmdb_proxy`)
pub fn get_data_dir() -> AppResult<PathBuf> {
    let data_dir = match std::env::var("TMDB_PROXY_DATA_DIR") {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .ok_or_else(|| AppError::Config("Failed to get user home directory".to_string()))?
            .join(DATA_DIR),
    };

    // Ensure directory exists
    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
    }

    Ok(data_dir)
}

/// Config file location (`$TMDB_PROXY_CONFIG` or `<data dir>/config.json`)
pub fn get_config_path() -> AppResult<PathBuf> {
    match std::env::var("TMDB_PROXY_CONFIG") {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(get_data_dir()?.join(CONFIG_FILE)),
    }
}

/// Load application config, then apply environment overrides
pub fn load_app_config() -> AppResult<AppConfig> {
    let mut config = load_config_file(&get_config_path()?)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Read a config file. A missing file yields the defaults.
pub fn load_config_file(path: &Path) -> AppResult<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::new());
    }

    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        AppError::Config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })
}

fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply environment overrides on top of the file config.
///
/// `lookup` resolves a variable name to its value; production passes
/// `std::env::var`, tests pass a fixed map.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup("TMDB_API_KEY") {
        if !key.trim().is_empty() {
            tracing::info!("Using TMDB API key from environment");
            config.proxy.api_key = Some(key.trim().to_string());
        }
    }

    if let Some(port) = lookup("TMDB_PROXY_PORT").or_else(|| lookup("PORT")) {
        match port.trim().parse::<u16>() {
            Ok(p) => config.proxy.port = p,
            Err(_) => tracing::warn!("Ignoring invalid port from environment: {:?}", port),
        }
    }

    if let Some(value) = lookup("TMDB_PROXY_ALLOW_LAN") {
        match parse_env_bool(&value) {
            Some(allow) => config.proxy.allow_lan_access = allow,
            None => tracing::warn!("Ignoring invalid TMDB_PROXY_ALLOW_LAN value: {:?}", value),
        }
    }

    if let Some(url) = lookup("TMDB_BASE_URL") {
        if !url.trim().is_empty() {
            config.proxy.base_url = url.trim().to_string();
        }
    }

    if let Some(language) = lookup("TMDB_LANGUAGE") {
        if !language.trim().is_empty() {
            config.proxy.language = language.trim().to_string();
        }
    }

    if let Some(value) = lookup("TMDB_PROXY_LOG_TO_FILE") {
        if let Some(enabled) = parse_env_bool(&value) {
            config.log_to_file = enabled;
        }
    }
}
