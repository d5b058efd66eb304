use crate::error::AppResult;
use crate::models::AppConfig;
use crate::modules::config::get_data_dir;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "tmdb-proxy.log";

pub fn get_log_dir() -> AppResult<PathBuf> {
    let log_dir = get_data_dir()?.join("logs");

    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)?;
    }

    Ok(log_dir)
}

/// Initialize logger system
pub fn init_logger(config: &AppConfig) {
    // Capture log macro logs
    let _ = tracing_log::LogTracer::init();

    // 1. Console output layer
    let console_layer = fmt::Layer::new()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    // 2. Optional file output layer (daily rolling, no ANSI)
    let file_layer = if config.log_to_file {
        match get_log_dir() {
            Ok(log_dir) => {
                let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                // Keep the writer alive for the rest of the process
                std::mem::forget(guard);
                Some(
                    fmt::Layer::new()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true)
                        .with_level(true),
                )
            }
            Err(e) => {
                eprintln!("Failed to initialize log directory: {}", e);
                None
            }
        }
    } else {
        None
    };

    // 3. Filter layer: RUST_LOG first, then the configured level
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // 4. Initialize global subscriber (try_init so re-initialization is harmless)
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    info!(
        "Logger system initialized ({})",
        if config.log_to_file {
            "Console + File Persistence"
        } else {
            "Console"
        }
    );
}
