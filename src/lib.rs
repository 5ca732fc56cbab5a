pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod reconciler;
pub mod remote;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use crate::core::Preferences;
use error::AppError;

/// Install the tracing subscriber and route panics through it.
///
/// `RUST_LOG` overrides the default `tailscale_control=info` filter.
pub fn init_tracing() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("PANIC in tailscale-control: {info}");
        default_hook(info);
    }));

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config::DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Open (or create) the preference database at `path`.
pub fn open_preferences(path: &Path) -> Result<Preferences, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let database = Arc::new(db::Database::open(path)?);
    tracing::info!("Preferences opened at {}", path.display());
    Ok(Preferences::new(database))
}
