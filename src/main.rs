//! Booking service binary.
//!
//! Reads its configuration from `BOOKING_CONFIG` or
//! `~/.config/hotel-booking/config.toml`, serves until SIGINT/SIGTERM, then
//! drains and exits. The `booking-server` launcher in `cli/` adds flags.

use tracing::{error, info, warn};

use hotel_booking::config::config_path_from_env;
use hotel_booking::server::{init_tracing, ServerHandle, ServerOptions};
use hotel_booking::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = config_path_from_env();
    let (config, load_error) = match AppConfig::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_tracing(&config);
    match load_error {
        None if config_path.exists() => {
            info!(path = %config_path.display(), "Configuration loaded")
        }
        None => info!(path = %config_path.display(), "No config file; using defaults"),
        Some(e) => warn!(error = %e, "Failed to load config; using defaults"),
    }

    let handle = match ServerHandle::start(ServerOptions {
        config,
        auto_migrate: true,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Failed to start booking service");
            return Err(e);
        }
    };

    handle.install_signal_handler();
    handle.shutdown_signal().wait().await;
    handle.wait().await;
    Ok(())
}
