//! Booking service launcher
//!
//! Headless reservation and payment reconciliation server, suitable for a
//! systemd unit, a container or a plain process.
//!
//! ```sh
//! # Default config (~/.config/hotel-booking/config.toml)
//! booking-server
//!
//! # Custom config and port
//! booking-server --config /etc/hotel-booking/config.toml --api-port 8081
//!
//! # Validate config without starting
//! booking-server --check
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use hotel_booking::config::AppConfig;
use hotel_booking::server::{init_tracing, ServerHandle, ServerOptions};

#[derive(Parser, Debug)]
#[command(
    name = "booking-server",
    version,
    about = "Hotel room reservations with payment reconciliation",
    long_about = "REST API server for hotel room reservations, booking \
                  reference codes and payment provider reconciliation.\n\n\
                  Default config: ~/.config/hotel-booking/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "BOOKING_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

fn print_summary(path: &std::path::Path, config: &AppConfig) {
    println!("Configuration is valid");
    println!("   Config file   : {}", path.display());
    println!(
        "   API address   : {}:{}",
        config.server.api_host, config.server.api_port
    );
    println!("   Database      : {}", config.database.url);
    println!("   Payments      : {:?}", config.payments.provider);
    println!("   Notifications : {:?}", config.notifications.provider);
    println!("   Log level     : {}", config.logging.level);
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(hotel_booking::default_config_path);

    let loaded = AppConfig::load(&config_path);
    if cli.check {
        return match loaded {
            Ok(mut config) => {
                if let Some(port) = cli.api_port {
                    config.server.api_port = port;
                }
                print_summary(&config_path, &config);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Invalid configuration: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let (mut config, load_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(port) = cli.api_port {
        config.server.api_port = port;
    }

    init_tracing(&config);
    match load_error {
        None => info!(path = %config_path.display(), "Configuration ready"),
        Some(e) => warn!(error = %e, "Failed to load config; using defaults"),
    }

    let handle = match ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Failed to start booking service");
            return ExitCode::FAILURE;
        }
    };

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully");

    handle.shutdown_signal().wait().await;
    handle.wait().await;
    ExitCode::SUCCESS
}
