//! Reusable booking service runtime.
//!
//! [`ServerHandle`] owns the whole lifecycle: metrics recorder, database and
//! migrations, outbound gateways, application services, the REST API and
//! graceful shutdown. The root binary and the CLI launcher both start the
//! service through it.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::ports::{NotificationGateway, PaymentGateway};
use crate::application::{AvailabilityChecker, PaymentReconciler, ReservationLedger, RoomCatalog};
use crate::config::{AppConfig, NotificationProvider, PaymentProvider};
use crate::domain::repositories::RepositoryProvider;
use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
use crate::infrastructure::payments::{DisabledPaymentGateway, StripeGateway};
use crate::infrastructure::{init_database, run_migrations};
use crate::interfaces::http::{create_api_router, ApiServices, RouterSettings};
use crate::notifications::{LogNotificationGateway, Notifier, WebhookNotificationGateway};
use crate::shared::clock::{Clock, SystemClock};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

pub type StartError = Box<dyn std::error::Error + Send + Sync>;

/// Options for starting the service.
pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

/// Handle to a running booking service.
///
/// ```rust,no_run
/// use hotel_booking::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the REST API is bound to (useful with port 0).
    pub local_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

/// The global recorder can only be installed once per process; a restart in
/// the same process reuses it. `None` if another recorder is already set.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return Some(handle.clone());
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics recorder installed");
            Some(PROM_HANDLE.get_or_init(|| handle).clone())
        }
        Err(e) => {
            warn!(error = %e, "Metrics recorder unavailable; /metrics disabled");
            None
        }
    }
}

fn payment_gateway(config: &AppConfig) -> Result<Arc<dyn PaymentGateway>, StartError> {
    let payments = &config.payments;
    Ok(match payments.provider {
        PaymentProvider::Stripe => {
            info!(api_base = %payments.stripe_api_base, "Payment provider: Stripe");
            Arc::new(StripeGateway::new(
                payments.stripe_secret_key.clone(),
                payments.stripe_api_base.clone(),
                Duration::from_secs(payments.timeout_secs),
            )?)
        }
        PaymentProvider::Disabled => {
            warn!("Payment provider disabled; payment intents will fail");
            Arc::new(DisabledPaymentGateway)
        }
    })
}

fn notification_gateway(config: &AppConfig) -> Result<Arc<dyn NotificationGateway>, StartError> {
    let notifications = &config.notifications;
    Ok(match notifications.provider {
        NotificationProvider::Webhook => {
            info!(url = %notifications.webhook_url, "Notifications: webhook");
            Arc::new(WebhookNotificationGateway::new(
                notifications.webhook_url.clone(),
                Duration::from_secs(notifications.timeout_secs),
            )?)
        }
        NotificationProvider::Log => Arc::new(LogNotificationGateway),
    })
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, StartError> {
        let config = opts.config;
        config.validate()?;

        info!(version = env!("CARGO_PKG_VERSION"), "Starting booking service");

        let metrics = prometheus_handle();

        let db = init_database(&config.database_config()).await?;
        if opts.auto_migrate {
            run_migrations(&db).await?;
        }

        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let notifier = Notifier::new(
            notification_gateway(&config)?,
            Duration::from_secs(config.notifications.timeout_secs),
        );

        let services = ApiServices {
            ledger: Arc::new(ReservationLedger::new(
                repos.clone(),
                clock.clone(),
                notifier.clone(),
                config.ledger_settings(),
            )),
            reconciler: Arc::new(PaymentReconciler::new(
                repos.clone(),
                payment_gateway(&config)?,
                notifier,
                config.reconciler_settings(),
            )),
            catalog: Arc::new(RoomCatalog::new(repos.clone())),
            availability: Arc::new(AvailabilityChecker::new(repos.clone(), clock)),
        };

        if config.payments.webhook_secret.is_empty() {
            warn!("payments.webhook_secret is empty; payment webhooks will be rejected");
        }

        let router = create_api_router(
            services,
            db.clone(),
            RouterSettings {
                jwt_config: config.jwt_config(),
                webhook_secret: config.payments.webhook_secret.clone(),
                metrics,
            },
        );

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let api_shutdown = shutdown.signal();

        let bind_addr = format!("{}:{}", config.server.api_host, config.server.api_port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "REST API listening");
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_server = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!(error = %e, "REST API server error");
            }
        });

        Ok(Self {
            repos,
            config,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Trigger shutdown on SIGTERM / SIGINT.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Non-blocking; pair with [`wait`](Self::wait).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for in-flight requests (bounded by `server.shutdown_timeout`),
    /// then close the database.
    pub async fn wait(self) {
        let limit = Duration::from_secs(self.shutdown.timeout_secs());
        match tokio::time::timeout(limit, self.api_task).await {
            Ok(Ok(())) => info!("REST API stopped"),
            Ok(Err(e)) => error!(error = %e, "REST API task panicked"),
            Err(_) => warn!(
                timeout_secs = limit.as_secs(),
                "REST API did not drain in time; closing anyway"
            ),
        }

        if let Err(e) = self.db.close().await {
            warn!(error = %e, "Error closing database connection");
        } else {
            info!("Database connection closed");
        }
        info!("Booking service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down booking service");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing from the application config. `RUST_LOG` overrides
/// `logging.level`.
///
/// Call once at process startup, before [`ServerHandle::start`].
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    if let Err(e) = result {
        eprintln!("tracing already initialized: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.api_host = "127.0.0.1".into();
        config.server.api_port = 0;
        config.server.shutdown_timeout = 5;
        config.database.url = "sqlite::memory:".into();
        config.database.max_connections = 1;
        config
    }

    #[tokio::test]
    async fn serves_health_and_shuts_down() {
        let handle = ServerHandle::start(ServerOptions {
            config: test_config(),
            auto_migrate: true,
        })
        .await
        .unwrap();
        assert!(handle.is_running());

        let url = format!("http://{}/health", handle.local_addr);
        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let request_id = response.headers().get("x-request-id").cloned();
        assert!(request_id.is_some());
        drop(response);

        tokio::time::timeout(Duration::from_secs(10), handle.shutdown())
            .await
            .expect("shutdown hung");
    }

    #[tokio::test]
    async fn invalid_config_refuses_to_start() {
        let mut config = test_config();
        config.payments.provider = PaymentProvider::Stripe;

        let result = ServerHandle::start(ServerOptions {
            config,
            auto_migrate: true,
        })
        .await;
        assert!(result.is_err());
    }
}
