//! API Server
//!
//! Serves the roll provider over HTTP.

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    monitoring::MetricsRegistry,
    routes::create_router,
};
use crate::{config::DiceBetConfig, games::provider::RandomnessProvider};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::TcpListener, signal};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub version: String,
    pub enable_metrics: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from(&DiceBetConfig::default())
    }
}

impl From<&DiceBetConfig> for ApiConfig {
    fn from(config: &DiceBetConfig) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            allowed_origins: config.server.allowed_origins.clone(),
            request_timeout_secs: config.server.request_timeout_secs,
            version: env!("CARGO_PKG_VERSION").to_string(),
            enable_metrics: config.monitoring.enable_metrics,
        }
    }
}

pub struct ApiServer {
    config: ApiConfig,
    provider: Arc<dyn RandomnessProvider>,
    metrics: Arc<MetricsRegistry>,
}

impl ApiServer {
    pub fn new(config: ApiConfig, provider: Arc<dyn RandomnessProvider>) -> Self {
        Self {
            config,
            provider,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    pub fn metrics(&self) -> Arc<MetricsRegistry> {
        self.metrics.clone()
    }

    /// Bind the configured address and serve until a shutdown signal arrives
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.get_socket_addr()?;
        let listener = TcpListener::bind(addr).await?;

        info!("🎲 Starting dicebet roll provider");
        info!("   Listen: http://{}", listener.local_addr()?);
        self.log_server_info();

        self.serve(listener).await
    }

    /// Serve on an already-bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.create_app();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("🛑 Roll provider stopped gracefully");
        Ok(())
    }

    /// Create the application with its middleware stack
    pub fn create_app(&self) -> axum::Router {
        let state = Arc::new(AppState {
            provider: self.provider.clone(),
            metrics: self.metrics.clone(),
        });

        create_router(state, self.config.enable_metrics)
            // Request ID middleware (first for tracing)
            .layer(axum::middleware::from_fn(request_id_middleware))
            // CORS layer (before timeout to handle preflight)
            .layer(create_cors_layer(self.config.allowed_origins.clone()))
            .layer(TimeoutLayer::new(Duration::from_secs(self.config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    fn get_socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        Ok(SocketAddr::from((
            self.config.host.parse::<std::net::IpAddr>()?,
            self.config.port,
        )))
    }

    fn log_server_info(&self) {
        info!("📋 Server Configuration:");
        info!("   Version: {}", self.config.version);
        info!("   CORS: {:?}", self.config.allowed_origins);
        info!("   Request timeout: {}s", self.config.request_timeout_secs);
        info!("   Metrics enabled: {}", self.config.enable_metrics);

        info!("📊 Available endpoints:");
        info!("   GET  /roll-dice  - Roll one six-sided die");
        info!("   GET  /health     - Health check");
        if self.config.enable_metrics {
            info!("   GET  /metrics    - Prometheus metrics");
        }
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
