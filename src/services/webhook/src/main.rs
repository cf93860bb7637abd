//! Main binary for the TrustFlow Webhook Service
//!
//! This service manages customer webhook integrations:
//! - Endpoint registration with URL security screening and per-space quotas
//! - Signed test deliveries against registered endpoints
//! - A dashboard-facing relay for testing candidate URLs
//! - Ephemeral test result caching with automatic expiry
//! - Health and Prometheus metrics endpoints

use webhook_service::{
    config::WebhookServiceConfig, manager::WebhookManager, routes::create_router,
};

use axum::serve;
use clap::{Arg, Command};
use dotenvy::dotenv;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();

    // Parse command line arguments
    let matches = create_cli().get_matches();

    // Initialize tracing
    init_tracing(matches.get_one::<String>("log-level").map(String::as_str))?;

    // Load configuration
    let config = load_config(&matches)?;

    // Validate configuration
    config.validate().map_err(|e| {
        error!("Configuration validation failed: {}", e);
        e
    })?;

    info!("Starting TrustFlow Webhook Service");
    info!(
        "Configuration: Server {}:{}",
        config.server.host, config.server.port
    );
    info!(
        "Limits: {} endpoints per space, {}s dispatch timeout, {}s result TTL",
        config.limits.max_endpoints_per_space,
        config.dispatch.timeout_seconds,
        config.results.ttl_seconds
    );

    // Create cancellation token for graceful shutdown
    let cancellation_token = CancellationToken::new();

    // Initialize webhook manager
    let manager = Arc::new(WebhookManager::new(config.clone()).map_err(|e| {
        error!("Failed to initialize webhook manager: {}", e);
        e
    })?);

    // Create router
    let app = create_router(Arc::clone(&manager));

    // Create socket address
    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .map_err(|e| format!("Invalid host address: {}", e))?,
        config.server.port,
    );

    info!("Starting HTTP server on {}", addr);

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to address {}: {}", addr, e);
        e
    })?;

    info!("Webhook service started successfully on {}", addr);
    info!("Health check: http://{}/health", addr);
    info!("Metrics: http://{}/metrics", addr);
    info!("Test relay: http://{}/api/webhooks/test", addr);

    // Start the expired-result sweeper
    let sweeper_task = start_sweeper_task(
        Arc::clone(&manager),
        config.results.sweep_interval_seconds,
        cancellation_token.clone(),
    );

    // Start server with graceful shutdown
    let server_task = tokio::spawn({
        let cancellation_token = cancellation_token.clone();
        async move {
            let server = serve(listener, app).into_future();

            tokio::select! {
                result = server => {
                    if let Err(e) = result {
                        error!("Server error: {}", e);
                    }
                }
                _ = cancellation_token.cancelled() => {
                    info!("Server shutdown requested");
                }
            }
        }
    });

    // Wait for shutdown signal
    wait_for_shutdown_signal().await;

    info!("Shutdown signal received, initiating graceful shutdown...");

    // Cancel all tasks
    cancellation_token.cancel();

    // Wait for server to shutdown
    if let Err(e) = server_task.await {
        error!("Server task error during shutdown: {}", e);
    }

    // Wait for sweeper task to finish
    if let Err(e) = sweeper_task.await {
        warn!("Sweeper task error during shutdown: {}", e);
    }

    info!("TrustFlow Webhook Service stopped gracefully");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: Option<&str>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let default_directives = format!(
        "webhook_service={level},tower_http=info,axum=info",
        level = log_level.unwrap_or("info")
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();

    Ok(())
}

/// Create CLI argument parser
fn create_cli() -> Command {
    Command::new("webhook-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("TrustFlow Webhook Service - Endpoint management and test delivery")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Server host address"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Server port"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
                .default_value("info"),
        )
}

/// Load configuration from file and environment
fn load_config(
    matches: &clap::ArgMatches,
) -> Result<WebhookServiceConfig, Box<dyn std::error::Error + Send + Sync>> {
    let mut config = if let Some(config_file) = matches.get_one::<String>("config") {
        info!("Loading configuration from file: {}", config_file);
        std::env::set_var("WEBHOOK_CONFIG_FILE", config_file);
        WebhookServiceConfig::from_env()
            .map_err(|e| format!("Failed to load configuration from file: {}", e))?
    } else {
        info!("Using default configuration with environment overrides");
        WebhookServiceConfig::from_env().unwrap_or_else(|e| {
            warn!(
                "Failed to load configuration from environment: {}, using defaults",
                e
            );
            WebhookServiceConfig::default()
        })
    };

    // Override with CLI arguments
    if let Some(host) = matches.get_one::<String>("host") {
        config.server.host = host.clone();
    }

    if let Some(port_str) = matches.get_one::<String>("port") {
        config.server.port = port_str
            .parse()
            .map_err(|e| format!("Invalid port number '{}': {}", port_str, e))?;
    }

    Ok(config)
}

/// Start the background sweeper that drops expired test results
fn start_sweeper_task(
    manager: Arc<WebhookManager>,
    interval_seconds: u64,
    cancellation_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(tokio::time::Duration::from_secs(interval_seconds));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let removed = manager.cleanup_expired_results();
                    if removed > 0 {
                        info!("Swept {} expired webhook test results", removed);
                    }
                }
                _ = cancellation_token.cancelled() => {
                    info!("Result sweeper shutting down");
                    break;
                }
            }
        }
    })
}

/// Wait for shutdown signals
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_cli() {
        let cli = create_cli();
        let matches = cli.try_get_matches_from(vec!["webhook-server", "--port", "9090"]);
        assert!(matches.is_ok());

        let matches = matches.unwrap();
        assert_eq!(matches.get_one::<String>("port"), Some(&"9090".to_string()));
    }

    #[test]
    fn test_load_default_config() {
        let cli = create_cli();
        let matches = cli.get_matches_from(vec!["webhook-server"]);

        let config = load_config(&matches);
        assert!(config.is_ok());

        let config = config.unwrap();
        assert_eq!(config.server.port, 8094);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_config_with_overrides() {
        let cli = create_cli();
        let matches = cli.get_matches_from(vec![
            "webhook-server",
            "--host",
            "127.0.0.1",
            "--port",
            "9999",
        ]);

        let config = load_config(&matches).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9999);
    }

    #[test]
    fn test_invalid_port_handling() {
        let cli = create_cli();
        let matches = cli.get_matches_from(vec!["webhook-server", "--port", "invalid"]);

        let config = load_config(&matches);
        assert!(config.is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = WebhookServiceConfig::default();
        assert!(config.validate().is_ok());

        config.server.port = 0;
        assert!(config.validate().is_err());
    }
}
