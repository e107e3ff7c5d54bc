//! Mohali Mart - storefront backend with token-gated routes

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, Layer, prelude::*};

mod config;

use crate::config::{Config, LoggingConfig};
use mohali_api::{AppState, create_router};
use mohali_auth::{Gatekeeper, GatekeeperPolicy, JwtManager, hash_password};
use mohali_db::{Database, NewUser, UserRole};

/// Mohali Mart - storefront backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "MOHALI_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "MOHALI_PORT")]
    port: Option<u16>,

    /// Token signing secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    init_logging(&config.logging);

    info!("Starting Mohali Mart v{}", env!("CARGO_PKG_VERSION"));

    // No secret, no server
    let secret = config.jwt_secret(args.jwt_secret)?;
    let jwt = Arc::new(
        JwtManager::new(&secret, config.auth.token_expiry_hours)
            .context("Failed to initialise token signing")?,
    );

    let metrics_handle = if config.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        Some(Arc::new(handle))
    } else {
        None
    };

    if let Some(parent) = std::path::Path::new(&config.database.path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    let db = Database::new(&config.database.url()).await?;

    seed_admin(&db, &config).await?;

    let policy = GatekeeperPolicy::from(&config.gatekeeper);
    info!(
        "Protecting API prefixes {:?} and page prefixes {:?}",
        policy.protected_api_prefixes, policy.protected_page_prefixes
    );
    let gatekeeper = Arc::new(Gatekeeper::new(policy, jwt.clone()));

    let state = AppState::new(db.clone(), jwt, gatekeeper);

    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

/// Create the configured administrator on an empty database
async fn seed_admin(db: &Database, config: &Config) -> Result<()> {
    let (Some(email), Some(password)) = (&config.auth.admin_email, &config.auth.admin_password)
    else {
        return Ok(());
    };

    if db.has_users().await? {
        return Ok(());
    }

    info!("Creating initial admin account {}", email);
    db.insert_user(NewUser {
        name: "Administrator".to_string(),
        email: email.clone(),
        password_hash: hash_password(password)?,
        role: UserRole::Admin,
        phone: None,
    })
    .await?;
    Ok(())
}

/// Initialize logging
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let layer = match config.format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().boxed(),
        "compact" => tracing_subscriber::fmt::layer().compact().boxed(),
        _ => tracing_subscriber::fmt::layer().pretty().boxed(),
    };

    tracing_subscriber::registry().with(filter).with(layer).init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
