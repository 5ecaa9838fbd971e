//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;
use std::time::Duration;

use auth::domain::repository::{PersonalAccessTokenRepository, UserRepository};
use auth::{AuthAppState, MemoryAuthRepository, PgAuthRepository, PgRateLimiter, auth_router};
use axum::{
    Router,
    http::{self, Method, header},
};
use kernel::error::app_error::AppError;
use platform::rate_limit::{MemoryRateLimiter, RateLimiter};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ApiConfig, RateLimitStore};

const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,platform=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;

    let Some(database_url) = config.database_url.clone() else {
        tracing::warn!("DATABASE_URL not set, users and tokens are kept in memory");
        let limiter = spawn_memory_limiter();
        return serve(MemoryAuthRepository::new(), limiter, config).await;
    };

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup
    // Errors here should not prevent server startup
    let repo = PgAuthRepository::new(pool.clone());
    if let Err(e) = repo.cleanup_expired().await {
        tracing::warn!(
            error = %e,
            "Access token cleanup failed, continuing anyway"
        );
    }

    match config.rate_limit_store {
        RateLimitStore::Database => {
            let limiter = database_limiter(pool).await;
            serve(repo, limiter, config).await
        }
        RateLimitStore::Memory => {
            let limiter = spawn_memory_limiter();
            serve(repo, limiter, config).await
        }
    }
}

/// In-process limiter plus a task that prunes elapsed windows
fn spawn_memory_limiter() -> MemoryRateLimiter {
    let limiter = MemoryRateLimiter::new();

    let cleanup = limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(LIMITER_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = cleanup.cleanup_expired();
            if removed > 0 {
                tracing::debug!(removed, "Pruned expired rate limit counters");
            }
        }
    });

    limiter
}

async fn database_limiter(pool: PgPool) -> PgRateLimiter {
    let limiter = PgRateLimiter::new(pool);
    if let Err(e) = limiter.cleanup_expired().await {
        tracing::warn!(
            error = %e,
            "Rate limit cleanup failed, continuing anyway"
        );
    }
    limiter
}

async fn serve<R, L>(repo: R, limiter: L, config: ApiConfig) -> anyhow::Result<()>
where
    R: UserRepository + PersonalAccessTokenRepository + Send + Sync + 'static,
    L: RateLimiter + Send + Sync + 'static,
{
    let state = AuthAppState::new(repo, limiter, config.auth.clone())?;

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = Router::new()
        .merge(auth_router(state))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = config.bind_addr;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");

    Ok(())
}

async fn not_found() -> AppError {
    AppError::not_found("Not Found")
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
