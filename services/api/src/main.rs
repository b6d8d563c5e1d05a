use anyhow::Result;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use bidding_api::{
    ApiConfig, AppState, StorageBackend, create_router,
    jwt::{JwtConfig, TokenService},
    middleware::cors_layer,
    repositories::schema,
};
use common::database::{DatabaseConfig, init_pool};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting bidding API service");

    let config = ApiConfig::from_env().map_err(anyhow::Error::msg)?;
    let tokens = TokenService::new(JwtConfig::from_env()?)?;

    let (state, pool) = match config.storage {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            if !common::database::health_check(&pool).await? {
                anyhow::bail!("Failed to connect to database");
            }
            info!("Database connection successful");

            schema::ensure_collections(&pool).await?;

            let state = AppState::postgres(tokens, config.environment, pool.clone());
            (state, Some(pool))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on shutdown");
            (AppState::in_memory(tokens, config.environment), None)
        }
    };

    let app = create_router(state)
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(
        "Bidding API service listening on {} ({:?})",
        config.bind_address(),
        config.environment
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        pool.close().await;
        info!("Database connection pool closed");
    }

    info!("Bidding API service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
