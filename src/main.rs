use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_booking::{
    app,
    config::{AppConfig, Config, LogFormat},
    repository::{PgRepository, Repository},
    services::seed::seed_demo_data,
    sessions::{RedisSessionStore, SessionStore},
    AppState,
};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn init_tracing(config: &AppConfig) {
    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.rust_log));

    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    init_tracing(&config.app);

    info!("Starting Movie Booking API");

    // Connect to the database
    let pg = PgRepository::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    info!("Database connected");

    pg.run_migrations()
        .await
        .context("failed to run migrations")?;

    // Sessions live in Redis
    let sessions: Arc<dyn SessionStore> = Arc::new(
        RedisSessionStore::connect(&config.redis.url, config.session.ttl_seconds)
            .await
            .context("failed to connect to Redis")?,
    );
    info!("Redis connected");

    let repo: Arc<dyn Repository> = Arc::new(pg);

    if config.seed.enabled {
        seed_demo_data(repo.as_ref(), config.session.bcrypt_cost)
            .await
            .context("failed to seed demo data")?;
    }

    let state = AppState::new(repo, sessions, config.session.bcrypt_cost);
    let router = app(state);

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port)
        .parse()
        .context("HOST/PORT do not form a socket address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
