use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use backoffice_api::auth::password::hash_password;
use backoffice_api::config::ServerConfig;
use backoffice_api::router::build_app_router;
use backoffice_api::state::AppState;
use backoffice_db::seed::{self, MANAGER_PASSWORD};
use backoffice_db::{MemoryStore, PgStore};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        member_history = ?config.history.member,
        employee_history = ?config.history.employee,
        "Loaded server configuration"
    );

    let seed_demo_data = std::env::var("SEED_DEMO_DATA")
        .is_ok_and(|v| matches!(v.trim(), "1" | "true" | "yes"));

    let state = match std::env::var("DATABASE_URL") {
        Ok(url) => postgres_state(&url, &config, seed_demo_data).await,
        Err(_) => memory_state(&config, seed_demo_data).await,
    };

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Back office API listening");

    axum::serve(listener, build_app_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server stopped");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backoffice_api=debug,backoffice_db=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn seed_password_hash() -> String {
    hash_password(MANAGER_PASSWORD).expect("Failed to hash seed password")
}

/// Connect, migrate and optionally seed PostgreSQL.
async fn postgres_state(url: &str, config: &ServerConfig, seed_demo_data: bool) -> AppState {
    let pool = backoffice_db::create_pool(url)
        .await
        .expect("Failed to connect to database");
    backoffice_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    backoffice_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready, migrations applied");

    if seed_demo_data {
        seed::seed_postgres(&pool, &seed_password_hash())
            .await
            .expect("Failed to seed demo data");
        tracing::info!("Demo data seeded");
    }

    AppState::new(Arc::new(PgStore::new(pool)), config.clone())
}

/// Without a database everything lives in process memory.
async fn memory_state(config: &ServerConfig, seed_demo_data: bool) -> AppState {
    tracing::warn!("DATABASE_URL not set, using the in-memory store (data is lost on exit)");
    let store = Arc::new(MemoryStore::new());
    if seed_demo_data {
        seed::seed_memory(&store, &seed_password_hash())
            .await
            .expect("Failed to seed demo data");
        tracing::info!("Demo data seeded");
    }
    AppState::new(store, config.clone())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
