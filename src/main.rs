use anyhow::Context;
use axum::http::HeaderValue;
use clap::Parser;
use ragway::{api, AppState, StoreClient};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "ragway-server", version, about = "Retrieval-augmented generation gateway")]
struct Args {
    /// Address to bind
    #[arg(long, env = "RAGWAY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(long, env = "RAGWAY_PORT", default_value_t = 8000)]
    port: u16,

    /// Path to the SQLite database file
    #[arg(long, env = "RAGWAY_DB", default_value = "ragway.db")]
    database: String,

    /// Comma-separated list of allowed CORS origins; any origin if unset
    #[arg(long, env = "RAGWAY_CORS_ORIGINS")]
    cors_origins: Option<String>,
}

fn build_cors(origins: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match origins {
        Some(list) => {
            let origins: Vec<HeaderValue> = list
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            cors.allow_origin(AllowOrigin::list(origins))
        }
        None => cors.allow_origin(Any),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ragway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = Arc::new(
        StoreClient::new_local(&args.database)
            .await
            .context("failed to open database")?,
    );

    // One connection pool for all three external services; timeouts are
    // per-call so the open-ended generation stream is not cut short.
    let http = reqwest::Client::new();

    let state = AppState::new(store, http).await?;
    let app = api::routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(args.cors_origins.as_deref()));

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", args.host, args.port))?;

    info!(addr = %listener.local_addr()?, database = %args.database, "Gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
