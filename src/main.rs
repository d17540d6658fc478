use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use mediscan::api::types::hash_token;
use mediscan::api::{start_server, ApiContext};
use mediscan::config;
use mediscan::db::{open_database, repository};
use mediscan::pipeline::build_pipeline;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if let Err(e) = run().await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let uploads_dir = config::uploads_dir();
    std::fs::create_dir_all(&uploads_dir)
        .map_err(|e| format!("Cannot create {}: {e}", uploads_dir.display()))?;

    // Open once up front so migrations run before the first request
    let db_path = config::database_path();
    {
        let conn =
            open_database(&db_path).map_err(|e| format!("Cannot open database: {e}"))?;

        if let Some(token) = config::bootstrap_token() {
            let user_id = repository::ensure_user_token(&conn, "local", &hash_token(&token))
                .map_err(|e| format!("Bootstrap user failed: {e}"))?;
            tracing::info!(user_id, "bootstrap user 'local' ready");
        }
    }

    let pipeline = build_pipeline(db_path.clone(), uploads_dir);
    let ctx = ApiContext::new(db_path, pipeline);

    let addr: SocketAddr = config::bind_addr()
        .parse()
        .map_err(|e| format!("Invalid bind address '{}': {e}", config::bind_addr()))?;

    let mut server = start_server(ctx, addr).await?;
    tracing::info!(addr = %server.addr, "listening");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Cannot listen for shutdown signal: {e}"))?;
    server.shutdown();
    server.join().await;

    Ok(())
}
