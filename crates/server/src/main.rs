mod config;
mod csrf;
mod error;
mod gate;
mod http;
mod moderation;
mod redirect;
mod render;
mod state;

use anyhow::Context;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Settings;
use csrf::{CsrfGuard, KeyStore};
use http::router::build_router;
use redirect::RedirectPolicy;
use render::EscapedText;
use state::AppState;
use storage::Db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::new().context("Failed to load configuration")?;

    let db = Db::new(&settings.database.url)
        .await
        .with_context(|| format!("Failed to open database {}", settings.database.url))?;

    let key_store = match &settings.security.csrf_keyfile {
        Some(path) => KeyStore::File(path.clone()),
        None => KeyStore::Settings(db.clone()),
    };
    let key = csrf::load_or_generate_key(&key_store).await?;

    let redirects = RedirectPolicy::from_list(&settings.security.allowed_redirect_origins);
    if !redirects.is_restricted() {
        info!("No redirect origins configured, comment redirects are not checked");
    }

    let state = AppState {
        db,
        authorizer: gate::from_settings(&settings.sandbox),
        csrf: CsrfGuard::new(
            key,
            Duration::from_secs(settings.security.csrf_token_ttl_secs),
        ),
        renderer: Arc::new(EscapedText),
        redirects,
    };

    let app = build_router(
        state,
        &settings.server.cors_origins,
        &settings.server.static_dir,
    );

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
