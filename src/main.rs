use std::sync::Arc;

use atelier::config::Config;
use atelier::generate::HttpGenerator;
use atelier::server::{AppState, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let backend = HttpGenerator::new(
        config.api_key.clone(),
        config.base_url.clone(),
        config.model.clone(),
    );
    let state = Arc::new(AppState {
        backend: Arc::new(backend),
        max_image_chars: config.max_image_chars,
    });

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(addr = %config.bind, model = %config.model, "atelier relay listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
