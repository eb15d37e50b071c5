/// API сервер для предрассчитанных предсказаний продаж

use std::sync::Arc;

use anyhow::Context;

use sales_forecast::{serving, PredictionStore, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env()?;

    // Артефакт читается один раз, а не на каждый запрос
    let predictions = PredictionStore::load(&config.predictions_path)
        .with_context(|| format!("Failed to load predictions from {}", config.predictions_path.display()))?;

    let app = serving::router(Arc::new(predictions));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Server listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
