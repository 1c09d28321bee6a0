use anyhow::Context;

use bloglist_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bloglist_observability::init();

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let services = bloglist_api::app::services::build_services(&config).await?;
    let app = bloglist_api::app::build_app(services);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
