use anyhow::Context;

use stockpile_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockpile_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let app = stockpile_api::app::build_app(&config)
        .await
        .context("failed to wire services")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        module = "server",
        addr = %listener.local_addr()?,
        locale = %config.locale,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
