use anyhow::Context;

use jobcache_api::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("invalid configuration")?;
    jobcache_observability::init(config.log_format);

    tracing::info!(
        base_ttl_secs = config.policy.base_ttl.as_secs(),
        api_ttl_secs = config.policy.derived_ttl.as_secs(),
        "configuration loaded"
    );

    let app = jobcache_api::app::build_app(&config);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server terminated")?;
    Ok(())
}
