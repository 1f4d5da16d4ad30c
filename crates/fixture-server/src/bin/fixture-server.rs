use fixture_server::{FixtureServer, FixtureServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fixture_server=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = FixtureServerConfig::from_env();
    info!(target: "fixture_server", static_dir = %config.static_dir.display(), "loaded config");

    let server = FixtureServer::new(config.clone());
    server.start(config.port).await?;

    tokio::signal::ctrl_c().await?;
    server.stop().await;
    Ok(())
}
