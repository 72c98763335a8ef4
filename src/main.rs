//! Org Console - HTTP server entry point.

use org_console::{api, config::Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "org_console=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting Org Console on {}:{}", config.host, config.port);
    tracing::info!(
        "Backend timeout: {}ms",
        config.request_timeout.as_millis()
    );

    api::serve(config).await
}
