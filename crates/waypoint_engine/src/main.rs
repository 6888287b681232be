use anyhow::Context as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing_subscriber::EnvFilter;
use waypoint_backend::{EnvLinkSource, EnvPushSource, EnvShareSource, SqliteStore};
use waypoint_domain::RoutePath;
use waypoint_engine::{Engine, EngineConfig, StartupServices};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig::from_env().context("invalid waypoint configuration")?;
    let store = SqliteStore::new(config.db_path.clone())?;
    let services = StartupServices::new(
        Arc::new(EnvPushSource::default()),
        Arc::new(EnvLinkSource::default()),
        Arc::new(EnvShareSource::default()),
        Arc::new(store),
    );

    tracing::info!(
        db = %config.db_path.display(),
        platform = config.options.platform.as_str(),
        "waypoint starting"
    );
    let engine = Engine::start(services, config.options);

    let intent = engine.startup_intent().await?;
    println!(
        "{}",
        serde_json::to_string(&intent).context("failed to encode startup intent")?
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("logout") {
            engine.logged_out().await?;
            continue;
        }
        match serde_json::from_str::<RoutePath>(line) {
            Ok(path) => engine.route_changed(path).await?,
            Err(err) => tracing::warn!(error = %err, "ignoring unparseable route path"),
        }
    }

    engine.flush().await?;
    Ok(())
}
