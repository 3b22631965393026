mod cli;
mod commands;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use elecmate_bulk::{BulkActionCoordinator, Session};
use elecmate_cloud::CloudConfig;
use elecmate_events::EventBus;

use cli::Cli;
use commands::Runner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays parseable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "elecmate_cli=info,elecmate_bulk=info,elecmate_cloud=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CloudConfig::from_env().context("loading configuration")?;
    tracing::debug!(?config, "Loaded configuration");
    let (storage, exporter) = elecmate_cloud::connect(&config)?;

    let bus = Arc::new(EventBus::default());
    let notices = bus.subscribe();
    let coordinator =
        BulkActionCoordinator::new(storage, exporter, bus, config.coordinator_config());

    let session = cli.user.map(Session::new);

    let mut runner = Runner {
        coordinator: &coordinator,
        notices,
        session: session.as_ref(),
        json: cli.json,
    };
    runner.run(cli.command).await
}
