use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use truthrelay_monitor::config::Config;
use truthrelay_monitor::detail::Enricher;
use truthrelay_monitor::feed::SnapshotFetcher;
use truthrelay_monitor::monitor::{ExitReason, Monitor};
use truthrelay_monitor::notify::DiscordWebhook;
use truthrelay_monitor::render::{BrowserlessRenderer, ChromeRenderer, PageRenderer};
use truthrelay_monitor::state::StateStore;
use truthrelay_monitor::translate::ClaudeTranslator;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("truthrelay_monitor=info".parse()?),
        )
        .init();

    info!("Truth Social relay monitor starting...");

    let config = Config::from_env()?;
    config.ensure_data_dir()?;

    let renderer: Arc<dyn PageRenderer> = match &config.browserless_url {
        Some(url) => Arc::new(BrowserlessRenderer::new(
            url,
            config.browserless_token.as_deref(),
        )),
        None => Arc::new(ChromeRenderer::new(&config.chrome_bin)),
    };

    let fetcher = Arc::new(SnapshotFetcher::new(renderer.clone(), &config.feed_url));
    let enricher = Arc::new(Enricher::new(renderer));
    let translator = Arc::new(ClaudeTranslator::new(
        &config.anthropic_api_key,
        &config.anthropic_model,
    ));
    let sink = Arc::new(DiscordWebhook::new(config.discord_webhook_url.clone()));
    let state = StateStore::new(&config.data_dir);

    let mut monitor = Monitor::new(fetcher, enricher, translator, sink, state, config.monitor());

    match monitor.run().await? {
        ExitReason::Shutdown => {
            info!("Shutting down gracefully");
            Ok(())
        }
        ExitReason::PeriodicRestart => {
            info!("Exiting nonzero so the container supervisor restarts us fresh");
            std::process::exit(1);
        }
    }
}
