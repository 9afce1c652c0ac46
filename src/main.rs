//! Trigger-filtered news poller — binary entrypoint.
//! Loads triggers, polls the configured feeds and prints each newly matched story.

use anyhow::{bail, Context};
use news_trigger_filter::config::{trigger_config_path, TriggerConfig};
use news_trigger_filter::handle::{start_hot_reload_thread, TriggerHandle};
use news_trigger_filter::ingest::config::load_feeds_default;
use news_trigger_filter::ingest::providers::rss::RssProvider;
use news_trigger_filter::ingest::scheduler::{spawn_poller, PollerCfg};
use news_trigger_filter::ingest::types::FeedProvider;
use news_trigger_filter::Story;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_trigger_filter=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn print_story(story: &Story) {
    println!("{}", story.title);
    println!("{}", "-".repeat(63));
    println!("{}", story.description);
    if !story.link.is_empty() {
        println!("{}", story.link);
    }
    println!("{}", "*".repeat(69));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let path = trigger_config_path();
    let cfg = TriggerConfig::from_path(&path)
        .with_context(|| format!("loading triggers from {}", path.display()))?;
    if cfg.triggers.is_empty() {
        tracing::warn!(path = %path.display(), "no active triggers; nothing will be shown");
    }
    let handle = TriggerHandle::new(cfg.triggers);
    start_hot_reload_thread(handle.clone(), path);

    let feeds = load_feeds_default().context("loading feed list")?;
    if feeds.is_empty() {
        bail!("no feeds configured (set FEEDS_PATH or create config/feeds.toml)");
    }
    let providers: Vec<Box<dyn FeedProvider>> = feeds
        .into_iter()
        .map(|url| Box::new(RssProvider::from_url(url)) as Box<dyn FeedProvider>)
        .collect();

    let poll_cfg = PollerCfg::from_env();
    tracing::info!(
        feeds = providers.len(),
        interval_secs = poll_cfg.interval_secs,
        "polling started"
    );

    let (tx, mut rx) = mpsc::channel::<Story>(256);
    let poller = spawn_poller(poll_cfg, providers, handle, tx);

    loop {
        tokio::select! {
            maybe = rx.recv() => match maybe {
                Some(story) => print_story(&story),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    drop(rx);
    poller.abort();
    Ok(())
}
