// src/ingest/scheduler.rs
use std::collections::{HashSet, VecDeque};

use metrics::counter;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::handle::TriggerHandle;
use crate::ingest::types::FeedProvider;
use crate::story::Story;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_SEEN_CAPACITY: usize = 10_000;
pub const ENV_POLL_INTERVAL_SECS: &str = "POLL_INTERVAL_SECS";

#[derive(Clone, Copy, Debug)]
pub struct PollerCfg {
    pub interval_secs: u64,
    pub seen_capacity: usize,
}

impl Default for PollerCfg {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            seen_capacity: DEFAULT_SEEN_CAPACITY,
        }
    }
}

impl PollerCfg {
    /// Defaults, with `POLL_INTERVAL_SECS` overriding the interval (min 1s).
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(secs) = parse_interval_env(std::env::var(ENV_POLL_INTERVAL_SECS).ok()) {
            cfg.interval_secs = secs;
        }
        cfg
    }
}

fn parse_interval_env(raw: Option<String>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .map(|v| v.max(1))
}

/// Ids of stories already delivered, oldest evicted first once `cap` is reached.
#[derive(Debug)]
pub struct SeenStories {
    order: VecDeque<String>,
    ids: HashSet<String>,
    cap: usize,
}

impl SeenStories {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            order: VecDeque::with_capacity(cap.min(10_000)),
            ids: HashSet::new(),
            cap,
        }
    }

    /// Record `id`; returns false if it was already seen.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        if self.order.len() >= self.cap {
            if let Some(old) = self.order.pop_front() {
                self.ids.remove(&old);
            }
        }
        self.order.push_back(id.to_string());
        self.ids.insert(id.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// One poll: fetch, filter against the current triggers, drop already-delivered ids.
pub async fn poll_once(
    providers: &[Box<dyn FeedProvider>],
    handle: &TriggerHandle,
    seen: &mut SeenStories,
) -> Vec<Story> {
    let stories = crate::ingest::run_once(providers).await;
    let matched = handle.filter(&stories);
    let fresh: Vec<Story> = matched.into_iter().filter(|s| seen.insert(&s.id)).collect();

    counter!("poll_runs_total").increment(1);
    counter!("stories_matched_total").increment(fresh.len() as u64);
    tracing::info!(
        target: "ingest",
        fetched = stories.len(),
        new_matches = fresh.len(),
        "poll tick"
    );
    fresh
}

/// Spawn the polling loop. New matches go to `sink`; the task ends once the
/// receiving side is dropped.
pub fn spawn_poller(
    cfg: PollerCfg,
    providers: Vec<Box<dyn FeedProvider>>,
    handle: TriggerHandle,
    sink: mpsc::Sender<Story>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(cfg.interval_secs.max(1)));
        let mut seen = SeenStories::with_capacity(cfg.seen_capacity);
        loop {
            ticker.tick().await;
            if sink.is_closed() {
                break;
            }
            for story in poll_once(&providers, &handle, &mut seen).await {
                if sink.send(story).await.is_err() {
                    tracing::info!(target: "ingest", "story sink closed; poller stopping");
                    return;
                }
            }
        }
    })
}
