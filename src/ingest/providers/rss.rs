// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::ingest::normalize_text;
use crate::ingest::types::FeedProvider;
use crate::story::Story;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(default, rename = "item")]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    guid: Option<Guid>,
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

// <guid isPermaLink="false">...</guid>
#[derive(Debug, Deserialize)]
struct Guid {
    #[serde(rename = "$text", default)]
    value: String,
}

/// RFC 2822 `pubDate` (named zones like GMT/EST and numeric offsets). Unparseable
/// dates map to the Unix epoch so the story is still filterable by phrase.
pub fn parse_pub_date(ts: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc2822(ts.trim()).unwrap_or_else(|e| {
        tracing::debug!(target: "ingest", error = %e, pub_date = ts, "unparseable pubDate");
        DateTime::<Utc>::default().fixed_offset()
    })
}

/// Parse an RSS 2.0 document into stories.
pub fn parse_rss(xml: &str) -> Result<Vec<Story>> {
    let t0 = std::time::Instant::now();
    let rss: Rss = from_str(xml).context("parsing rss xml")?;

    let mut out = Vec::with_capacity(rss.channel.item.len());
    for it in rss.channel.item {
        let title = normalize_text(it.title.as_deref().unwrap_or_default());
        let description = normalize_text(it.description.as_deref().unwrap_or_default());
        let link = it.link.unwrap_or_default().trim().to_string();

        // Stable id: guid, else link, else title.
        let id = it
            .guid
            .map(|g| g.value.trim().to_string())
            .filter(|g| !g.is_empty())
            .or_else(|| Some(link.clone()).filter(|l| !l.is_empty()))
            .unwrap_or_else(|| title.clone());
        if id.is_empty() {
            continue;
        }

        let published_at = it
            .pub_date
            .as_deref()
            .map(parse_pub_date)
            .unwrap_or_else(|| DateTime::<Utc>::default().fixed_offset());

        out.push(Story {
            id,
            title,
            description,
            link,
            published_at,
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("feed_parse_ms").record(ms);
    counter!("feed_items_total").increment(out.len() as u64);
    Ok(out)
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

/// RSS feed provider, either over HTTP or from an in-memory document.
pub struct RssProvider {
    name: String,
    mode: Mode,
}

impl RssProvider {
    pub fn from_fixture(name: impl Into<String>, xml: &str) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: url.clone(),
            mode: Mode::Http {
                url,
                client: reqwest::Client::new(),
            },
        }
    }
}

#[async_trait]
impl FeedProvider for RssProvider {
    async fn fetch_latest(&self) -> Result<Vec<Story>> {
        match &self.mode {
            Mode::Fixture(s) => parse_rss(s),
            Mode::Http { url, client } => {
                let body = client
                    .get(url.as_str())
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .with_context(|| format!("GET {url}"))?
                    .text()
                    .await
                    .with_context(|| format!("reading body of {url}"))?;
                parse_rss(&body).with_context(|| format!("feed {url}"))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
