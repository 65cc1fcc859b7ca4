use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::dom::collapsed_text;
use crate::render::PageRenderer;
use crate::types::{numeric_id, FeedPost};

/// Aggregator feed listing the monitored account's posts, newest first.
pub const DEFAULT_FEED_URL: &str =
    "https://rollcall.com/factbase/trump/topic/social/?platform=all&sort=date&sort_order=desc&page=1";

/// Hard wall-clock budget for one snapshot fetch, render included. Coarser
/// than the per-post detail budget because the feed page is heavy.
const FEED_TIMEOUT: Duration = Duration::from_secs(180);

/// Images below this dimension on the feed card are avatars and icons,
/// not post media.
const MIN_MEDIA_DIMENSION: u32 = 150;

// --- FeedFetcher trait ---

/// Stage 1: detect the currently visible posts on the aggregator feed.
/// Returns posts ascending by numeric id; empty on any failure or timeout,
/// which callers treat as "no update this cycle".
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self) -> Vec<FeedPost>;
}

pub struct SnapshotFetcher {
    renderer: Arc<dyn PageRenderer>,
    feed_url: String,
}

impl SnapshotFetcher {
    pub fn new(renderer: Arc<dyn PageRenderer>, feed_url: &str) -> Self {
        Self {
            renderer,
            feed_url: feed_url.to_string(),
        }
    }

    async fn fetch_inner(&self) -> Result<Vec<FeedPost>> {
        let url = cache_busted(&self.feed_url);
        let html = self.renderer.render(&url).await?;
        Ok(parse_feed_snapshot(&html))
    }
}

#[async_trait]
impl FeedFetcher for SnapshotFetcher {
    async fn fetch(&self) -> Vec<FeedPost> {
        match tokio::time::timeout(FEED_TIMEOUT, self.fetch_inner()).await {
            Ok(Ok(posts)) => {
                info!(count = posts.len(), "Feed snapshot fetched");
                posts
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Feed fetch failed, treating as empty snapshot");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    timeout_secs = FEED_TIMEOUT.as_secs(),
                    "Feed fetch hit hard timeout, treating as empty snapshot"
                );
                Vec::new()
            }
        }
    }
}

/// Append a cache-defeating query parameter so CDN layers cannot serve a
/// stale snapshot.
fn cache_busted(feed_url: &str) -> String {
    let sep = if feed_url.contains('?') { '&' } else { '?' };
    format!("{feed_url}{sep}t={}", chrono::Utc::now().timestamp())
}

/// Extract feed posts from the rendered aggregator page.
///
/// Cards without a Truth Social detail link or without a numeric id in that
/// link are ads and layout chrome, and are intentionally discarded.
pub(crate) fn parse_feed_snapshot(html: &str) -> Vec<FeedPost> {
    let doc = Html::parse_document(html);
    let card_sel = Selector::parse("div.rounded-xl.border").expect("valid selector");
    let anchor_sel = Selector::parse("a").expect("valid selector");
    let content_sel =
        Selector::parse("div.text-sm.font-medium.whitespace-pre-wrap").expect("valid selector");
    let div_sel = Selector::parse("div").expect("valid selector");
    let img_sel = Selector::parse("img").expect("valid selector");

    let mut posts = Vec::new();

    for card in doc.select(&card_sel) {
        let detail_link = card.select(&anchor_sel).find(|a| {
            a.value()
                .attr("href")
                .is_some_and(|h| h.contains("truthsocial.com"))
                && collapsed_text(*a).contains("View on Truth Social")
        });
        let Some(link) = detail_link else {
            continue;
        };
        let url = link.value().attr("href").unwrap_or_default().to_string();
        let Some(id) = post_id_from_url(&url) else {
            continue;
        };

        let content = card
            .select(&content_sel)
            .next()
            .map(collapsed_text)
            .unwrap_or_default();

        // The timestamp lives in some nested div; the shortest text that
        // carries both the `@` and the ET zone marker is the most specific.
        let timestamp_text = card
            .select(&div_sel)
            .map(collapsed_text)
            .filter(|t| t.contains('@') && t.contains("ET"))
            .min_by_key(String::len)
            .unwrap_or_default();

        let media_urls = card
            .select(&img_sel)
            .filter(|img| {
                let dim = |name| {
                    img.value()
                        .attr(name)
                        .and_then(|v| v.parse::<u32>().ok())
                        .unwrap_or(0)
                };
                dim("width") > MIN_MEDIA_DIMENSION || dim("height") > MIN_MEDIA_DIMENSION
            })
            .filter_map(|img| img.value().attr("src"))
            .map(String::from)
            .collect();

        posts.push(FeedPost {
            id,
            url,
            content,
            timestamp_text,
            media_urls,
        });
    }

    posts.sort_by_key(|p| numeric_id(&p.id).unwrap_or(0));
    posts
}

fn post_id_from_url(url: &str) -> Option<String> {
    let re = regex::Regex::new(r"posts/(\d+)").expect("valid regex");
    re.captures(url).map(|c| c[1].to_string())
}
