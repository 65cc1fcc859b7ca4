use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::dom::collapsed_text;
use crate::render::PageRenderer;
use crate::types::PostDetail;

/// Per-post budget. Enrichment runs inside the processing loop, so it fails
/// fast rather than stalling the whole batch.
const DETAIL_TIMEOUT: Duration = Duration::from_secs(45);

// --- DetailFetcher trait ---

/// Stage 2: deep fields from the post's origin-platform page. A zero-value
/// record means "no enrichment available"; it is never an error and must
/// never abort processing of the post.
#[async_trait]
pub trait DetailFetcher: Send + Sync {
    async fn enrich(&self, url: &str) -> PostDetail;
}

pub struct Enricher {
    renderer: Arc<dyn PageRenderer>,
}

impl Enricher {
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self { renderer }
    }

    async fn enrich_inner(&self, url: &str) -> Result<PostDetail> {
        let html = self.renderer.render(url).await?;
        Ok(parse_post_detail(&html))
    }
}

#[async_trait]
impl DetailFetcher for Enricher {
    async fn enrich(&self, url: &str) -> PostDetail {
        match tokio::time::timeout(DETAIL_TIMEOUT, self.enrich_inner(url)).await {
            Ok(Ok(detail)) => {
                info!(
                    url,
                    is_retruth = detail.is_retruth,
                    has_card = detail.card_content.is_some(),
                    media = detail.media_urls.len(),
                    "Detail enrichment complete"
                );
                detail
            }
            Ok(Err(e)) => {
                warn!(url, error = %e, "Detail enrichment failed, continuing without it");
                PostDetail::default()
            }
            Err(_) => {
                warn!(
                    url,
                    timeout_secs = DETAIL_TIMEOUT.as_secs(),
                    "Detail enrichment timed out, continuing without it"
                );
                PostDetail::default()
            }
        }
    }
}

/// Extract deep post fields from a rendered Truth Social status page.
/// Every field is independently optional; absent selectors simply leave the
/// zero value in place.
pub(crate) fn parse_post_detail(html: &str) -> PostDetail {
    let doc = Html::parse_document(html);
    let header_sel = Selector::parse(".status__header").expect("valid selector");
    let content_sel = Selector::parse(".status__content").expect("valid selector");
    let card_sel = Selector::parse("a.status-card").expect("valid selector");
    let card_title_sel = Selector::parse("strong.status-card__title").expect("valid selector");
    let card_desc_sel = Selector::parse(".status-card__description").expect("valid selector");
    let media_sel = Selector::parse(".status__media").expect("valid selector");
    let img_sel = Selector::parse("img").expect("valid selector");
    let video_sel = Selector::parse("video").expect("valid selector");
    let source_sel = Selector::parse("source").expect("valid selector");

    let mut detail = PostDetail::default();

    if let Some(header) = doc.select(&header_sel).next() {
        let text = collapsed_text(header);
        if text.contains("ReTruthed") {
            detail.is_retruth = true;
            detail.retruth_header = text;
        }
    }

    if let Some(content) = doc.select(&content_sel).next() {
        detail.full_text = collapsed_text(content);
    }

    if let Some(card) = doc.select(&card_sel).next() {
        let title = card.select(&card_title_sel).next().map(collapsed_text);
        let desc = card.select(&card_desc_sel).next().map(collapsed_text);
        let joined = [title, desc]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        if !joined.is_empty() {
            detail.card_content = Some(joined);
        }
    }

    // Media extraction is scoped to the status media region so avatars and
    // UI icons elsewhere on the page are never picked up.
    if let Some(media) = doc.select(&media_sel).next() {
        detail.media_urls = media
            .select(&img_sel)
            .filter_map(|img| img.value().attr("src"))
            .map(String::from)
            .collect();

        detail.video_url = media.select(&video_sel).next().and_then(|video| {
            video
                .value()
                .attr("src")
                .map(String::from)
                .or_else(|| {
                    video
                        .select(&source_sel)
                        .next()
                        .and_then(|s| s.value().attr("src"))
                        .map(String::from)
                })
        });
    }

    detail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_retruth_header_text_and_card() {
        let html = r#"<html><body>
            <div class="status__header">ReTruthed from @Foo</div>
            <div class="status__content">The full shared text of the post</div>
            <a class="status-card" href="https://news.example/story">
              <strong class="status-card__title">Story title</strong>
              <div class="status-card__description">Story description here</div>
            </a>
        </body></html>"#;
        let detail = parse_post_detail(html);
        assert!(detail.is_retruth);
        assert_eq!(detail.retruth_header, "ReTruthed from @Foo");
        assert_eq!(detail.full_text, "The full shared text of the post");
        assert_eq!(
            detail.card_content.as_deref(),
            Some("Story title\nStory description here")
        );
    }

    #[test]
    fn non_retruth_header_is_ignored() {
        let html = r#"<div class="status__header">Donald J. Trump</div>
                      <div class="status__content">Plain post</div>"#;
        let detail = parse_post_detail(html);
        assert!(!detail.is_retruth);
        assert!(detail.retruth_header.is_empty());
    }

    #[test]
    fn media_extraction_is_scoped_to_the_media_region() {
        let html = r#"<html><body>
            <img src="https://cdn.example/avatar.jpg">
            <div class="status__media">
              <img src="https://cdn.example/one.jpg">
              <img src="https://cdn.example/two.jpg">
              <video src="https://cdn.example/clip.mp4"></video>
            </div>
        </body></html>"#;
        let detail = parse_post_detail(html);
        assert_eq!(
            detail.media_urls,
            vec!["https://cdn.example/one.jpg", "https://cdn.example/two.jpg"]
        );
        assert_eq!(detail.video_url.as_deref(), Some("https://cdn.example/clip.mp4"));
    }

    #[test]
    fn video_src_falls_back_to_source_child() {
        let html = r#"<div class="status__media">
            <video><source src="https://cdn.example/clip.mp4" type="video/mp4"></video>
        </div>"#;
        let detail = parse_post_detail(html);
        assert_eq!(detail.video_url.as_deref(), Some("https://cdn.example/clip.mp4"));
    }

    #[test]
    fn empty_page_yields_zero_value_record() {
        assert_eq!(parse_post_detail("<html></html>"), PostDetail::default());
    }
}
